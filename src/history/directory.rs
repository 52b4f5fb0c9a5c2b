use std::{fs::File, path::PathBuf};

use tracing::{debug, instrument};

use crate::tracker::HandRecord;

use super::{HandSink, SinkError};

/// Writes each hand to `<base_path>/<hand_id>.json` as pretty printed JSON.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    base_path: PathBuf,
}

impl DirectorySink {
    /// Creates a new `DirectorySink`. The directory is created on the first
    /// write if it doesn't exist yet.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        debug!(?base_path, "Creating DirectorySink");
        DirectorySink { base_path }
    }

    pub fn path_for(&self, hand: &HandRecord) -> PathBuf {
        self.base_path
            .join(hand.hand_id.to_string())
            .with_extension("json")
    }
}

impl HandSink for DirectorySink {
    #[instrument(level = "trace", skip(self, hand), fields(base_path = ?self.base_path, hand_id = %hand.hand_id))]
    fn record(&mut self, hand: &HandRecord) -> Result<(), SinkError> {
        if !self.base_path.exists() {
            debug!(?self.base_path, "Creating directory for hand history");
            std::fs::create_dir_all(&self.base_path)?;
        }

        let hand_path = self.path_for(hand);
        let file = File::create(&hand_path)?;
        debug!(?hand_path, actions = hand.actions.len(), "Writing hand");

        Ok(serde_json::to_writer_pretty(&file, hand)?)
    }
}
