use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::PathBuf,
};

use tracing::{debug, instrument};

use crate::tracker::HandRecord;

use super::{HandSink, SinkError};

/// Appends each hand as one compact JSON object per line.
///
/// The file and its parent directories are created as needed, and existing
/// content is never truncated, so several sessions can share one file.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    output_path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

impl HandSink for JsonLinesSink {
    #[instrument(level = "trace", skip(self, hand), fields(output_path = ?self.output_path))]
    fn record(&mut self, hand: &HandRecord) -> Result<(), SinkError> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!(?parent, "Creating directory for hand history");
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, hand)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
