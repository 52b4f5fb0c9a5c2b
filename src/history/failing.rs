use tracing::warn;

use crate::tracker::HandRecord;

use super::{HandSink, SinkError};

/// A sink that always fails. Used to check that sessions shrug off sink
/// errors.
pub struct FailingSink;

impl HandSink for FailingSink {
    fn record(&mut self, _hand: &HandRecord) -> Result<(), SinkError> {
        warn!("FailingSink intentionally returning error");
        Err(SinkError::UnableToRecordHand)
    }
}
