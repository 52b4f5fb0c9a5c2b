use crate::tracker::HandRecord;

use super::{HandSink, SinkError};

/// A no-op sink that discards every hand.
///
/// Useful when you need a sink but don't care about the output.
pub struct NullSink;

impl HandSink for NullSink {
    fn record(&mut self, _hand: &HandRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
