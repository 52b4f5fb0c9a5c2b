//! Destinations for completed hands.
//!
//! A [`HandSink`] is told about every [`HandRecord`] a session emits. Sinks
//! may fail; the session logs the failure and carries on, so a full disk
//! never stops hand tracking.
mod directory;
mod json_lines;
mod null;
mod stats;
mod vec;

#[cfg(test)]
pub(crate) mod failing;

use thiserror::Error;

use crate::tracker::HandRecord;

pub use self::directory::DirectorySink;
pub use self::json_lines::JsonLinesSink;
pub use self::null::NullSink;
pub use self::stats::{PlayerStats, StatsSink, StatsStorage};
pub use self::vec::VecSink;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Unable to record hand")]
    UnableToRecordHand,
    #[error("Error borrowing shared storage")]
    BorrowMutError(#[from] std::cell::BorrowMutError),
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Something that wants to know about completed hands.
pub trait HandSink {
    /// Called once per emitted hand, in emission order.
    fn record(&mut self, hand: &HandRecord) -> Result<(), SinkError>;
}
