//! # Hand tracking
//!
//! Reconstructs complete hands from a stream of noisy table observations.
//!
//! Each poll of the table produces an [`Observation`]: whatever hole cards,
//! board cards, pot and action labels the screen reader managed to pick up.
//! A [`HandStateMachine`] folds those observations into an open hand, decides
//! when that hand has ended, and emits it as a [`HandRecord`]. A
//! [`TableSession`] drives the state machine from an [`ObservationSource`]
//! and hands every record to its [`HandSink`](crate::history::HandSink)s.
//!
//! ## Completion heuristics
//!
//! The table never says "this hand is over". A hand is treated as complete
//! when any of the following is seen while it is open:
//!
//! - The hero's hole cards disappear.
//! - New hole cards show up with an empty board.
//! - The board goes from showing cards to empty.
//! - The pot drops from above `pot_reset_high` to below `pot_reset_low`.
mod action;
mod clock;
mod config;
mod hand;
mod normalizer;
mod observation;
mod session;
mod state;
mod state_machine;
mod street;

pub use self::action::{ActionType, PlayerAction};
pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::config::{ConfigError, TrackerConfig};
pub use self::hand::{HandAccumulator, HandId, HandIdParseError, HandRecord};
pub use self::normalizer::{ActionNormalizer, DedupPolicy, parse_amount};
pub use self::observation::{Observation, ObservedPlayer, RawAction, RawAmount};
pub use self::session::{IterSource, JsonLinesSource, ObservationSource, TableSession, Tick};
pub use self::state::HandState;
pub use self::state_machine::{CompletionReason, HandStateMachine};
pub use self::street::{Street, street};
