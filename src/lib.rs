//! Poker Tracker
//!
//! This library turns what a screen reader sees on a poker table into
//! structured hand histories.
//!
//! The library is split into three modules:
//!
//! - [`core`] holds cards and card token parsing.
//! - [`tracker`] holds the observation model, action normalization and the
//!   hand state machine that decides where one hand ends and the next begins.
//! - [`history`] holds the sinks completed hands are written to, along with
//!   running per player statistics.
//!
//! ```
//! use poker_tracker::tracker::{HandState, HandStateMachine, Observation};
//!
//! let mut fsm: HandStateMachine = HandStateMachine::default();
//!
//! fsm.update(
//!     &Observation::new()
//!         .player("Hero")
//!         .player("Villain")
//!         .hero_cards(["Ah", "Kd"])
//!         .pot(1.5)
//!         .action("Villain", "raise", 3.0),
//! );
//! fsm.update(
//!     &Observation::new()
//!         .hero_cards(["Ah", "Kd"])
//!         .community_cards(["Qs", "Jh", "2c"])
//!         .pot(7.5),
//! );
//! assert_eq!(HandState::Flop, fsm.current_state());
//!
//! let hand = fsm.update(&Observation::new()).unwrap();
//! assert_eq!(3, hand.community_cards.len());
//! assert_eq!(1, hand.actions.len());
//! ```

/// Cards and card parsing.
pub mod core;

/// Observations, the hand state machine and table sessions.
pub mod tracker;

/// Sinks for completed hands.
pub mod history;
