use std::fmt;

use serde::{Deserialize, Serialize};

use super::street::Street;

/// State of the hand reconstruction state machine.
///
/// ```text
/// Waiting -> Preflop -> Flop -> Turn -> River -> Completed -> Waiting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandState {
    /// No hole cards visible; between hands.
    #[default]
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    /// Declared so records from other tools can carry it. Board counts alone
    /// can't tell a finished river from a showdown, so the state machine
    /// never enters it.
    Showdown,
    /// Terminal state carried by emitted hand records.
    Completed,
}

impl HandState {
    /// The state for a table showing hole cards and a board on `street`.
    ///
    /// Returns `None` for [`Street::Unknown`]; callers keep whatever state
    /// they were in.
    pub const fn from_street(street: Street) -> Option<Self> {
        match street {
            Street::Preflop => Some(HandState::Preflop),
            Street::Flop => Some(HandState::Flop),
            Street::Turn => Some(HandState::Turn),
            Street::River => Some(HandState::River),
            Street::Unknown => None,
        }
    }

    /// The betting street this state represents, if any.
    pub const fn street(&self) -> Option<Street> {
        match self {
            HandState::Preflop => Some(Street::Preflop),
            HandState::Flop => Some(Street::Flop),
            HandState::Turn => Some(Street::Turn),
            HandState::River | HandState::Showdown => Some(Street::River),
            HandState::Waiting | HandState::Completed => None,
        }
    }

    /// True while a hand is being played.
    pub const fn is_in_hand(&self) -> bool {
        matches!(
            self,
            HandState::Preflop
                | HandState::Flop
                | HandState::Turn
                | HandState::River
                | HandState::Showdown
        )
    }
}

impl fmt::Display for HandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandState::Waiting => "waiting",
            HandState::Preflop => "preflop",
            HandState::Flop => "flop",
            HandState::Turn => "turn",
            HandState::River => "river",
            HandState::Showdown => "showdown",
            HandState::Completed => "completed",
        };
        f.write_str(s)
    }
}
