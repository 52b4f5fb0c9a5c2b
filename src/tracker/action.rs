use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::street::Street;

/// The closed set of things a player can be seen doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
    /// A forced blind or ante.
    Post,
}

impl ActionType {
    /// Money went in by choice.
    pub const fn is_voluntary(&self) -> bool {
        matches!(
            self,
            ActionType::Call | ActionType::Bet | ActionType::Raise | ActionType::AllIn
        )
    }

    /// Money went in as a bet or raise rather than a call.
    pub const fn is_aggressive(&self) -> bool {
        matches!(
            self,
            ActionType::Bet | ActionType::Raise | ActionType::AllIn
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Fold => "fold",
            ActionType::Check => "check",
            ActionType::Call => "call",
            ActionType::Bet => "bet",
            ActionType::Raise => "raise",
            ActionType::AllIn => "all_in",
            ActionType::Post => "post",
        };
        f.write_str(s)
    }
}

fn unknown_street() -> Street {
    Street::Unknown
}

/// One normalized action in a hand's action log.
///
/// Immutable once it has been appended to a hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAction {
    #[serde(rename = "player")]
    pub player_name: String,
    #[serde(rename = "action")]
    pub action_type: ActionType,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    /// Street the hand was on when the action was observed.
    #[serde(default = "unknown_street")]
    pub street: Street,
}

impl PlayerAction {
    pub fn new(
        player_name: impl Into<String>,
        action_type: ActionType,
        amount: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            action_type,
            amount,
            timestamp,
            street: Street::Unknown,
        }
    }

    pub fn with_street(mut self, street: Street) -> Self {
        self.street = street;
        self
    }
}
