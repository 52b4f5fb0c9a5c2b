use std::fmt;

use serde::{Deserialize, Serialize};

/// Betting street as implied by the number of community cards showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    /// The board reading doesn't correspond to any street. Usually a
    /// detector missed a card or saw one twice.
    Unknown,
}

impl Street {
    /// Classify a board by its card count.
    ///
    /// ```
    /// use poker_tracker::tracker::Street;
    ///
    /// assert_eq!(Street::Preflop, Street::from_community_count(0));
    /// assert_eq!(Street::River, Street::from_community_count(5));
    /// assert_eq!(Street::Unknown, Street::from_community_count(2));
    /// ```
    pub const fn from_community_count(count: usize) -> Self {
        match count {
            0 => Street::Preflop,
            3 => Street::Flop,
            4 => Street::Turn,
            5 => Street::River,
            _ => Street::Unknown,
        }
    }

    /// The number of community cards showing on this street.
    pub const fn community_count(&self) -> Option<usize> {
        match self {
            Street::Preflop => Some(0),
            Street::Flop => Some(3),
            Street::Turn => Some(4),
            Street::River => Some(5),
            Street::Unknown => None,
        }
    }

    pub const fn is_known(&self) -> bool {
        !matches!(self, Street::Unknown)
    }
}

/// Shorthand for [`Street::from_community_count`].
pub const fn street(community_card_count: usize) -> Street {
    Street::from_community_count(community_card_count)
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
