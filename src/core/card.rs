use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CardParseError;

/// Card rank. Ordered from deuce to ace.
#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Hash)]
pub enum Value {
    Two = 0,
    Three = 1,
    Four = 2,
    Five = 3,
    Six = 4,
    Seven = 5,
    Eight = 6,
    Nine = 7,
    Ten = 8,
    Jack = 9,
    Queen = 10,
    King = 11,
    Ace = 12,
}

const VALUES: [Value; 13] = [
    Value::Two,
    Value::Three,
    Value::Four,
    Value::Five,
    Value::Six,
    Value::Seven,
    Value::Eight,
    Value::Nine,
    Value::Ten,
    Value::Jack,
    Value::Queen,
    Value::King,
    Value::Ace,
];

impl Value {
    /// All values from lowest to highest.
    pub const fn values() -> [Value; 13] {
        VALUES
    }

    /// Read a value from its single character form. Case insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use poker_tracker::core::Value;
    ///
    /// assert_eq!(Some(Value::Ten), Value::from_char('t'));
    /// assert_eq!(None, Value::from_char('1'));
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            '2' => Some(Self::Two),
            '3' => Some(Self::Three),
            '4' => Some(Self::Four),
            '5' => Some(Self::Five),
            '6' => Some(Self::Six),
            '7' => Some(Self::Seven),
            '8' => Some(Self::Eight),
            '9' => Some(Self::Nine),
            'T' => Some(Self::Ten),
            'J' => Some(Self::Jack),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            'A' => Some(Self::Ace),
            _ => None,
        }
    }

    /// Canonical single character form.
    pub fn to_char(self) -> char {
        match self {
            Self::Two => '2',
            Self::Three => '3',
            Self::Four => '4',
            Self::Five => '5',
            Self::Six => '6',
            Self::Seven => '7',
            Self::Eight => '8',
            Self::Nine => '9',
            Self::Ten => 'T',
            Self::Jack => 'J',
            Self::Queen => 'Q',
            Self::King => 'K',
            Self::Ace => 'A',
        }
    }
}

/// Card suit.
#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Hash)]
pub enum Suit {
    Spade = 0,
    Club = 1,
    Heart = 2,
    Diamond = 3,
}

impl Suit {
    /// All four suits.
    pub const fn suits() -> [Suit; 4] {
        [Suit::Spade, Suit::Club, Suit::Heart, Suit::Diamond]
    }

    /// Read a suit from a letter (`s`, `c`, `h`, `d`, any case) or from the
    /// glyphs some table readers emit (`♠`, `♣`, `♥`, `♦`).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            's' | '♠' | '♤' => Some(Self::Spade),
            'c' | '♣' | '♧' => Some(Self::Club),
            'h' | '♥' | '♡' => Some(Self::Heart),
            'd' | '♦' | '♢' => Some(Self::Diamond),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Self::Spade => 's',
            Self::Club => 'c',
            Self::Heart => 'h',
            Self::Diamond => 'd',
        }
    }
}

/// A single playing card as read off the table.
///
/// Cards serialize as their canonical two character token (`"Ah"`).
#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub value: Value,
    pub suit: Suit,
}

impl Card {
    pub fn new(value: Value, suit: Suit) -> Self {
        Self { value, suit }
    }

    /// Parse every token, keeping the ones that are real cards.
    ///
    /// OCR noise in one slot shouldn't throw away the rest of the reading.
    pub fn parse_lossy<S: AsRef<str>>(tokens: &[S]) -> Vec<Card> {
        tokens
            .iter()
            .filter_map(|t| match Card::try_from(t.as_ref()) {
                Ok(card) => Some(card),
                Err(error) => {
                    tracing::trace!(token = t.as_ref(), %error, "Dropping card token");
                    None
                }
            })
            .collect()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value.to_char(), self.suit.to_char())
    }
}

impl TryFrom<&str> for Card {
    type Error = CardParseError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        let trimmed = token.trim();
        // Some readers report the ten as "10".
        let (value, rest) = if let Some(rest) = trimmed.strip_prefix("10") {
            (Value::Ten, rest)
        } else {
            let mut chars = trimmed.chars();
            let c = chars
                .next()
                .ok_or_else(|| CardParseError::MalformedToken(token.to_string()))?;
            let value = Value::from_char(c).ok_or(CardParseError::UnexpectedValueChar(c))?;
            (value, chars.as_str())
        };

        let mut chars = rest.chars();
        let suit = match (chars.next(), chars.next()) {
            (Some(c), None) => Suit::from_char(c).ok_or(CardParseError::UnexpectedSuitChar(c))?,
            _ => return Err(CardParseError::MalformedToken(token.to_string())),
        };

        Ok(Card { value, suit })
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Card::try_from(token.as_str())
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::try_from(s)
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}
