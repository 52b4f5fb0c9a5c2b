use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::trace;

use super::normalizer::{parse_amount, read_amount};

/// What the capture layer read off the table during one poll.
///
/// Every field is optional on the wire. Missing, null or garbled fields mean
/// "no information this tick" for that field only; the rest of the
/// observation is still used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    #[serde(deserialize_with = "lenient_vec")]
    pub players: Vec<ObservedPlayer>,
    /// Raw hole card tokens. Zero or two when the reader is behaving.
    #[serde(deserialize_with = "lenient_vec")]
    pub hero_cards: Vec<String>,
    /// Raw board tokens. Zero, three, four or five when the reader is behaving.
    #[serde(deserialize_with = "lenient_vec")]
    pub community_cards: Vec<String>,
    /// `None` when the pot couldn't be read this tick.
    #[serde(deserialize_with = "lenient_amount")]
    pub pot_size: Option<f64>,
    /// Action labels seen since the previous poll.
    #[serde(alias = "raw_actions", deserialize_with = "lenient_vec")]
    pub actions: Vec<RawAction>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(mut self, name: impl Into<String>) -> Self {
        self.players.push(ObservedPlayer::new(name));
        self
    }

    pub fn seated(mut self, player: ObservedPlayer) -> Self {
        self.players.push(player);
        self
    }

    pub fn hero_cards<I, S>(mut self, cards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hero_cards = cards.into_iter().map(Into::into).collect();
        self
    }

    pub fn community_cards<I, S>(mut self, cards: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.community_cards = cards.into_iter().map(Into::into).collect();
        self
    }

    pub fn pot(mut self, pot_size: f64) -> Self {
        self.pot_size = Some(pot_size);
        self
    }

    pub fn action(
        mut self,
        player: impl Into<String>,
        action: impl Into<String>,
        amount: impl Into<RawAmount>,
    ) -> Self {
        self.actions.push(RawAction {
            player: player.into(),
            action: action.into(),
            amount: amount.into(),
        });
        self
    }

    /// A usable pot reading. Negative, NaN and infinite readings are noise.
    pub fn pot_reading(&self) -> Option<f64> {
        self.pot_size.filter(|p| p.is_finite() && *p >= 0.0)
    }
}

/// A detected player box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlayerRepr")]
pub struct ObservedPlayer {
    pub name: String,
    pub stack: Option<f64>,
    /// Last action label shown on the player's box, verbatim.
    pub last_action: Option<String>,
}

impl ObservedPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack: None,
            last_action: None,
        }
    }

    pub fn with_stack(mut self, stack: f64) -> Self {
        self.stack = Some(stack);
        self
    }

    pub fn with_last_action(mut self, label: impl Into<String>) -> Self {
        self.last_action = Some(label.into());
        self
    }
}

/// Readers report players either as bare names or as full boxes.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlayerRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default, deserialize_with = "lenient_amount")]
        stack: Option<f64>,
        #[serde(default, alias = "last_action_text", deserialize_with = "lenient")]
        last_action: Option<String>,
    },
}

impl From<PlayerRepr> for ObservedPlayer {
    fn from(repr: PlayerRepr) -> Self {
        match repr {
            PlayerRepr::Name(name) => ObservedPlayer::new(name),
            PlayerRepr::Full {
                name,
                stack,
                last_action,
            } => ObservedPlayer {
                name,
                stack,
                last_action,
            },
        }
    }
}

/// An action label as read from the table, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(default, alias = "player_name", deserialize_with = "lenient")]
    pub player: String,
    #[serde(default, alias = "action_text", deserialize_with = "lenient")]
    pub action: String,
    #[serde(default, deserialize_with = "lenient")]
    pub amount: RawAmount,
}

/// An amount that may have come straight out of OCR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl RawAmount {
    /// The amount in currency units. Anything unreadable counts as zero.
    pub fn value(&self) -> f64 {
        match self {
            RawAmount::Number(n) if n.is_finite() && *n >= 0.0 => *n,
            RawAmount::Number(_) => 0.0,
            RawAmount::Text(text) => parse_amount(text),
            RawAmount::Missing => 0.0,
        }
    }
}

impl From<f64> for RawAmount {
    fn from(n: f64) -> Self {
        RawAmount::Number(n)
    }
}

impl From<&str> for RawAmount {
    fn from(s: &str) -> Self {
        RawAmount::Text(s.to_string())
    }
}

impl From<String> for RawAmount {
    fn from(s: String) -> Self {
        RawAmount::Text(s)
    }
}

/// Null or a value of the wrong shape reads as the field's default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|error| {
        trace!(%error, "Unreadable observation field");
        T::default()
    }))
}

/// Keeps the elements that read cleanly and drops the rest. Anything other
/// than an array is an empty list.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(item) => Some(item),
            Err(error) => {
                trace!(%error, "Dropping unreadable observation entry");
                None
            }
        })
        .collect())
}

/// A number, or text such as `"$12.50"`. Unreadable readings are `None`.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => read_amount(&text),
        _ => None,
    })
}
