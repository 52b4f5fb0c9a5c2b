//! Turning OCR'd action labels into [`PlayerAction`]s.
//!
//! Labels arrive with trailing garbage, odd casing and amounts formatted for
//! humans. Matching is table driven: an exact keyword match wins, otherwise
//! the first keyword contained anywhere in the label is used.

use approx::abs_diff_eq;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

use super::action::{ActionType, PlayerAction};
use super::config::TrackerConfig;
use super::observation::RawAction;

/// Keywords checked in order. All-in comes first so that labels such as
/// "call all-in" are not read as a plain call.
const DEFAULT_KEYWORDS: [(&str, ActionType); 9] = [
    ("all-in", ActionType::AllIn),
    ("all in", ActionType::AllIn),
    ("allin", ActionType::AllIn),
    ("fold", ActionType::Fold),
    ("check", ActionType::Check),
    ("call", ActionType::Call),
    ("bet", ActionType::Bet),
    ("raise", ActionType::Raise),
    ("post", ActionType::Post),
];

/// Maps free text action labels onto [`ActionType`].
#[derive(Debug, Clone)]
pub struct ActionNormalizer {
    keywords: Vec<(String, ActionType)>,
}

impl Default for ActionNormalizer {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS
                .iter()
                .map(|(k, t)| (k.to_string(), *t))
                .collect(),
        }
    }
}

impl ActionNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a site specific label. Later keywords lose substring ties to
    /// earlier ones.
    pub fn with_keyword(mut self, keyword: impl Into<String>, action_type: ActionType) -> Self {
        self.keywords
            .push((keyword.into().trim().to_lowercase(), action_type));
        self
    }

    /// Resolve a label to an action type.
    ///
    /// ```
    /// use poker_tracker::tracker::{ActionNormalizer, ActionType};
    ///
    /// let normalizer = ActionNormalizer::default();
    /// assert_eq!(Some(ActionType::Raise), normalizer.classify("  RAISE "));
    /// assert_eq!(Some(ActionType::Call), normalizer.classify("calls~|"));
    /// assert_eq!(None, normalizer.classify("sitting out"));
    /// ```
    pub fn classify(&self, text: &str) -> Option<ActionType> {
        let label = text.trim().to_lowercase();
        if label.is_empty() {
            return None;
        }

        self.keywords
            .iter()
            .find(|(keyword, _)| *keyword == label)
            .or_else(|| {
                self.keywords
                    .iter()
                    .find(|(keyword, _)| label.contains(keyword.as_str()))
            })
            .map(|(_, action_type)| *action_type)
    }

    /// Normalize one raw action observed at `timestamp`.
    ///
    /// Returns `None` when there is no player name or no recognizable
    /// action. That's "nothing learned this tick", not an error.
    pub fn normalize(&self, raw: &RawAction, timestamp: DateTime<Utc>) -> Option<PlayerAction> {
        let player = raw.player.trim();
        if player.is_empty() {
            trace!(action = %raw.action, "Dropping action without a player");
            return None;
        }

        let Some(action_type) = self.classify(&raw.action) else {
            trace!(player, action = %raw.action, "Unrecognized action label");
            return None;
        };

        Some(PlayerAction::new(
            player,
            action_type,
            raw.amount.value(),
            timestamp,
        ))
    }
}

/// Parse an amount as printed on a table: `"$1,250.50"`, `"€ 3"`, `"2.5k"`.
///
/// Unreadable, negative and non-finite amounts come back as zero; an action
/// without a confirmed amount is still worth keeping for sequencing.
///
/// ```
/// use poker_tracker::tracker::parse_amount;
///
/// assert_eq!(1250.5, parse_amount("$1,250.50"));
/// assert_eq!(2500.0, parse_amount("2.5K"));
/// assert_eq!(8.0, parse_amount("Raise $8"));
/// assert_eq!(8000.0, parse_amount("Raise to 8k"));
/// assert_eq!(0.0, parse_amount("n/a"));
/// ```
pub fn parse_amount(text: &str) -> f64 {
    read_amount(text).unwrap_or(0.0)
}

/// Like [`parse_amount`] but `None` when nothing usable was read.
pub(crate) fn read_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',') && !c.is_whitespace())
        .collect();

    let direct = match cleaned.chars().last() {
        Some(suffix @ ('k' | 'K' | 'm' | 'M')) => cleaned[..cleaned.len() - 1]
            .parse::<f64>()
            .ok()
            .map(|v| v * scale(suffix)),
        _ => cleaned.parse::<f64>().ok(),
    };

    // Labels like "Raise $8" carry the amount after the keyword.
    let amount = direct.or_else(|| {
        let start = cleaned.find(|c: char| c.is_ascii_digit())?;
        let digits: String = cleaned[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let value = digits.parse::<f64>().ok()?;

        // A k or m straight after the number scales it, unless it starts a
        // word ("8max").
        let mut rest = cleaned[start + digits.len()..].chars();
        match (rest.next(), rest.next()) {
            (Some(suffix @ ('k' | 'K' | 'm' | 'M')), next)
                if !next.is_some_and(char::is_alphabetic) =>
            {
                Some(value * scale(suffix))
            }
            _ => Some(value),
        }
    })?;

    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn scale(suffix: char) -> f64 {
    match suffix {
        'k' | 'K' => 1_000.0,
        _ => 1_000_000.0,
    }
}

/// Decides whether a freshly normalized action is a re-read of one already
/// in the log.
///
/// The table UI keeps showing an action label for a while, so the same
/// action gets observed across consecutive polls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupPolicy {
    pub window: TimeDelta,
    pub lookback: usize,
    pub amount_tolerance: f64,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self::from(&TrackerConfig::default())
    }
}

impl From<&TrackerConfig> for DedupPolicy {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            window: config.dedup_window(),
            lookback: config.dedup_lookback,
            amount_tolerance: config.amount_tolerance,
        }
    }
}

impl DedupPolicy {
    /// True when one of the last `lookback` entries has the same player,
    /// the same action type, an amount within tolerance and was seen less
    /// than `window` before the candidate.
    pub fn is_duplicate(&self, log: &[PlayerAction], candidate: &PlayerAction) -> bool {
        let start = log.len().saturating_sub(self.lookback);
        log[start..].iter().any(|recent| {
            recent.player_name == candidate.player_name
                && recent.action_type == candidate.action_type
                && abs_diff_eq!(
                    recent.amount,
                    candidate.amount,
                    epsilon = self.amount_tolerance
                )
                && candidate.timestamp - recent.timestamp < self.window
        })
    }
}
