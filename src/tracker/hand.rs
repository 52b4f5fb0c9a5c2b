use std::{
    collections::BTreeMap,
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Card;

use super::action::PlayerAction;
use super::normalizer::DedupPolicy;
use super::observation::ObservedPlayer;
use super::state::HandState;
use super::street::Street;

const HAND_ID_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Process wide so that ids stay unique across tables.
static NEXT_HAND_SEQUENCE: AtomicU64 = AtomicU64::new(1);

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum HandIdParseError {
    #[error("Hand id {0:?} has no sequence number")]
    MissingSequence(String),
    #[error("Hand id {0:?} has an invalid sequence number")]
    InvalidSequence(String),
    #[error("Hand id {0:?} has an invalid timestamp")]
    InvalidTimestamp(String),
}

/// Identifier of a reconstructed hand.
///
/// Made of the second the hand was first seen and a sequence number that
/// increases with every hand created in this process. Ids order by sequence,
/// i.e. by creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HandId {
    started: DateTime<Utc>,
    sequence: u64,
}

impl HandId {
    /// Allocate the next id.
    pub fn next(started: DateTime<Utc>) -> Self {
        Self {
            started: started.trunc_subsecs(0),
            sequence: NEXT_HAND_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }
}

impl Ord for HandId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then(self.started.cmp(&other.started))
    }
}

impl PartialOrd for HandId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for HandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{:06}",
            self.started.format(HAND_ID_TIME_FORMAT),
            self.sequence
        )
    }
}

impl FromStr for HandId {
    type Err = HandIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (stamp, sequence) = s
            .rsplit_once('_')
            .ok_or_else(|| HandIdParseError::MissingSequence(s.to_string()))?;
        let sequence = sequence
            .parse::<u64>()
            .map_err(|_| HandIdParseError::InvalidSequence(s.to_string()))?;
        let started = NaiveDateTime::parse_from_str(stamp, HAND_ID_TIME_FORMAT)
            .map_err(|_| HandIdParseError::InvalidTimestamp(s.to_string()))?
            .and_utc();
        Ok(Self { started, sequence })
    }
}

impl TryFrom<String> for HandId {
    type Error = HandIdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HandId> for String {
    fn from(id: HandId) -> Self {
        id.to_string()
    }
}

/// The hand currently being reconstructed.
///
/// Only the state machine mutates it. Community cards and pot only ever
/// grow; a shrinking reading is evidence of a new hand, not a correction.
#[derive(Debug, Clone, PartialEq)]
pub struct HandAccumulator {
    id: HandId,
    started_at: DateTime<Utc>,
    state: HandState,
    players: Vec<String>,
    player_stacks: BTreeMap<String, f64>,
    hero_cards: Vec<Card>,
    community_cards: Vec<Card>,
    pot_size: f64,
    actions: Vec<PlayerAction>,
}

impl HandAccumulator {
    pub(crate) fn start(
        id: HandId,
        started_at: DateTime<Utc>,
        players: &[ObservedPlayer],
        hero_cards: Vec<Card>,
    ) -> Self {
        let mut hand = Self {
            id,
            started_at,
            state: HandState::Preflop,
            players: Vec::with_capacity(players.len()),
            player_stacks: BTreeMap::new(),
            hero_cards,
            community_cards: Vec::new(),
            pot_size: 0.0,
            actions: Vec::new(),
        };
        hand.merge_players(players);
        hand
    }

    pub fn id(&self) -> &HandId {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> HandState {
        self.state
    }

    /// Every player name seen during this hand, in order of appearance.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// First stack reading seen for each player.
    pub fn player_stacks(&self) -> &BTreeMap<String, f64> {
        &self.player_stacks
    }

    pub fn hero_cards(&self) -> &[Card] {
        &self.hero_cards
    }

    pub fn community_cards(&self) -> &[Card] {
        &self.community_cards
    }

    pub fn pot_size(&self) -> f64 {
        self.pot_size
    }

    pub fn actions(&self) -> &[PlayerAction] {
        &self.actions
    }

    /// The street implied by the board collected so far.
    pub fn street(&self) -> Street {
        Street::from_community_count(self.community_cards.len())
    }

    pub(crate) fn note_player(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && !self.players.iter().any(|p| p == name) {
            self.players.push(name.to_string());
        }
    }

    pub(crate) fn merge_players(&mut self, players: &[ObservedPlayer]) {
        for player in players {
            self.note_player(&player.name);
            if let Some(stack) = player.stack.filter(|s| s.is_finite() && *s >= 0.0) {
                let name = player.name.trim();
                if !name.is_empty() {
                    self.player_stacks.entry(name.to_string()).or_insert(stack);
                }
            }
        }
    }

    /// Replace the board if the new reading is longer. Never shortens it.
    pub(crate) fn merge_board(&mut self, board: Vec<Card>) {
        if board.len() > self.community_cards.len() {
            self.community_cards = board;
            if let Some(state) = HandState::from_street(self.street()) {
                self.state = state;
            }
        }
    }

    /// Raise the pot if the reading is higher. Never lowers it.
    pub(crate) fn merge_pot(&mut self, pot: Option<f64>) {
        if let Some(pot) = pot {
            if pot > self.pot_size {
                self.pot_size = pot;
            }
        }
    }

    /// Append unless it is a re-read of a recent action. Returns whether the
    /// action was kept.
    pub(crate) fn push_action(&mut self, action: PlayerAction, dedup: &DedupPolicy) -> bool {
        if dedup.is_duplicate(&self.actions, &action) {
            return false;
        }
        self.note_player(&action.player_name);
        self.actions.push(action);
        true
    }

    pub(crate) fn complete(
        self,
        hero_name: &str,
        site: Option<&str>,
        completed_at: DateTime<Utc>,
    ) -> HandRecord {
        HandRecord {
            hand_id: self.id,
            timestamp: self.started_at,
            completed_at: Some(completed_at),
            state: HandState::Completed,
            site: site.map(str::to_string),
            players: self.players,
            player_stacks: self.player_stacks,
            hero_name: hero_name.to_string(),
            hero_cards: self.hero_cards,
            community_cards: self.community_cards,
            pot_size: self.pot_size,
            actions: self.actions,
            winner: None,
        }
    }
}

/// A finished hand, as handed to sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    pub hand_id: HandId,
    /// When the hand was first seen.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub state: HandState,
    #[serde(default)]
    pub site: Option<String>,
    pub players: Vec<String>,
    #[serde(default)]
    pub player_stacks: BTreeMap<String, f64>,
    pub hero_name: String,
    pub hero_cards: Vec<Card>,
    pub community_cards: Vec<Card>,
    pub pot_size: f64,
    pub actions: Vec<PlayerAction>,
    /// Winner resolution needs showdown reading, which the tracker doesn't
    /// do. Always `None` for tracked hands.
    #[serde(default)]
    pub winner: Option<String>,
}

impl HandRecord {
    /// Last street the hand reached.
    pub fn street(&self) -> Street {
        Street::from_community_count(self.community_cards.len())
    }

    pub fn actions_on(&self, street: Street) -> impl Iterator<Item = &PlayerAction> {
        self.actions.iter().filter(move |a| a.street == street)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
