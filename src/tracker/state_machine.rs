use std::collections::HashMap;

use tracing::{debug, info, trace};

use crate::core::Card;

use super::clock::{Clock, SystemClock};
use super::config::{ConfigError, TrackerConfig};
use super::hand::{HandAccumulator, HandId, HandRecord};
use super::normalizer::{ActionNormalizer, DedupPolicy};
use super::observation::{Observation, RawAction, RawAmount};
use super::state::HandState;
use super::street::{Street, street};

/// Why the state machine decided a hand was over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// Fresh hole cards arrived while a hand was still open.
    MissedBoundary,
    /// The hero's hole cards disappeared.
    HeroCardsCleared,
    /// The board went from showing cards to empty.
    BoardCleared,
    /// The pot dropped from above the high threshold to below the low one.
    PotReset,
    /// The caller asked for it.
    Forced,
}

/// Reconstructs hands from a stream of polled table observations.
///
/// One instance per table. Call [`update`](Self::update) once per poll; it
/// returns the hand that finished on that tick, if any. Nothing in here
/// fails: unreadable input is treated as missing, and the worst outcome of
/// noisy input is a hand split in two or two hands merged into one.
///
/// ```
/// use poker_tracker::tracker::{HandState, HandStateMachine, Observation};
///
/// let mut fsm: HandStateMachine = HandStateMachine::default();
/// let tick = Observation::new().hero_cards(["Ah", "Kd"]).pot(0.75);
/// assert!(fsm.update(&tick).is_none());
/// assert_eq!(HandState::Preflop, fsm.current_state());
///
/// let done = fsm.update(&Observation::new()).unwrap();
/// assert_eq!(HandState::Completed, done.state);
/// assert_eq!(HandState::Waiting, fsm.current_state());
/// ```
#[derive(Debug)]
pub struct HandStateMachine<C: Clock = SystemClock> {
    config: TrackerConfig,
    normalizer: ActionNormalizer,
    dedup: DedupPolicy,
    clock: C,

    current_state: HandState,
    current_hand: Option<HandAccumulator>,
    hand_history: Vec<HandRecord>,

    // What the previous tick showed, for the completion heuristics.
    last_community_count: usize,
    last_pot_size: f64,
    last_player_labels: HashMap<String, String>,
}

impl Default for HandStateMachine<SystemClock> {
    fn default() -> Self {
        Self::build(TrackerConfig::default(), SystemClock)
    }
}

impl HandStateMachine<SystemClock> {
    /// A state machine on the system clock.
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> HandStateMachine<C> {
    pub fn with_clock(config: TrackerConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, clock))
    }

    fn build(config: TrackerConfig, clock: C) -> Self {
        info!(hero = %config.hero_name, "Hand state machine initialized");
        Self {
            dedup: DedupPolicy::from(&config),
            normalizer: ActionNormalizer::default(),
            config,
            clock,
            current_state: HandState::Waiting,
            current_hand: None,
            hand_history: Vec::new(),
            last_community_count: 0,
            last_pot_size: 0.0,
            last_player_labels: HashMap::new(),
        }
    }

    /// Use a custom action label table.
    pub fn with_normalizer(mut self, normalizer: ActionNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn current_state(&self) -> HandState {
        self.current_state
    }

    /// The hand being reconstructed right now.
    pub fn current_hand(&self) -> Option<&HandAccumulator> {
        self.current_hand.as_ref()
    }

    /// A copy of every hand completed so far, oldest first.
    pub fn hand_history(&self) -> Vec<HandRecord> {
        self.hand_history.clone()
    }

    /// Borrowed view of the completed hands.
    pub fn history(&self) -> &[HandRecord] {
        &self.hand_history
    }

    /// Feed one tick worth of observation.
    ///
    /// Returns the hand that completed during this tick. At most one hand
    /// completes per tick.
    pub fn update(&mut self, observation: &Observation) -> Option<HandRecord> {
        let now = self.clock.now();
        let hero_cards = Card::parse_lossy(&observation.hero_cards);
        let board = Card::parse_lossy(&observation.community_cards);
        let board_count = board.len();
        let pot = observation.pot_reading();

        let new_state = self.classify(&hero_cards, board_count);
        let mut emitted = None;
        let mut started_this_tick = false;

        if new_state != self.current_state {
            debug!(from = %self.current_state, to = %new_state, "State transition");
            if new_state == HandState::Preflop {
                if self.current_state != HandState::Waiting {
                    emitted = self.complete_hand(CompletionReason::MissedBoundary);
                }
                self.start_new_hand(observation, hero_cards.clone());
                started_this_tick = true;
            }
            self.current_state = new_state;
        }

        let inferred = self.inferred_actions(observation);
        if let Some(hand) = self.current_hand.as_mut() {
            hand.merge_players(&observation.players);
            hand.merge_board(board);
            hand.merge_pot(pot);

            let action_street = hand.state().street().unwrap_or(Street::Unknown);
            for raw in observation.actions.iter().chain(inferred.iter()) {
                let Some(action) = self.normalizer.normalize(raw, now) else {
                    continue;
                };
                let action = action.with_street(action_street);
                if !hand.push_action(action, &self.dedup) {
                    trace!(
                        player = %raw.player,
                        action = %raw.action,
                        "Discarding duplicate action"
                    );
                }
            }
        }

        if emitted.is_none() {
            if let Some(reason) =
                self.completion_signal(&hero_cards, board_count, pot, started_this_tick)
            {
                debug!(?reason, "Hand completion heuristic fired");
                emitted = self.complete_hand(reason);
            }
        }

        self.last_community_count = board_count;
        if let Some(pot) = pot {
            self.last_pot_size = pot;
        }

        emitted
    }

    /// Complete the open hand now, e.g. when the session is shutting down.
    pub fn force_complete(&mut self) -> Option<HandRecord> {
        self.complete_hand(CompletionReason::Forced)
    }

    /// Back to `Waiting`, dropping any open hand without emitting it.
    /// Completed history is kept.
    pub fn reset(&mut self) {
        if let Some(hand) = self.current_hand.take() {
            debug!(hand_id = %hand.id(), "Discarding open hand on reset");
        }
        self.current_state = HandState::Waiting;
        self.last_community_count = 0;
        self.last_pot_size = 0.0;
        self.last_player_labels.clear();
        info!("Hand state machine reset");
    }

    fn classify(&self, hero_cards: &[Card], board_count: usize) -> HandState {
        match hero_cards.len() {
            0 => HandState::Waiting,
            // A board count that matches no street is detector noise; stay put.
            2 => HandState::from_street(street(board_count)).unwrap_or(self.current_state),
            // One readable hole card is a partial reading, not a new hand.
            _ => self.current_state,
        }
    }

    fn start_new_hand(&mut self, observation: &Observation, hero_cards: Vec<Card>) {
        let now = self.clock.now();
        let hand = HandAccumulator::start(HandId::next(now), now, &observation.players, hero_cards);
        info!(hand_id = %hand.id(), "Started new hand");
        self.current_hand = Some(hand);
        // The previous hand's pot and labels say nothing about this one.
        self.last_pot_size = 0.0;
        self.last_player_labels.clear();
    }

    /// Heuristics that say the open hand is over, checked against what the
    /// previous tick showed. A hand that started this tick has no previous
    /// tick of its own, so only the hero cards check applies to it.
    fn completion_signal(
        &self,
        hero_cards: &[Card],
        board_count: usize,
        pot: Option<f64>,
        started_this_tick: bool,
    ) -> Option<CompletionReason> {
        let hand = self.current_hand.as_ref()?;

        if !hand.hero_cards().is_empty() && hero_cards.is_empty() {
            return Some(CompletionReason::HeroCardsCleared);
        }
        if started_this_tick {
            return None;
        }
        if self.last_community_count > 0 && board_count == 0 {
            return Some(CompletionReason::BoardCleared);
        }
        if let Some(pot) = pot {
            if self.last_pot_size > self.config.pot_reset_high && pot < self.config.pot_reset_low {
                return Some(CompletionReason::PotReset);
            }
        }
        None
    }

    fn complete_hand(&mut self, reason: CompletionReason) -> Option<HandRecord> {
        let hand = self.current_hand.take()?;
        let record = hand.complete(
            &self.config.hero_name,
            self.config.site.as_deref(),
            self.clock.now(),
        );
        info!(
            hand_id = %record.hand_id,
            actions = record.actions.len(),
            ?reason,
            "Completed hand"
        );
        self.hand_history.push(record.clone());
        self.current_state = HandState::Waiting;
        Some(record)
    }

    /// Actions implied by players' action labels changing since last tick.
    fn inferred_actions(&mut self, observation: &Observation) -> Vec<RawAction> {
        if !self.config.infer_player_actions {
            return Vec::new();
        }

        let mut inferred = Vec::new();
        for player in &observation.players {
            let label = player.last_action.as_deref().map(str::trim).unwrap_or("");
            if label.is_empty() {
                // The next label shown is a new action, even if it repeats.
                self.last_player_labels.remove(&player.name);
                continue;
            }
            let previous = self
                .last_player_labels
                .insert(player.name.clone(), label.to_string());
            if previous.as_deref() != Some(label) {
                inferred.push(RawAction {
                    player: player.name.clone(),
                    action: label.to_string(),
                    amount: RawAmount::Text(label.to_string()),
                });
            }
        }
        inferred
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::tracker::action::ActionType;
    use crate::tracker::clock::ManualClock;
    use crate::tracker::observation::ObservedPlayer;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 20, 15, 0).unwrap()
    }

    fn machine() -> (HandStateMachine<ManualClock>, ManualClock) {
        machine_with(TrackerConfig::default())
    }

    fn machine_with(config: TrackerConfig) -> (HandStateMachine<ManualClock>, ManualClock) {
        let clock = ManualClock::new(start());
        let fsm = HandStateMachine::with_clock(config, clock.clone()).unwrap();
        (fsm, clock)
    }

    fn hole(a: &str, b: &str) -> Observation {
        Observation::new().player("Hero").player("Bob").hero_cards([a, b])
    }

    fn tokens(cards: &[Card]) -> Vec<String> {
        cards.iter().map(|c| c.to_string()).collect()
    }

    #[test_log::test]
    fn test_normal_hand() {
        let (mut fsm, clock) = machine();

        let tick1 = hole("Ah", "Kd").pot(0.75);
        assert!(fsm.update(&tick1).is_none());
        assert_eq!(HandState::Preflop, fsm.current_state());

        clock.advance_millis(1000);
        let tick2 = hole("Ah", "Kd")
            .community_cards(["Ac", "7s", "2h"])
            .pot(20.0);
        assert!(fsm.update(&tick2).is_none());
        assert_eq!(HandState::Flop, fsm.current_state());

        clock.advance_millis(1000);
        let record = fsm.update(&Observation::new()).unwrap();
        assert_eq!(vec!["Ah", "Kd"], tokens(&record.hero_cards));
        assert_eq!(vec!["Ac", "7s", "2h"], tokens(&record.community_cards));
        assert_eq!(20.0, record.pot_size);
        assert_eq!(HandState::Completed, record.state);
        assert_eq!("Hero", record.hero_name);
        assert_eq!(vec!["Hero", "Bob"], record.players);
        assert_eq!(start(), record.timestamp);
        assert_eq!(HandState::Waiting, fsm.current_state());
        assert!(fsm.current_hand().is_none());
        assert_eq!(1, fsm.history().len());
    }

    #[test_log::test]
    fn test_missed_boundary_emits_previous_hand() {
        let (mut fsm, clock) = machine();
        fsm.update(&hole("Ah", "Kd").pot(1.5));
        clock.advance_millis(1000);
        fsm.update(
            &hole("Ah", "Kd")
                .community_cards(["Ac", "7s", "2h"])
                .pot(4.0)
                .action("Bob", "bet", 2.0),
        );
        assert_eq!(HandState::Flop, fsm.current_state());
        let first_id = fsm.current_hand().unwrap().id().clone();

        clock.advance_millis(1000);
        let tick = hole("9c", "9d").pot(1.5).action("Bob", "raise", 3.0);
        let record = fsm.update(&tick).unwrap();

        assert_eq!(first_id, record.hand_id);
        assert_eq!(vec!["Ah", "Kd"], tokens(&record.hero_cards));
        assert_eq!(1, record.actions.len());

        assert_eq!(HandState::Preflop, fsm.current_state());
        let hand = fsm.current_hand().unwrap();
        assert!(hand.id() > &first_id);
        assert_eq!(vec!["9c", "9d"], tokens(hand.hero_cards()));
        assert!(hand.community_cards().is_empty());
        // The rest of the tick belongs to the new hand.
        assert_eq!(1.5, hand.pot_size());
        assert_eq!(ActionType::Raise, hand.actions()[0].action_type);

        // The board clearing that came with the new cards must not also end
        // the new hand on the next tick.
        clock.advance_millis(1000);
        assert!(fsm.update(&hole("9c", "9d").pot(1.5)).is_none());
        assert_eq!(HandState::Preflop, fsm.current_state());
    }

    #[test]
    fn test_pot_reset_completes_hand() {
        let (mut fsm, clock) = machine();
        fsm.update(&hole("Ah", "Kd").pot(3.0));
        clock.advance_millis(1000);
        fsm.update(&hole("Ah", "Kd").pot(15.0));
        assert!(fsm.current_hand().is_some());

        clock.advance_millis(1000);
        let record = fsm.update(&hole("Ah", "Kd").pot(2.0)).unwrap();
        assert_eq!(15.0, record.pot_size);
        assert_eq!(HandState::Waiting, fsm.current_state());
    }

    #[test]
    fn test_pot_thresholds_are_configurable() {
        let config = TrackerConfig {
            pot_reset_high: 100.0,
            pot_reset_low: 50.0,
            ..TrackerConfig::default()
        };
        let (mut fsm, _clock) = machine_with(config);
        fsm.update(&hole("Ah", "Kd").pot(15.0));
        assert!(fsm.update(&hole("Ah", "Kd").pot(2.0)).is_none());
        fsm.update(&hole("Ah", "Kd").pot(150.0));
        assert!(fsm.update(&hole("Ah", "Kd").pot(40.0)).is_some());
    }

    #[test]
    fn test_missing_pot_reading_is_not_a_reset() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd").pot(30.0));
        fsm.update(&hole("Ah", "Kd").pot(30.0));
        assert!(fsm.update(&hole("Ah", "Kd")).is_none());
        assert!(fsm.update(&hole("Ah", "Kd").pot(f64::NAN)).is_none());
        assert_eq!(30.0, fsm.current_hand().unwrap().pot_size());
        // The last real reading is still remembered.
        assert!(fsm.update(&hole("Ah", "Kd").pot(1.0)).is_some());
    }

    #[test]
    fn test_board_cleared_completes_hand() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd"));
        fsm.update(&hole("Ah", "Kd").community_cards(["Ac", "7s", "2h", "3d"]));
        assert_eq!(HandState::Turn, fsm.current_state());

        // Same hole cards, board gone: a preflop reading while on the turn.
        let record = fsm.update(&hole("Ah", "Kd")).unwrap();
        assert_eq!(4, record.community_cards.len());
        // The same cards still showing start a fresh hand.
        assert_eq!(HandState::Preflop, fsm.current_state());
        assert!(fsm.current_hand().is_some());
    }

    #[test]
    fn test_board_cleared_while_preflop() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd"));
        // A single card is not a street; the state holds at preflop.
        fsm.update(&hole("Ah", "Kd").community_cards(["Ac"]));
        assert_eq!(HandState::Preflop, fsm.current_state());

        let record = fsm.update(&hole("Ah", "Kd")).unwrap();
        assert_eq!(1, record.community_cards.len());
        assert_eq!(HandState::Waiting, fsm.current_state());
    }

    #[test]
    fn test_stale_pot_does_not_end_next_hand() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd"));
        fsm.update(&hole("Ah", "Kd").community_cards(["Ac", "7s", "2h"]).pot(40.0));
        // New cards arrive but the pot can't be read.
        assert!(fsm.update(&hole("9c", "9d")).is_some());
        assert!(fsm.update(&hole("9c", "9d").pot(1.5)).is_none());
        assert_eq!(HandState::Preflop, fsm.current_state());
    }

    #[test]
    fn test_new_hand_after_board_shown_completion_survives() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd"));
        fsm.update(&hole("Ah", "Kd").community_cards(["Ac", "7s", "2h", "3d", "8c"]));
        // Hero mucks, board still on screen.
        let done = fsm.update(&Observation::new().community_cards(["Ac", "7s", "2h", "3d", "8c"]));
        assert!(done.is_some());

        // Next deal: new hole cards and the board has cleared.
        assert!(fsm.update(&hole("Qs", "Jh")).is_none());
        assert_eq!(HandState::Preflop, fsm.current_state());
        assert!(fsm.current_hand().is_some());
    }

    #[test]
    fn test_duplicate_action_across_ticks() {
        let (mut fsm, clock) = machine();
        fsm.update(&hole("Ah", "Kd").action("Bob", "raise", 8.0));
        clock.advance_millis(1000);
        fsm.update(&hole("Ah", "Kd").action("Bob", "raise", 8.0));
        assert_eq!(1, fsm.current_hand().unwrap().actions().len());

        // Same label well after the window is a new action.
        clock.advance_millis(2500);
        fsm.update(&hole("Ah", "Kd").action("Bob", "raise", 8.0));
        assert_eq!(2, fsm.current_hand().unwrap().actions().len());
    }

    #[test]
    fn test_duplicate_within_one_tick() {
        let (mut fsm, _clock) = machine();
        fsm.update(
            &hole("Ah", "Kd")
                .action("Bob", "raise", 8.0)
                .action("Bob", "RAISE!", "$8"),
        );
        assert_eq!(1, fsm.current_hand().unwrap().actions().len());
    }

    #[test]
    fn test_actions_carry_street() {
        let (mut fsm, clock) = machine();
        fsm.update(&hole("Ah", "Kd").action("Bob", "call", 1.0));
        clock.advance_millis(1000);
        fsm.update(
            &hole("Ah", "Kd")
                .community_cards(["Ac", "7s", "2h"])
                .action("Bob", "bet", 3.0)
                .action("", "fold", 0.0)
                .action("Cy", "mumble", 0.0),
        );
        let actions = fsm.current_hand().unwrap().actions();
        assert_eq!(2, actions.len());
        assert_eq!(Street::Preflop, actions[0].street);
        assert_eq!(Street::Flop, actions[1].street);
        assert_eq!(start(), actions[0].timestamp);
    }

    #[test]
    fn test_community_cards_never_shrink_within_hand() {
        let (mut fsm, _clock) = machine();
        let boards: [&[&str]; 6] = [
            &[],
            &["Ac", "7s", "2h"],
            &["Ac", "7s"],
            &["Ac", "7s", "2h", "9d"],
            &["Ac", "7s", "2h"],
            &["Ac", "7s", "2h", "9d", "Tc"],
        ];
        let mut last = 0;
        for board in boards {
            let emitted = fsm.update(&hole("Ah", "Kd").community_cards(board.iter().copied()));
            assert!(emitted.is_none());
            let len = fsm.current_hand().unwrap().community_cards().len();
            assert!(len >= last);
            last = len;
        }
        assert_eq!(5, last);
    }

    #[test]
    fn test_unknown_board_count_keeps_state() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd").community_cards(["Ac", "7s", "2h"]));
        // Joined mid-hand: no accumulator until a fresh preflop.
        assert_eq!(HandState::Flop, fsm.current_state());
        assert!(fsm.current_hand().is_none());

        fsm.update(&hole("Ah", "Kd").community_cards(["Ac", "7s", "2h", "9d", "Tc", "Jc"]));
        assert_eq!(HandState::Flop, fsm.current_state());
        fsm.update(&hole("Ah", "Kd").community_cards(["Ac", "7s"]));
        assert_eq!(HandState::Flop, fsm.current_state());
    }

    #[test]
    fn test_malformed_tokens_are_ignored() {
        let (mut fsm, _clock) = machine();
        fsm.update(&Observation::new().hero_cards(["??", "X"]));
        assert_eq!(HandState::Waiting, fsm.current_state());

        fsm.update(&hole("ah", "KD").community_cards(["Zz"]));
        assert_eq!(HandState::Preflop, fsm.current_state());
        let hand = fsm.current_hand().unwrap();
        assert_eq!(vec!["Ah", "Kd"], tokens(hand.hero_cards()));
    }

    #[test]
    fn test_at_most_one_hand_in_flight() {
        let (mut fsm, clock) = machine();
        let ticks = [
            hole("Ah", "Kd"),
            hole("Ah", "Kd").community_cards(["Ac", "7s", "2h"]).pot(12.0),
            hole("9c", "9d"),
            Observation::new(),
            Observation::new().pot(50.0),
            hole("2c", "3d").pot(1.0),
            hole("2c", "3d").pot(30.0),
            hole("2c", "3d").pot(0.5),
        ];
        let mut emitted = 0;
        for tick in &ticks {
            clock.advance_millis(1000);
            if fsm.update(tick).is_some() {
                emitted += 1;
            }
            if fsm.current_hand().is_some() {
                assert!(fsm.current_state().is_in_hand());
            }
        }
        assert_eq!(emitted, fsm.history().len());
        assert_eq!(3, emitted);

        let ids: Vec<_> = fsm.history().iter().map(|h| h.hand_id.clone()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_history_is_a_copy() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd"));
        fsm.update(&Observation::new());

        let first = fsm.hand_history();
        let second = fsm.hand_history();
        assert_eq!(first, second);

        let mut copy = fsm.hand_history();
        copy.clear();
        assert_eq!(1, fsm.hand_history().len());
    }

    #[test]
    fn test_reset_discards_open_hand() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd"));
        fsm.update(&Observation::new());
        fsm.update(&hole("Qs", "Qd").pot(25.0));
        assert!(fsm.current_hand().is_some());

        fsm.reset();
        assert_eq!(HandState::Waiting, fsm.current_state());
        assert!(fsm.current_hand().is_none());
        assert_eq!(1, fsm.history().len());
        assert!(fsm.force_complete().is_none());
    }

    #[test]
    fn test_force_complete() {
        let (mut fsm, clock) = machine();
        fsm.update(&hole("Ah", "Kd").pot(3.0));
        clock.advance_millis(4000);
        let record = fsm.force_complete().unwrap();
        assert_eq!(Some(start() + chrono::TimeDelta::seconds(4)), record.completed_at);
        assert_eq!(HandState::Waiting, fsm.current_state());
        assert!(fsm.force_complete().is_none());
    }

    #[test]
    fn test_site_and_hero_name_from_config() {
        let config = TrackerConfig::default()
            .with_hero_name("me")
            .with_site("betonline");
        let (mut fsm, _clock) = machine_with(config);
        fsm.update(&hole("Ah", "Kd"));
        let record = fsm.force_complete().unwrap();
        assert_eq!("me", record.hero_name);
        assert_eq!(Some("betonline".to_string()), record.site);
    }

    #[test]
    fn test_players_and_stacks_accumulate() {
        let (mut fsm, _clock) = machine();
        fsm.update(&hole("Ah", "Kd").seated(ObservedPlayer::new("Cy").with_stack(44.0)));
        fsm.update(&hole("Ah", "Kd").player("Dee").action("Eve", "fold", 0.0));
        let record = fsm.force_complete().unwrap();
        assert_eq!(vec!["Hero", "Bob", "Cy", "Dee", "Eve"], record.players);
        assert_eq!(Some(&44.0), record.player_stacks.get("Cy"));
    }

    #[test]
    fn test_inferred_actions_from_labels() {
        let config = TrackerConfig {
            infer_player_actions: true,
            ..TrackerConfig::default()
        };
        let (mut fsm, clock) = machine_with(config);
        let with_label = |label: &str| {
            Observation::new()
                .hero_cards(["Ah", "Kd"])
                .seated(ObservedPlayer::new("Bob").with_last_action(label))
        };

        fsm.update(&with_label("Raise $8"));
        clock.advance_millis(3000);
        // Unchanged label is the same action still on screen.
        fsm.update(&with_label("Raise $8"));
        clock.advance_millis(1000);
        fsm.update(&with_label("Call"));

        let actions = fsm.current_hand().unwrap().actions();
        assert_eq!(2, actions.len());
        assert_eq!(ActionType::Raise, actions[0].action_type);
        assert_eq!(8.0, actions[0].amount);
        assert_eq!(ActionType::Call, actions[1].action_type);
    }

    #[test]
    fn test_label_shown_again_after_clearing() {
        let config = TrackerConfig {
            infer_player_actions: true,
            ..TrackerConfig::default()
        };
        let (mut fsm, clock) = machine_with(config);
        let tick = |board: &[&str], label: Option<&str>| {
            let mut bob = ObservedPlayer::new("Bob");
            bob.last_action = label.map(str::to_string);
            Observation::new()
                .hero_cards(["Ah", "Kd"])
                .community_cards(board.iter().copied())
                .seated(bob)
        };

        fsm.update(&tick(&[], Some("Call")));
        clock.advance_millis(5000);
        fsm.update(&tick(&["Ac", "7s", "2h"], None));
        clock.advance_millis(5000);
        fsm.update(&tick(&["Ac", "7s", "2h", "9d"], Some("Call")));

        let actions = fsm.current_hand().unwrap().actions();
        assert_eq!(2, actions.len());
        assert_eq!(
            vec![Street::Preflop, Street::Turn],
            actions.iter().map(|a| a.street).collect::<Vec<_>>()
        );
        assert!(actions.iter().all(|a| a.action_type == ActionType::Call));
    }

    #[test]
    fn test_labels_forgotten_between_hands() {
        let config = TrackerConfig {
            infer_player_actions: true,
            ..TrackerConfig::default()
        };
        let (mut fsm, clock) = machine_with(config);
        let with_label = |cards: [&str; 2]| {
            Observation::new()
                .hero_cards(cards)
                .seated(ObservedPlayer::new("Bob").with_last_action("Call"))
        };

        fsm.update(&with_label(["Ah", "Kd"]));
        clock.advance_millis(5000);
        fsm.update(&Observation::new());
        clock.advance_millis(5000);
        fsm.update(&with_label(["9c", "9d"]));

        let actions = fsm.current_hand().unwrap().actions();
        assert_eq!(1, actions.len());
        assert_eq!(ActionType::Call, actions[0].action_type);
    }

    #[test]
    fn test_single_hole_card_is_not_a_new_hand() {
        let (mut fsm, _clock) = machine();
        fsm.update(&Observation::new().hero_cards(["Ah", "K?"]));
        assert_eq!(HandState::Waiting, fsm.current_state());
        assert!(fsm.current_hand().is_none());

        fsm.update(&hole("Ah", "Kd"));
        fsm.update(&hole("Ah", "Kd").community_cards(["Ac", "7s", "2h"]));
        let id = fsm.current_hand().unwrap().id().clone();

        // A garbled card while on the flop neither ends nor restarts the hand.
        assert!(fsm.update(&hole("Ah", "??").community_cards(["Ac", "7s", "2h"])).is_none());
        assert_eq!(HandState::Flop, fsm.current_state());
        let hand = fsm.current_hand().unwrap();
        assert_eq!(&id, hand.id());
        assert_eq!(2, hand.hero_cards().len());
    }

    #[test]
    fn test_labels_ignored_by_default() {
        let (mut fsm, _clock) = machine();
        fsm.update(
            &Observation::new()
                .hero_cards(["Ah", "Kd"])
                .seated(ObservedPlayer::new("Bob").with_last_action("Raise $8")),
        );
        assert!(fsm.current_hand().unwrap().actions().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig {
            dedup_lookback: 0,
            ..TrackerConfig::default()
        };
        assert!(HandStateMachine::new(config).is_err());
    }

    #[test]
    fn test_custom_normalizer() {
        let (fsm, _clock) = machine();
        let mut fsm = fsm.with_normalizer(ActionNormalizer::default().with_keyword("shove", ActionType::AllIn));
        fsm.update(&hole("Ah", "Kd").action("Bob", "shoves", 100.0));
        assert_eq!(
            ActionType::AllIn,
            fsm.current_hand().unwrap().actions()[0].action_type
        );
    }
}
