use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use tracing::trace;

use crate::tracker::{ActionType, HandRecord, Street};

use super::{HandSink, SinkError};

/// Running counts for one player across every hand they were seen in.
///
/// Only counts are stored; percentages are derived so that two storages can
/// be merged without losing precision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub hands_played: usize,
    // Hands with a voluntary preflop call, bet, raise or all-in
    pub vpip_hands: usize,
    // Hands with a preflop bet, raise or all-in
    pub pfr_hands: usize,
    pub bet_count: usize,
    pub raise_count: usize,
    pub all_in_count: usize,
    pub call_count: usize,
    pub check_count: usize,
    pub fold_count: usize,
}

impl PlayerStats {
    /// Calculate VPIP percentage
    pub fn vpip_percent(&self) -> f32 {
        if self.hands_played == 0 {
            0.0
        } else {
            (self.vpip_hands as f32 / self.hands_played as f32) * 100.0
        }
    }

    /// Calculate PFR (Pre-Flop Raise) percentage
    pub fn pfr_percent(&self) -> f32 {
        if self.hands_played == 0 {
            0.0
        } else {
            (self.pfr_hands as f32 / self.hands_played as f32) * 100.0
        }
    }

    /// (bets + raises + all-ins) / calls
    pub fn aggression_factor(&self) -> f32 {
        let aggressive_actions = self.bet_count + self.raise_count + self.all_in_count;
        if self.call_count == 0 {
            if aggressive_actions == 0 {
                0.0
            } else {
                f32::INFINITY
            }
        } else {
            aggressive_actions as f32 / self.call_count as f32
        }
    }

    pub fn merge(&mut self, other: &PlayerStats) {
        self.hands_played += other.hands_played;
        self.vpip_hands += other.vpip_hands;
        self.pfr_hands += other.pfr_hands;
        self.bet_count += other.bet_count;
        self.raise_count += other.raise_count;
        self.all_in_count += other.all_in_count;
        self.call_count += other.call_count;
        self.check_count += other.check_count;
        self.fold_count += other.fold_count;
    }
}

/// Per player statistics keyed by player name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsStorage {
    pub hands_seen: usize,
    players: BTreeMap<String, PlayerStats>,
}

impl StatsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self, name: &str) -> Option<&PlayerStats> {
        self.players.get(name)
    }

    pub fn players(&self) -> impl Iterator<Item = (&str, &PlayerStats)> {
        self.players.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    pub fn record_hand(&mut self, hand: &HandRecord) {
        self.hands_seen += 1;

        for name in &hand.players {
            let stats = self.players.entry(name.clone()).or_default();
            stats.hands_played += 1;

            let mut vpip = false;
            let mut pfr = false;
            for action in hand.actions.iter().filter(|a| a.player_name == *name) {
                match action.action_type {
                    ActionType::Bet => stats.bet_count += 1,
                    ActionType::Raise => stats.raise_count += 1,
                    ActionType::AllIn => stats.all_in_count += 1,
                    ActionType::Call => stats.call_count += 1,
                    ActionType::Check => stats.check_count += 1,
                    ActionType::Fold => stats.fold_count += 1,
                    ActionType::Post => {}
                }

                if action.street == Street::Preflop {
                    vpip |= action.action_type.is_voluntary();
                    pfr |= action.action_type.is_aggressive();
                }
            }

            if vpip {
                stats.vpip_hands += 1;
            }
            if pfr {
                stats.pfr_hands += 1;
            }
            trace!(player = %name, vpip, pfr, "Recorded hand stats");
        }
    }

    pub fn merge(&mut self, other: &StatsStorage) {
        self.hands_seen += other.hands_seen;
        for (name, stats) in &other.players {
            self.players.entry(name.clone()).or_default().merge(stats);
        }
    }
}

/// A sink that folds every hand into a shared [`StatsStorage`].
#[derive(Default)]
pub struct StatsSink {
    storage: Rc<RefCell<StatsStorage>>,
}

impl StatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_storage(&self) -> Rc<RefCell<StatsStorage>> {
        self.storage.clone()
    }
}

impl HandSink for StatsSink {
    fn record(&mut self, hand: &HandRecord) -> Result<(), SinkError> {
        self.storage.try_borrow_mut()?.record_hand(hand);
        Ok(())
    }
}
