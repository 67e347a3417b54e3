//! Per-state action-value storage
//!
//! The table maps each [`BoardSnapshot`] an agent has ever seen to a
//! [`StateEntry`] holding that state's action values, visit counts, and
//! next-state estimates. Entries are created lazily, keyed structurally,
//! and never deleted: the table grows monotonically and is exclusively
//! owned by one agent.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::config::AgentConfig;
use crate::tictactoe::BoardSnapshot;

/// Whether an action was chosen to gather information or to maximize
/// estimated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Explore,
    Exploit,
}

/// Learned statistics for one action of one state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionStats {
    /// Board position this action plays.
    pub action: usize,
    /// Current estimate of expected future reward.
    pub value: f64,
    /// Number of observed outcomes for this action here.
    pub visits: u64,
    /// Best value seen among reachable next states. `None` until the
    /// first backward propagation; an expected condition early in
    /// learning, not an error.
    pub best_next: Option<f64>,
    /// Most recent learning targets, bounded by the configured window.
    pub recent_targets: VecDeque<f64>,
}

/// One line of the diagnostic update log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub visit: u64,
    pub action: usize,
    pub reward: f64,
    pub target: f64,
    pub value: f64,
    pub decision: DecisionKind,
}

/// Everything the agent knows about one board state.
///
/// The action key set is fixed at creation to the state's legal moves;
/// `value`, `visits`, `best_next`, and the target windows all share it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEntry {
    stats: Vec<ActionStats>,
    /// Total value updates applied to this entry across all actions.
    pub total_visits: u64,
    /// Exploration-control state for the epsilon-greedy variant.
    pub epsilon: f64,
    /// Diagnostic log, populated only when configured.
    pub history: Vec<UpdateRecord>,
}

impl StateEntry {
    fn new(legal_actions: &[usize], config: &AgentConfig) -> Self {
        StateEntry {
            stats: legal_actions
                .iter()
                .map(|&action| ActionStats {
                    action,
                    value: config.start_q,
                    visits: 0,
                    best_next: None,
                    recent_targets: VecDeque::new(),
                })
                .collect(),
            total_visits: 0,
            epsilon: config.initial_epsilon(),
            history: Vec::new(),
        }
    }

    /// Per-action statistics, in ascending action order.
    pub fn stats(&self) -> &[ActionStats] {
        &self.stats
    }

    pub fn stats_for(&self, action: usize) -> Option<&ActionStats> {
        self.stats.iter().find(|s| s.action == action)
    }

    pub(crate) fn stats_for_mut(&mut self, action: usize) -> Option<&mut ActionStats> {
        self.stats.iter_mut().find(|s| s.action == action)
    }

    /// The legal actions of this state, fixed at creation.
    pub fn actions(&self) -> impl Iterator<Item = usize> + '_ {
        self.stats.iter().map(|s| s.action)
    }

    /// Current value estimate for one action.
    pub fn value(&self, action: usize) -> Option<f64> {
        self.stats_for(action).map(|s| s.value)
    }

    /// Overwrite one action's value estimate.
    ///
    /// Intended for seeding known-good values (evaluation scenarios and
    /// tests); learning goes through the credit-assignment updates.
    pub fn set_value(&mut self, action: usize, value: f64) {
        if let Some(stats) = self.stats_for_mut(action) {
            stats.value = value;
        }
    }

    /// Maximum value estimate over this state's actions.
    ///
    /// Entries are only created for states with legal moves, so the
    /// maximum always exists.
    pub fn best_value(&self) -> f64 {
        self.stats
            .iter()
            .map(|s| s.value)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Lazily grown map from board snapshot to state entry
///
/// Owns the agent's configuration so entry construction and the update
/// rules all read from one injected source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateValueTable {
    entries: HashMap<BoardSnapshot, StateEntry>,
    config: AgentConfig,
}

impl StateValueTable {
    pub fn new(config: AgentConfig) -> Self {
        StateValueTable {
            entries: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Get the entry for a snapshot, creating it on first encounter.
    ///
    /// A fresh entry starts every legal action at the configured
    /// `start_q` with zeroed counts. Structurally equal snapshots always
    /// resolve to the same entry.
    pub fn get_or_create(&mut self, snapshot: BoardSnapshot) -> &mut StateEntry {
        let config = &self.config;
        self.entries
            .entry(snapshot)
            .or_insert_with(|| StateEntry::new(&snapshot.legal_moves(), config))
    }

    pub fn get(&self, snapshot: &BoardSnapshot) -> Option<&StateEntry> {
        self.entries.get(snapshot)
    }

    /// Iterate over all (snapshot, entry) pairs in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = (&BoardSnapshot, &StateEntry)> {
        self.entries.iter()
    }

    /// Number of distinct states visited.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
