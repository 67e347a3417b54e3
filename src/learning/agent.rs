//! Learning agent orchestration
//!
//! The agent is the only component the game driver talks to. It owns its
//! value table, mediates all access, and threads the per-game session
//! state: the pending (state, action) pair whose outcome has not yet
//! been observed.

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{
    config::AgentConfig,
    credit, policy,
    table::{DecisionKind, StateValueTable},
};
use crate::{
    strategy::Strategy,
    tictactoe::{reward, BoardState},
    Result,
};

/// A chosen action awaiting its observed outcome.
#[derive(Debug, Clone, Copy)]
struct PendingMove {
    /// The full game state the action was chosen in; its snapshot keys
    /// the table and its `to_move` fixes the reward perspective.
    state: BoardState,
    action: usize,
    decision: DecisionKind,
}

/// Serializable snapshot of an agent's learned state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentState {
    pub name: String,
    pub table: StateValueTable,
    pub rng_seed: Option<u64>,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Tabular learning agent
///
/// Estimates per-state action values, explores while learning is
/// enabled, and updates estimates with the configured
/// temporal-difference rule as outcomes are observed.
#[derive(Debug, Clone)]
pub struct LearningAgent {
    name: String,
    table: StateValueTable,
    learning: bool,
    rng: StdRng,
    rng_seed: Option<u64>,
    pending: Option<PendingMove>,
}

impl LearningAgent {
    /// Create a new agent with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfiguration`] if any
    /// hyper-parameter is out of range.
    pub fn new(name: impl Into<String>, config: AgentConfig) -> Result<Self> {
        let config = config.validated()?;
        Ok(Self {
            name: name.into(),
            table: StateValueTable::new(config),
            learning: true,
            rng: build_rng(None),
            rng_seed: None,
            pending: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    /// Toggle learning. With learning off the agent plays pure greedy
    /// (deployment mode) and never updates its table.
    pub fn set_learning(&mut self, learning: bool) {
        self.learning = learning;
    }

    pub fn is_learning(&self) -> bool {
        self.learning
    }

    pub fn config(&self) -> &AgentConfig {
        self.table.config()
    }

    pub fn table(&self) -> &StateValueTable {
        &self.table
    }

    /// Mutable table access, for seeding values in evaluation scenarios.
    pub fn table_mut(&mut self) -> &mut StateValueTable {
        &mut self.table
    }

    pub(crate) fn export_state(&self) -> AgentState {
        AgentState {
            name: self.name.clone(),
            table: self.table.clone(),
            rng_seed: self.rng_seed,
        }
    }

    /// Rebuild an agent from a saved snapshot. Loaded agents start in
    /// deployment mode; call [`LearningAgent::set_learning`] to resume
    /// training.
    pub(crate) fn from_state(state: AgentState) -> Self {
        Self {
            name: state.name,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
            table: state.table,
            learning: false,
            pending: None,
        }
    }
}

impl Strategy for LearningAgent {
    fn start_new_game(&mut self) {
        self.pending = None;
    }

    fn choose_action(&mut self, state: &BoardState) -> Result<usize> {
        let snapshot = state.snapshot();
        if snapshot.legal_moves().is_empty() {
            return Err(crate::Error::NoValidMoves);
        }

        // Propagate value backward one ply: the best estimate of this
        // state becomes (part of) the next-state estimate of the action
        // that led here on our previous turn.
        if self.learning && self.config().predictive {
            if let Some(pending) = self.pending {
                let best_next = self.table.get_or_create(snapshot).best_value();
                let config = *self.table.config();
                let previous = self.table.get_or_create(pending.state.snapshot());
                credit::update_next_state_estimate(previous, pending.action, best_next, &config);
            }
        }

        let config = *self.table.config();
        let entry = self.table.get_or_create(snapshot);
        let (action, decision) = if self.learning {
            (
                policy::explore(entry, &config, &mut self.rng),
                DecisionKind::Explore,
            )
        } else {
            (policy::exploit(entry, &mut self.rng), DecisionKind::Exploit)
        };

        self.pending = Some(PendingMove {
            state: *state,
            action,
            decision,
        });

        Ok(action)
    }

    fn observe_outcome(&mut self, resulting: &BoardState) -> Result<()> {
        let pending = self
            .pending
            .ok_or_else(|| crate::Error::OutcomeWithoutMove {
                strategy: self.name.clone(),
            })?;

        if self.learning {
            let observed = reward(&pending.state, resulting);
            let config = *self.table.config();
            let entry = self.table.get_or_create(pending.state.snapshot());
            credit::update_value(entry, pending.action, observed, pending.decision, &config);
        }

        // The pending pair stays recorded: the next choose_action in
        // this game reads it for backward propagation.
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::config::ExploreRule;

    fn uniform_config() -> AgentConfig {
        AgentConfig {
            explore_rule: ExploreRule::Uniform,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_outcome_without_move_fails_fast() {
        let mut agent = LearningAgent::new("agent", uniform_config()).unwrap();
        agent.start_new_game();

        let state = BoardState::new();
        let result = agent.observe_outcome(&state);
        assert!(matches!(
            result,
            Err(crate::Error::OutcomeWithoutMove { .. })
        ));
    }

    #[test]
    fn test_choose_then_observe_updates_table() {
        let mut agent = LearningAgent::new("agent", uniform_config())
            .unwrap()
            .with_seed(1);
        agent.start_new_game();

        let state = BoardState::new();
        let action = agent.choose_action(&state).unwrap();
        let next = state.make_move(action).unwrap();
        agent.observe_outcome(&next).unwrap();

        let entry = agent.table().get(&state.snapshot()).unwrap();
        assert_eq!(entry.stats_for(action).unwrap().visits, 1);
        assert_eq!(entry.total_visits, 1);
    }

    #[test]
    fn test_learning_off_never_updates() {
        let mut agent = LearningAgent::new("agent", uniform_config())
            .unwrap()
            .with_seed(2);
        agent.set_learning(false);
        agent.start_new_game();

        let state = BoardState::new();
        let action = agent.choose_action(&state).unwrap();
        let next = state.make_move(action).unwrap();
        agent.observe_outcome(&next).unwrap();

        let entry = agent.table().get(&state.snapshot()).unwrap();
        assert_eq!(entry.total_visits, 0);
        assert_eq!(entry.stats_for(action).unwrap().visits, 0);
    }

    #[test]
    fn test_backward_propagation_records_next_state_estimate() {
        let mut agent = LearningAgent::new("agent", uniform_config())
            .unwrap()
            .with_seed(3);
        agent.start_new_game();

        // Our first move from the empty board.
        let first = BoardState::new();
        let action = agent.choose_action(&first).unwrap();
        let after_ours = first.make_move(action).unwrap();
        agent.observe_outcome(&after_ours).unwrap();

        // Seed a value at the state we see on our next turn, so the
        // propagated best is distinguishable from start_q.
        let opponent_move = after_ours.legal_moves()[0];
        let second = after_ours.make_move(opponent_move).unwrap();
        let seeded = second.legal_moves()[0];
        agent
            .table_mut()
            .get_or_create(second.snapshot())
            .set_value(seeded, 0.9);

        agent.choose_action(&second).unwrap();

        let first_entry = agent.table().get(&first.snapshot()).unwrap();
        let best_next = first_entry.stats_for(action).unwrap().best_next;
        assert_eq!(best_next, Some(0.9));
    }

    #[test]
    fn test_start_new_game_clears_pending() {
        let mut agent = LearningAgent::new("agent", uniform_config())
            .unwrap()
            .with_seed(4);
        agent.start_new_game();

        let state = BoardState::new();
        agent.choose_action(&state).unwrap();

        agent.start_new_game();
        let result = agent.observe_outcome(&state.make_move(0).unwrap());
        assert!(matches!(
            result,
            Err(crate::Error::OutcomeWithoutMove { .. })
        ));
    }
}
