//! Tabular temporal difference learning
//!
//! The learning core: per-state action-value storage, explore/exploit
//! decision policies, the temporal-difference update rules, and the
//! agent that orchestrates them turn by turn.
//!
//! ## Flow
//!
//! The game driver calls [`LearningAgent`] through the
//! [`crate::strategy::Strategy`] port once per own turn:
//!
//! 1. `choose_action(state)` — get or create the state's entry,
//!    propagate the best value of this state backward to the previous
//!    turn's action (predictive mode), then explore or exploit.
//! 2. `observe_outcome(resulting_state)` — compute the reward for the
//!    chosen action and fold it into the value estimate.
//!
//! Rewards only arrive on decisive moves, so intermediate actions learn
//! through the discounted next-state estimates threaded backward in
//! step 1.

pub mod agent;
pub mod config;
pub mod credit;
pub mod policy;
pub mod serialization;
pub mod table;

pub use agent::LearningAgent;
pub use config::{AgentConfig, ExploreRule, UpdateRule};
pub use serialization::SavedAgent;
pub use table::{ActionStats, DecisionKind, StateEntry, StateValueTable, UpdateRecord};
