//! Per-agent learning configuration
//!
//! Every knob the learning core consults lives in one immutable struct,
//! validated once at construction and passed explicitly into the table,
//! policy, and credit-assignment code. There is no global settings
//! lookup, so agents with different configurations compose freely in one
//! process.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Fallback bound on each action's recorded-target window when the
/// explore rule does not configure one.
const DEFAULT_TARGET_WINDOW: usize = 100;

/// How an action value moves toward each new learning target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRule {
    /// Exact running mean: after n updates the value equals the
    /// arithmetic mean of all n targets.
    MeanReturn,
    /// Fixed-rate exponential update: `value += learning_rate * (target
    /// - value)`. Adapts to non-stationarity, which matters when the
    /// opponent's policy is itself changing.
    Exponential { learning_rate: f64 },
}

/// How the agent explores while learning is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExploreRule {
    /// Uniformly random legal action.
    Uniform,
    /// Every action gets `min_visits` trials before sampling is trusted;
    /// after that, one draw from each action's last `sample_window`
    /// learning targets decides (argmax of the draws).
    VisitThreshold {
        min_visits: u64,
        sample_window: usize,
    },
    /// With probability epsilon (decaying multiplicatively toward the
    /// floor after each value update) play uniformly at random, else
    /// exploit.
    EpsilonGreedy { epsilon: f64, decay: f64, floor: f64 },
}

/// Immutable hyper-parameter bundle for one learning agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Initial value for every action of a freshly created state entry.
    /// May differ between the first and second mover to break symmetry.
    pub start_q: f64,

    /// Value-update rule; fixed for the lifetime of a trained table.
    pub update_rule: UpdateRule,

    /// Weight of future value relative to immediate reward.
    pub discount_rate: f64,

    /// Bootstrap targets from the best estimated value of the next
    /// state. Required when rewards only arrive at game end.
    pub predictive: bool,

    /// Whether the action alone determines the next observed state.
    /// False for multi-player or stochastic games, in which case
    /// next-state estimates are averaged rather than overwritten.
    pub next_state_is_predictable: bool,

    /// Exploration behavior while learning.
    pub explore_rule: ExploreRule,

    /// Record a diagnostic log of every value update per state.
    pub keep_history: bool,
}

impl AgentConfig {
    /// Validate all parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the offending
    /// parameter.
    pub fn validated(self) -> Result<Self> {
        if !self.start_q.is_finite() {
            return Err(invalid(format!("start_q must be finite, got {}", self.start_q)));
        }
        if !(0.0..=1.0).contains(&self.discount_rate) {
            return Err(invalid(format!(
                "discount_rate must be within [0, 1], got {}",
                self.discount_rate
            )));
        }
        match self.update_rule {
            UpdateRule::MeanReturn => {}
            UpdateRule::Exponential { learning_rate } => {
                if !(learning_rate > 0.0 && learning_rate <= 1.0) {
                    return Err(invalid(format!(
                        "learning_rate must be within (0, 1], got {learning_rate}"
                    )));
                }
            }
        }
        match self.explore_rule {
            ExploreRule::Uniform => {}
            ExploreRule::VisitThreshold {
                min_visits,
                sample_window,
            } => {
                if min_visits == 0 {
                    return Err(invalid("min_visits must be at least 1".to_string()));
                }
                if sample_window == 0 {
                    return Err(invalid("sample_window must be at least 1".to_string()));
                }
            }
            ExploreRule::EpsilonGreedy {
                epsilon,
                decay,
                floor,
            } => {
                if !(0.0..=1.0).contains(&epsilon) {
                    return Err(invalid(format!(
                        "epsilon must be within [0, 1], got {epsilon}"
                    )));
                }
                if !(decay > 0.0 && decay <= 1.0) {
                    return Err(invalid(format!(
                        "epsilon decay must be within (0, 1], got {decay}"
                    )));
                }
                if !(0.0..=1.0).contains(&floor) {
                    return Err(invalid(format!(
                        "epsilon floor must be within [0, 1], got {floor}"
                    )));
                }
            }
        }
        Ok(self)
    }

    /// Initial epsilon for a fresh state entry (zero for non-epsilon
    /// explore rules, which never read it).
    pub(crate) fn initial_epsilon(&self) -> f64 {
        match self.explore_rule {
            ExploreRule::EpsilonGreedy { epsilon, .. } => epsilon,
            _ => 0.0,
        }
    }

    /// Bound on each action's recorded-target window.
    pub(crate) fn target_window(&self) -> usize {
        match self.explore_rule {
            ExploreRule::VisitThreshold { sample_window, .. } => sample_window,
            _ => DEFAULT_TARGET_WINDOW,
        }
    }
}

impl Default for AgentConfig {
    /// Defaults follow the original tuned two-player setup: predictive
    /// running-mean learning with a visit-threshold explore policy.
    fn default() -> Self {
        Self {
            start_q: 0.0,
            update_rule: UpdateRule::MeanReturn,
            discount_rate: 0.7,
            predictive: true,
            next_state_is_predictable: false,
            explore_rule: ExploreRule::VisitThreshold {
                min_visits: 20,
                sample_window: 100,
            },
            keep_history: false,
        }
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfiguration { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AgentConfig::default().validated().is_ok());
    }

    #[test]
    fn test_discount_rate_out_of_range_rejected() {
        let config = AgentConfig {
            discount_rate: 1.5,
            ..AgentConfig::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_learning_rate_bounds() {
        let bad = AgentConfig {
            update_rule: UpdateRule::Exponential { learning_rate: 0.0 },
            ..AgentConfig::default()
        };
        assert!(bad.validated().is_err());

        let good = AgentConfig {
            update_rule: UpdateRule::Exponential { learning_rate: 1.0 },
            ..AgentConfig::default()
        };
        assert!(good.validated().is_ok());
    }

    #[test]
    fn test_zero_visit_threshold_rejected() {
        let config = AgentConfig {
            explore_rule: ExploreRule::VisitThreshold {
                min_visits: 0,
                sample_window: 10,
            },
            ..AgentConfig::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_epsilon_ranges() {
        let config = AgentConfig {
            explore_rule: ExploreRule::EpsilonGreedy {
                epsilon: 1.2,
                decay: 0.999,
                floor: 0.01,
            },
            ..AgentConfig::default()
        };
        assert!(config.validated().is_err());
    }
}
