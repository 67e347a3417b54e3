//! Temporal-difference credit assignment
//!
//! [`update_value`] folds an observed reward into an action's value
//! estimate; [`update_next_state_estimate`] threads value estimates
//! backward one ply per turn. In a two-player game the reward for a move
//! depends on the opponent's reply, so the backward propagation happens
//! on the agent's *next* turn, before that turn's action is chosen.

use super::{
    config::{AgentConfig, ExploreRule, UpdateRule},
    table::{DecisionKind, StateEntry, UpdateRecord},
};

/// Fold one observed reward into `entry`'s estimate for `action`.
///
/// The learning target is the raw reward unless the agent is predictive
/// and a next-state estimate has been recorded, in which case the
/// discounted estimate is added. The configured update rule then moves
/// the value toward the target; the target is also appended to the
/// action's bounded recent-target window for the sampling explore
/// policy.
pub fn update_value(
    entry: &mut StateEntry,
    action: usize,
    reward: f64,
    decision: DecisionKind,
    config: &AgentConfig,
) {
    entry.total_visits += 1;

    let predictive = config.predictive;
    let discount_rate = config.discount_rate;
    let window = config.target_window();
    let update_rule = config.update_rule;

    let Some(stats) = entry.stats_for_mut(action) else {
        return;
    };
    stats.visits += 1;

    let target = match stats.best_next {
        Some(best_next) if predictive => reward + discount_rate * best_next,
        // Cannot bootstrap yet (or not configured to): fall back to the
        // raw reward.
        _ => reward,
    };

    match update_rule {
        UpdateRule::MeanReturn => {
            // Exact running mean over all targets observed so far.
            stats.value += (target - stats.value) / stats.visits as f64;
        }
        UpdateRule::Exponential { learning_rate } => {
            stats.value += learning_rate * (target - stats.value);
        }
    }

    stats.recent_targets.push_back(target);
    while stats.recent_targets.len() > window {
        stats.recent_targets.pop_front();
    }

    let record = UpdateRecord {
        visit: stats.visits,
        action,
        reward,
        target,
        value: stats.value,
        decision,
    };

    if let ExploreRule::EpsilonGreedy { decay, floor, .. } = config.explore_rule {
        entry.epsilon = (entry.epsilon * decay).max(floor);
    }

    if config.keep_history {
        entry.history.push(record);
    }
}

/// Record the best estimated value of the state reached via `action`.
///
/// `best_next` is the maximum value estimate over the next entry's
/// actions, computed by the caller. When the environment is
/// state-predictable, or no estimate exists yet, it is stored directly.
/// Otherwise the same action can lead to different opponent-adjusted
/// next states across games, so the estimate is blended as a running
/// mean weighted by the entry's total visit count.
pub fn update_next_state_estimate(
    entry: &mut StateEntry,
    action: usize,
    best_next: f64,
    config: &AgentConfig,
) {
    let predictable = config.next_state_is_predictable;
    let samples = entry.total_visits.max(1) as f64;

    let Some(stats) = entry.stats_for_mut(action) else {
        return;
    };

    stats.best_next = match stats.best_next {
        Some(previous) if !predictable => {
            Some(((samples - 1.0) * previous + best_next) / samples)
        }
        _ => Some(best_next),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::table::StateValueTable;
    use crate::tictactoe::BoardState;

    fn fresh_entry(config: AgentConfig) -> (StateValueTable, BoardState) {
        let mut table = StateValueTable::new(config);
        let state = BoardState::new();
        table.get_or_create(state.snapshot());
        (table, state)
    }

    #[test]
    fn test_running_mean_equals_arithmetic_mean() {
        let config = AgentConfig::default();
        let (mut table, state) = fresh_entry(config);
        let entry = table.get_or_create(state.snapshot());

        let targets = [1.0, -1.0, 0.0, 1.0, 1.0];
        for &t in &targets {
            update_value(entry, 0, t, DecisionKind::Explore, &config);
        }

        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let value = entry.value(0).unwrap();
        assert!((value - mean).abs() < 1e-12);
        assert_eq!(entry.stats_for(0).unwrap().visits, 5);
    }

    #[test]
    fn test_exponential_update() {
        let config = AgentConfig {
            update_rule: UpdateRule::Exponential { learning_rate: 0.5 },
            predictive: false,
            ..AgentConfig::default()
        };
        let (mut table, state) = fresh_entry(config);
        let entry = table.get_or_create(state.snapshot());

        update_value(entry, 0, 1.0, DecisionKind::Explore, &config);
        // 0.0 + 0.5 * (1.0 - 0.0)
        assert!((entry.value(0).unwrap() - 0.5).abs() < 1e-12);

        update_value(entry, 0, 1.0, DecisionKind::Explore, &config);
        // 0.5 + 0.5 * (1.0 - 0.5)
        assert!((entry.value(0).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_target_bootstraps_from_next_state_estimate() {
        let config = AgentConfig {
            discount_rate: 0.5,
            ..AgentConfig::default()
        };
        let (mut table, state) = fresh_entry(config);
        let entry = table.get_or_create(state.snapshot());

        // No estimate recorded: target is the raw reward.
        update_value(entry, 2, 1.0, DecisionKind::Explore, &config);
        assert!((entry.value(2).unwrap() - 1.0).abs() < 1e-12);

        update_next_state_estimate(entry, 2, 0.8, &config);
        update_value(entry, 2, 0.0, DecisionKind::Explore, &config);
        // Second target is 0.0 + 0.5 * 0.8 = 0.4; mean of (1.0, 0.4).
        assert!((entry.value(2).unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_non_predictive_ignores_next_state_estimate() {
        let config = AgentConfig {
            predictive: false,
            ..AgentConfig::default()
        };
        let (mut table, state) = fresh_entry(config);
        let entry = table.get_or_create(state.snapshot());

        update_next_state_estimate(entry, 0, 0.9, &config);
        update_value(entry, 0, 0.0, DecisionKind::Explore, &config);
        assert_eq!(entry.value(0), Some(0.0));
    }

    #[test]
    fn test_predictable_environment_overwrites_estimate() {
        let config = AgentConfig {
            next_state_is_predictable: true,
            ..AgentConfig::default()
        };
        let (mut table, state) = fresh_entry(config);
        let entry = table.get_or_create(state.snapshot());

        update_next_state_estimate(entry, 0, 0.5, &config);
        update_next_state_estimate(entry, 0, -0.3, &config);
        assert_eq!(entry.stats_for(0).unwrap().best_next, Some(-0.3));
    }

    #[test]
    fn test_multi_agent_estimate_is_blended() {
        let config = AgentConfig::default();
        let (mut table, state) = fresh_entry(config);
        let entry = table.get_or_create(state.snapshot());

        update_next_state_estimate(entry, 0, 1.0, &config);
        // Two observed outcomes for this entry so far.
        update_value(entry, 0, 0.0, DecisionKind::Explore, &config);
        update_value(entry, 1, 0.0, DecisionKind::Explore, &config);

        update_next_state_estimate(entry, 0, 0.0, &config);
        // Blend with total_visits = 2: (1 * 1.0 + 0.0) / 2.
        assert!((entry.stats_for(0).unwrap().best_next.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_window_is_bounded() {
        let config = AgentConfig {
            explore_rule: ExploreRule::VisitThreshold {
                min_visits: 1,
                sample_window: 3,
            },
            ..AgentConfig::default()
        };
        let (mut table, state) = fresh_entry(config);
        let entry = table.get_or_create(state.snapshot());

        for i in 0..10 {
            update_value(entry, 0, i as f64, DecisionKind::Explore, &config);
        }

        let targets = &entry.stats_for(0).unwrap().recent_targets;
        assert_eq!(targets.len(), 3);
        assert_eq!(targets.iter().copied().collect::<Vec<_>>(), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_epsilon_decays_toward_floor() {
        let config = AgentConfig {
            explore_rule: ExploreRule::EpsilonGreedy {
                epsilon: 0.5,
                decay: 0.5,
                floor: 0.1,
            },
            ..AgentConfig::default()
        };
        let (mut table, state) = fresh_entry(config);
        let entry = table.get_or_create(state.snapshot());

        update_value(entry, 0, 0.0, DecisionKind::Explore, &config);
        assert!((entry.epsilon - 0.25).abs() < 1e-12);

        for _ in 0..10 {
            update_value(entry, 0, 0.0, DecisionKind::Explore, &config);
        }
        assert!((entry.epsilon - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_history_only_kept_when_configured() {
        let silent = AgentConfig::default();
        let (mut table, state) = fresh_entry(silent);
        let entry = table.get_or_create(state.snapshot());
        update_value(entry, 0, 1.0, DecisionKind::Exploit, &silent);
        assert!(entry.history.is_empty());

        let logged = AgentConfig {
            keep_history: true,
            ..AgentConfig::default()
        };
        let (mut table, state) = fresh_entry(logged);
        let entry = table.get_or_create(state.snapshot());
        update_value(entry, 0, 1.0, DecisionKind::Exploit, &logged);

        assert_eq!(entry.history.len(), 1);
        let record = &entry.history[0];
        assert_eq!(record.action, 0);
        assert_eq!(record.visit, 1);
        assert_eq!(record.reward, 1.0);
        assert_eq!(record.decision, DecisionKind::Exploit);
    }
}
