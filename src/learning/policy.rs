//! Explore/exploit decision policies
//!
//! Both entry points read a [`StateEntry`] and draw from the agent's RNG.
//! Exploiting is greedy over current value estimates with random
//! tie-breaking; exploring preserves learning signal according to the
//! configured rule.

use rand::{rngs::StdRng, seq::IndexedRandom, Rng};

use super::{
    config::{AgentConfig, ExploreRule},
    table::StateEntry,
};

/// Greedy action: maximum current value, ties broken uniformly at
/// random among all maximizers so an early arbitrary tie cannot stick.
pub fn exploit(entry: &StateEntry, rng: &mut StdRng) -> usize {
    let best = entry.best_value();
    let maximizers: Vec<usize> = entry
        .stats()
        .iter()
        .filter(|s| s.value == best)
        .map(|s| s.action)
        .collect();
    // Entries always hold at least one action.
    *maximizers.choose(rng).unwrap()
}

/// Information-gathering action according to the configured rule.
pub fn explore(entry: &StateEntry, config: &AgentConfig, rng: &mut StdRng) -> usize {
    match config.explore_rule {
        ExploreRule::Uniform => uniform(entry, rng),
        ExploreRule::VisitThreshold { min_visits, .. } => {
            visit_threshold(entry, min_visits, rng)
        }
        ExploreRule::EpsilonGreedy { .. } => {
            if rng.random::<f64>() < entry.epsilon {
                uniform(entry, rng)
            } else {
                exploit(entry, rng)
            }
        }
    }
}

fn uniform(entry: &StateEntry, rng: &mut StdRng) -> usize {
    let actions: Vec<usize> = entry.actions().collect();
    *actions.choose(rng).unwrap()
}

/// Until every action has `min_visits` observed outcomes, pick uniformly
/// among the under-visited ones. After that, draw one sample from each
/// action's recent-target window and take the argmax of the draws — a
/// non-parametric approximation of sampling from each action's outcome
/// distribution.
fn visit_threshold(entry: &StateEntry, min_visits: u64, rng: &mut StdRng) -> usize {
    let under_visited: Vec<usize> = entry
        .stats()
        .iter()
        .filter(|s| s.visits < min_visits)
        .map(|s| s.action)
        .collect();

    if let Some(&action) = under_visited.choose(rng) {
        return action;
    }

    // All actions cleared the threshold, so every window is non-empty.
    let draws: Vec<(usize, f64)> = entry
        .stats()
        .iter()
        .map(|s| {
            let index = rng.random_range(0..s.recent_targets.len());
            (s.action, s.recent_targets[index])
        })
        .collect();

    let best = draws
        .iter()
        .map(|&(_, draw)| draw)
        .fold(f64::NEG_INFINITY, f64::max);
    let maximizers: Vec<usize> = draws
        .iter()
        .filter(|&&(_, draw)| draw == best)
        .map(|&(action, _)| action)
        .collect();
    *maximizers.choose(rng).unwrap()
}
