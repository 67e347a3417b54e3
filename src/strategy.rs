//! Strategy port - the capability interface every player implements
//!
//! The game driver only ever talks to this trait. The learning agent is
//! the interesting implementation; the random and human strategies are
//! trivial collaborators used as opponents and for interactive play.

use rand::{rngs::StdRng, seq::IndexedRandom, SeedableRng};

use crate::{
    tictactoe::BoardState,
    Result,
};

/// Unified interface for anything that can play a game.
///
/// The driver calls, in order, once per turn: [`Strategy::choose_action`],
/// then — after applying the action — [`Strategy::observe_outcome`] with
/// the resulting state. [`Strategy::start_new_game`] is called once
/// before the first move of every game.
pub trait Strategy {
    /// Reset per-game session state.
    fn start_new_game(&mut self);

    /// Select a position (0-8) to play in the given state.
    ///
    /// # Errors
    ///
    /// Returns an error if no legal moves are available (terminal state)
    /// or the strategy cannot produce a move.
    fn choose_action(&mut self, state: &BoardState) -> Result<usize>;

    /// Report the state that resulted from this strategy's last action.
    ///
    /// Called exactly once per own turn, including the last turn of a
    /// finished game. Reporting an outcome with no action pending is a
    /// contract violation and fails fast.
    fn observe_outcome(&mut self, resulting: &BoardState) -> Result<()>;

    /// Name used in logs and statistics.
    fn name(&self) -> &str;

    /// Seed the strategy's random number generator, if it has one.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Baseline strategy that plays a uniformly random legal move
#[derive(Debug)]
pub struct RandomStrategy {
    name: String,
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: build_rng(None),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Strategy for RandomStrategy {
    fn start_new_game(&mut self) {}

    fn choose_action(&mut self, state: &BoardState) -> Result<usize> {
        let legal = state.legal_moves();
        legal
            .choose(&mut self.rng)
            .copied()
            .ok_or(crate::Error::NoValidMoves)
    }

    fn observe_outcome(&mut self, _resulting: &BoardState) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }
}

/// Interactive strategy that reads moves from stdin
#[derive(Debug)]
pub struct HumanStrategy {
    name: String,
}

impl HumanStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn read_position(&self) -> Result<Option<usize>> {
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .map_err(|source| crate::Error::Io {
                operation: "read move from stdin".to_string(),
                source,
            })?;
        Ok(line.trim().parse::<usize>().ok())
    }
}

impl Strategy for HumanStrategy {
    fn start_new_game(&mut self) {}

    fn choose_action(&mut self, state: &BoardState) -> Result<usize> {
        let legal = state.legal_moves();
        if legal.is_empty() {
            return Err(crate::Error::NoValidMoves);
        }

        println!("{state}");
        loop {
            println!("{}, enter a position (0-8):", self.name);
            match self.read_position()? {
                Some(position) if legal.contains(&position) => return Ok(position),
                Some(position) => println!("Position {position} is not available."),
                None => println!("Please enter a number between 0 and 8."),
            }
        }
    }

    fn observe_outcome(&mut self, _resulting: &BoardState) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_strategy_plays_legal_moves() {
        let mut strategy = RandomStrategy::new("rand").with_seed(1);
        let state = BoardState::new().make_move(4).unwrap();

        for _ in 0..20 {
            let position = strategy.choose_action(&state).unwrap();
            assert!(state.legal_moves().contains(&position));
        }
    }

    #[test]
    fn test_random_strategy_is_deterministic_under_seed() {
        let state = BoardState::new();
        let mut a = RandomStrategy::new("a").with_seed(77);
        let mut b = RandomStrategy::new("b").with_seed(77);

        let picks_a: Vec<usize> = (0..10).map(|_| a.choose_action(&state).unwrap()).collect();
        let picks_b: Vec<usize> = (0..10).map(|_| b.choose_action(&state).unwrap()).collect();
        assert_eq!(picks_a, picks_b);
    }
}
