//! High-level game management
//!
//! The driver owns the turn loop: it asks the strategy whose turn it is
//! for an action, applies the move, and reports the resulting state back
//! to that strategy. Every strategy sees exactly one
//! `choose_action`/`observe_outcome` pair per own turn, including the
//! final turn of a decided game, so the winning, losing, and drawing
//! moves all receive credit.

use serde::{Deserialize, Serialize};

use super::board::{BoardState, Player};
use crate::{strategy::Strategy, Result};

/// A move in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub position: usize,
    pub player: Player,
}

/// Outcome of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    /// The winning player, if the game was decisive.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Win(player) => Some(player),
            GameOutcome::Draw => None,
        }
    }
}

/// A finished game: the move sequence and how it ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedGame {
    pub moves: Vec<Move>,
    pub outcome: GameOutcome,
    pub final_state: BoardState,
}

/// Turn-by-turn driver for one game between two strategies
#[derive(Debug, Clone, Copy, Default)]
pub struct GameDriver {
    narrate: bool,
}

impl GameDriver {
    pub fn new() -> Self {
        GameDriver { narrate: false }
    }

    /// A driver that prints the board after every move.
    pub fn narrated() -> Self {
        GameDriver { narrate: true }
    }

    /// Play one full game, X moving first.
    ///
    /// Both strategies are told a new game is starting before the first
    /// move. After the final move, the player who did *not* move last is
    /// shown the terminal state as well, so its last action is credited.
    ///
    /// # Errors
    ///
    /// Propagates strategy failures (e.g. unreadable human input) and
    /// illegal moves returned by a strategy.
    pub fn play(
        &self,
        x: &mut dyn Strategy,
        o: &mut dyn Strategy,
    ) -> Result<CompletedGame> {
        x.start_new_game();
        o.start_new_game();

        let mut state = BoardState::new();
        let mut moves = Vec::new();

        while !state.is_terminal() {
            let mover = state.to_move;
            let strategy: &mut dyn Strategy = if mover == Player::X { &mut *x } else { &mut *o };

            let position = strategy.choose_action(&state)?;
            let next = state.make_move(position)?;
            strategy.observe_outcome(&next)?;

            moves.push(Move {
                position,
                player: mover,
            });
            state = next;

            if self.narrate {
                println!("{state}");
            }
        }

        // The non-mover's pending action still awaits its outcome.
        if moves.len() >= 2 {
            let other: &mut dyn Strategy = if state.to_move == Player::X {
                &mut *x
            } else {
                &mut *o
            };
            other.observe_outcome(&state)?;
        }

        let outcome = if let Some(winner) = state.winner() {
            GameOutcome::Win(winner)
        } else {
            GameOutcome::Draw
        };

        if self.narrate {
            match outcome {
                GameOutcome::Win(winner) => println!("{winner} wins!"),
                GameOutcome::Draw => println!("It's a draw!"),
            }
        }

        Ok(CompletedGame {
            moves,
            outcome,
            final_state: state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::RandomStrategy;

    #[test]
    fn test_random_game_terminates_with_outcome() {
        let mut x = RandomStrategy::new("X").with_seed(3);
        let mut o = RandomStrategy::new("O").with_seed(4);

        let game = GameDriver::new().play(&mut x, &mut o).unwrap();

        assert!(game.moves.len() >= 5 && game.moves.len() <= 9);
        assert!(game.final_state.is_terminal());
        match game.outcome {
            GameOutcome::Win(winner) => {
                assert_eq!(game.final_state.winner(), Some(winner));
            }
            GameOutcome::Draw => assert!(game.final_state.is_full()),
        }
    }

    #[test]
    fn test_moves_alternate_starting_with_x() {
        let mut x = RandomStrategy::new("X").with_seed(9);
        let mut o = RandomStrategy::new("O").with_seed(10);

        let game = GameDriver::new().play(&mut x, &mut o).unwrap();

        for (i, m) in game.moves.iter().enumerate() {
            let expected = if i % 2 == 0 { Player::X } else { Player::O };
            assert_eq!(m.player, expected);
        }
    }
}
