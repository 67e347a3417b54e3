//! Tic-Tac-Toe game logic
//!
//! Board representation, move legality, win/draw detection, the reward
//! function, and the turn-by-turn game driver. The learning core treats
//! this module as an external collaborator: it only ever sees
//! [`BoardSnapshot`] keys, legal-move sets, and rewards.

pub mod board;
pub mod game;

pub use board::{reward, BoardSnapshot, BoardState, Cell, Player};
pub use game::{CompletedGame, GameDriver, GameOutcome, Move};
