//! Tabular Q-learning for noughts and crosses
//!
//! This crate provides:
//! - Complete Tic-Tac-Toe game implementation with a turn-by-turn driver
//! - A tabular learning agent: per-state action values, explore/exploit
//!   policies, and temporal-difference credit assignment
//! - Self-play training with win/draw/loss statistics
//! - Save/load of trained agents

pub mod cli;
pub mod error;
pub mod learning;
pub mod strategy;
pub mod tictactoe;
pub mod training;

pub use error::{Error, Result};
pub use learning::{AgentConfig, ExploreRule, LearningAgent, SavedAgent, UpdateRule};
pub use strategy::{HumanStrategy, RandomStrategy, Strategy};
pub use training::{run_games, TrainingConfig, TrainingResult};
