//! qnac CLI - train, evaluate, and play against tabular learning agents

use anyhow::Result;
use clap::{Parser, Subcommand};

use qnac::cli::{execute_evaluate, execute_play, execute_train, EvaluateArgs, PlayArgs, TrainArgs};

#[derive(Parser)]
#[command(name = "qnac")]
#[command(version, about = "Tabular Q-learning for noughts and crosses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train two agents in self-play and save both
    Train(Box<TrainArgs>),

    /// Evaluate a trained agent against a random opponent
    Evaluate(EvaluateArgs),

    /// Play interactively against a trained agent
    Play(PlayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => execute_train(*args),
        Commands::Evaluate(args) => execute_evaluate(args),
        Commands::Play(args) => execute_play(args),
    }
}
