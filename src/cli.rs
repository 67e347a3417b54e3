//! Command implementations and output helpers for the qnac binary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::{
    learning::{AgentConfig, ExploreRule, LearningAgent, SavedAgent, UpdateRule},
    strategy::{HumanStrategy, RandomStrategy},
    tictactoe::{GameDriver, Player},
    training::{run_games, TrainingConfig},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExploreArg {
    /// Uniformly random exploration
    Uniform,
    /// Visit-threshold gate, then sampling from recent targets
    VisitThreshold,
    /// Epsilon-greedy with multiplicative decay
    Epsilon,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UpdateArg {
    /// Exact running mean of all observed targets
    Mean,
    /// Fixed learning-rate exponential update
    Exponential,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SideArg {
    X,
    O,
}

impl From<SideArg> for Player {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::X => Player::X,
            SideArg::O => Player::O,
        }
    }
}

/// Train two agents in self-play and save both.
#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Number of self-play games
    #[arg(long, default_value_t = 100_000)]
    pub games: usize,

    /// Random seed for reproducible training
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output path for the X-side agent
    #[arg(long, default_value = "qnac-x.agent")]
    pub out_x: PathBuf,

    /// Output path for the O-side agent
    #[arg(long, default_value = "qnac-o.agent")]
    pub out_o: PathBuf,

    /// Initial action value for the first mover. Offset from zero to
    /// compensate for X's head start under random play.
    #[arg(long, default_value_t = 0.3067)]
    pub start_q_x: f64,

    /// Initial action value for the second mover
    #[arg(long, default_value_t = -0.3067)]
    pub start_q_o: f64,

    /// Discount rate for future rewards
    #[arg(long, default_value_t = 0.7)]
    pub discount: f64,

    /// Value update rule
    #[arg(long, value_enum, default_value_t = UpdateArg::Mean)]
    pub update: UpdateArg,

    /// Learning rate for the exponential update rule
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Exploration policy
    #[arg(long, value_enum, default_value_t = ExploreArg::VisitThreshold)]
    pub explore: ExploreArg,

    /// Minimum trials per action before sampling-based exploration
    #[arg(long, default_value_t = 20)]
    pub min_visits: u64,

    /// Recent learning targets sampled by the explore policy
    #[arg(long, default_value_t = 100)]
    pub sample_window: usize,

    /// Initial epsilon for epsilon-greedy exploration
    #[arg(long, default_value_t = 0.3)]
    pub epsilon: f64,

    /// Multiplicative epsilon decay per value update
    #[arg(long, default_value_t = 0.99999)]
    pub epsilon_decay: f64,

    /// Epsilon floor
    #[arg(long, default_value_t = 0.05)]
    pub epsilon_floor: f64,

    /// Record per-state diagnostic update logs (large)
    #[arg(long)]
    pub keep_history: bool,

    /// Save aggregate statistics as JSON
    #[arg(long)]
    pub stats_out: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl TrainArgs {
    fn explore_rule(&self) -> ExploreRule {
        match self.explore {
            ExploreArg::Uniform => ExploreRule::Uniform,
            ExploreArg::VisitThreshold => ExploreRule::VisitThreshold {
                min_visits: self.min_visits,
                sample_window: self.sample_window,
            },
            ExploreArg::Epsilon => ExploreRule::EpsilonGreedy {
                epsilon: self.epsilon,
                decay: self.epsilon_decay,
                floor: self.epsilon_floor,
            },
        }
    }

    fn config_for(&self, start_q: f64) -> AgentConfig {
        AgentConfig {
            start_q,
            update_rule: match self.update {
                UpdateArg::Mean => UpdateRule::MeanReturn,
                UpdateArg::Exponential => UpdateRule::Exponential {
                    learning_rate: self.learning_rate,
                },
            },
            discount_rate: self.discount,
            predictive: true,
            next_state_is_predictable: false,
            explore_rule: self.explore_rule(),
            keep_history: self.keep_history,
        }
    }
}

pub fn execute_train(args: TrainArgs) -> Result<()> {
    let mut x = LearningAgent::new("learner-x", args.config_for(args.start_q_x))?;
    let mut o = LearningAgent::new("learner-o", args.config_for(args.start_q_o))?;

    let config = TrainingConfig {
        num_games: args.games,
        seed: args.seed,
        progress: !args.no_progress,
    };

    let result = run_games(&mut x, &mut o, &config)?;

    print_section("Training complete");
    print_kv("Games", &format_number(result.total_games));
    print_kv("X wins", &format!("{} ({:.1}%)", format_number(result.x_wins), result.x_win_rate * 100.0));
    print_kv("O wins", &format!("{} ({:.1}%)", format_number(result.o_wins), result.o_win_rate * 100.0));
    print_kv("Draws", &format!("{} ({:.1}%)", format_number(result.draws), result.draw_rate * 100.0));
    print_kv("X states", &format_number(x.table().len()));
    print_kv("O states", &format_number(o.table().len()));

    SavedAgent::from_agent(&x)
        .save_to_file(&args.out_x)
        .with_context(|| format!("Failed to save X agent to {}", args.out_x.display()))?;
    SavedAgent::from_agent(&o)
        .save_to_file(&args.out_o)
        .with_context(|| format!("Failed to save O agent to {}", args.out_o.display()))?;
    println!(
        "\nSaved agents to {} and {}",
        args.out_x.display(),
        args.out_o.display()
    );

    if let Some(path) = &args.stats_out {
        result
            .save(path)
            .with_context(|| format!("Failed to save statistics to {}", path.display()))?;
    }

    Ok(())
}

/// Evaluate a trained agent greedily against a random opponent.
#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Path to a saved agent
    #[arg(long)]
    pub agent: PathBuf,

    /// Side the agent plays
    #[arg(long, value_enum, default_value_t = SideArg::X)]
    pub side: SideArg,

    /// Number of evaluation games
    #[arg(long, default_value_t = 1000)]
    pub games: usize,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute_evaluate(args: EvaluateArgs) -> Result<()> {
    let mut agent = SavedAgent::load_from_file(&args.agent)?.to_agent()?;
    // Greedy deployment mode: no exploration, no updates.
    agent.set_learning(false);
    let mut opponent = RandomStrategy::new("random");

    let config = TrainingConfig {
        num_games: args.games,
        seed: args.seed,
        progress: false,
    };

    let side: Player = args.side.into();
    let result = match side {
        Player::X => run_games(&mut agent, &mut opponent, &config)?,
        Player::O => run_games(&mut opponent, &mut agent, &config)?,
    };

    let (wins, losses) = match side {
        Player::X => (result.x_wins, result.o_wins),
        Player::O => (result.o_wins, result.x_wins),
    };

    print_section(&format!("Evaluation as {side} vs random"));
    print_kv("Games", &format_number(result.total_games));
    print_kv("Wins", &format_number(wins));
    print_kv("Draws", &format_number(result.draws));
    print_kv("Losses", &format_number(losses));

    Ok(())
}

/// Play interactively against a trained agent.
#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Path to a saved agent
    #[arg(long)]
    pub agent: PathBuf,

    /// Side the agent plays; you take the other one
    #[arg(long, value_enum, default_value_t = SideArg::X)]
    pub side: SideArg,
}

pub fn execute_play(args: PlayArgs) -> Result<()> {
    let mut agent = SavedAgent::load_from_file(&args.agent)?.to_agent()?;
    agent.set_learning(false);
    let mut human = HumanStrategy::new("You");

    println!("Positions are numbered 0-8, left to right, top to bottom.\n");

    let driver = GameDriver::narrated();
    let agent_side: Player = args.side.into();
    let game = match agent_side {
        Player::X => driver.play(&mut agent, &mut human)?,
        Player::O => driver.play(&mut human, &mut agent)?,
    };

    match game.outcome.winner() {
        Some(winner) if winner == agent_side => println!("The agent ({agent_side}) wins."),
        Some(winner) => println!("You ({winner}) win!"),
        None => println!("Draw."),
    }

    Ok(())
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:16} {}", format!("{key}:"), value);
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}
