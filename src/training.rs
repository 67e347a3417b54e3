//! Self-play training driver

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    strategy::Strategy,
    tictactoe::{GameDriver, GameOutcome, Player},
    Result,
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training games
    pub num_games: usize,

    /// Random seed; the O-side strategy gets `seed + 1`
    pub seed: Option<u64>,

    /// Whether to show a progress bar
    pub progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_games: 10_000,
            seed: None,
            progress: false,
        }
    }
}

/// Aggregate result of a training run, counted from X's perspective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    pub total_games: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub x_win_rate: f64,
    pub o_win_rate: f64,
    pub draw_rate: f64,
}

impl TrainingResult {
    pub fn new(total_games: usize, x_wins: usize, o_wins: usize, draws: usize) -> Self {
        let rate = |n: usize| {
            if total_games > 0 {
                n as f64 / total_games as f64
            } else {
                0.0
            }
        };
        Self {
            total_games,
            x_wins,
            o_wins,
            draws,
            x_win_rate: rate(x_wins),
            o_win_rate: rate(o_wins),
            draw_rate: rate(draws),
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

fn create_progress(total_games: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_games);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games")
            .expect("Invalid progress bar template")
            .progress_chars("=>-"),
    );
    pb
}

/// Play `num_games` games between the two strategies and tally outcomes.
///
/// Both strategies may be learning agents (self-play), or one can be a
/// fixed baseline for evaluation. Seeding is applied once up front so a
/// fixed seed reproduces the full action sequence and final tables.
pub fn run_games(
    x: &mut dyn Strategy,
    o: &mut dyn Strategy,
    config: &TrainingConfig,
) -> Result<TrainingResult> {
    if let Some(seed) = config.seed {
        x.set_rng_seed(seed)?;
        o.set_rng_seed(seed.wrapping_add(1))?;
    }

    let driver = GameDriver::new();
    let progress = config.progress.then(|| create_progress(config.num_games as u64));

    let mut x_wins = 0;
    let mut o_wins = 0;
    let mut draws = 0;

    for _ in 0..config.num_games {
        let game = driver.play(x, o)?;
        match game.outcome {
            GameOutcome::Win(Player::X) => x_wins += 1,
            GameOutcome::Win(Player::O) => o_wins += 1,
            GameOutcome::Draw => draws += 1,
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress {
        pb.finish();
    }

    Ok(TrainingResult::new(config.num_games, x_wins, o_wins, draws))
}
