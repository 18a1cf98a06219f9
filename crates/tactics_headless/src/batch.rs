//! Batch skirmish runner for balance testing.
//!
//! Runs one scenario across many seeds in parallel using rayon and
//! aggregates the outcomes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scenario::Scenario;
use crate::skirmish::{run_skirmish, SkirmishReport};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario label for the results file
    pub scenario: String,
    /// Number of battles to run
    pub game_count: u32,
    /// Maximum parallel battles (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// First seed; battle `i` uses `seed_start + i`
    pub seed_start: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "skirmish".to_string(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: &str, game_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set parallelism
    pub fn with_parallel(mut self, parallel: u32) -> Self {
        self.parallel_games = parallel;
        self
    }
}

/// Aggregate outcome over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Battles completed.
    pub total_games: u32,
    /// Wins per side label ("player", "enemy", "draw").
    pub outcomes: BTreeMap<String, u32>,
    /// Share of battles per side label.
    pub win_rates: BTreeMap<String, f64>,
    /// Mean battle length in turns.
    pub average_turns: f64,
    /// Mean exchanges per battle.
    pub average_exchanges: f64,
    /// Survival rate per unit id.
    pub survival_rates: BTreeMap<String, f64>,
}

impl BatchSummary {
    /// Summarize a set of reports.
    #[must_use]
    pub fn from_games(games: &[SkirmishReport]) -> Self {
        if games.is_empty() {
            return Self::default();
        }
        let total = games.len() as f64;

        let mut outcomes: BTreeMap<String, u32> = BTreeMap::new();
        let mut survivors: BTreeMap<String, u32> = BTreeMap::new();
        for game in games {
            *outcomes.entry(game.winner_label().to_string()).or_default() += 1;
            for unit in &game.units {
                let entry = survivors.entry(unit.id.clone()).or_default();
                if unit.alive {
                    *entry += 1;
                }
            }
        }

        let rate = |count: u32| f64::from(count) / total;
        Self {
            total_games: games.len() as u32,
            win_rates: outcomes.iter().map(|(k, v)| (k.clone(), rate(*v))).collect(),
            outcomes,
            average_turns: games.iter().map(|g| f64::from(g.turns)).sum::<f64>() / total,
            average_exchanges: games.iter().map(|g| f64::from(g.exchanges)).sum::<f64>() / total,
            survival_rates: survivors.into_iter().map(|(k, v)| (k, rate(v))).collect(),
        }
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Battle index
    pub game_index: u32,
    /// Seed used
    pub seed: u32,
    /// Error message
    pub message: String,
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual battle reports
    pub games: Vec<SkirmishReport>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run a batch of battles
pub fn run_batch(scenario: &Scenario, config: BatchConfig) -> BatchResults {
    let start = Instant::now();

    info!(
        "Starting batch run: {} battles of '{}'",
        config.game_count, config.scenario
    );

    let run = || -> Vec<Result<SkirmishReport, BatchError>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(i);
                run_skirmish(scenario, seed).map_err(|e| {
                    warn!("Battle {} failed: {}", i, e);
                    BatchError {
                        game_index: i,
                        seed,
                        message: e.to_string(),
                    }
                })
            })
            .collect()
    };

    let results = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!("Failed to build thread pool: {}, using default", e);
                run()
            }
        }
    } else {
        run()
    };

    let mut games = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(report) => games.push(report),
            Err(error) => errors.push(error),
        }
    }

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} battles in {:.1}s ({:.1} battles/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(0.001)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// Seed checked.
    pub seed: u32,
    /// Final state hash of each run.
    pub hashes: Vec<u64>,
}

impl VerifyOutcome {
    /// Whether every run ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run the same seed `runs` times and collect final state hashes.
pub fn verify_determinism(
    scenario: &Scenario,
    seed: u32,
    runs: u32,
) -> Result<VerifyOutcome, crate::skirmish::RunnerError> {
    let hashes = (0..runs)
        .map(|_| run_skirmish(scenario, seed).map(|report| report.state_hash))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(VerifyOutcome { seed, hashes })
}
