//! Headless tactics battle runner.
//!
//! Plays scenarios without graphics. Reports go to stdout as JSON, logs go
//! to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in skirmish once
//! cargo run -p tactics_headless -- run --seed 7
//!
//! # Run a scenario file and record a replay
//! cargo run -p tactics_headless -- run --scenario scenarios/skirmish.ron --replay-out battle.replay
//!
//! # Run batch balance test
//! cargo run -p tactics_headless -- batch --count 1000 --output results/
//!
//! # Check a recorded replay
//! cargo run -p tactics_headless -- replay --file battle.replay
//!
//! # Preview an attack between two scenario units
//! cargo run -p tactics_headless -- forecast --attacker p2_fighter --defender e2_bandit
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tactics_core::replay::BattleReplay;
use tactics_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    scenario::Scenario,
    skirmish::Skirmish,
};

#[derive(Parser)]
#[command(name = "tactics_headless")]
#[command(about = "Headless tactics battle runner for AI testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single battle and print its report
    Run {
        /// Scenario file to load (built-in skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u32,

        /// Write the battle replay here
        #[arg(long)]
        replay_out: Option<PathBuf>,
    },

    /// Run a batch of battles for balance testing
    Batch {
        /// Scenario file to load (built-in skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of battles to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel battles (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u32,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Scenario file to load (built-in skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u32,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Re-simulate a recorded replay and check every exchange
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the battle forecast between two units at their starting tiles
    Forecast {
        /// Scenario file to load (built-in skirmish if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Attacking unit id
        #[arg(short, long)]
        attacker: String,

        /// Defending unit id
        #[arg(short, long)]
        defender: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            seed,
            replay_out,
        } => cmd_run(scenario.as_deref(), seed, replay_out.as_deref()),
        Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
        } => cmd_batch(scenario.as_deref(), count, parallel, output, seed),
        Commands::Verify {
            scenario,
            seed,
            runs,
        } => cmd_verify(scenario.as_deref(), seed, runs),
        Commands::Replay { file } => cmd_replay(&file),
        Commands::Forecast {
            scenario,
            attacker,
            defender,
        } => cmd_forecast(scenario.as_deref(), &attacker, &defender),
    }
}

fn load_scenario(path: Option<&Path>) -> Scenario {
    match Scenario::load_or_default(path) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to encode output: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run a single battle
fn cmd_run(scenario: Option<&Path>, seed: u32, replay_out: Option<&Path>) {
    let scenario = load_scenario(scenario);
    tracing::info!(scenario = %scenario.name, seed, "Starting battle");

    let mut skirmish = match Skirmish::new(&scenario, seed) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to set up battle: {}", e);
            std::process::exit(1);
        }
    };
    if replay_out.is_some() {
        skirmish = skirmish.with_replay();
    }

    let report = skirmish.run();

    if let (Some(path), Some(replay)) = (replay_out, skirmish.replay()) {
        if let Err(e) = replay.save(path) {
            eprintln!("Failed to save replay: {}", e);
            std::process::exit(1);
        }
        eprintln!("Replay saved to: {} ({} exchanges)", path.display(), replay.len());
    }

    print_json(&report);
}

/// Run batch of battles for balance testing
fn cmd_batch(scenario: Option<&Path>, count: u32, parallel: u32, output: PathBuf, seed: u32) {
    let scenario = load_scenario(scenario);

    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        scenario = %scenario.name,
        count = count,
        parallel = parallel,
        seed = seed,
        output = %output.display(),
        cpus_available = num_cpus,
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        std::process::exit(1);
    }

    let config = BatchConfig::new(&scenario.name, count)
        .with_output(output.clone())
        .with_seed(seed)
        .with_parallel(parallel);

    let results = run_batch(&scenario, config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {}", e);
        std::process::exit(1);
    }

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Battles played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Battles FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("Average turns: {:.1}", results.summary.average_turns);
    eprintln!("\nOutcomes:");
    for (side, rate) in &results.summary.win_rates {
        eprintln!("  {}: {:.1}%", side, rate * 100.0);
    }

    if !results.errors.is_empty() {
        eprintln!("\nFAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Battle {} (seed {}): {}",
                error.game_index, error.seed, error.message
            );
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(scenario: Option<&Path>, seed: u32, runs: u32) {
    let scenario = load_scenario(scenario);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    match verify_determinism(&scenario, seed, runs) {
        Ok(outcome) if outcome.is_deterministic() => {
            eprintln!("PASS: All {} runs produced identical results", runs);
        }
        Ok(outcome) => {
            eprintln!("FAIL: Non-determinism detected!");
            for (i, hash) in outcome.hashes.iter().enumerate() {
                eprintln!("  Run {}: {:016x}", i, hash);
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("FAIL: Error during verification: {}", e);
            std::process::exit(1);
        }
    }
}

/// Verify a recorded replay
fn cmd_replay(file: &Path) {
    tracing::info!("Verifying replay: {}", file.display());

    let replay = match BattleReplay::load(file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load replay: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!("Loaded replay:");
    eprintln!("  Label: {}", replay.label);
    eprintln!("  Seed: {}", replay.seed);
    eprintln!("  Exchanges: {}", replay.len());

    match replay.verify() {
        Ok(results) => {
            eprintln!("PASS: Replay verification successful ({} exchanges)", results.len());
        }
        Err(e) => {
            eprintln!("FAIL: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a battle forecast
fn cmd_forecast(scenario: Option<&Path>, attacker: &str, defender: &str) {
    let scenario = load_scenario(scenario);
    let forecast = Skirmish::new(&scenario, scenario.rules.default_seed)
        .and_then(|skirmish| skirmish.forecast(attacker, defender));

    match forecast {
        Ok(forecast) => print_json(&forecast),
        Err(e) => {
            eprintln!("Failed to forecast: {}", e);
            std::process::exit(1);
        }
    }
}
