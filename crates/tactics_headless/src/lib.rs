//! Headless skirmish runner for AI testing and CI verification.
//!
//! This crate plays whole battles without a renderer: every unit on both
//! sides is driven by the tactical AI and every attack goes through the
//! combat engine. This enables:
//!
//! - **AI testing**: watch the five behaviors fight each other
//! - **Balance testing**: run thousands of seeds in parallel and compare win rates
//! - **CI verification**: same scenario and seed must always end in the same state
//!
//! # Example
//!
//! ```bash
//! # Run one battle and print the report as JSON
//! cargo run -p tactics_headless -- run --scenario scenarios/skirmish.ron --seed 7
//!
//! # Run a batch of seeds
//! cargo run -p tactics_headless -- batch --count 500 --output results/
//!
//! # Verify determinism
//! cargo run -p tactics_headless -- verify --seed 12345 --runs 5
//! ```

pub mod batch;
pub mod scenario;
pub mod skirmish;

pub use batch::{run_batch, BatchConfig, BatchResults, BatchSummary};
pub use scenario::{Scenario, ScenarioError, UnitPlacement};
pub use skirmish::{run_skirmish, RunnerError, Skirmish, SkirmishReport};
