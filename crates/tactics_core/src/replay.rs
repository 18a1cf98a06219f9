//! Battle replay log.
//!
//! A replay stores the engine's seed and rules plus every engagement fought
//! with it, in order, alongside the hash of each result. Re-running the
//! engagements on a fresh engine must reproduce every hash.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::{CombatEngine, CombatResult, Engagement};
use crate::config::CombatRules;
use crate::error::{GameError, Result};

/// Replay file format version.
pub const REPLAY_VERSION: u32 = 1;

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEntry {
    /// Inputs to the exchange.
    pub engagement: Engagement,
    /// [`CombatResult::state_hash`] of the outcome.
    pub result_hash: u64,
}

/// A recorded sequence of exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReplay {
    /// Format version.
    pub version: u32,
    /// Free-form label, usually the scenario name.
    pub label: String,
    /// Rules the engine ran with.
    pub rules: CombatRules,
    /// Seed at the start of the recording.
    pub seed: u32,
    /// Exchanges in the order they were fought.
    pub entries: Vec<ReplayEntry>,
}

impl BattleReplay {
    /// Start a recording for an engine about to fight with `seed`.
    #[must_use]
    pub fn new(label: impl Into<String>, rules: CombatRules, seed: u32) -> Self {
        Self {
            version: REPLAY_VERSION,
            label: label.into(),
            rules,
            seed,
            entries: Vec::new(),
        }
    }

    /// Start a recording matching `engine`'s current state.
    #[must_use]
    pub fn for_engine(label: impl Into<String>, engine: &CombatEngine) -> Self {
        Self::new(label, *engine.rules(), engine.rng_seed())
    }

    /// Record an exchange and its outcome.
    pub fn record(&mut self, engagement: Engagement, result: &CombatResult) {
        self.entries.push(ReplayEntry {
            engagement,
            result_hash: result.state_hash(),
        });
    }

    /// Resolve `engagement` on `engine` and record it.
    pub fn resolve_and_record(&mut self, engine: &mut CombatEngine, engagement: Engagement) -> CombatResult {
        let result = engine.resolve_combat(&engagement);
        self.record(engagement, &result);
        result
    }

    /// Number of recorded exchanges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-run every exchange on a fresh engine.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ReplayMismatch`] at the first diverging entry.
    pub fn verify(&self) -> Result<Vec<CombatResult>> {
        let mut engine = CombatEngine::with_rules(self.rules);
        engine.set_rng_seed(self.seed);

        let mut results = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let result = engine.resolve_combat(&entry.engagement);
            let actual = result.state_hash();
            if actual != entry.result_hash {
                return Err(GameError::ReplayMismatch {
                    index,
                    expected: entry.result_hash,
                    actual,
                });
            }
            results.push(result);
        }
        tracing::debug!(label = %self.label, entries = results.len(), "Replay verified");
        Ok(results)
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bytes, rejecting other format versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)?;
        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {}, got {}",
                REPLAY_VERSION, replay.version
            )));
        }
        Ok(replay)
    }

    /// Save to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_bytes()?)?;
        Ok(())
    }

    /// Load from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }
}
