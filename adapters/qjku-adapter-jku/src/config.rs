//! Run and engine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{JkuError, JkuResult};

/// Optional per-snapshot data the caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputField {
    /// Basis-state probabilities as an array.
    Probabilities,
    /// Basis-state probabilities keyed by ket string.
    ProbabilitiesKet,
    /// Any other name; accepted and ignored.
    #[serde(other)]
    Unknown,
}

/// Settings for one batch of circuits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Shots per circuit.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Simulator seed; a random one is drawn per run when absent.
    #[serde(default)]
    pub seed: Option<u32>,

    /// Extra snapshot fields to keep in the result.
    #[serde(default)]
    pub data: Vec<OutputField>,
}

fn default_shots() -> u32 {
    1024
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            shots: default_shots(),
            seed: None,
            data: Vec::new(),
        }
    }
}

impl RunConfig {
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_field(mut self, field: OutputField) -> Self {
        if !self.data.contains(&field) {
            self.data.push(field);
        }
        self
    }

    /// Whether the caller asked for `field`.
    pub fn wants(&self, field: OutputField) -> bool {
        field != OutputField::Unknown && self.data.contains(&field)
    }

    pub fn validate(&self) -> JkuResult<()> {
        if self.shots == 0 {
            return Err(JkuError::Config("shots must be at least 1".into()));
        }
        Ok(())
    }

    /// The configured seed, or a fresh random one.
    pub fn resolve_seed(&self) -> u32 {
        self.seed.unwrap_or_else(rand::random)
    }
}

/// How to reach the simulator executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the simulator binary.
    pub executable: PathBuf,

    /// Suppress the banner logged before each run.
    #[serde(default)]
    pub silent: bool,
}

impl EngineConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            silent: false,
        }
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}
