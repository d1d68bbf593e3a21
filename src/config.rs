//! Solver configuration.
//!
//! Every tunable constant of the cost model, the jitter source, and the
//! monthly fairness carry-over lives here. Configurations load from TOML;
//! omitted fields take their defaults.
//!
//! ```
//! use u_roster::config::SolverConfig;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     penalty_multiplier = 2.0
//!     random_seed = 7
//! "#).unwrap();
//!
//! assert!((config.penalty_multiplier - 2.0).abs() < 1e-10);
//! assert_eq!(config.random_seed, Some(7));
//! assert_eq!(config.weeks_per_month, 4);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What to do when the shortest-path search detects a negative cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeCyclePolicy {
    /// Abort the solve with [`RosterError::NegativeCycle`](crate::error::RosterError::NegativeCycle).
    #[default]
    Fail,
    /// Log a warning, cancel the cycle and search again.
    ///
    /// Cancellation is capped at one per network edge; past that the solve
    /// stops augmenting and returns what it has.
    Warn,
}

/// Main solver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Factor applied to `(doctor penalty + cabinet load)` on assignment edges.
    pub penalty_multiplier: f64,
    /// Constant part of the static preference cost.
    pub preference_base: f64,
    /// Cost added per rank in the doctor's preferred-location list.
    pub preference_step: f64,
    /// Upper bound of the tie-break jitter added to every edge cost. Zero disables it.
    pub jitter_epsilon: f64,
    /// Seed for the jitter source. `None` seeds from the OS.
    pub random_seed: Option<u64>,
    /// Weeks in a month; quotas are split across this many weeks.
    pub weeks_per_month: usize,
    /// Starting fairness penalty of fine-exempt doctors each week.
    pub exempt_start_penalty: f64,
    /// Baseline increment per assigned shift, carried to later weeks.
    pub weekly_assignment_penalty: f64,
    /// Weekly multiplier on the baseline of fine-exempt doctors.
    pub exempt_growth_factor: f64,
    /// Reaction to a negative cycle in the residual network.
    pub negative_cycle_policy: NegativeCyclePolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            penalty_multiplier: 1.5,
            preference_base: 1.0,
            preference_step: 5.0,
            jitter_epsilon: 1e-5,
            random_seed: None,
            weeks_per_month: 4,
            exempt_start_penalty: 4.0,
            weekly_assignment_penalty: 0.5,
            exempt_growth_factor: 1.2,
            negative_cycle_policy: NegativeCyclePolicy::Fail,
        }
    }
}

impl SolverConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with jitter disabled.
    ///
    /// Solves under this configuration are fully deterministic.
    pub fn deterministic() -> Self {
        Self::default().with_jitter(0.0)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string and validates it.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the jitter bound.
    pub fn with_jitter(mut self, epsilon: f64) -> Self {
        self.jitter_epsilon = epsilon;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the penalty multiplier.
    pub fn with_penalty_multiplier(mut self, multiplier: f64) -> Self {
        self.penalty_multiplier = multiplier;
        self
    }

    /// Sets the negative-cycle policy.
    pub fn with_negative_cycle_policy(mut self, policy: NegativeCyclePolicy) -> Self {
        self.negative_cycle_policy = policy;
        self
    }

    /// Sets the month length in weeks.
    pub fn with_weeks_per_month(mut self, weeks: usize) -> Self {
        self.weeks_per_month = weeks;
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weeks_per_month == 0 {
            return Err(ConfigError::Invalid("weeks_per_month must be positive".into()));
        }
        if !(self.jitter_epsilon >= 0.0 && self.jitter_epsilon.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "jitter_epsilon must be finite and non-negative, got {}",
                self.jitter_epsilon
            )));
        }
        if !(self.penalty_multiplier >= 0.0 && self.penalty_multiplier.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "penalty_multiplier must be finite and non-negative, got {}",
                self.penalty_multiplier
            )));
        }
        Ok(())
    }
}
