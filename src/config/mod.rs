// Configuration module for aerosurety
// Protocol parameters for admission, insurance and oracle consensus

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Base units per token (amounts are carried as integer base units)
pub const TOKEN: u64 = 1_000_000_000;

/// Minimum deposit before an airline may participate in governance
pub const DEFAULT_MIN_AIRLINE_FUNDING: u64 = 10 * TOKEN;
/// Cap on a single insurance premium
pub const DEFAULT_MAX_PREMIUM: u64 = TOKEN;
/// Fee an oracle pays on registration
pub const DEFAULT_ORACLE_REGISTRATION_FEE: u64 = TOKEN;
/// Matching responses required to finalize a flight status
pub const DEFAULT_MIN_RESPONSES: u32 = 3;
/// Oracle indexes are drawn from [0, DEFAULT_MAX_INDEX)
pub const DEFAULT_MAX_INDEX: u8 = 10;
/// Airlines admitted without a vote while fewer than this many are registered
pub const DEFAULT_AIRLINE_FAST_PATH: usize = 4;

/// Indexes assigned to each oracle at registration
pub const ORACLE_INDEX_COUNT: usize = 3;

/// Error type for configuration loading and validation issues
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable protocol parameters. `Default` carries the reference values;
/// deployments may load overrides from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuretyConfig {
    /// Minimum airline funding deposit, in base units
    pub min_airline_funding: u64,
    /// Maximum premium for a single policy, in base units
    pub max_premium: u64,
    /// Oracle registration fee, in base units
    pub oracle_registration_fee: u64,
    /// Matching oracle responses required for quorum
    pub min_responses: u32,
    /// Exclusive upper bound of the oracle index range
    pub max_index: u8,
    /// Registered-airline count below which admission needs no vote
    pub airline_fast_path: usize,
}

impl Default for SuretyConfig {
    fn default() -> Self {
        SuretyConfig {
            min_airline_funding: DEFAULT_MIN_AIRLINE_FUNDING,
            max_premium: DEFAULT_MAX_PREMIUM,
            oracle_registration_fee: DEFAULT_ORACLE_REGISTRATION_FEE,
            min_responses: DEFAULT_MIN_RESPONSES,
            max_index: DEFAULT_MAX_INDEX,
            airline_fast_path: DEFAULT_AIRLINE_FAST_PATH,
        }
    }
}

impl SuretyConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: SuretyConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters describe a workable protocol
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_airline_funding == 0 {
            return Err(ConfigError::InvalidValue(
                "min_airline_funding",
                "must be greater than zero".to_string(),
            ));
        }
        if self.max_premium == 0 {
            return Err(ConfigError::InvalidValue(
                "max_premium",
                "must be greater than zero".to_string(),
            ));
        }
        if self.min_responses == 0 {
            return Err(ConfigError::InvalidValue(
                "min_responses",
                "a quorum of zero would finalize without any response".to_string(),
            ));
        }
        if (self.max_index as usize) < ORACLE_INDEX_COUNT {
            return Err(ConfigError::InvalidValue(
                "max_index",
                format!(
                    "must be at least {} so each oracle can hold distinct indexes",
                    ORACLE_INDEX_COUNT
                ),
            ));
        }
        if self.airline_fast_path == 0 {
            return Err(ConfigError::InvalidValue(
                "airline_fast_path",
                "the first airline could never be admitted".to_string(),
            ));
        }
        Ok(())
    }
}
