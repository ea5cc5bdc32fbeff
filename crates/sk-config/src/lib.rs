//! # sk-config
//!
//! Layered configuration loading for skillsmith using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SKL_*` prefix, `__` as separator)
//! 2. Project-level `.skillsmith/config.toml`
//! 3. User-level `~/.config/skillsmith/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SKL_REGISTRY__ROOT` -> `registry.root`,
//! `SKL_RUNTIME__PROGRAM` -> `runtime.program`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use sk_config::SkillsmithConfig;
//!
//! let config = SkillsmithConfig::load_with_dotenv().expect("config");
//! println!("registry: {}", config.registry.index_path().display());
//! ```

mod error;
mod matching;
mod registry;
mod runtime;
mod verify;

pub use error::ConfigError;
pub use matching::{DataSourceProfile, MatchWeights, MatchingConfig};
pub use registry::RegistryConfig;
pub use runtime::{RuntimeConfig, SCRIPT_PLACEHOLDER};
pub use verify::{ServerProfile, VerifyConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SkillsmithConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
}

impl SkillsmithConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading a `.env` file from the current directory.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".skillsmith/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SKL_").split("__"))
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.index_file.trim().is_empty() {
            return Err(invalid("registry.index_file", "must not be empty"));
        }
        if self.registry.stale_after_days < 0 {
            return Err(invalid("registry.stale_after_days", "must not be negative"));
        }
        if self.runtime.program.trim().is_empty() {
            return Err(invalid("runtime.program", "must not be empty"));
        }
        if self.runtime.check_timeout_secs == 0 || self.runtime.run_timeout_secs == 0 {
            return Err(invalid("runtime", "timeouts must be at least one second"));
        }
        if self.matching.adapt_threshold < self.matching.min_score {
            return Err(invalid(
                "matching.adapt_threshold",
                "must not be lower than matching.min_score",
            ));
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skillsmith").join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SkillsmithConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.runtime.check_timeout_secs, 5);
        assert_eq!(config.matching.min_score, 5);
    }

    #[test]
    fn figment_builds_without_files() {
        let config: SkillsmithConfig = SkillsmithConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.registry.index_file, "index.json");
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut config = SkillsmithConfig::default();
        config.matching.adapt_threshold = 2;
        let err = config.validate().expect_err("should reject");
        assert!(err.to_string().contains("matching.adapt_threshold"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = SkillsmithConfig::default();
        config.runtime.check_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
