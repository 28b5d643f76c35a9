//! # Parkside Configuration
//!
//! Layered configuration for the simulation driver.
//!
//! ## Features
//! - **Unified Configuration**: One source of truth for scheduler and
//!   display policy knobs.
//! - **Validation**: Range checks on every tunable at load time.
//! - **Environment Awareness**: YAML file plus `PARKSIDE_*` overrides.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod display;
mod error;
mod scheduler;

pub use display::DisplayConfig;
pub use error::ConfigError;
pub use scheduler::SchedulerConfig;

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, Copy)]
pub struct ParksideConfig {
    /// Execution scheduler tunables (chunking, slot budget, auto-pause).
    #[validate(nested)]
    pub scheduler: SchedulerConfig,

    /// Display policy defaults (jail split, leaderboard depth).
    #[validate(nested)]
    pub display: DisplayConfig,
}

impl ParksideConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/parkside.yaml` - base settings. If missing, defaults are used.
    /// 3. `PARKSIDE_*` environment variables (`__` nesting separator).
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ParksideConfig::default()));

        if Path::new("config/parkside.yaml").exists() {
            figment = figment.merge(Yaml::file("config/parkside.yaml"));
        }

        figment
            .merge(Env::prefixed("PARKSIDE_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path for testing/validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(ParksideConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("PARKSIDE_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = ParksideConfig::default();
        config.validate().expect("default config should validate");

        assert_eq!(config.scheduler.chunk_size, 10_000);
        assert_eq!(config.scheduler.slot_budget_ms, 100);
        assert_eq!(config.scheduler.pause_interval, 100_000_000);
        assert!(config.display.split_jail);
        assert_eq!(config.display.top_k, 20);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let mut config = ParksideConfig::default();
        config.scheduler.chunk_size = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PARKSIDE_SCHEDULER__CHUNK_SIZE", "2500");

            let config = ParksideConfig::load().expect("load");
            assert_eq!(config.scheduler.chunk_size, 2500);

            Ok(())
        });
    }
}
