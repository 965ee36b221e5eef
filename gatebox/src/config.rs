//! YAML configuration for policy tables and sweep cadence.
//!
//! The built-in tables ([`LimitClasses::default`],
//! [`CachePolicies::default`]) cover the stock deployment; a config file
//! extends or overrides them without code changes.
//!
//! ```
//! use gatebox::Config;
//!
//! let config = Config::from_yaml(
//!     r#"
//! sweep_interval_secs: 60
//! limits:
//!   login:
//!     max_attempts: 3
//!     window_ms: 600000
//!     block_duration_ms: 3600000
//! datasets:
//!   faturas:
//!     ttl_secs: 900
//! "#,
//! )
//! .unwrap();
//!
//! let classes = config.limit_classes();
//! assert_eq!(classes.get("login").unwrap().max_attempts(), 3);
//! // Built-ins not mentioned in the file survive.
//! assert!(classes.get("api").is_some());
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use gatebox_core::{CachePolicy, LimitClass};

use crate::policy::{CachePolicies, LimitClasses};

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document did not parse into a [`Config`].
    #[error("invalid YAML configuration: {0}")]
    Yaml(String),
}

/// One rate-limit class as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitClassConfig {
    /// Maximum attempts within one window.
    pub max_attempts: u32,
    /// Window length in milliseconds.
    pub window_ms: i64,
    /// Block duration in milliseconds.
    pub block_duration_ms: i64,
}

/// One cache dataset policy as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicyConfig {
    /// Time-to-live in seconds.
    pub ttl_secs: i64,
    /// Tags attached to entries; defaults to the dataset's own name.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Deserializable configuration: sweep cadence plus limit and dataset
/// overrides layered on top of the built-in tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between background sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Limit classes to add or override.
    #[serde(default)]
    pub limits: BTreeMap<String, LimitClassConfig>,
    /// Dataset policies to add or override.
    #[serde(default)]
    pub datasets: BTreeMap<String, CachePolicyConfig>,
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sweep_interval_secs: default_sweep_interval_secs(),
            limits: BTreeMap::new(),
            datasets: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|error| ConfigError::Yaml(error.to_string()))
    }

    /// Sweep cadence as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Builds the limit class table: built-in defaults overlaid with the
    /// configured entries.
    pub fn limit_classes(&self) -> LimitClasses {
        let mut table = LimitClasses::default();
        for (name, class) in &self.limits {
            table.insert(
                SmolStr::new(name),
                LimitClass::new(
                    class.max_attempts,
                    TimeDelta::milliseconds(class.window_ms),
                    TimeDelta::milliseconds(class.block_duration_ms),
                ),
            );
        }
        table
    }

    /// Builds the dataset policy table: built-in defaults overlaid with the
    /// configured entries. A dataset without explicit tags is tagged with
    /// its own name.
    pub fn cache_policies(&self) -> CachePolicies {
        let mut table = CachePolicies::default();
        for (name, policy) in &self.datasets {
            let tags = if policy.tags.is_empty() {
                vec![SmolStr::new(name)]
            } else {
                policy.tags.iter().map(SmolStr::new).collect()
            };
            table.insert(
                SmolStr::new(name),
                CachePolicy::new(TimeDelta::seconds(policy.ttl_secs), tags),
            );
        }
        table
    }
}
