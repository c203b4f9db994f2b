// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Session configuration.
//!
//! Settings come from the first TOML file found among an explicit path,
//! `./maki.toml` and `<config dir>/maki/config.toml`, then `MAKI_*`
//! environment variables override individual keys:
//!
//! ```toml
//! max_call_depth = 256
//! instruction_budget = 10000000
//! loose_truthiness = true
//! random_seed = 7
//! tick_interval_ms = 16
//! log_filter = "maki=debug"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use maki_interpreter::VmOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SessionError};

/// Name of the per-directory config file.
pub const LOCAL_CONFIG: &str = "maki.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "MAKI_";

/// Host session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interpreter limits.
    #[serde(flatten)]
    pub vm: VmOptions,

    /// Seed for `System.random`; entropy when unset.
    pub random_seed: Option<u64>,

    /// Period of the event loop's timer tick.
    pub tick_interval_ms: u64,

    /// Tracing filter directive, used when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vm: VmOptions::default(),
            random_seed: None,
            tick_interval_ms: 16,
            log_filter: None,
        }
    }
}

impl Config {
    /// Loads configuration from `explicit`, or the first default location
    /// that exists, then applies environment overrides.
    ///
    /// An explicit path must exist; default locations are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.load_from_env(std::env::vars())?;
        Ok(config)
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SessionError::io(path, e))?;
        let config = toml::from_str(&content).map_err(|source| SessionError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Applies `MAKI_<KEY>` overrides from `vars`.
    pub fn load_from_env(
        &mut self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<()> {
        for (key, value) in vars {
            if let Some(name) = key.strip_prefix(ENV_PREFIX) {
                self.set(&name.to_ascii_lowercase(), &value)?;
            }
        }
        Ok(())
    }

    /// Sets one key from its string form. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || SessionError::ConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "max_call_depth" => self.vm.max_call_depth = value.parse().map_err(|_| invalid())?,
            "instruction_budget" => {
                self.vm.instruction_budget = value.parse().map_err(|_| invalid())?;
            }
            "loose_truthiness" => self.vm.loose_truthiness = parse_bool(value).ok_or_else(invalid)?,
            "random_seed" => {
                self.random_seed = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| invalid())?)
                };
            }
            "tick_interval_ms" => {
                let ms: u64 = value.parse().map_err(|_| invalid())?;
                if ms == 0 {
                    return Err(invalid());
                }
                self.tick_interval_ms = ms;
            }
            "log_filter" | "log" => self.log_filter = Some(value.to_string()),
            _ => debug!(key, "ignoring unknown config key"),
        }
        Ok(())
    }

    /// The tick period, never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Default config locations, most specific first.
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("maki").join("config.toml"));
    }
    paths
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.vm.max_call_depth, 256);
        assert_eq!(config.vm.instruction_budget, 10_000_000);
        assert!(config.vm.loose_truthiness);
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_call_depth = 32\nrandom_seed = 9").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.vm.max_call_depth, 32);
        assert_eq!(config.random_seed, Some(9));
        assert_eq!(config.vm.instruction_budget, 10_000_000);
        assert_eq!(config.tick_interval_ms, 16);
    }

    #[test]
    fn test_bad_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_call_depth = \"deep\"").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SessionError::ConfigParse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, SessionError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .load_from_env(env(&[
                ("MAKI_LOOSE_TRUTHINESS", "off"),
                ("MAKI_TICK_INTERVAL_MS", "40"),
                ("MAKI_LOG", "maki=trace"),
                ("HOME", "/root"),
            ]))
            .unwrap();
        assert!(!config.vm.loose_truthiness);
        assert_eq!(config.tick_interval_ms, 40);
        assert_eq!(config.log_filter.as_deref(), Some("maki=trace"));
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let mut config = Config::default();
        let err = config
            .load_from_env(env(&[("MAKI_MAX_CALL_DEPTH", "lots")]))
            .unwrap_err();
        assert!(matches!(err, SessionError::ConfigValue { ref key, .. } if key == "max_call_depth"));
        assert!(config.set("tick_interval_ms", "0").is_err());
    }
}
