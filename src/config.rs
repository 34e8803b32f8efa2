//! Bridge configuration using Figment.
//!
//! Configuration is loaded from:
//! 1. A `plotlink.toml` file (base configuration)
//! 2. Environment variables (prefixed with `PLOTLINK_`, nested keys joined
//!    with `__`, e.g. `PLOTLINK_SESSION__MAX_SESSIONS=2`)
//!
//! # Example
//!
//! ```no_run
//! use plotlink::BridgeConfig;
//!
//! fn main() -> plotlink::Result<()> {
//!     let config = BridgeConfig::load()?;
//!     println!("Session limit: {}", config.session.max_sessions);
//!     Ok(())
//! }
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BridgeError, Result};

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Session behavior settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Session behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of concurrently open sessions in this process.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Whether the vendor application window is shown when a session opens.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Whether a dropped session saves the project before shutting down.
    #[serde(default = "default_true")]
    pub save_on_close: bool,
    /// Whether opening a non-existent project path creates a new project.
    #[serde(default = "default_true")]
    pub create_missing: bool,
}

fn default_max_sessions() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            visible: true,
            save_on_close: true,
            create_missing: true,
        }
    }
}

impl BridgeConfig {
    /// Loads configuration from `plotlink.toml` and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from("plotlink.toml")
    }

    /// Loads configuration from the given TOML file and the environment.
    ///
    /// The file is optional; environment variables override file values.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config: BridgeConfig = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PLOTLINK_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates values that parse but are logically incorrect.
    pub fn validate(&self) -> Result<()> {
        if self.session.max_sessions == 0 {
            return Err(BridgeError::Configuration(
                "session.max_sessions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.session.max_sessions, 5);
        assert!(config.session.visible);
        assert!(config.session.save_on_close);
        assert!(config.session.create_missing);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("plotlink.toml");
        let mut file = std::fs::File::create(&path).expect("create config");
        writeln!(file, "[session]\nmax_sessions = 2\nvisible = false").expect("write config");

        let config = BridgeConfig::load_from(&path).expect("load config");
        assert_eq!(config.session.max_sessions, 2);
        assert!(!config.session.visible);
        // Unset keys fall back to defaults.
        assert!(config.session.save_on_close);
    }

    #[test]
    fn test_validation_rejects_zero_sessions() {
        let config = BridgeConfig {
            session: SessionConfig {
                max_sessions: 0,
                ..SessionConfig::default()
            },
        };
        let err = config.validate().expect_err("must fail validation");
        assert!(matches!(err, BridgeError::Configuration(_)));
    }
}
