use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::engine::EngineConfig;
use crate::error::EngineError;
use crate::policy::CapacityPolicy;

pub const CONFIG_ENV: &str = "ROOM_SWAP_CONFIG";
pub const BIND_ENV: &str = "ROOM_SWAP_BIND";
pub const AUDIT_LOG_ENV: &str = "ROOM_SWAP_AUDIT_LOG";

/// Service configuration, loaded from TOML with environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AppConfig {
    /// Address the HTTP server listens on
    pub bind_addr: String,

    /// Append-only swap audit file; audit lines go to the log when unset
    pub audit_log: Option<PathBuf>,

    /// Capacity feasibility rule applied by every matcher
    pub policy: CapacityPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            audit_log: Some(PathBuf::from("swap_log.txt")),
            policy: CapacityPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Reads the file named by `ROOM_SWAP_CONFIG` if set, then applies the
    /// `ROOM_SWAP_BIND` and `ROOM_SWAP_AUDIT_LOG` overrides.
    pub fn load() -> Result<Self, EngineError> {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        Ok(config.with_overrides(
            std::env::var(BIND_ENV).ok(),
            std::env::var(AUDIT_LOG_ENV).ok(),
        ))
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(text)?)
    }

    /// An empty audit log override disables the audit file.
    pub fn with_overrides(mut self, bind_addr: Option<String>, audit_log: Option<String>) -> Self {
        if let Some(bind_addr) = bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(audit_log) = audit_log {
            self.audit_log = (!audit_log.is_empty()).then(|| PathBuf::from(audit_log));
        }
        self
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            policy: self.policy,
        }
    }
}
