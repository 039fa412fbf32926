//! Configuration collaborators.
//!
//! [`AppConfig`] is the read-only section/key store consulted per request
//! (e.g. whether counter bookkeeping runs); it is constructed explicitly
//! and passed in, never a process-wide singleton. [`RuntimeConfig`] carries
//! the environment-derived coroutine knobs.
//!
//! ## Config file
//!
//! ```yaml
//! core:
//!   collect_stats: true
//! server:
//!   keep_alive: true
//! ```
//!
//! ## Environment
//!
//! `WORKFUNNEL_STACK_SIZE` sets the coroutine stack size in bytes, decimal
//! (`32768`) or hex (`0x8000`). Default: `0x8000` (32 KB).

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Default coroutine stack size in bytes (32 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Read-only application configuration, keyed by section and key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AppConfig {
    sections: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl AppConfig {
    /// An empty configuration: every lookup misses, every flag is off.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load from a YAML file of `section -> key -> value` maps.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_yaml::from_str(&raw)?;
        Ok(config)
    }

    /// Build from an in-memory section map (used by tests and embedders).
    pub fn from_sections(
        sections: HashMap<String, HashMap<String, serde_yaml::Value>>,
    ) -> Self {
        Self { sections }
    }

    /// Look up a raw value.
    pub fn get(&self, section: &str, key: &str) -> Option<&serde_yaml::Value> {
        self.sections.get(section)?.get(key)
    }

    /// Look up a boolean flag; missing keys and non-boolean values read as
    /// `false`.
    pub fn get_bool(&self, section: &str, key: &str) -> bool {
        self.get(section, key).and_then(|v| v.as_bool()).unwrap_or(false)
    }
}

/// Runtime knobs loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for spawned coroutines in bytes
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load from the environment (`WORKFUNNEL_STACK_SIZE`).
    pub fn from_env() -> Self {
        let stack_size = env::var("WORKFUNNEL_STACK_SIZE")
            .ok()
            .and_then(|val| {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).ok()
                } else {
                    val.parse().ok()
                }
            })
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }
}
