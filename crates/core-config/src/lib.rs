//! Tunables for the editing core, loaded from an optional TOML file.
//!
//! Nothing here touches rendering or terminal layout: these are the few knobs
//! the rope, the input engine, and the locators need at construction time
//! (leaf size, buffered-event capacity, tab width, wrap width). Unknown TOML
//! fields are ignored so the file can evolve without breaking old configs.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Rope leaf byte budget `B` from spec §4.1: a small power of two.
const DEFAULT_ROPE_LEAF_BYTES: usize = 1024;
const DEFAULT_INPUT_MAX_EVENTS: usize = 64;
const DEFAULT_TAB_SIZE: usize = 4;
const DEFAULT_WRAP_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rope_leaf_bytes: usize,
    pub input_max_events: usize,
    pub tab_size: usize,
    pub wrap_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rope_leaf_bytes: DEFAULT_ROPE_LEAF_BYTES,
            input_max_events: DEFAULT_INPUT_MAX_EVENTS,
            tab_size: DEFAULT_TAB_SIZE,
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults for anything absent.
    /// A missing file is not an error: callers that have no config simply get
    /// `Config::default()`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(target = "config", path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        tracing::debug!(target = "config", path = %path.display(), ?cfg, "loaded config");
        Ok(cfg)
    }
}
