//! Pinyin-specific configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All generic options from `hintjump_core::Config` (flattened via serde)
//! - How `ü` is spelled in readings and queries
//! - An optional reading table that overrides the built-in readings
//!
//! # Example
//!
//! ```rust
//! use hintjump_pinyin::PinyinConfig;
//!
//! let config = PinyinConfig::from_toml_str("label_alphabet = \"jkl\"\numlaut_as_v = false\n").unwrap();
//! assert!(!config.umlaut_as_v);
//! assert_eq!(config.base().label_alphabet, "jkl");
//! ```
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PinyinConfig {
    /// Base configuration fields (labels, activation, layout, feedback)
    #[serde(flatten)]
    pub base: hintjump_core::Config,

    /// Spell ü as `v` (lv, nv). Otherwise as plain `u`.
    pub umlaut_as_v: bool,

    /// TSV reading table (`字<TAB>reading`) consulted before the built-in
    /// readings, e.g. to pick the intended reading of a heteronym.
    pub extra_readings: Option<PathBuf>,
}

impl Default for PinyinConfig {
    fn default() -> Self {
        Self {
            base: hintjump_core::Config::default(),
            umlaut_as_v: true,
            extra_readings: None,
        }
    }
}

impl PinyinConfig {
    /// Convert this pinyin config into the base config for `JumpEngine::new()`
    pub fn into_base(self) -> hintjump_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &hintjump_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut hintjump_core::Config {
        &mut self.base
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from a TOML file. A relative `extra_readings` path is resolved
    /// against the file's directory.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config =
            Self::from_toml_str(&content).with_context(|| format!("invalid config {}", path.display()))?;
        if let (Some(extra), Some(dir)) = (config.extra_readings.as_mut(), path.parent()) {
            if extra.is_relative() {
                *extra = dir.join(&*extra);
            }
        }
        Ok(config)
    }
}
