//! hintjump-core
//!
//! Jump-to-text core: match a typed query against the visible document
//! (directly or through romanized readings), label every occurrence, and
//! drive the keystroke session that narrows labels down to one target.
//!
//! The crate is script-agnostic. Language crates supply a `Romanizer`;
//! hosts supply a `Host` (visible text, selection, rendering).
//!
//! Public API:
//! - `Romanizer`, `RomanizedForm`, `TableRomanizer` - readings
//! - `QueryMatcher` - ordered multi-strategy matching
//! - `CandidateCollector`, `TextSpanProvider` - occurrences on screen
//! - `LabelAlphabet`, `assign_labels`, `layout_markers` - hint labels
//! - `JumpEngine`, `JumpSession` - the session state machine
//! - `Config` - configuration
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

pub mod candidate;
pub use candidate::{Candidate, CandidateSpan, Point, Rect, TextSpan};

pub mod romanize;
pub use romanize::{RomanSegment, RomanizedForm, Romanizer, TableRomanizer};

pub mod matcher;
pub use matcher::{query_tokens, Hit, MatchOutcome, MatchStrategy, QueryMatcher};

pub mod collector;
pub use collector::{dedup_candidates, CandidateCollector, TextSpanProvider};

pub mod label;
pub use label::{assign_labels, layout_markers, HintEntry, LabelAlphabet};

pub mod key_event;
pub use key_event::{EventResult, InputEvent, Key, KeyInput};

pub mod input_buffer;
pub use input_buffer::InputBuffer;

pub mod context;
pub use context::{HintView, OverlayContext};

pub mod host;
pub use host::{CaretTarget, EffectKind, Host, Selection, TransientEffect};

pub mod session;
pub use session::{JumpSession, SessionState};

pub mod jump_engine;
pub use jump_engine::JumpEngine;

/// Generic configuration for the jump engine.
///
/// Language crates extend this (see `PinyinConfig`) by flattening it into
/// their own config.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Symbols labels are built from. First symbols label the first hints.
    pub label_alphabet: String,

    /// Hard cap on candidates collected per session
    pub max_candidates: usize,
    /// Candidates closer than this (px, on both axes) are merged
    pub dedup_tolerance_px: f64,

    // Activation gesture
    /// Key that is double-pressed to open the query prompt
    pub activation_key: String,
    /// Maximum gap between the two presses (ms)
    pub activation_timeout_ms: u64,

    // Marker layout
    /// Markers closer than this vertically count as the same row (px)
    pub overlap_band_px: f64,
    /// Minimum horizontal gap between markers on the same row (px)
    pub overlap_gap_px: f64,

    // Transient feedback
    /// Lifetime of the confirmation flash after a jump (ms)
    pub flash_ms: u64,
    /// Lifetime of notices (ms)
    pub notice_ms: u64,
    /// Notice shown when a query finds nothing
    pub not_found_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            label_alphabet: label::DEFAULT_LABEL_ALPHABET.to_string(),
            max_candidates: collector::DEFAULT_MAX_CANDIDATES,
            dedup_tolerance_px: collector::DEFAULT_DEDUP_TOLERANCE_PX,
            activation_key: "shift".to_string(),
            activation_timeout_ms: 300,
            overlap_band_px: 8.0,
            overlap_gap_px: 16.0,
            flash_ms: 400,
            notice_ms: 1500,
            not_found_message: "No match found".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The label alphabet, validated.
    pub fn alphabet(&self) -> anyhow::Result<LabelAlphabet> {
        LabelAlphabet::new(&self.label_alphabet)
    }

    /// The activation key. Unknown names fall back to Shift.
    pub fn activation_key(&self) -> Key {
        Key::parse(&self.activation_key).unwrap_or_else(|| {
            warn!(name = %self.activation_key, "unknown activation key, using shift");
            Key::Shift
        })
    }

    pub fn activation_timeout(&self) -> Duration {
        Duration::from_millis(self.activation_timeout_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = config.to_toml_string().expect("serializable");
        assert!(text.contains("label_alphabet = \"asdfghjklqwe\""));
        assert_eq!(Config::from_toml_str(&text).expect("parses"), config);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("label_alphabet = \"jkl\"\nmax_candidates = 20\n")
            .expect("parses");
        assert_eq!(config.label_alphabet, "jkl");
        assert_eq!(config.max_candidates, 20);
        assert_eq!(config.activation_timeout_ms, 300);
        assert_eq!(config.alphabet().expect("valid").len(), 3);
    }

    #[test]
    fn activation_key_falls_back() {
        let mut config = Config::default();
        assert_eq!(config.activation_key(), Key::Shift);
        config.activation_key = "Control".into();
        assert_eq!(config.activation_key(), Key::Control);
        config.activation_key = "hyper".into();
        assert_eq!(config.activation_key(), Key::Shift);
    }

    #[test]
    fn save_and_load_file() {
        let path = std::env::temp_dir().join(format!("hintjump_config_{}.toml", std::process::id()));
        let mut config = Config::default();
        config.not_found_message = "没有找到".into();
        config.save_toml(&path).expect("write");
        let loaded = Config::load_toml(&path).expect("read");
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
