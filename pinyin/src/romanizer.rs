//! Mandarin readings for the jump engine.
//!
//! `PinyinRomanizer` reads every Han character with its most common
//! tone-less pinyin syllable, taken from the `pinyin` crate's dictionary.
//! An optional override table wins over the built-in reading.

use hintjump_core::romanize::segment_with;
use hintjump_core::{RomanSegment, Romanizer, TableRomanizer};
use pinyin::ToPinyin;
use tracing::debug;

use crate::config::PinyinConfig;
use crate::normalize::{normalize_query, spell_umlaut};

#[derive(Debug, Clone)]
pub struct PinyinRomanizer {
    umlaut_as_v: bool,
    overrides: TableRomanizer,
}

impl Default for PinyinRomanizer {
    fn default() -> Self {
        Self {
            umlaut_as_v: true,
            overrides: TableRomanizer::new(),
        }
    }
}

impl PinyinRomanizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from config, loading `extra_readings` when set.
    pub fn from_config(config: &PinyinConfig) -> anyhow::Result<Self> {
        let mut romanizer = Self::new().umlaut_as_v(config.umlaut_as_v);
        if let Some(path) = &config.extra_readings {
            let table = TableRomanizer::load_tsv(path)?;
            debug!(path = %path.display(), entries = table.len(), "loaded reading overrides");
            romanizer = romanizer.with_overrides(table);
        }
        Ok(romanizer)
    }

    pub fn umlaut_as_v(mut self, enabled: bool) -> Self {
        self.umlaut_as_v = enabled;
        self
    }

    pub fn with_overrides(mut self, table: TableRomanizer) -> Self {
        self.overrides = table;
        self
    }

    /// Tone-less reading of `ch`, or `None` for chars without one.
    pub fn reading(&self, ch: char) -> Option<String> {
        if let Some(syllable) = self.overrides.get(ch) {
            return Some(self.spell(syllable));
        }
        ch.to_pinyin().map(|p| self.spell(p.plain()))
    }

    fn spell(&self, syllable: &str) -> String {
        let spelled = spell_umlaut(syllable, self.umlaut_as_v);
        if self.umlaut_as_v {
            spelled
        } else {
            // some dictionaries already write ü as v
            spelled.replace('v', "u")
        }
    }
}

impl Romanizer for PinyinRomanizer {
    fn try_segments(&self, text: &str) -> anyhow::Result<Vec<RomanSegment>> {
        Ok(segment_with(text, |ch| self.reading(ch)))
    }

    /// Tone marks folded away and ü spelled the way readings spell it.
    fn normalize_query(&self, raw: &str) -> String {
        normalize_query(raw, self.umlaut_as_v)
    }
}
