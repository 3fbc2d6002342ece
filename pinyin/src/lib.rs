//! hintjump-pinyin crate root
//!
//! Mandarin support for `hintjump-core`: a `Romanizer` that reads Han text
//! as tone-less pinyin, tone-mark folding for typed queries, the
//! `PinyinConfig` extension of the core config, and a fixed-grid host used
//! by the `hintjump` CLI.
//!
//! Public API exported here:
//! - `PinyinRomanizer` from `romanizer`
//! - `normalize_query` from `normalize`
//! - `PinyinConfig` from `config`
//! - `GridHost` from `grid`

pub mod config;
pub mod grid;
pub mod normalize;
pub mod romanizer;

// Re-export the engine types callers need alongside the romanizer.
pub use hintjump_core::{
    Config, EventResult, HintEntry, Host, InputEvent, JumpEngine, Key, KeyInput, MatchStrategy, OverlayContext,
    Romanizer, SessionState,
};

pub use config::PinyinConfig;
pub use grid::GridHost;
pub use normalize::normalize_query;
pub use romanizer::PinyinRomanizer;

/// Installed engine with pinyin readings over `host`, built from `config`.
pub fn pinyin_engine<H: Host>(host: H, config: PinyinConfig) -> anyhow::Result<JumpEngine<PinyinRomanizer, H>> {
    let romanizer = PinyinRomanizer::from_config(&config)?;
    let mut engine = JumpEngine::new(romanizer, host, config.into_base())?;
    engine.init();
    Ok(engine)
}
