//! Overlay snapshot for the renderer.
//!
//! `OverlayContext` is a plain data container. After every event that
//! changes what is on screen the engine refreshes it and hands it to
//! `Host::render`; the renderer just reads fields.

use serde::Serialize;

use crate::candidate::{CandidateSpan, Point};
use crate::matcher::MatchStrategy;

/// One hint as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HintView<H> {
    pub label: String,
    pub span: CandidateSpan<H>,
    pub strategy: MatchStrategy,
    /// Marker position after layout.
    pub marker: Point,
    /// The typed prefix can still reach this hint (emphasized).
    pub possible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayContext<H> {
    /// Query prompt is showing.
    pub prompt_open: bool,
    /// Text the prompt starts with (the prior selection).
    pub prompt_prefill: String,
    /// Label prefix typed so far.
    pub buffer: String,
    pub hints: Vec<HintView<H>>,
}

impl<H> Default for OverlayContext<H> {
    fn default() -> Self {
        Self {
            prompt_open: false,
            prompt_prefill: String::new(),
            buffer: String::new(),
            hints: Vec::new(),
        }
    }
}

impl<H> OverlayContext<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.prompt_open = false;
        self.prompt_prefill.clear();
        self.buffer.clear();
        self.hints.clear();
    }

    /// Anything to draw at all.
    pub fn is_visible(&self) -> bool {
        self.prompt_open || !self.hints.is_empty()
    }

    pub fn possible_hints(&self) -> impl Iterator<Item = &HintView<H>> {
        self.hints.iter().filter(|h| h.possible)
    }

    pub fn hint(&self, label: &str) -> Option<&HintView<H>> {
        self.hints.iter().find(|h| h.label == label)
    }
}

impl<H: Serialize> OverlayContext<H> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
