//! Located text types shared by the collector, labeller and session.
//!
//! This module provides:
//! - `Rect` / `Point`: screen geometry supplied by the host
//! - `TextSpan`: one visible text unit as handed over by a provider
//! - `CandidateSpan`: a located occurrence inside a text unit
//! - `Candidate`: a span paired with the strategy that produced it

use serde::{Deserialize, Serialize};

use crate::matcher::MatchStrategy;

/// Axis-aligned rectangle in host pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Top-left corner, where a hint marker is anchored.
    pub fn origin(&self) -> Point {
        Point {
            x: self.left,
            y: self.top,
        }
    }

    /// True when both rectangles overlap by a non-zero area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// Marker anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One visible text unit: raw text, where it renders, and an opaque handle
/// the host uses to address it later.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan<H> {
    pub text: String,
    pub rects: Vec<Rect>,
    pub handle: H,
}

impl<H> TextSpan<H> {
    pub fn new<T: Into<String>>(text: T, rects: Vec<Rect>, handle: H) -> Self {
        Self {
            text: text.into(),
            rects,
            handle,
        }
    }

    /// Length of the text in chars.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A located occurrence: `len` chars starting at char offset `start` of the
/// text unit addressed by `handle`.
///
/// Spans are immutable once produced and only live as long as the session
/// that collected them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSpan<H> {
    pub handle: H,
    pub start: usize,
    pub len: usize,
    /// Length of the owning text unit, in chars.
    pub unit_len: usize,
    pub rects: Vec<Rect>,
}

impl<H> CandidateSpan<H> {
    /// The rectangle used for deduplication and marker placement.
    pub fn primary_rect(&self) -> Option<&Rect> {
        self.rects.first()
    }

    /// Char offset immediately after the matched region.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// True when the match runs up to the end of its text unit.
    pub fn touches_unit_end(&self) -> bool {
        self.end() >= self.unit_len
    }
}

/// A collected candidate: the span plus how it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate<H> {
    pub span: CandidateSpan<H>,
    pub strategy: MatchStrategy,
    /// The query token that produced this candidate.
    pub token: String,
}

impl<H> Candidate<H> {
    pub fn new(span: CandidateSpan<H>, strategy: MatchStrategy, token: impl Into<String>) -> Self {
        Candidate {
            span,
            strategy,
            token: token.into(),
        }
    }
}
