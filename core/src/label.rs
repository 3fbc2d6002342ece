//! Hint labels and marker layout.
//!
//! Labels are handed out in collector order: the first `k` candidates get
//! one symbol each, the next `k * k` get ordered symbol pairs. Anything
//! beyond that gets no label and is dropped.

use anyhow::bail;
use serde::Serialize;
use tracing::debug;

use crate::candidate::{Candidate, CandidateSpan, Point};
use crate::matcher::MatchStrategy;

pub const DEFAULT_LABEL_ALPHABET: &str = "asdfghjklqwe";

/// The symbols labels are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAlphabet {
    symbols: Vec<char>,
}

impl LabelAlphabet {
    /// Build an alphabet; symbols must be unique and there must be at least one.
    ///
    /// Symbols are stored lower-cased, since typed label keys are lower-cased
    /// before lookup. `"aA"` is therefore a repeat.
    pub fn new(symbols: &str) -> anyhow::Result<Self> {
        let mut folded: Vec<char> = Vec::new();
        for raw in symbols.chars() {
            if raw.is_whitespace() {
                bail!("label alphabet must not contain whitespace");
            }
            let mut lower = raw.to_lowercase();
            let (Some(ch), None) = (lower.next(), lower.next()) else {
                bail!("label symbol {:?} has no single-char lower case", raw);
            };
            if folded.contains(&ch) {
                bail!("label alphabet repeats {:?}", ch);
            }
            folded.push(ch);
        }
        if folded.is_empty() {
            bail!("label alphabet must not be empty");
        }
        Ok(Self { symbols: folded })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.symbols.contains(&ch)
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Number of labels this alphabet can produce.
    pub fn capacity(&self) -> usize {
        let k = self.symbols.len();
        k + k * k
    }

    /// Label for the candidate at position `index`, if there is one.
    ///
    /// With more than `k` candidates every pair label starts with a symbol
    /// that is also a single-symbol label. Typing that symbol jumps at once,
    /// so pair labels cannot be reached by typing.
    pub fn label(&self, index: usize) -> Option<String> {
        let k = self.symbols.len();
        if index < k {
            return Some(self.symbols[index].to_string());
        }
        let i = index - k;
        if i >= k * k {
            return None;
        }
        Some([self.symbols[i / k], self.symbols[i % k]].iter().collect())
    }
}

impl Default for LabelAlphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_LABEL_ALPHABET.chars().collect(),
        }
    }
}

/// A live label → span pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HintEntry<H> {
    pub label: String,
    pub span: CandidateSpan<H>,
    pub strategy: MatchStrategy,
    /// Where the marker would sit before layout adjustment.
    pub anchor: Point,
}

impl<H> HintEntry<H> {
    /// True while `typed` can still lead to this hint.
    pub fn is_possible(&self, typed: &str) -> bool {
        self.label.starts_with(typed)
    }
}

/// Pair every candidate with a label, in the given order.
pub fn assign_labels<H>(candidates: Vec<Candidate<H>>, alphabet: &LabelAlphabet) -> Vec<HintEntry<H>> {
    let total = candidates.len();
    let mut hints = Vec::with_capacity(total.min(alphabet.capacity()));
    for (index, candidate) in candidates.into_iter().enumerate() {
        let Some(label) = alphabet.label(index) else {
            debug!(total, capacity = alphabet.capacity(), "label space exhausted");
            break;
        };
        let anchor = candidate
            .span
            .primary_rect()
            .map(|r| r.origin())
            .unwrap_or_default();
        hints.push(HintEntry {
            label,
            span: candidate.span,
            strategy: candidate.strategy,
            anchor,
        });
    }
    hints
}

/// Marker positions with visual collisions pushed apart.
///
/// A marker that sits within `band` vertically and `gap` horizontally of an
/// earlier one moves right by `gap` until it is clear. Only positions
/// change; the label → span pairing does not.
pub fn layout_markers<H>(hints: &[HintEntry<H>], band: f64, gap: f64) -> Vec<Point> {
    let mut placed: Vec<Point> = Vec::with_capacity(hints.len());
    for hint in hints {
        let mut pos = hint.anchor;
        if gap > 0.0 {
            // each shift clears at least one earlier marker
            for _ in 0..=placed.len() {
                let blocker = placed
                    .iter()
                    .find(|p| (p.y - pos.y).abs() < band && (p.x - pos.x).abs() < gap);
                match blocker {
                    Some(p) => pos.x = p.x + gap,
                    None => break,
                }
            }
        }
        placed.push(pos);
    }
    placed
}
