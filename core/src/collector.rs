//! Candidate collection over the visible document.
//!
//! The collector never touches rendering primitives. A host exposes its
//! visible text through `TextSpanProvider`; the collector runs the matcher
//! per unit and per token, measures every occurrence through the provider,
//! then merges candidates that land on the same spot.

use std::fmt;

use tracing::{debug, info};

use crate::candidate::{Candidate, CandidateSpan, Rect, TextSpan};
use crate::matcher::{direct_offsets, MatchStrategy, QueryMatcher};
use crate::romanize::Romanizer;

/// Upper bound on emitted candidates per session.
pub const DEFAULT_MAX_CANDIDATES: usize = 300;

/// Two candidates whose primary rectangles differ by less than this on both
/// axes are the same target.
pub const DEFAULT_DEDUP_TOLERANCE_PX: f64 = 5.0;

/// Source of visible text for one collection pass.
pub trait TextSpanProvider {
    type Handle: Clone + fmt::Debug;

    /// Visible text units in document order, excluded regions already
    /// filtered out.
    fn visible_spans(&self) -> Vec<TextSpan<Self::Handle>>;

    /// Screen rectangles of `len` chars starting at char `start` of a unit.
    fn measure(&self, handle: &Self::Handle, start: usize, len: usize) -> Vec<Rect>;

    /// Viewport test for an already measured rectangle.
    fn is_visible(&self, rect: &Rect) -> bool;
}

/// Runs the matcher over a provider and produces deduplicated candidates.
pub struct CandidateCollector<'m, R> {
    matcher: &'m QueryMatcher<R>,
    max_candidates: usize,
    dedup_tolerance: f64,
}

impl<'m, R: Romanizer> CandidateCollector<'m, R> {
    pub fn new(matcher: &'m QueryMatcher<R>) -> Self {
        Self {
            matcher,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE_PX,
        }
    }

    pub fn max_candidates(mut self, n: usize) -> Self {
        self.max_candidates = n.max(1);
        self
    }

    pub fn dedup_tolerance(mut self, px: f64) -> Self {
        self.dedup_tolerance = px.max(0.0);
        self
    }

    /// Collect candidates for `tokens` in document order.
    pub fn collect<P, S>(&self, provider: &P, tokens: &[S]) -> Vec<Candidate<P::Handle>>
    where
        P: TextSpanProvider + ?Sized,
        S: AsRef<str>,
    {
        self.matcher.clear_cache();
        let mut out: Vec<Candidate<P::Handle>> = Vec::new();

        'units: for unit in provider.visible_spans() {
            if !self.matcher.enhanced_match(&unit.text, tokens) {
                continue;
            }
            for token in tokens.iter().map(AsRef::as_ref).filter(|t| !t.is_empty()) {
                for (start, len, strategy) in self.locate(&unit.text, token) {
                    if out.len() >= self.max_candidates {
                        info!(cap = self.max_candidates, "candidate cap reached, skipping the rest");
                        break 'units;
                    }
                    if let Some(span) = self.build_span(provider, &unit, start, len) {
                        out.push(Candidate::new(span, strategy, token));
                    }
                }
            }
        }

        dedup_candidates(out, self.dedup_tolerance)
    }

    /// Occurrences of one token in one text as `(start, len, strategy)`.
    ///
    /// Direct hits win outright. Romanized and fallback offsets are
    /// positions in the original text.
    fn locate(&self, text: &str, token: &str) -> Vec<(usize, usize, MatchStrategy)> {
        let token_len = token.chars().count();

        let direct = direct_offsets(text, token, false);
        if !direct.is_empty() {
            return direct
                .into_iter()
                .map(|start| (start, token_len, MatchStrategy::Direct))
                .collect();
        }

        let outcome = self.matcher.match_token(text, token);
        if outcome.is_match() && !outcome.hits.is_empty() {
            return outcome
                .hits
                .iter()
                .map(|hit| (hit.start, hit.len, outcome.strategy))
                .collect();
        }

        let strategy = if token_len == 1 {
            MatchStrategy::SingleCharFallback
        } else {
            MatchStrategy::FullRomanized
        };
        let text_len = text.chars().count();
        self.matcher
            .fallback_indices(text, token)
            .into_iter()
            .map(|start| (start, token_len.min(text_len.saturating_sub(start)), strategy))
            .collect()
    }

    fn build_span<P>(
        &self,
        provider: &P,
        unit: &TextSpan<P::Handle>,
        start: usize,
        len: usize,
    ) -> Option<CandidateSpan<P::Handle>>
    where
        P: TextSpanProvider + ?Sized,
    {
        let unit_len = unit.char_len();
        if start >= unit_len {
            debug!(handle = ?unit.handle, start, unit_len, "dropping out-of-range candidate");
            return None;
        }
        let len = len.min(unit_len - start);
        if len == 0 {
            debug!(handle = ?unit.handle, start, "dropping empty candidate");
            return None;
        }

        let rects: Vec<Rect> = provider
            .measure(&unit.handle, start, len)
            .into_iter()
            .filter(|r| provider.is_visible(r))
            .collect();
        if rects.is_empty() {
            debug!(handle = ?unit.handle, start, len, "candidate has no visible geometry");
            return None;
        }

        Some(CandidateSpan {
            handle: unit.handle.clone(),
            start,
            len,
            unit_len,
            rects,
        })
    }
}

/// Merge candidates whose primary rectangles nearly coincide.
///
/// First-seen wins, so the result is deterministic and running it again on
/// its own output changes nothing.
pub fn dedup_candidates<H>(candidates: Vec<Candidate<H>>, tolerance: f64) -> Vec<Candidate<H>> {
    let mut kept: Vec<Candidate<H>> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let Some(rect) = candidate.span.primary_rect() else {
            continue;
        };
        let duplicate = kept.iter().any(|k| {
            k.span.primary_rect().is_some_and(|other| {
                (other.top - rect.top).abs() < tolerance && (other.left - rect.left).abs() < tolerance
            })
        });
        if !duplicate {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::romanize::TableRomanizer;

    const CHAR_W: f64 = 10.0;
    const LINE_H: f64 = 20.0;

    /// One unit per line, fixed-width chars.
    struct Lines {
        lines: Vec<String>,
        viewport: Rect,
    }

    impl Lines {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|s| s.to_string()).collect(),
                viewport: Rect::new(0.0, 0.0, 1000.0, 1000.0),
            }
        }
    }

    impl TextSpanProvider for Lines {
        type Handle = usize;

        fn visible_spans(&self) -> Vec<TextSpan<usize>> {
            self.lines
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let w = text.chars().count() as f64 * CHAR_W;
                    TextSpan::new(text.clone(), vec![Rect::new(0.0, i as f64 * LINE_H, w, LINE_H)], i)
                })
                .collect()
        }

        fn measure(&self, handle: &usize, start: usize, len: usize) -> Vec<Rect> {
            vec![Rect::new(
                start as f64 * CHAR_W,
                *handle as f64 * LINE_H,
                len as f64 * CHAR_W,
                LINE_H,
            )]
        }

        fn is_visible(&self, rect: &Rect) -> bool {
            self.viewport.intersects(rect)
        }
    }

    fn matcher() -> QueryMatcher<TableRomanizer> {
        QueryMatcher::new(TableRomanizer::with_entries([
            ('你', "ni"),
            ('好', "hao"),
            ('世', "shi"),
            ('界', "jie"),
        ]))
    }

    #[test]
    fn direct_occurrences_in_document_order() {
        let m = matcher();
        let provider = Lines::new(&["the cat", "bathe the dog"]);
        let found = CandidateCollector::new(&m).collect(&provider, &["the"]);
        let spans: Vec<(usize, usize)> = found.iter().map(|c| (c.span.handle, c.span.start)).collect();
        assert_eq!(spans, vec![(0, 0), (1, 2), (1, 6)]);
        assert!(found.iter().all(|c| c.strategy == MatchStrategy::Direct));
    }

    #[test]
    fn romanized_match_maps_to_source() {
        let m = matcher();
        let provider = Lines::new(&["hello world", "你好世界"]);
        let found = CandidateCollector::new(&m).collect(&provider, &["nihao"]);
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!((c.span.handle, c.span.start, c.span.len), (1, 0, 2));
        assert_eq!(c.strategy, MatchStrategy::FullRomanized);
    }

    #[test]
    fn latin_lines_only_match_directly() {
        let m = matcher();
        let provider = Lines::new(&["hello world", "the quick fox"]);
        assert!(CandidateCollector::new(&m).collect(&provider, &["tqf"]).is_empty());
        assert!(CandidateCollector::new(&m).collect(&provider, &["lowo"]).is_empty());

        let found = CandidateCollector::new(&m).collect(&provider, &["quick"]);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].span.handle, found[0].span.start), (1, 4));
    }

    #[test]
    fn full_width_text_is_found_by_ascii_query() {
        let m = matcher();
        let provider = Lines::new(&["ｔｈｅ cat"]);
        let found = CandidateCollector::new(&m).collect(&provider, &["the"]);
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].span.start, found[0].span.len), (0, 3));
        assert_eq!(found[0].strategy, MatchStrategy::Direct);
    }

    #[test]
    fn direct_match_suppresses_romanized_for_same_token() {
        let m = matcher();
        let provider = Lines::new(&["ni 你"]);
        let found = CandidateCollector::new(&m).collect(&provider, &["ni"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span.start, 0);
        assert_eq!(found[0].strategy, MatchStrategy::Direct);
    }

    #[test]
    fn tokens_are_or_ed() {
        let m = matcher();
        let provider = Lines::new(&["alpha", "你好", "beta"]);
        let found = CandidateCollector::new(&m).collect(&provider, &["beta", "nh"]);
        let units: Vec<usize> = found.iter().map(|c| c.span.handle).collect();
        assert_eq!(units, vec![1, 2]);
    }

    #[test]
    fn cap_bounds_output() {
        let m = matcher();
        let line = "a ".repeat(50);
        let lines: Vec<&str> = std::iter::repeat(line.as_str()).take(10).collect();
        let provider = Lines::new(&lines);
        let found = CandidateCollector::new(&m).max_candidates(30).collect(&provider, &["a"]);
        assert_eq!(found.len(), 30);
    }

    #[test]
    fn invisible_candidates_are_dropped() {
        let m = matcher();
        let mut provider = Lines::new(&["x", "x", "x"]);
        provider.viewport = Rect::new(0.0, 0.0, 1000.0, 30.0);
        let found = CandidateCollector::new(&m).collect(&provider, &["x"]);
        assert_eq!(found.len(), 2, "third line starts at y=40");
    }

    #[test]
    fn dedup_merges_coincident_and_is_idempotent() {
        let m = matcher();
        let provider = Lines::new(&["ab", "ab"]);
        let found = CandidateCollector::new(&m).collect(&provider, &["a", "ab"]);
        // "a" and "ab" start at the same spot on each line
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].token, "a");

        let again = dedup_candidates(found.clone(), DEFAULT_DEDUP_TOLERANCE_PX);
        assert_eq!(again, found);
    }
}
