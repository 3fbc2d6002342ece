//! Query matching across scripts.
//!
//! `QueryMatcher::match_token` tries an ordered list of strategies and the
//! first one that finds anything wins:
//!
//! 1. direct substring (exact case first, then case-insensitive)
//! 2. full romanized form, syllables joined by spaces
//! 3. full romanized form, syllables concatenated
//! 4. syllable initials
//! 5. partial: each whitespace-separated piece of the token against 2 and 4
//!
//! Two fallbacks cover queries that are a single romanized unit, and
//! `enhanced_match` combines everything into the predicate the collector
//! uses to decide whether a text unit deserves an offset scan.
//!
//! All offsets are char offsets. Romanized hits are mapped back onto the
//! source through `RomanizedForm`.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use ahash::AHashMap;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::romanize::{RomanizedForm, Romanizer};

/// How a token matched a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    Direct,
    FullRomanized,
    Initials,
    PartialRomanized,
    PartialInitials,
    SingleCharFallback,
    None,
}

/// A matched region of the source text, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub start: usize,
    pub len: usize,
}

impl Hit {
    fn from_range(range: Range<usize>) -> Self {
        Hit {
            start: range.start,
            len: range.end - range.start,
        }
    }
}

/// Result of matching one token against one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub strategy: MatchStrategy,
    /// Char offsets of every occurrence inside `compared`.
    pub indices: Vec<usize>,
    /// The string the token was compared against: the original text or one
    /// of its romanized forms.
    pub compared: String,
    /// Occurrences mapped onto the original text.
    pub hits: Vec<Hit>,
}

impl MatchOutcome {
    pub fn none() -> Self {
        MatchOutcome {
            strategy: MatchStrategy::None,
            indices: Vec::new(),
            compared: String::new(),
            hits: Vec::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.strategy != MatchStrategy::None && !self.indices.is_empty()
    }
}

/// Split raw user input into query tokens.
///
/// The input is NFKC-normalized first so full-width Latin folds to ASCII.
/// Duplicate tokens are dropped, order is kept.
pub fn query_tokens(raw: &str) -> Vec<String> {
    let normalized: String = raw.nfkc().collect();
    let mut tokens: Vec<String> = Vec::new();
    for piece in normalized.split_whitespace() {
        if !tokens.iter().any(|t| t == piece) {
            tokens.push(piece.to_string());
        }
    }
    tokens
}

/// Case-insensitive substring test over chars.
pub fn contains_ignore_case(text: &str, token: &str) -> bool {
    if text.is_empty() || token.is_empty() {
        return false;
    }
    let text = folded_chars(text);
    let token = folded_chars(token);
    !find_chars(&text, &token, chars_eq_ignore_case).is_empty()
}

/// All non-overlapping occurrences of `token` in `text`, as char offsets.
///
/// Both sides are compared after a per-char NFKC fold, so `ｔｈｅ` in the
/// text matches `the`. Offsets still count chars of the original text.
pub fn direct_offsets(text: &str, token: &str, case_sensitive: bool) -> Vec<usize> {
    if text.is_empty() || token.is_empty() {
        return Vec::new();
    }
    let text = folded_chars(text);
    let token = folded_chars(token);
    if case_sensitive {
        find_chars(&text, &token, |a, b| a == b)
    } else {
        find_chars(&text, &token, chars_eq_ignore_case)
    }
}

/// Chars of `text`, each replaced by its NFKC form when that is a single
/// char. One char in, one char out.
fn folded_chars(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

fn fold_char(ch: char) -> char {
    if ch.is_ascii() {
        return ch;
    }
    let mut folded = std::iter::once(ch).nfkc();
    match (folded.next(), folded.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn find_chars(text: &[char], token: &[char], eq: impl Fn(char, char) -> bool) -> Vec<usize> {
    let mut out = Vec::new();
    if token.is_empty() || token.len() > text.len() {
        return out;
    }
    let mut i = 0;
    while i + token.len() <= text.len() {
        if text[i..i + token.len()]
            .iter()
            .zip(token)
            .all(|(&a, &b)| eq(a, b))
        {
            out.push(i);
            i += token.len();
        } else {
            i += 1;
        }
    }
    out
}

/// Byte offsets of non-overlapping occurrences of `needle` in `hay`.
fn find_bytes(hay: &str, needle: &str) -> Vec<usize> {
    let mut out = Vec::new();
    if needle.is_empty() {
        return out;
    }
    let mut from = 0;
    while let Some(pos) = hay[from..].find(needle) {
        out.push(from + pos);
        from += pos + needle.len();
    }
    out
}

/// Matches query tokens against text, caching romanized forms for the
/// lifetime of one collection pass.
pub struct QueryMatcher<R> {
    romanizer: R,
    forms: RefCell<AHashMap<String, Rc<RomanizedForm>>>,
}

impl<R: Romanizer> QueryMatcher<R> {
    pub fn new(romanizer: R) -> Self {
        Self {
            romanizer,
            forms: RefCell::new(AHashMap::new()),
        }
    }

    pub fn romanizer(&self) -> &R {
        &self.romanizer
    }

    /// Drop cached forms. Called at the start of every collection pass.
    pub fn clear_cache(&self) {
        self.forms.borrow_mut().clear();
    }

    /// Romanized form of `text`, computed once per pass.
    pub fn form(&self, text: &str) -> Rc<RomanizedForm> {
        if let Some(form) = self.forms.borrow().get(text) {
            return Rc::clone(form);
        }
        let form = Rc::new(RomanizedForm::of(&self.romanizer, text));
        self.forms
            .borrow_mut()
            .insert(text.to_string(), Rc::clone(&form));
        form
    }

    /// Match one token against one text; first successful strategy wins.
    pub fn match_token(&self, text: &str, token: &str) -> MatchOutcome {
        if text.is_empty() || token.trim().is_empty() {
            return MatchOutcome::none();
        }

        let token_len = token.chars().count();
        for case_sensitive in [true, false] {
            let offsets = direct_offsets(text, token, case_sensitive);
            if !offsets.is_empty() {
                let hits = offsets
                    .iter()
                    .map(|&start| Hit {
                        start,
                        len: token_len,
                    })
                    .collect();
                return MatchOutcome {
                    strategy: MatchStrategy::Direct,
                    indices: offsets,
                    compared: text.to_string(),
                    hits,
                };
            }
        }

        let form = self.form(text);
        if form.is_empty() {
            return MatchOutcome::none();
        }
        let needle = token.to_lowercase();

        if let Some(outcome) = spaced_match(&form, &needle, MatchStrategy::FullRomanized) {
            return outcome;
        }
        if let Some(outcome) = joined_match(&form, &needle) {
            return outcome;
        }
        if let Some(outcome) = initials_match(&form, &needle, MatchStrategy::Initials) {
            return outcome;
        }
        for piece in needle.split_whitespace() {
            if let Some(outcome) = spaced_match(&form, piece, MatchStrategy::PartialRomanized) {
                return outcome;
            }
            if let Some(outcome) = initials_match(&form, piece, MatchStrategy::PartialInitials) {
                return outcome;
            }
        }
        MatchOutcome::none()
    }

    /// Source char offsets whose reading starts with the one-char query.
    /// ASCII letters and digits are skipped; direct matching covers them.
    pub fn single_char_indices(&self, text: &str, token: &str) -> Vec<usize> {
        let mut chars = token.trim().chars();
        let (Some(query), None) = (chars.next(), chars.next()) else {
            return Vec::new();
        };
        let query: Vec<char> = query.to_lowercase().collect();
        let source: Vec<char> = text.chars().collect();

        let form = self.form(text);
        form.segments()
            .iter()
            .filter(|seg| {
                !source
                    .get(seg.source.clone())
                    .is_some_and(|run| run.iter().all(char::is_ascii_alphanumeric))
            })
            .filter(|seg| {
                seg.syllable
                    .chars()
                    .next()
                    .is_some_and(|first| first.to_lowercase().eq(query.iter().copied()))
            })
            .map(|seg| seg.source.start)
            .collect()
    }

    /// True when some script char of `text` romanizes to an initial equal
    /// to the one-char `token`.
    pub fn single_char_fallback(&self, text: &str, token: &str) -> bool {
        !self.single_char_indices(text, token).is_empty()
    }

    /// Looser romanized test for tokens of two or more chars.
    pub fn full_romanized_fallback(&self, text: &str, token: &str) -> bool {
        let needle = token.trim().to_lowercase();
        if text.is_empty() || needle.chars().count() < 2 {
            return false;
        }
        let form = self.form(text);
        if form.is_empty() {
            return false;
        }
        let compact: String = needle.split_whitespace().collect();
        form.spaced().contains(&needle)
            || form.joined().contains(&needle)
            || form.initials().contains(&needle)
            || form.syllables().any(|s| s.starts_with(&needle))
            || (!compact.is_empty() && form.joined().contains(&compact))
    }

    /// Superset scan used when no strategy produced offsets: one index per
    /// source char whose romanization could start the token.
    pub fn fallback_indices(&self, text: &str, token: &str) -> Vec<usize> {
        let needle = token.trim().to_lowercase();
        match needle.chars().count() {
            0 => Vec::new(),
            1 => self.single_char_indices(text, &needle),
            _ => {
                let form = self.form(text);
                let compact: String = needle.split_whitespace().collect();
                let mut out: Vec<usize> = Vec::new();
                for (k, seg) in form.segments().iter().enumerate() {
                    let starts_here = form.joined_from(k).starts_with(&compact)
                        || form.initials_from(k).starts_with(&needle)
                        || seg.syllable.starts_with(&needle);
                    if starts_here && out.last() != Some(&seg.source.start) {
                        out.push(seg.source.start);
                    }
                }
                out
            }
        }
    }

    /// Does any token plausibly occur in `text`?
    pub fn enhanced_match<S: AsRef<str>>(&self, text: &str, tokens: &[S]) -> bool {
        if text.is_empty() {
            return false;
        }
        tokens.iter().map(AsRef::as_ref).any(|token| {
            !token.is_empty()
                && (contains_ignore_case(text, token)
                    || self.match_token(text, token).is_match()
                    || self.single_char_fallback(text, token)
                    || self.full_romanized_fallback(text, token))
        })
    }
}

fn spaced_match(form: &RomanizedForm, needle: &str, strategy: MatchStrategy) -> Option<MatchOutcome> {
    byte_match(form.spaced(), needle, strategy, |r| form.source_for_spaced(r))
}

fn joined_match(form: &RomanizedForm, needle: &str) -> Option<MatchOutcome> {
    byte_match(form.joined(), needle, MatchStrategy::FullRomanized, |r| {
        form.source_for_joined(r)
    })
}

fn byte_match(
    hay: &str,
    needle: &str,
    strategy: MatchStrategy,
    to_source: impl Fn(Range<usize>) -> Option<Range<usize>>,
) -> Option<MatchOutcome> {
    let offsets = find_bytes(hay, needle);
    if offsets.is_empty() {
        return None;
    }
    let indices = offsets.iter().map(|&b| hay[..b].chars().count()).collect();
    let hits = offsets
        .iter()
        .filter_map(|&b| to_source(b..b + needle.len()))
        .map(Hit::from_range)
        .collect();
    Some(MatchOutcome {
        strategy,
        indices,
        compared: hay.to_string(),
        hits,
    })
}

fn initials_match(form: &RomanizedForm, needle: &str, strategy: MatchStrategy) -> Option<MatchOutcome> {
    let initials: Vec<char> = form.initials().chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    let indices = find_chars(&initials, &needle, |a, b| a == b);
    if indices.is_empty() {
        return None;
    }
    let hits = indices
        .iter()
        .filter_map(|&i| form.source_for_initials(i..i + needle.len()))
        .map(Hit::from_range)
        .collect();
    Some(MatchOutcome {
        strategy,
        indices,
        compared: form.initials().to_string(),
        hits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::romanize::TableRomanizer;

    fn matcher() -> QueryMatcher<TableRomanizer> {
        QueryMatcher::new(TableRomanizer::with_entries([
            ('你', "ni"),
            ('好', "hao"),
            ('世', "shi"),
            ('界', "jie"),
            ('中', "zhong"),
            ('文', "wen"),
        ]))
    }

    #[test]
    fn direct_prefers_exact_case() {
        let m = matcher();
        let out = m.match_token("The theme", "the");
        assert_eq!(out.strategy, MatchStrategy::Direct);
        assert_eq!(out.indices, vec![4], "exact-case occurrence wins");

        let out = m.match_token("THE end", "the");
        assert_eq!(out.strategy, MatchStrategy::Direct);
        assert_eq!(out.hits, vec![Hit { start: 0, len: 3 }]);
    }

    #[test]
    fn full_width_text_matches_directly() {
        let m = matcher();
        let out = m.match_token("ｔｈｅ cat", "the");
        assert_eq!(out.strategy, MatchStrategy::Direct);
        assert_eq!(out.hits, vec![Hit { start: 0, len: 3 }]);
        assert_eq!(direct_offsets("ＡＢ ab", "ab", false), vec![0, 3]);
        assert!(contains_ignore_case("ｈｅｌｌｏ", "HELL"));
        // ligatures fold to several chars and are left alone
        assert!(direct_offsets("ﬁne", "fi", false).is_empty());
    }

    #[test]
    fn latin_text_has_no_romanized_form() {
        let m = matcher();
        assert!(m.form("the quick fox").is_empty());
        assert!(!m.match_token("the quick fox", "tqf").is_match());
        assert!(!m.match_token("hello world", "lowo").is_match());
        assert!(!m.enhanced_match("hello world", &["lowo", "hw"]));
        assert!(m.fallback_indices("the quick fox", "tq").is_empty());

        let out = m.match_token("用 中文 write", "zw");
        assert_eq!(out.strategy, MatchStrategy::Initials);
        assert_eq!(out.hits, vec![Hit { start: 2, len: 2 }]);
    }

    #[test]
    fn direct_records_every_occurrence() {
        let out = matcher().match_token("ab ab ab", "ab");
        assert_eq!(out.indices, vec![0, 3, 6]);
        assert_eq!(out.compared, "ab ab ab");
    }

    #[test]
    fn empty_inputs_never_match() {
        let m = matcher();
        assert!(!m.match_token("", "a").is_match());
        assert!(!m.match_token("abc", "").is_match());
        assert!(!m.match_token("abc", "   ").is_match());
        assert!(!m.enhanced_match("", &["a"]));
        assert!(!m.enhanced_match("abc", &[""]));
    }

    #[test]
    fn full_romanized_spaced_and_joined() {
        let m = matcher();
        let out = m.match_token("你好世界", "ni hao");
        assert_eq!(out.strategy, MatchStrategy::FullRomanized);
        assert_eq!(out.compared, "ni hao shi jie");
        assert_eq!(out.hits, vec![Hit { start: 0, len: 2 }]);

        let out = m.match_token("说：你好世界", "NiHao");
        assert_eq!(out.strategy, MatchStrategy::FullRomanized);
        assert_eq!(out.compared, "nihaoshijie");
        assert_eq!(out.hits, vec![Hit { start: 2, len: 2 }]);
    }

    #[test]
    fn initials_match_script_chars() {
        let out = matcher().match_token("你好世界", "sj");
        assert_eq!(out.strategy, MatchStrategy::Initials);
        assert_eq!(out.indices, vec![2]);
        assert_eq!(out.hits, vec![Hit { start: 2, len: 2 }]);
    }

    #[test]
    fn single_initial_matches_without_literal_letter() {
        let m = matcher();
        let out = m.match_token("中文", "w");
        assert!(out.is_match());
        assert_eq!(out.hits, vec![Hit { start: 1, len: 1 }]);
        assert!(m.single_char_fallback("中文", "z"));
        assert_eq!(m.single_char_indices("z中文z", "z"), vec![1]);
    }

    #[test]
    fn partial_pieces() {
        let m = matcher();
        let out = m.match_token("世界", "hello shi");
        assert_eq!(out.strategy, MatchStrategy::PartialRomanized);
        assert_eq!(out.hits, vec![Hit { start: 0, len: 1 }]);

        let out = m.match_token("世界", "xyz sj");
        assert_eq!(out.strategy, MatchStrategy::PartialInitials);
    }

    #[test]
    fn fallbacks() {
        let m = matcher();
        assert!(m.full_romanized_fallback("中文", "zho"), "syllable prefix");
        assert!(m.full_romanized_fallback("你好", "ni hao"));
        assert!(!m.full_romanized_fallback("你好", "n"), "needs two chars");
        assert_eq!(m.fallback_indices("你好中文", "haozh"), vec![1]);
        assert_eq!(m.fallback_indices("你好中文", "zw"), vec![2]);
        assert!(m.fallback_indices("你好", "xx").is_empty());
    }

    #[test]
    fn enhanced_match_is_an_or_over_tokens() {
        let m = matcher();
        assert!(m.enhanced_match("你好世界", &["nothing", "nh"]));
        assert!(m.enhanced_match("Hello", &["hell"]));
        assert!(!m.enhanced_match("你好世界", &["zzz", "q"]));
    }

    #[test]
    fn tokens_are_normalized_and_deduplicated() {
        assert_eq!(query_tokens("  ｔｈｅ  the nihao "), vec!["the", "nihao"]);
        assert!(query_tokens("   ").is_empty());
    }

    #[test]
    fn forms_are_cached_per_pass() {
        let m = matcher();
        let a = m.form("你好");
        let b = m.form("你好");
        assert!(Rc::ptr_eq(&a, &b));
        m.clear_cache();
        assert!(!Rc::ptr_eq(&a, &m.form("你好")));
    }
}
