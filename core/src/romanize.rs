//! Romanization contract and the derived `RomanizedForm`.
//!
//! A romanizer turns source-script text into phonetic syllables. The core
//! only depends on the `Romanizer` trait; language crates provide the
//! readings (see `hintjump-pinyin`).
//!
//! Unit policy used by every romanizer built on `segment_with`: a char
//! with a reading becomes one unit (its syllable), and every other char is
//! skipped. Latin words therefore never take part in romanized matching;
//! direct matching already covers them.
//!
//! Every unit remembers the char range of the source it came from, which is
//! how romanized hits are mapped back onto the original text.

use std::ops::Range;
use std::path::Path;

use ahash::AHashMap;
use anyhow::{bail, Context};
use tracing::warn;

/// One romanized unit and the source chars it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomanSegment {
    pub syllable: String,
    /// Char range in the source text.
    pub source: Range<usize>,
}

impl RomanSegment {
    pub fn new<T: Into<String>>(syllable: T, source: Range<usize>) -> Self {
        Self {
            syllable: syllable.into(),
            source,
        }
    }
}

/// Converts text into phonetic syllables.
///
/// Implementations only provide `try_segments`; the provided methods never
/// fail. Any error is logged and degrades to an empty result so callers
/// always get a well-typed value.
pub trait Romanizer {
    fn try_segments(&self, text: &str) -> anyhow::Result<Vec<RomanSegment>>;

    fn segments(&self, text: &str) -> Vec<RomanSegment> {
        if text.is_empty() {
            return Vec::new();
        }
        match self.try_segments(text) {
            Ok(segments) => segments,
            Err(e) => {
                warn!(error = %e, text_len = text.len(), "romanization failed");
                Vec::new()
            }
        }
    }

    /// Syllables of `text`, in order.
    fn romanize(&self, text: &str) -> Vec<String> {
        self.segments(text).into_iter().map(|s| s.syllable).collect()
    }

    /// First letter of every syllable, lower-cased and concatenated.
    fn initials(&self, text: &str) -> String {
        self.segments(text)
            .iter()
            .filter_map(|s| s.syllable.chars().next())
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Reading of a single char, if it has one.
    fn romanize_char(&self, ch: char) -> Option<String> {
        let mut buf = [0u8; 4];
        self.segments(ch.encode_utf8(&mut buf))
            .into_iter()
            .next()
            .map(|s| s.syllable)
    }

    /// Rewrite a typed query into the spelling the readings use, before it
    /// is split into tokens. The default keeps it as typed.
    fn normalize_query(&self, raw: &str) -> String {
        raw.to_string()
    }
}

impl<R: Romanizer + ?Sized> Romanizer for &R {
    fn try_segments(&self, text: &str) -> anyhow::Result<Vec<RomanSegment>> {
        (**self).try_segments(text)
    }

    fn normalize_query(&self, raw: &str) -> String {
        (**self).normalize_query(raw)
    }
}

/// Split `text` into units following the module's unit policy.
///
/// `reading` returns the syllable for chars that have one.
pub fn segment_with<F>(text: &str, mut reading: F) -> Vec<RomanSegment>
where
    F: FnMut(char) -> Option<String>,
{
    text.chars()
        .enumerate()
        .filter_map(|(i, ch)| {
            reading(ch)
                .filter(|s| !s.is_empty())
                .map(|syllable| RomanSegment::new(syllable.to_lowercase(), i..i + 1))
        })
        .collect()
}

/// Romanized view of one source string.
///
/// Derived on demand and never mutated. `spaced` joins syllables with a
/// single space, `joined` concatenates them, `initials` holds exactly one
/// char per syllable. All three are lower-case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomanizedForm {
    segments: Vec<RomanSegment>,
    spaced: String,
    spaced_starts: Vec<usize>,
    joined: String,
    joined_starts: Vec<usize>,
    initials: String,
}

impl RomanizedForm {
    pub fn new(segments: Vec<RomanSegment>) -> Self {
        let segments: Vec<RomanSegment> = segments
            .into_iter()
            .filter(|s| !s.syllable.is_empty())
            .map(|s| RomanSegment::new(s.syllable.to_lowercase(), s.source))
            .collect();

        let mut form = RomanizedForm {
            segments: Vec::new(),
            spaced: String::new(),
            spaced_starts: Vec::with_capacity(segments.len()),
            joined: String::new(),
            joined_starts: Vec::with_capacity(segments.len()),
            initials: String::new(),
        };
        for (i, seg) in segments.iter().enumerate() {
            if i > 0 {
                form.spaced.push(' ');
            }
            form.spaced_starts.push(form.spaced.len());
            form.spaced.push_str(&seg.syllable);
            form.joined_starts.push(form.joined.len());
            form.joined.push_str(&seg.syllable);
            if let Some(first) = seg.syllable.chars().next() {
                form.initials.push(first);
            }
        }
        form.segments = segments;
        form
    }

    pub fn of<R: Romanizer + ?Sized>(romanizer: &R, text: &str) -> Self {
        Self::new(romanizer.segments(text))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[RomanSegment] {
        &self.segments
    }

    pub fn syllables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.syllable.as_str())
    }

    pub fn spaced(&self) -> &str {
        &self.spaced
    }

    pub fn joined(&self) -> &str {
        &self.joined
    }

    pub fn initials(&self) -> &str {
        &self.initials
    }

    /// Tail of `joined` starting at the given syllable.
    pub fn joined_from(&self, segment: usize) -> &str {
        match self.joined_starts.get(segment) {
            Some(&start) => &self.joined[start..],
            None => "",
        }
    }

    /// Tail of `initials` starting at the given syllable.
    pub fn initials_from(&self, segment: usize) -> &str {
        match self.initials.char_indices().nth(segment) {
            Some((start, _)) => &self.initials[start..],
            None => "",
        }
    }

    /// Source char range covered by a byte range of `spaced`.
    pub fn source_for_spaced(&self, bytes: Range<usize>) -> Option<Range<usize>> {
        self.source_for_bytes(&self.spaced_starts, bytes)
    }

    /// Source char range covered by a byte range of `joined`.
    pub fn source_for_joined(&self, bytes: Range<usize>) -> Option<Range<usize>> {
        self.source_for_bytes(&self.joined_starts, bytes)
    }

    /// Source char range covered by a char range of `initials`.
    pub fn source_for_initials(&self, chars: Range<usize>) -> Option<Range<usize>> {
        if chars.start >= chars.end || chars.end > self.segments.len() {
            return None;
        }
        let first = &self.segments[chars.start];
        let last = &self.segments[chars.end - 1];
        Some(first.source.start..last.source.end)
    }

    fn source_for_bytes(&self, starts: &[usize], bytes: Range<usize>) -> Option<Range<usize>> {
        let mut covered: Option<Range<usize>> = None;
        for (seg, &start) in self.segments.iter().zip(starts) {
            let end = start + seg.syllable.len();
            if start < bytes.end && end > bytes.start {
                covered = Some(match covered {
                    Some(r) => r.start..seg.source.end,
                    None => seg.source.clone(),
                });
            }
        }
        covered
    }
}

/// Romanizer backed by an explicit char → syllable table.
///
/// Hosts that ship their own reading data use this; it is also what the
/// core tests run against.
#[derive(Debug, Clone, Default)]
pub struct TableRomanizer {
    readings: AHashMap<char, String>,
}

impl TableRomanizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (ch, syllable) in entries {
            table.insert(ch, syllable);
        }
        table
    }

    pub fn insert<S: Into<String>>(&mut self, ch: char, syllable: S) {
        self.readings.insert(ch, syllable.into().to_lowercase());
    }

    pub fn get(&self, ch: char) -> Option<&str> {
        self.readings.get(&ch).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Parse `字<TAB>zi` lines. Blank lines and `#` comments are ignored.
    pub fn from_tsv(content: &str) -> anyhow::Result<Self> {
        let mut table = Self::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, syllable)) = line.split_once('\t') else {
                bail!("line {}: expected `<char>\\t<syllable>`", lineno + 1);
            };
            let mut chars = key.trim().chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                bail!("line {}: key must be a single char, got {:?}", lineno + 1, key);
            };
            let syllable = syllable.trim();
            if syllable.is_empty() || !syllable.chars().all(|c| c.is_ascii_alphabetic()) {
                bail!("line {}: invalid syllable {:?}", lineno + 1, syllable);
            }
            table.insert(ch, syllable);
        }
        Ok(table)
    }

    pub fn load_tsv<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read reading table {}", path.display()))?;
        Self::from_tsv(&content).with_context(|| format!("in {}", path.display()))
    }
}

impl Romanizer for TableRomanizer {
    fn try_segments(&self, text: &str) -> anyhow::Result<Vec<RomanSegment>> {
        Ok(segment_with(text, |ch| self.readings.get(&ch).cloned()))
    }
}
