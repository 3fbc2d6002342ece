//! Typed label prefix.
//!
//! While hints are shown the user types label symbols one at a time. The
//! buffer only ever grows or shrinks by one char at its end.

/// Label keystrokes typed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    /// Create a new empty input buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the typed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of chars typed.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn push(&mut self, ch: char) {
        self.text.push(ch);
    }

    /// Remove the last char. Returns it, or `None` when already empty.
    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    /// What the buffer would read after typing `ch`, without changing it.
    pub fn with_char(&self, ch: char) -> String {
        let mut next = String::with_capacity(self.text.len() + ch.len_utf8());
        next.push_str(&self.text);
        next.push(ch);
        next
    }
}
