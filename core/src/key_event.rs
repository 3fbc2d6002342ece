//! Input events the jump engine consumes.
//!
//! Hosts translate platform events into these; the engine never sees raw
//! platform key codes.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Logical key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Backspace,
    Escape,
    Enter,
    Tab,
    Shift,
    Control,
    Alt,
    Meta,
}

static NAMED_KEYS: phf::Map<&'static str, Key> = phf_map! {
    "shift" => Key::Shift,
    "control" => Key::Control,
    "ctrl" => Key::Control,
    "alt" => Key::Alt,
    "option" => Key::Alt,
    "meta" => Key::Meta,
    "cmd" => Key::Meta,
    "escape" => Key::Escape,
    "esc" => Key::Escape,
    "backspace" => Key::Backspace,
    "enter" => Key::Enter,
    "return" => Key::Enter,
    "tab" => Key::Tab,
    "space" => Key::Char(' '),
};

impl Key {
    /// Parse a key name (`"shift"`, `"Escape"`) or a single character.
    pub fn parse(name: &str) -> Option<Key> {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Some(Key::Char(ch));
        }
        NAMED_KEYS.get(name.trim().to_ascii_lowercase().as_str()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key name {:?}", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::parse(s).ok_or_else(|| UnknownKey(s.to_string()))
    }
}

/// A key-down event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    /// Auto-repeat from a held key.
    pub repeat: bool,
    /// Monotonic time of the event.
    pub timestamp: Duration,
}

impl KeyInput {
    pub fn new(key: Key, timestamp: Duration) -> Self {
        Self {
            key,
            repeat: false,
            timestamp,
        }
    }

    pub fn at_ms(key: Key, ms: u64) -> Self {
        Self::new(key, Duration::from_millis(ms))
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// Everything the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyInput),
    /// The query prompt was submitted with this raw text.
    SubmitQuery(String),
    PointerDown {
        inside_prompt: bool,
    },
    Scroll,
    Wheel,
}

/// Whether the engine consumed an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Consumed; the host should stop propagation.
    Handled,
    /// Let the event through to the application.
    NotHandled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_and_chars() {
        assert_eq!(Key::parse("Shift"), Some(Key::Shift));
        assert_eq!(Key::parse("ESC"), Some(Key::Escape));
        assert_eq!(Key::parse("space"), Some(Key::Char(' ')));
        assert_eq!(Key::parse("a"), Some(Key::Char('a')));
        assert_eq!(Key::parse("hyper"), None);
        assert!("hyper".parse::<Key>().is_err());
        assert_eq!("ctrl".parse::<Key>(), Ok(Key::Control));
    }

    #[test]
    fn key_input_builders() {
        let k = KeyInput::at_ms(Key::Shift, 120).repeated();
        assert!(k.repeat);
        assert_eq!(k.timestamp, Duration::from_millis(120));
    }
}
