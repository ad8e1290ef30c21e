//! Key chord model: keys, modifier sets, and chord matching.
//!
//! A [`KeyChord`] describes a single key pressed together with a set of
//! modifiers, e.g. `Ctrl+H`. Chords are parsed from strings (used in
//! configuration files and replay scripts), rendered back with [`Display`],
//! and matched against live [`KeyEvent`](crate::input::KeyEvent)s by the
//! dispatcher.
//!
//! Matching is deliberately permissive about extra modifiers: a chord names
//! the modifiers that **must** be held, and an event that carries additional
//! ones still matches. `Ctrl+H` therefore fires on `Ctrl+Shift+H` as well.
//! Character keys are compared case-insensitively by normalizing to ASCII
//! lowercase on both sides.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::input::KeyEvent;

// ============================================================================
// Modifiers
// ============================================================================

/// The set of modifier keys held during a key press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers {
    /// Control key (left or right).
    pub control: bool,
    /// Alt / Option key.
    pub alt: bool,
    /// Shift key.
    pub shift: bool,
    /// Meta key (Cmd on macOS, Win on Windows, Super on Linux).
    pub meta: bool,
}

impl KeyModifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        control: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Control only.
    pub const CONTROL: Self = Self {
        control: true,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Returns true if every modifier in `required` is also held in `self`.
    pub fn contains(self, required: KeyModifiers) -> bool {
        (!required.control || self.control)
            && (!required.alt || self.alt)
            && (!required.shift || self.shift)
            && (!required.meta || self.meta)
    }

    /// Returns true if no modifier is held.
    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

// ============================================================================
// Keys
// ============================================================================

/// A non-modifier key.
///
/// Printable characters are carried as [`Key::Char`]; a handful of named keys
/// cover the navigation and editing keys that show up in shortcut tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character key.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Function key (`F1` is `F(1)`).
    F(u8),
}

impl Key {
    /// Normalizes character keys to ASCII lowercase so that matching is
    /// case-insensitive. Named keys are returned unchanged.
    pub fn normalized(self) -> Key {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => write!(f, "Space"),
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::F(n) => write!(f, "F{n}"),
        }
    }
}

// ============================================================================
// Chords
// ============================================================================

/// A key plus the modifiers that must accompany it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// Modifiers that must be held for the chord to match.
    pub modifiers: KeyModifiers,
    /// The non-modifier key.
    pub key: Key,
}

impl KeyChord {
    /// Creates a chord from a key and modifier set. The key is normalized to
    /// lowercase so `Ctrl+H` and `Ctrl+h` are the same chord.
    pub fn new(key: Key, modifiers: KeyModifiers) -> Self {
        Self {
            modifiers,
            key: key.normalized(),
        }
    }

    /// Creates a `Ctrl+<key>` chord.
    pub fn ctrl(key: Key) -> Self {
        Self::new(key, KeyModifiers::CONTROL)
    }

    /// Creates a chord with no modifiers.
    pub fn bare(key: Key) -> Self {
        Self::new(key, KeyModifiers::NONE)
    }

    /// Returns true when `event` satisfies this chord: its key is the same
    /// (case-insensitive for characters) and it holds at least the required
    /// modifiers. Extra modifiers on the event do not prevent a match.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.modifiers.contains(self.modifiers) && event.key.normalized() == self.key
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.control {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.alt {
            parts.push("Alt".to_string());
        }
        if self.modifiers.shift {
            parts.push("Shift".to_string());
        }
        if self.modifiers.meta {
            parts.push("Meta".to_string());
        }
        parts.push(self.key.to_string());
        write!(f, "{}", parts.join("+"))
    }
}

/// Errors produced when parsing a chord string.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChordParseError {
    /// The chord string was empty or all whitespace.
    #[error("empty chord")]
    Empty,

    /// The chord named only modifiers, no key.
    #[error("chord has no key, only modifiers")]
    NoKey,

    /// A token was neither a modifier nor a recognized key.
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    /// More than one non-modifier key was named.
    #[error("chord names more than one key ('{0}')")]
    ExtraKey(String),
}

impl FromStr for KeyChord {
    type Err = ChordParseError;

    /// Parses chord strings of the form `"ctrl+h"`, `"Ctrl+Shift+Left"`,
    /// `"alt+f4"`. Tokens are separated by `+`, matched case-insensitively,
    /// and may carry surrounding whitespace; empty tokens are skipped, so a
    /// trailing `+` reads as a chord with no key. Exactly one non-modifier
    /// key is required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ChordParseError::Empty);
        }

        let mut modifiers = KeyModifiers::default();
        let mut key: Option<Key> = None;

        for part in s.split('+') {
            let token = part.trim().to_ascii_lowercase();
            match token.as_str() {
                // Empty tokens ("ctrl+") carry nothing; the missing-key
                // check comes after the scan.
                "" => continue,
                "ctrl" | "control" => modifiers.control = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "command" | "super" | "win" => modifiers.meta = true,
                _ => {
                    let parsed = parse_key_token(&token)
                        .ok_or_else(|| ChordParseError::UnknownKey(part.trim().to_string()))?;
                    if key.is_some() {
                        return Err(ChordParseError::ExtraKey(part.trim().to_string()));
                    }
                    key = Some(parsed);
                }
            }
        }

        match key {
            Some(key) => Ok(KeyChord::new(key, modifiers)),
            None => Err(ChordParseError::NoKey),
        }
    }
}

/// Resolves a lowercase token into a key, or `None` if unrecognized.
fn parse_key_token(token: &str) -> Option<Key> {
    let key = match token {
        "enter" | "return" => Key::Enter,
        "esc" | "escape" => Key::Escape,
        "tab" => Key::Tab,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "space" | "spacebar" => Key::Char(' '),
        _ => {
            if let Some(n) = token.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Some(Key::F(n));
                }
                return None;
            }
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyEvent;

    #[test]
    fn test_parse_simple_chord() {
        let chord: KeyChord = "ctrl+h".parse().expect("Failed to parse chord");
        assert_eq!(chord, KeyChord::ctrl(Key::Char('h')));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let lower: KeyChord = "ctrl+h".parse().expect("parse failed");
        let upper: KeyChord = "Ctrl+H".parse().expect("parse failed");
        let shouty: KeyChord = "CONTROL+H".parse().expect("parse failed");
        assert_eq!(lower, upper);
        assert_eq!(lower, shouty);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let chord: KeyChord = " ctrl + shift + left ".parse().expect("parse failed");
        assert!(chord.modifiers.control);
        assert!(chord.modifiers.shift);
        assert_eq!(chord.key, Key::Left);
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(
            "enter".parse::<KeyChord>().expect("parse failed").key,
            Key::Enter
        );
        assert_eq!(
            "alt+f4".parse::<KeyChord>().expect("parse failed").key,
            Key::F(4)
        );
        assert_eq!(
            "ctrl+space".parse::<KeyChord>().expect("parse failed").key,
            Key::Char(' ')
        );
    }

    #[test]
    fn test_parse_modifier_aliases() {
        let chord: KeyChord = "cmd+option+x".parse().expect("parse failed");
        assert!(chord.modifiers.meta);
        assert!(chord.modifiers.alt);
        assert_eq!(chord.key, Key::Char('x'));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<KeyChord>(), Err(ChordParseError::Empty));
        assert_eq!("   ".parse::<KeyChord>(), Err(ChordParseError::Empty));
        assert_eq!("ctrl+shift".parse::<KeyChord>(), Err(ChordParseError::NoKey));
        assert_eq!("ctrl+".parse::<KeyChord>(), Err(ChordParseError::NoKey));
        assert_eq!(
            "ctrl+f13".parse::<KeyChord>(),
            Err(ChordParseError::UnknownKey("f13".to_string()))
        );
        assert_eq!(
            "ctrl+bogus".parse::<KeyChord>(),
            Err(ChordParseError::UnknownKey("bogus".to_string()))
        );
        assert_eq!(
            "ctrl+a+b".parse::<KeyChord>(),
            Err(ChordParseError::ExtraKey("b".to_string()))
        );
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["Ctrl+H", "Ctrl+Alt+Delete", "Shift+F5", "Meta+Space", "Escape"] {
            let chord: KeyChord = text.parse().expect("parse failed");
            assert_eq!(chord.to_string(), text);
            let reparsed: KeyChord = chord.to_string().parse().expect("reparse failed");
            assert_eq!(reparsed, chord);
        }
    }

    #[test]
    fn test_matches_exact_event() {
        let chord = KeyChord::ctrl(Key::Char('h'));
        let event = KeyEvent::new(Key::Char('h'), KeyModifiers::CONTROL);
        assert!(chord.matches(&event));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let chord = KeyChord::ctrl(Key::Char('h'));
        let event = KeyEvent::new(Key::Char('H'), KeyModifiers::CONTROL);
        assert!(chord.matches(&event));
    }

    #[test]
    fn test_extra_event_modifiers_still_match() {
        let chord = KeyChord::ctrl(Key::Char('h'));
        let event = KeyEvent::new(
            Key::Char('h'),
            KeyModifiers {
                control: true,
                shift: true,
                ..KeyModifiers::NONE
            },
        );
        assert!(chord.matches(&event));
    }

    #[test]
    fn test_missing_modifier_does_not_match() {
        let chord = KeyChord::ctrl(Key::Char('h'));
        let bare = KeyEvent::new(Key::Char('h'), KeyModifiers::NONE);
        let alt = KeyEvent::new(Key::Char('h'), KeyModifiers { alt: true, ..KeyModifiers::NONE });
        assert!(!chord.matches(&bare));
        assert!(!chord.matches(&alt));
    }

    #[test]
    fn test_different_key_does_not_match() {
        let chord = KeyChord::ctrl(Key::Char('h'));
        let event = KeyEvent::new(Key::Char('g'), KeyModifiers::CONTROL);
        assert!(!chord.matches(&event));
    }

    #[test]
    fn test_modifier_containment() {
        let ctrl_shift = KeyModifiers {
            control: true,
            shift: true,
            ..KeyModifiers::NONE
        };
        assert!(ctrl_shift.contains(KeyModifiers::CONTROL));
        assert!(ctrl_shift.contains(KeyModifiers::NONE));
        assert!(!KeyModifiers::CONTROL.contains(ctrl_shift));
        assert!(KeyModifiers::NONE.is_empty());
        assert!(!ctrl_shift.is_empty());
    }
}
