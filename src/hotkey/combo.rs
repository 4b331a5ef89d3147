//! Hotkey strings and their canonical form
//!
//! A hotkey is written as `+`-joined tokens, e.g. `"Ctrl + Alt+C"`. Tokens are
//! trimmed and lowercased, modifier and key aliases are folded, and modifiers
//! are sorted into the fixed order `ctrl`, `alt`, `shift`, `super`. The one
//! non-modifier key always comes last, so `"alt+ctrl+c"` and `"Ctrl + Alt+C"`
//! are both `"ctrl+alt+c"`.

use super::error::ValidationError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Modifier keys in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Super,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Shift => "shift",
            Self::Super => "super",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "ctrl" | "control" => Some(Self::Ctrl),
            "alt" | "option" | "opt" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            "super" | "win" | "cmd" | "command" | "meta" => Some(Self::Super),
            _ => None,
        }
    }
}

/// Canonical spelling of a non-modifier key
fn canonical_key(token: &str) -> &str {
    match token {
        "esc" => "escape",
        "return" => "enter",
        "del" => "delete",
        "ins" => "insert",
        "pgup" => "pageup",
        "pgdown" | "pgdn" => "pagedown",
        "spacebar" => "space",
        "-" => "minus",
        "=" => "equal",
        "," => "comma",
        "." => "period",
        "/" => "slash",
        "\\" => "backslash",
        ";" => "semicolon",
        "'" => "quote",
        "`" => "backquote",
        "[" => "bracketleft",
        "]" => "bracketright",
        other => other,
    }
}

/// A parsed hotkey: a set of modifiers plus exactly one key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HotkeyCombo {
    modifiers: BTreeSet<Modifier>,
    key: String,
}

impl HotkeyCombo {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::EmptyKey);
        }

        let mut modifiers = BTreeSet::new();
        let mut key: Option<String> = None;

        for token in raw.split('+') {
            let token = token.trim().to_lowercase();
            if token.is_empty() {
                return Err(ValidationError::EmptyToken(raw.to_string()));
            }

            if let Some(modifier) = Modifier::from_token(&token) {
                modifiers.insert(modifier);
            } else if key.is_some() {
                return Err(ValidationError::MultipleKeys(raw.to_string()));
            } else {
                key = Some(canonical_key(&token).to_string());
            }
        }

        let key = key.ok_or_else(|| ValidationError::MissingKey(raw.to_string()))?;
        Ok(Self { modifiers, key })
    }

    /// Modifiers in canonical order
    pub fn modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.modifiers.iter().copied()
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for HotkeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier.as_str())?;
        }
        f.write_str(&self.key)
    }
}

impl FromStr for HotkeyCombo {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical form of a hotkey string
pub fn normalize(raw: &str) -> Result<String, ValidationError> {
    HotkeyCombo::parse(raw).map(|combo| combo.to_string())
}
