// Keyseq Press Types
// A live key press and a binding slot (chord)

use std::fmt;

use crate::modifier::{ModifierSet, Modifiers};

/// One observed key press: the modifiers held plus the logical key and physical code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPress {
    /// Modifiers active when the key went down
    pub mods: Modifiers,
    /// Logical key name reported by the device (e.g. `"d"`, `"D"`, `"Enter"`)
    pub key: String,
    /// Physical key identity (e.g. `"KeyD"`, `"ControlLeft"`)
    pub code: String,
}

impl KeyPress {
    pub fn new(mods: Modifiers, key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            mods,
            key: key.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.mods, self.key)
        }
    }
}

/// A single slot of a binding: a modifier set plus a primary key or code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    mods: ModifierSet,
    key: String,
}

impl Chord {
    pub fn new(mods: ModifierSet, key: impl Into<String>) -> Self {
        Self {
            mods,
            key: key.into(),
        }
    }

    pub fn mods(&self) -> &ModifierSet {
        &self.mods
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Slot equality: identical modifier sets, and the primary key names either
    /// the logical key or the physical code of the press
    pub fn matches(&self, press: &KeyPress) -> bool {
        self.mods.matches(press.mods) && (self.key == press.key || self.key == press.code)
    }

    /// Check if a bare modifier press could still become this chord once the
    /// primary key arrives
    pub fn awaits(&self, press: &KeyPress) -> bool {
        self.mods.covers(press.mods)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.mods, self.key)
        }
    }
}
