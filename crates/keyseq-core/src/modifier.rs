// Keyseq Modifier System
// Modifier names, live modifier sets, binding modifier sets and the `$mod` alias

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use smallvec::SmallVec;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Placeholder resolved to the platform's primary modifier at parse time
pub const MOD_ALIAS: &str = "$mod";

/// Platform strings that identify Apple hardware
static APPLE_PLATFORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mac|iPod|iPhone|iPad").expect("static regex"));

/// The modifier keys that change the meaning of a binding.
///
/// AltGraph is not tracked on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum ModifierName {
    Shift,
    Meta,
    Alt,
    Control,
}

impl ModifierName {
    const fn bit(self) -> u8 {
        match self {
            ModifierName::Shift => 0b0001,
            ModifierName::Meta => 0b0010,
            ModifierName::Alt => 0b0100,
            ModifierName::Control => 0b1000,
        }
    }
}

/// A set of modifier names stored as a bitfield
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(ModifierName::Shift.bit());
    pub const META: Modifiers = Modifiers(ModifierName::Meta.bit());
    pub const ALT: Modifiers = Modifiers(ModifierName::Alt.bit());
    pub const CONTROL: Modifiers = Modifiers(ModifierName::Control.bit());
    pub const ALL: Modifiers = Modifiers(0b1111);

    /// Set containing a single modifier
    pub const fn of(name: ModifierName) -> Self {
        Modifiers(name.bit())
    }

    #[inline]
    pub const fn contains(self, name: ModifierName) -> bool {
        self.0 & name.bit() != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if every modifier in `self` is also in `other`
    #[inline]
    pub const fn is_subset(self, other: Modifiers) -> bool {
        self.0 & other.0 == self.0
    }

    pub fn insert(&mut self, name: ModifierName) {
        self.0 |= name.bit();
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the contained modifiers in canonical order
    pub fn iter(self) -> impl Iterator<Item = ModifierName> {
        ModifierName::iter().filter(move |name| self.contains(*name))
    }

    /// Check if a logical key name is one of the modifier keys in this set.
    ///
    /// Used with the tracked-modifier set to recognise a bare modifier keypress
    /// such as `"Control"` or `"Shift"`.
    pub fn is_modifier_key(self, key: &str) -> bool {
        ModifierName::from_str(key).is_ok_and(|name| self.contains(name))
    }
}

impl FromIterator<ModifierName> for Modifiers {
    fn from_iter<I: IntoIterator<Item = ModifierName>>(iter: I) -> Self {
        let mut mods = Modifiers::NONE;
        for name in iter {
            mods.insert(name);
        }
        mods
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&'static str> = self.iter().map(<&'static str>::from).collect();
        write!(f, "{}", parts.join("+"))
    }
}

/// Modifier set of a binding slot.
///
/// The binding grammar is lenient: any token before the primary key is taken
/// as a modifier, including names outside [`ModifierName`]. Unknown tokens are
/// kept so that such a slot never matches a live event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet {
    known: Modifiers,
    // sorted and deduplicated so derived equality is set equality
    unknown: SmallVec<[String; 1]>,
}

impl ModifierSet {
    /// Build a set from modifier tokens as they appear in a binding string
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = ModifierSet::default();
        for token in tokens {
            match ModifierName::from_str(token) {
                Ok(name) => set.known.insert(name),
                Err(_) => set.unknown.push(token.to_string()),
            }
        }
        set.unknown.sort();
        set.unknown.dedup();
        set
    }

    pub fn known(&self) -> Modifiers {
        self.known
    }

    pub fn unknown(&self) -> &[String] {
        &self.unknown
    }

    /// Exact set equality against the modifiers held during a live press
    pub fn matches(&self, live: Modifiers) -> bool {
        self.unknown.is_empty() && self.known == live
    }

    /// Check if a press holding `live` could still grow into this set
    pub fn covers(&self, live: Modifiers) -> bool {
        self.unknown.is_empty() && live.is_subset(self.known)
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.unknown.is_empty()
    }
}

impl From<Modifiers> for ModifierSet {
    fn from(known: Modifiers) -> Self {
        Self {
            known,
            unknown: SmallVec::new(),
        }
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self
            .known
            .iter()
            .map(|m| -> &str { m.into() })
            .chain(self.unknown.iter().map(String::as_str))
            .collect();
        write!(f, "{}", parts.join("+"))
    }
}

/// Host platform family, which decides what `$mod` stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Platform {
    Apple,
    Other,
}

impl Platform {
    /// Platform of the running binary
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Apple
        } else {
            Platform::Other
        }
    }

    /// Classify a platform identifier such as `"MacIntel"` or `"Linux x86_64"`
    pub fn from_identifier(identifier: &str) -> Self {
        if APPLE_PLATFORM.is_match(identifier) {
            Platform::Apple
        } else {
            Platform::Other
        }
    }

    /// The modifier `$mod` resolves to: Meta on Apple platforms, Control elsewhere
    pub fn default_modifier(self) -> ModifierName {
        match self {
            Platform::Apple => ModifierName::Meta,
            Platform::Other => ModifierName::Control,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_name_parsing_is_exact() {
        assert_eq!(ModifierName::from_str("Shift"), Ok(ModifierName::Shift));
        assert_eq!(ModifierName::from_str("Control"), Ok(ModifierName::Control));
        assert!(ModifierName::from_str("Ctrl").is_err());
        assert!(ModifierName::from_str("shift").is_err());
        assert!(ModifierName::from_str("AltGraph").is_err());
    }

    #[test]
    fn test_modifiers_subset() {
        let ctrl_shift = Modifiers::CONTROL | Modifiers::SHIFT;
        assert!(Modifiers::CONTROL.is_subset(ctrl_shift));
        assert!(Modifiers::NONE.is_subset(Modifiers::NONE));
        assert!(!ctrl_shift.is_subset(Modifiers::CONTROL));
        assert_eq!(ctrl_shift.len(), 2);
    }

    #[test]
    fn test_modifiers_from_iter_and_display() {
        let mods: Modifiers = [ModifierName::Control, ModifierName::Shift].into_iter().collect();
        assert!(mods.contains(ModifierName::Shift));
        assert!(!mods.contains(ModifierName::Meta));
        assert_eq!(mods.to_string(), "Shift+Control");
    }

    #[test]
    fn test_is_modifier_key_respects_tracked_set() {
        assert!(Modifiers::ALL.is_modifier_key("Control"));
        assert!(Modifiers::ALL.is_modifier_key("Meta"));
        assert!(!Modifiers::ALL.is_modifier_key("AltGraph"));
        assert!(!Modifiers::ALL.is_modifier_key("k"));
        assert!(!Modifiers::SHIFT.is_modifier_key("Control"));
    }

    #[test]
    fn test_modifier_set_equality_is_order_independent() {
        let a = ModifierSet::from_tokens(["Shift", "Alt"]);
        let b = ModifierSet::from_tokens(["Alt", "Shift", "Alt"]);
        assert_eq!(a, b);
        assert!(a.matches(Modifiers::ALT | Modifiers::SHIFT));
        assert!(!a.matches(Modifiers::ALT));
    }

    #[test]
    fn test_unknown_modifier_never_matches() {
        let set = ModifierSet::from_tokens(["Hyper"]);
        assert_eq!(set.unknown(), &["Hyper".to_string()]);
        assert!(!set.matches(Modifiers::NONE));
        assert!(!set.covers(Modifiers::NONE));
        assert_eq!(set.to_string(), "Hyper");
    }

    #[test]
    fn test_modifier_set_display_lists_known_then_unknown() {
        let set = ModifierSet::from_tokens(["Hyper", "Alt", "Shift"]);
        assert_eq!(set.to_string(), "Shift+Alt+Hyper");
        let name: &'static str = ModifierName::Control.into();
        assert_eq!(name, "Control");
    }

    #[test]
    fn test_covers() {
        let set = ModifierSet::from(Modifiers::CONTROL | Modifiers::ALT);
        assert!(set.covers(Modifiers::CONTROL));
        assert!(set.covers(Modifiers::CONTROL | Modifiers::ALT));
        assert!(!set.covers(Modifiers::SHIFT));
    }

    #[test]
    fn test_platform_identifier() {
        assert_eq!(Platform::from_identifier("MacIntel"), Platform::Apple);
        assert_eq!(Platform::from_identifier("iPhone"), Platform::Apple);
        assert_eq!(Platform::from_identifier("Win32"), Platform::Other);
        assert_eq!(Platform::from_identifier("Linux x86_64"), Platform::Other);
    }

    #[test]
    fn test_platform_default_modifier() {
        assert_eq!(Platform::Apple.default_modifier(), ModifierName::Meta);
        assert_eq!(Platform::Other.default_modifier(), ModifierName::Control);
        assert_eq!(Platform::from_str("APPLE"), Ok(Platform::Apple));
        assert_eq!(Platform::Other.to_string(), "other");
    }
}
