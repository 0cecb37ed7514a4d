// Keyseq Config API - Binding String Parser
// Parses binding strings like "$mod+Alt+s Shift+a" into chords

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::binding::Binding;
use crate::modifier::{ModifierSet, Platform, MOD_ALIAS};
use crate::press::Chord;

/// A `+` that follows a word character separates tokens; any other `+` is a key
static TOKEN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)\+").expect("static regex"));

/// Parse a binding string into a [`Binding`].
///
/// Presses are separated by any run of whitespace, so doubled spaces never
/// produce empty presses. Within a press, the last `+`-joined
/// token is the key (or physical code) and every token before it is a
/// modifier. `$mod` becomes the platform's primary modifier.
///
/// Parsing never fails. A string without `+` is a single key with no
/// modifiers, and unknown modifier names are kept so the slot simply never
/// matches.
///
/// # Examples
/// ```
/// use keyseq_core::config::parse_binding;
/// use keyseq_core::Platform;
///
/// let binding = parse_binding("$mod+Alt+s Shift+a", Platform::Apple);
/// assert_eq!(binding.len(), 2);
/// assert_eq!(binding.to_string(), "Meta+Alt+s Shift+a");
/// ```
pub fn parse_binding(binding: &str, platform: Platform) -> Binding {
    let chords = binding
        .split_whitespace()
        .map(|press| parse_press(press, platform));

    // Whitespace-only input still yields one (unmatchable) empty-key slot
    Binding::from_chords(chords).unwrap_or_else(|| Binding::single(parse_press("", platform)))
}

/// Parse a single press such as `"Shift+D"` or `"$mod+KeyU"`
pub fn parse_press(press: &str, platform: Platform) -> Chord {
    let mut tokens: Vec<&str> = TOKEN_SEPARATOR.split(press).collect();
    let key = tokens.pop().unwrap_or_default();

    let default_modifier = platform.default_modifier();
    let default_name: &'static str = default_modifier.into();
    let mods = ModifierSet::from_tokens(
        tokens
            .into_iter()
            .map(|token| if token == MOD_ALIAS { default_name } else { token }),
    );

    Chord::new(mods, key)
}

/// Memoizing binding parser bound to one platform
#[derive(Debug, Clone)]
pub struct BindingParser {
    platform: Platform,
    cache: HashMap<String, Binding>,
}

impl BindingParser {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            cache: HashMap::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Parse `binding`, reusing an earlier result for the same string
    pub fn parse(&mut self, binding: &str) -> Binding {
        if let Some(parsed) = self.cache.get(binding) {
            return parsed.clone();
        }
        let parsed = parse_binding(binding, self.platform);
        self.cache.insert(binding.to_string(), parsed.clone());
        parsed
    }

    /// Number of distinct strings parsed so far
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
