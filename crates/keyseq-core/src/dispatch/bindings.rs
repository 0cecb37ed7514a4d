// Keyseq Dispatch - Binding Maps
// Binding string to callback maps, flat and scoped

use std::fmt;

use indexmap::IndexMap;

use crate::binding::Binding;
use crate::config::BindingParser;
use crate::input::KeyboardEvent;

/// Callback invoked with the event that completed its binding
pub type Callback = Box<dyn FnMut(&KeyboardEvent) + Send>;

/// Binding strings mapped to callbacks, in registration order
#[derive(Default)]
pub struct KeyBindingMap {
    entries: IndexMap<String, Callback>,
}

impl KeyBindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, builder style
    pub fn bind<F>(mut self, binding: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(&KeyboardEvent) + Send + 'static,
    {
        self.insert(binding, Box::new(callback));
        self
    }

    /// Add a binding. Re-binding a string replaces its callback but keeps its position.
    pub fn insert(&mut self, binding: impl Into<String>, callback: Callback) {
        self.entries.insert(binding.into(), callback);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binding strings in registration order
    pub fn bindings(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Parse every binding string once
    pub(crate) fn into_parsed(self, parser: &mut BindingParser) -> Vec<(Binding, String, Callback)> {
        self.entries
            .into_iter()
            .map(|(text, callback)| (parser.parse(&text), text, callback))
            .collect()
    }
}

impl fmt::Debug for KeyBindingMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

/// Value of a [`ScopedBindingMap`] entry
pub enum ScopeEntry {
    Callback(Callback),
    /// Bindings reachable only after this entry's presses
    Scope(ScopedBindingMap),
}

/// Nested binding map. A scope entry prefixes every binding inside it, so
/// `scope("g", {"t": ..})` is the binding `"g t"`.
#[derive(Default)]
pub struct ScopedBindingMap {
    entries: IndexMap<String, ScopeEntry>,
}

impl ScopedBindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<F>(mut self, binding: impl Into<String>, callback: F) -> Self
    where
        F: FnMut(&KeyboardEvent) + Send + 'static,
    {
        self.entries
            .insert(binding.into(), ScopeEntry::Callback(Box::new(callback)));
        self
    }

    pub fn scope(mut self, prefix: impl Into<String>, inner: ScopedBindingMap) -> Self {
        self.entries.insert(prefix.into(), ScopeEntry::Scope(inner));
        self
    }

    /// Number of callbacks, nested scopes included
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .map(|entry| match entry {
                ScopeEntry::Callback(_) => 1,
                ScopeEntry::Scope(inner) => inner.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into full bindings, depth first in registration order
    pub(crate) fn into_parsed(self, parser: &mut BindingParser) -> Vec<(Binding, String, Callback)> {
        let mut out = Vec::new();
        self.flatten_into(None, parser, &mut out);
        out
    }

    fn flatten_into(
        self,
        prefix: Option<&Binding>,
        parser: &mut BindingParser,
        out: &mut Vec<(Binding, String, Callback)>,
    ) {
        for (text, entry) in self.entries {
            let parsed = parser.parse(&text);
            let binding = match prefix {
                Some(prefix) => prefix.concat(&parsed),
                None => parsed,
            };
            match entry {
                ScopeEntry::Callback(callback) => {
                    let label = binding.to_string();
                    out.push((binding, label, callback));
                }
                ScopeEntry::Scope(inner) => inner.flatten_into(Some(&binding), parser, out),
            }
        }
    }
}

impl fmt::Debug for ScopedBindingMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (text, entry) in &self.entries {
            match entry {
                ScopeEntry::Callback(_) => map.entry(text, &"<callback>"),
                ScopeEntry::Scope(inner) => map.entry(text, inner),
            };
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::Platform;

    #[test]
    fn test_binding_map_order_and_replace() {
        let mut map = KeyBindingMap::new().bind("g g", |_| {}).bind("Shift+D", |_| {});
        map.insert("g g", Box::new(|_: &KeyboardEvent| {}));
        let keys: Vec<&str> = map.bindings().collect();
        assert_eq!(keys, vec!["g g", "Shift+D"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_scoped_map_flattens_with_prefix() {
        let map = ScopedBindingMap::new()
            .bind("Shift+D", |_| {})
            .scope(
                "g",
                ScopedBindingMap::new()
                    .bind("t", |_| {})
                    .scope("$mod+k", ScopedBindingMap::new().bind("x", |_| {})),
            );
        assert_eq!(map.len(), 3);

        let mut parser = BindingParser::new(Platform::Other);
        let labels: Vec<String> = map
            .into_parsed(&mut parser)
            .into_iter()
            .map(|(_, label, _)| label)
            .collect();
        assert_eq!(labels, vec!["Shift+D", "g t", "g Control+k x"]);
    }

    #[test]
    fn test_empty_scope() {
        let map = ScopedBindingMap::new().scope("g", ScopedBindingMap::new());
        assert!(map.is_empty());
    }
}
