// Keyseq Core Library
// Keybinding grammar and incremental sequence matching

pub mod binding;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod matcher;
pub mod modifier;
pub mod press;
pub mod state;
pub mod target;

pub use binding::{Binding, MatchState};
pub use config::{parse_binding, parse_press, BindingParser, KeyBindingOptions, DEFAULT_TIMEOUT};
pub use dispatch::{
    create_keybindings_handler, create_scoped_handler, Callback, KeyBindingMap,
    KeybindingsHandler, PendingTimers, ScopeEntry, ScopedBindingMap,
};
pub use input::{
    active_modifiers, EventFilter, EventKind, IgnoreEditable, InputEvent, KeyboardEvent,
    TargetKind,
};
pub use matcher::{BindingId, BindingTree, Matcher, ScopedMatcher, SequenceMatcher, Verdict};
pub use modifier::{ModifierName, ModifierSet, Modifiers, Platform, MOD_ALIAS};
pub use press::{Chord, KeyPress};
pub use state::History;
pub use target::{subscribe, subscribe_scoped, EventTarget, KeyListener, Subscription};

#[cfg(feature = "config")]
pub use config::{Config, ConfigError};

#[cfg(feature = "crossterm")]
pub use input::keyboard_event_from_crossterm;
