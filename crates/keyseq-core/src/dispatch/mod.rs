// Keyseq Dispatch Module
// Callback registration, deferral and timeout handling

pub mod bindings;
pub mod handler;
pub mod timers;

pub use bindings::{Callback, KeyBindingMap, ScopeEntry, ScopedBindingMap};
pub use handler::{create_keybindings_handler, create_scoped_handler, KeybindingsHandler};
pub use timers::{DeferredCall, Due, PendingTimers};
