// Keyseq Input Layer
// Keyboard events, modifier resolution, filters and terminal adapters

pub mod event;
pub mod filter;

#[cfg(feature = "crossterm")]
pub mod crossterm;

pub use event::{active_modifiers, key_press, EventKind, InputEvent, KeyboardEvent, TargetKind};
pub use filter::{EventFilter, IgnoreEditable};

#[cfg(feature = "crossterm")]
pub use self::crossterm::keyboard_event_from_crossterm;
