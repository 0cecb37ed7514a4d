// Keyseq Input Layer - Keyboard Events
// Event types at the input boundary and the modifier resolver

use serde::Deserialize;
use strum_macros::{Display, EnumString};

use crate::modifier::{ModifierName, Modifiers};
use crate::press::KeyPress;

/// The key event a subscription listens to
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    KeyDown,
    KeyUp,
}

/// What kind of element the event was delivered to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TargetKind {
    #[default]
    Document,
    /// A text input, text area or other editable control
    EditableText,
    /// Any other element
    Element,
}

/// A keyboard event as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub kind: EventKind,
    /// Logical key name (e.g. `"D"`, `"Enter"`, `"Control"`)
    pub key: String,
    /// Physical key code (e.g. `"KeyD"`, `"ControlLeft"`)
    pub code: String,
    /// Auto-repeat from a held key
    pub repeat: bool,
    pub target: TargetKind,
    /// Held modifiers, or `None` when the source cannot report them
    modifier_state: Option<Modifiers>,
}

impl KeyboardEvent {
    /// A key-down event with no modifiers held
    pub fn key_down(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            kind: EventKind::KeyDown,
            key: key.into(),
            code: code.into(),
            repeat: false,
            target: TargetKind::Document,
            modifier_state: Some(Modifiers::NONE),
        }
    }

    /// A key-up event with no modifiers held
    pub fn key_up(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            kind: EventKind::KeyUp,
            ..Self::key_down(key, code)
        }
    }

    pub fn with_modifiers(mut self, mods: Modifiers) -> Self {
        self.modifier_state = Some(mods);
        self
    }

    /// Drop modifier-state support, as some input paths do for function keys
    pub fn without_modifier_state(mut self) -> Self {
        self.modifier_state = None;
        self
    }

    pub fn with_target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }

    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Query one modifier. `None` when the event has no modifier state at all.
    pub fn get_modifier_state(&self, name: ModifierName) -> Option<bool> {
        self.modifier_state.map(|mods| mods.contains(name))
    }

    pub fn has_modifier_state(&self) -> bool {
        self.modifier_state.is_some()
    }
}

/// Anything delivered to a listener. Only keyboard events are matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Keyboard(KeyboardEvent),
    /// A non-keyboard event dispatched under a key event name, e.g. by an
    /// autocomplete widget
    Other { kind: EventKind },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::Keyboard(event) => event.kind,
            InputEvent::Other { kind } => *kind,
        }
    }

    pub fn as_keyboard(&self) -> Option<&KeyboardEvent> {
        match self {
            InputEvent::Keyboard(event) => Some(event),
            InputEvent::Other { .. } => None,
        }
    }
}

impl From<KeyboardEvent> for InputEvent {
    fn from(event: KeyboardEvent) -> Self {
        InputEvent::Keyboard(event)
    }
}

/// Which of the `tracked` modifiers are held during `event`.
///
/// An event without modifier state degrades to "no modifiers held".
pub fn active_modifiers(event: &KeyboardEvent, tracked: Modifiers) -> Modifiers {
    tracked
        .iter()
        .filter(|name| event.get_modifier_state(*name).unwrap_or(false))
        .collect()
}

/// Normalize an event into the press recorded in history
pub fn key_press(event: &KeyboardEvent, tracked: Modifiers) -> KeyPress {
    KeyPress::new(
        active_modifiers(event, tracked),
        event.key.clone(),
        event.code.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_modifiers() {
        let event = KeyboardEvent::key_down("D", "KeyD").with_modifiers(Modifiers::SHIFT | Modifiers::ALT);
        assert_eq!(
            active_modifiers(&event, Modifiers::ALL),
            Modifiers::SHIFT | Modifiers::ALT
        );
        assert_eq!(active_modifiers(&event, Modifiers::SHIFT), Modifiers::SHIFT);
    }

    #[test]
    fn test_missing_modifier_state_degrades_to_none() {
        let event = KeyboardEvent::key_down("F1", "F1")
            .with_modifiers(Modifiers::CONTROL)
            .without_modifier_state();
        assert_eq!(event.get_modifier_state(ModifierName::Control), None);
        assert_eq!(active_modifiers(&event, Modifiers::ALL), Modifiers::NONE);
    }

    #[test]
    fn test_key_press_normalization() {
        let event = KeyboardEvent::key_down("u", "KeyU").with_modifiers(Modifiers::CONTROL);
        let press = key_press(&event, Modifiers::ALL);
        assert_eq!(press, KeyPress::new(Modifiers::CONTROL, "u", "KeyU"));
    }

    #[test]
    fn test_input_event_kind() {
        let key_up: InputEvent = KeyboardEvent::key_up("a", "KeyA").into();
        assert_eq!(key_up.kind(), EventKind::KeyUp);
        assert!(key_up.as_keyboard().is_some());

        let other = InputEvent::Other {
            kind: EventKind::KeyDown,
        };
        assert_eq!(other.kind(), EventKind::KeyDown);
        assert!(other.as_keyboard().is_none());
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::KeyDown.to_string(), "keydown");
        assert_eq!("keyup".parse::<EventKind>(), Ok(EventKind::KeyUp));
    }
}
