// Keyseq Input Layer - crossterm Adapter
// Translates terminal key events into keyboard events with DOM-style names

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

use crate::input::event::{EventKind, KeyboardEvent};
use crate::modifier::Modifiers;

/// Convert a crossterm key event.
///
/// Returns `None` for keys with no keyboard-event equivalent (media keys,
/// `Null`). Terminals only report modifiers for some keys and rarely send
/// releases; whatever they do report is carried over.
pub fn keyboard_event_from_crossterm(event: &KeyEvent) -> Option<KeyboardEvent> {
    let kind = match event.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => EventKind::KeyDown,
        KeyEventKind::Release => EventKind::KeyUp,
    };
    let mut mods = modifiers_from_crossterm(event.modifiers);

    let (key, code) = match event.code {
        KeyCode::Char(c) => (c.to_string(), char_code(c)),
        KeyCode::BackTab => {
            mods = mods | Modifiers::SHIFT;
            named("Tab")
        }
        KeyCode::F(n) => (format!("F{}", n), format!("F{}", n)),
        KeyCode::Modifier(modifier) => {
            let (key, code) = modifier_names(modifier)?;
            (key.to_string(), code.to_string())
        }
        other => named(named_key(other)?),
    };

    let mut out = KeyboardEvent::key_down(key, code).with_modifiers(mods);
    out.kind = kind;
    out.repeat = event.kind == KeyEventKind::Repeat;
    Some(out)
}

fn named(name: &str) -> (String, String) {
    (name.to_string(), name.to_string())
}

fn modifiers_from_crossterm(mods: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if mods.contains(KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        out = out | Modifiers::CONTROL;
    }
    if mods.contains(KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    if mods.intersects(KeyModifiers::SUPER | KeyModifiers::META) {
        out = out | Modifiers::META;
    }
    out
}

/// Physical code for a printable character, US layout
fn char_code(c: char) -> String {
    match c {
        'a'..='z' | 'A'..='Z' => format!("Key{}", c.to_ascii_uppercase()),
        '0'..='9' => format!("Digit{}", c),
        ' ' => "Space".to_string(),
        '-' | '_' => "Minus".to_string(),
        '=' | '+' => "Equal".to_string(),
        '[' | '{' => "BracketLeft".to_string(),
        ']' | '}' => "BracketRight".to_string(),
        '\\' | '|' => "Backslash".to_string(),
        ';' | ':' => "Semicolon".to_string(),
        '\'' | '"' => "Quote".to_string(),
        ',' | '<' => "Comma".to_string(),
        '.' | '>' => "Period".to_string(),
        '/' | '?' => "Slash".to_string(),
        '`' | '~' => "Backquote".to_string(),
        _ => String::new(),
    }
}

fn named_key(code: KeyCode) -> Option<&'static str> {
    let name = match code {
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Tab => "Tab",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::Esc => "Escape",
        KeyCode::CapsLock => "CapsLock",
        KeyCode::ScrollLock => "ScrollLock",
        KeyCode::NumLock => "NumLock",
        KeyCode::PrintScreen => "PrintScreen",
        KeyCode::Pause => "Pause",
        KeyCode::Menu => "ContextMenu",
        _ => return None,
    };
    Some(name)
}

fn modifier_names(modifier: ModifierKeyCode) -> Option<(&'static str, &'static str)> {
    let names = match modifier {
        ModifierKeyCode::LeftShift => ("Shift", "ShiftLeft"),
        ModifierKeyCode::RightShift => ("Shift", "ShiftRight"),
        ModifierKeyCode::LeftControl => ("Control", "ControlLeft"),
        ModifierKeyCode::RightControl => ("Control", "ControlRight"),
        ModifierKeyCode::LeftAlt => ("Alt", "AltLeft"),
        ModifierKeyCode::RightAlt => ("Alt", "AltRight"),
        ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => ("Meta", "MetaLeft"),
        ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => ("Meta", "MetaRight"),
        ModifierKeyCode::IsoLevel3Shift => ("AltGraph", "AltRight"),
        _ => return None,
    };
    Some(names)
}
