// Keyseq Input Layer - Event Filtering
// Target-level filters applied before events reach a matcher

use crate::input::event::{KeyboardEvent, TargetKind};

/// Decide whether a subscription should see a keyboard event
pub trait EventFilter: Send + Sync {
    fn accepts(&self, event: &KeyboardEvent) -> bool;
}

impl<F> EventFilter for F
where
    F: Fn(&KeyboardEvent) -> bool + Send + Sync,
{
    fn accepts(&self, event: &KeyboardEvent) -> bool {
        self(event)
    }
}

/// Skip events whose target is an editable text control
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreEditable;

impl EventFilter for IgnoreEditable {
    fn accepts(&self, event: &KeyboardEvent) -> bool {
        event.target != TargetKind::EditableText
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_editable() {
        let doc = KeyboardEvent::key_down("a", "KeyA");
        let field = KeyboardEvent::key_down("a", "KeyA").with_target(TargetKind::EditableText);
        let button = KeyboardEvent::key_down("a", "KeyA").with_target(TargetKind::Element);

        assert!(IgnoreEditable.accepts(&doc));
        assert!(!IgnoreEditable.accepts(&field));
        assert!(IgnoreEditable.accepts(&button));
    }

    #[test]
    fn test_closure_filter() {
        let no_repeats = |event: &KeyboardEvent| !event.repeat;
        assert!(no_repeats.accepts(&KeyboardEvent::key_down("a", "KeyA")));
        assert!(!no_repeats.accepts(&KeyboardEvent::key_down("a", "KeyA").repeating()));
    }
}
