// Keyseq Config API - Subscription Options
// Runtime configuration with documented defaults

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::input::{EventFilter, EventKind};
use crate::modifier::{Modifiers, Platform};

/// Sequences are abandoned when presses are more than this far apart
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Options for a keybinding subscription.
///
/// | field               | default                      |
/// |---------------------|------------------------------|
/// | `timeout`           | [`DEFAULT_TIMEOUT`] (1000ms) |
/// | `event`             | [`EventKind::KeyDown`]       |
/// | `platform`          | [`Platform::current()`]      |
/// | `tracked_modifiers` | Shift, Meta, Alt, Control    |
/// | `filter`            | none                         |
///
/// Setting `timeout` much below 1000ms will be too fast for many users.
#[derive(Clone)]
pub struct KeyBindingOptions {
    /// Maximum pause between presses of a sequence, and the delay before a
    /// match that could still grow into a longer one is committed
    pub timeout: Duration,
    /// Which key event the subscription listens to
    pub event: EventKind,
    /// Platform used to resolve `$mod`
    pub platform: Platform,
    /// Modifier keys queried on each event
    pub tracked_modifiers: Modifiers,
    /// Optional event filter applied before the matcher sees an event
    pub filter: Option<Arc<dyn EventFilter>>,
}

impl KeyBindingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_event(mut self, event: EventKind) -> Self {
        self.event = event;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_tracked_modifiers(mut self, tracked: Modifiers) -> Self {
        self.tracked_modifiers = tracked;
        self
    }

    pub fn with_filter(mut self, filter: impl EventFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }
}

impl Default for KeyBindingOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            event: EventKind::KeyDown,
            platform: Platform::current(),
            tracked_modifiers: Modifiers::ALL,
            filter: None,
        }
    }
}

impl fmt::Debug for KeyBindingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBindingOptions")
            .field("timeout", &self.timeout)
            .field("event", &self.event)
            .field("platform", &self.platform)
            .field("tracked_modifiers", &self.tracked_modifiers)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::IgnoreEditable;

    #[test]
    fn test_defaults() {
        let options = KeyBindingOptions::default();
        assert_eq!(options.timeout, Duration::from_millis(1000));
        assert_eq!(options.event, EventKind::KeyDown);
        assert_eq!(options.platform, Platform::current());
        assert_eq!(options.tracked_modifiers, Modifiers::ALL);
        assert!(options.filter.is_none());
    }

    #[test]
    fn test_builder() {
        let options = KeyBindingOptions::new()
            .with_timeout(Duration::from_millis(300))
            .with_event(EventKind::KeyUp)
            .with_platform(Platform::Apple)
            .with_filter(IgnoreEditable);
        assert_eq!(options.timeout, Duration::from_millis(300));
        assert_eq!(options.event, EventKind::KeyUp);
        assert_eq!(options.platform, Platform::Apple);
        assert!(format!("{:?}", options).contains("filter: true"));
    }
}
