// Keyseq Event Target
// Listener registry, subscriptions and their teardown guard

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::config::KeyBindingOptions;
use crate::dispatch::{
    create_keybindings_handler, create_scoped_handler, KeyBindingMap, KeybindingsHandler,
    ScopedBindingMap,
};
use crate::input::{EventKind, InputEvent};
use crate::matcher::Matcher;

/// Something an [`EventTarget`] delivers events to
pub trait KeyListener: Send {
    fn on_event(&mut self, event: &InputEvent, now: Instant);

    fn poll_timers(&mut self, now: Instant);

    fn next_deadline(&self) -> Option<Instant>;

    fn cancel_pending(&mut self);
}

impl<M: Matcher> KeyListener for KeybindingsHandler<M> {
    fn on_event(&mut self, event: &InputEvent, now: Instant) {
        self.handle_event_at(event, now);
    }

    fn poll_timers(&mut self, now: Instant) {
        self.poll_timers_at(now);
    }

    fn next_deadline(&self) -> Option<Instant> {
        KeybindingsHandler::next_deadline(self)
    }

    fn cancel_pending(&mut self) {
        KeybindingsHandler::cancel_pending(self);
    }
}

type SharedListener = Arc<Mutex<dyn KeyListener>>;

struct Listener {
    id: u64,
    kind: EventKind,
    handler: SharedListener,
}

/// A place key events are dispatched to, such as a window or a terminal.
///
/// Clones share the same listener list.
#[derive(Clone, Default)]
pub struct EventTarget {
    listeners: Arc<Mutex<Vec<Listener>>>,
    next_id: Arc<AtomicU64>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind` events and return its id
    pub fn add_listener(&self, kind: EventKind, handler: SharedListener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push(Listener { id, kind, handler });
        log::debug!("Added {} listener {}", kind, id);
        id
    }

    /// Remove a listener. Returns false when it was already gone.
    pub fn remove_listener(&self, id: u64) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        let removed = listeners.len() != before;
        if removed {
            log::debug!("Removed listener {}", id);
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn dispatch(&self, event: &InputEvent) {
        self.dispatch_at(event, Instant::now());
    }

    /// Deliver an event to every listener registered for its kind
    pub fn dispatch_at(&self, event: &InputEvent, now: Instant) {
        // Callbacks may subscribe or unsubscribe, so never hold the list lock
        // while a handler runs
        let handlers: Vec<SharedListener> = self
            .listeners
            .lock()
            .iter()
            .filter(|listener| listener.kind == event.kind())
            .map(|listener| Arc::clone(&listener.handler))
            .collect();
        for handler in handlers {
            handler.lock().on_event(event, now);
        }
    }

    pub fn poll_timers(&self) {
        self.poll_timers_at(Instant::now());
    }

    /// Poll the timers of every listener
    pub fn poll_timers_at(&self, now: Instant) {
        for handler in self.snapshot() {
            handler.lock().poll_timers(now);
        }
    }

    /// Earliest deadline across all listeners
    pub fn next_deadline(&self) -> Option<Instant> {
        self.snapshot()
            .iter()
            .filter_map(|handler| handler.lock().next_deadline())
            .min()
    }

    fn snapshot(&self) -> Vec<SharedListener> {
        self.listeners
            .lock()
            .iter()
            .map(|listener| Arc::clone(&listener.handler))
            .collect()
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Subscribe `map` to `target`.
///
/// The binding strings are parsed once here. The subscription stays active
/// until the returned guard is dropped or [`Subscription::unsubscribe`] is called.
///
/// # Examples
/// ```
/// use keyseq_core::{subscribe, EventTarget, KeyBindingMap, KeyBindingOptions, KeyboardEvent};
///
/// let target = EventTarget::new();
/// let map = KeyBindingMap::new().bind("Shift+D", |_| println!("delete"));
/// let subscription = subscribe(&target, map, KeyBindingOptions::default());
///
/// target.dispatch(&KeyboardEvent::key_down("x", "KeyX").into());
/// subscription.unsubscribe();
/// assert_eq!(target.listener_count(), 0);
/// ```
pub fn subscribe(
    target: &EventTarget,
    map: KeyBindingMap,
    options: KeyBindingOptions,
) -> Subscription {
    let handler = create_keybindings_handler(map, &options);
    Subscription::attach(target, options.event, handler)
}

/// Subscribe a nested binding map, matched with a chord tree
pub fn subscribe_scoped(
    target: &EventTarget,
    map: ScopedBindingMap,
    options: KeyBindingOptions,
) -> Subscription {
    let handler = create_scoped_handler(map, &options);
    Subscription::attach(target, options.event, handler)
}

/// Guard for an active subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    target: EventTarget,
    id: u64,
    handler: SharedListener,
    detached: Arc<AtomicBool>,
}

impl Subscription {
    fn attach<M: Matcher + 'static>(
        target: &EventTarget,
        kind: EventKind,
        handler: KeybindingsHandler<M>,
    ) -> Self {
        let detached = handler.detach_flag();
        let handler: SharedListener = Arc::new(Mutex::new(handler));
        let id = target.add_listener(kind, Arc::clone(&handler));
        Self {
            target: target.clone(),
            id,
            handler,
            detached,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.detached.load(Ordering::Acquire)
    }

    /// Detach the listener and cancel its timers
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detached.store(true, Ordering::Release);
        self.target.remove_listener(self.id);
        // Locked when dropped from inside one of its own callbacks; the
        // handler then releases its timers once the callback returns
        if let Some(mut handler) = self.handler.try_lock() {
            handler.cancel_pending();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyboardEvent;
    use crate::modifier::Platform;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn options() -> KeyBindingOptions {
        KeyBindingOptions::default().with_platform(Platform::Other)
    }

    fn key(k: &str) -> InputEvent {
        KeyboardEvent::key_down(k, format!("Key{}", k.to_uppercase())).into()
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnMut(&KeyboardEvent) + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move |_: &KeyboardEvent| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_by_event_kind() {
        let target = EventTarget::new();
        let (down, on_down) = counter();
        let (up, on_up) = counter();
        let _a = subscribe(&target, KeyBindingMap::new().bind("a", on_down), options());
        let _b = subscribe(
            &target,
            KeyBindingMap::new().bind("a", on_up),
            options().with_event(EventKind::KeyUp),
        );

        target.dispatch(&key("a"));
        assert_eq!(down.load(Ordering::SeqCst), 1);
        assert_eq!(up.load(Ordering::SeqCst), 0);

        target.dispatch(&KeyboardEvent::key_up("a", "KeyA").into());
        assert_eq!(up.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let target = EventTarget::new();
        let (count, cb) = counter();
        {
            let subscription = subscribe(&target, KeyBindingMap::new().bind("a", cb), options());
            assert!(subscription.is_active());
            assert_eq!(target.listener_count(), 1);
        }
        assert_eq!(target.listener_count(), 0);
        target.dispatch(&key("a"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_cancels_timers() {
        let target = EventTarget::new();
        let (count, cb) = counter();
        let map = KeyBindingMap::new().bind("g g", cb).bind("g g g", |_| {});
        let subscription = subscribe(&target, map, options());
        let start = Instant::now();

        target.dispatch_at(&key("g"), start);
        target.dispatch_at(&key("g"), start + Duration::from_millis(10));
        assert!(target.next_deadline().is_some());

        subscription.unsubscribe();
        assert!(target.next_deadline().is_none());
        target.poll_timers_at(start + Duration::from_secs(5));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_from_own_callback() {
        let target = EventTarget::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::default();
        let (count, mut cb) = counter();

        let inner = Arc::clone(&slot);
        let map = KeyBindingMap::new()
            .bind("Shift+KeyA", move |_| {
                inner.lock().take();
            })
            .bind("Shift+Shift+KeyA", move |event| cb(event));
        *slot.lock() = Some(subscribe(&target, map, options()));

        let event = KeyboardEvent::key_down("A", "KeyA").with_modifiers(crate::Modifiers::SHIFT);
        target.dispatch(&event.into());

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(target.listener_count(), 0);
    }
}
