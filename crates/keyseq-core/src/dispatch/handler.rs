// Keyseq Dispatch - Keybindings Handler
// Feeds key events to a matcher and fires or defers matched callbacks

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{BindingParser, KeyBindingOptions};
use crate::dispatch::bindings::{Callback, KeyBindingMap, ScopedBindingMap};
use crate::dispatch::timers::PendingTimers;
use crate::input::{key_press, EventFilter, InputEvent, KeyboardEvent};
use crate::matcher::{BindingId, Matcher, ScopedMatcher, SequenceMatcher};
use crate::modifier::Modifiers;
use crate::press::KeyPress;

/// Build a handler over a flat binding map.
///
/// Every binding string is parsed once here, for `options.platform`.
pub fn create_keybindings_handler(
    map: KeyBindingMap,
    options: &KeyBindingOptions,
) -> KeybindingsHandler<SequenceMatcher> {
    let mut parser = BindingParser::new(options.platform);
    let (bindings, entries): (Vec<_>, Vec<_>) = map
        .into_parsed(&mut parser)
        .into_iter()
        .map(|(binding, label, callback)| (binding, (label, callback)))
        .unzip();

    let matcher = SequenceMatcher::new(bindings, options.tracked_modifiers);
    KeybindingsHandler::with_matcher(matcher, entries, options)
}

/// Build a handler over a nested binding map, matched with a chord tree
pub fn create_scoped_handler(
    map: ScopedBindingMap,
    options: &KeyBindingOptions,
) -> KeybindingsHandler<ScopedMatcher> {
    let mut parser = BindingParser::new(options.platform);
    let (bindings, entries): (Vec<_>, Vec<_>) = map
        .into_parsed(&mut parser)
        .into_iter()
        .map(|(binding, label, callback)| (binding, (label, callback)))
        .unzip();

    let matcher = ScopedMatcher::new(&bindings, options.tracked_modifiers);
    KeybindingsHandler::with_matcher(matcher, entries, options)
}

struct Entry {
    label: String,
    callback: Callback,
}

/// Per-subscription dispatch state: matcher, callbacks and pending timers.
///
/// The handler is passive. Hosts feed it events with [`handle_event`] and call
/// [`poll_timers`] when [`next_deadline`] passes.
///
/// [`handle_event`]: KeybindingsHandler::handle_event
/// [`poll_timers`]: KeybindingsHandler::poll_timers
/// [`next_deadline`]: KeybindingsHandler::next_deadline
pub struct KeybindingsHandler<M: Matcher = SequenceMatcher> {
    matcher: M,
    entries: Vec<Entry>,
    timers: PendingTimers,
    timeout: Duration,
    tracked: Modifiers,
    filter: Option<Arc<dyn EventFilter>>,
    detached: Arc<AtomicBool>,
}

impl<M: Matcher> KeybindingsHandler<M> {
    /// Wrap a matcher. `entries` pairs a label with the callback of each binding,
    /// indexed like the matcher's bindings.
    pub fn with_matcher(
        matcher: M,
        entries: Vec<(String, Callback)>,
        options: &KeyBindingOptions,
    ) -> Self {
        debug_assert_eq!(matcher.binding_count(), entries.len());
        log::debug!(
            "Created keybindings handler: {} bindings, timeout {:?}",
            entries.len(),
            options.timeout
        );
        Self {
            matcher,
            entries: entries
                .into_iter()
                .map(|(label, callback)| Entry { label, callback })
                .collect(),
            timers: PendingTimers::new(),
            timeout: options.timeout,
            tracked: options.tracked_modifiers,
            filter: options.filter.clone(),
            detached: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        self.handle_event_at(event, Instant::now());
    }

    /// Process one event observed at `now`
    pub fn handle_event_at(&mut self, event: &InputEvent, now: Instant) {
        let Some(keyboard) = event.as_keyboard() else {
            log::trace!("Ignoring non-keyboard {} event", event.kind());
            return;
        };
        if let Some(filter) = &self.filter {
            if !filter.accepts(keyboard) {
                log::trace!("Event filtered out: {}", keyboard.key);
                return;
            }
        }

        // Timers that expired before this event still take effect first
        self.poll_timers_at(now);
        if self.is_detached() {
            return;
        }
        self.timers.cancel_all();

        let press = key_press(keyboard, self.tracked);
        let verdict = self.matcher.advance(press);

        if verdict.possible {
            let deadline = now + self.timeout;
            for &id in &verdict.matched {
                log::debug!(
                    "Deferring {} until longer sequences are ruled out",
                    self.label(id)
                );
                self.timers.defer(id, keyboard.clone(), deadline);
            }
            self.timers.arm_reset(deadline);
        } else {
            for &id in &verdict.matched {
                self.fire(id, keyboard);
            }
        }
        self.release_if_detached();
    }

    pub fn poll_timers(&mut self) {
        self.poll_timers_at(Instant::now());
    }

    /// Run deferred callbacks and the inactivity reset due at `now`
    pub fn poll_timers_at(&mut self, now: Instant) {
        let due = self.timers.take_due(now);
        for call in &due.calls {
            self.fire(call.binding, &call.event);
        }
        if due.reset {
            log::debug!(
                "Sequence timed out after {} presses",
                self.matcher.history().len()
            );
            self.matcher.reset();
        }
        self.release_if_detached();
    }

    /// Earliest instant at which [`poll_timers_at`](Self::poll_timers_at) has work
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Drop every pending timer and the history
    pub fn cancel_pending(&mut self) {
        self.timers.cancel_all();
        self.matcher.reset();
    }

    /// Stop firing callbacks for good and release every timer
    pub fn detach(&mut self) {
        self.detached.store(true, Ordering::Release);
        self.cancel_pending();
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    /// Shared flag that detaches this handler when set, usable while the
    /// handler itself is borrowed
    pub(crate) fn detach_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.detached)
    }

    /// Presses of the sequence in progress
    pub fn pending_sequence(&self) -> &[KeyPress] {
        self.matcher.history()
    }

    /// No sequence in progress and no timers pending
    pub fn is_idle(&self) -> bool {
        self.matcher.history().is_empty() && self.timers.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn binding_count(&self) -> usize {
        self.entries.len()
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    fn label(&self, id: BindingId) -> &str {
        self.entries.get(id).map_or("<unknown>", |e| e.label.as_str())
    }

    fn fire(&mut self, id: BindingId, event: &KeyboardEvent) {
        if self.is_detached() {
            return;
        }
        if let Some(entry) = self.entries.get_mut(id) {
            log::debug!("Firing {}", entry.label);
            (entry.callback)(event);
        }
    }

    fn release_if_detached(&mut self) {
        if self.is_detached() {
            self.cancel_pending();
        }
    }
}

impl<M: Matcher + fmt::Debug> fmt::Debug for KeybindingsHandler<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.entries.iter().map(|e| e.label.as_str()).collect();
        f.debug_struct("KeybindingsHandler")
            .field("matcher", &self.matcher)
            .field("bindings", &labels)
            .field("timers", &self.timers)
            .field("timeout", &self.timeout)
            .field("detached", &self.is_detached())
            .finish()
    }
}
