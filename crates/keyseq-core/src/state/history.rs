// Keyseq Press History
// The presses typed so far toward some binding

use smallvec::SmallVec;

use crate::modifier::Modifiers;
use crate::press::KeyPress;

/// Ordered presses since the last reset.
///
/// Holding several modifiers one after another produces several key events;
/// those are folded into a single entry so that `Control` then `Alt` then `s`
/// reads as one `Control+Alt+s` press.
///
/// A bare modifier entry that only some slot awaits is provisional: it is
/// replaced by the next press whether or not that press still holds it.
#[derive(Debug, Clone, Default)]
pub struct History {
    presses: SmallVec<[KeyPress; 4]>,
    provisional: bool,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a press.
    ///
    /// Returns true when the previous entry was replaced: either a bare
    /// modifier that the new press subsumes, or a provisional entry.
    pub fn push(&mut self, press: KeyPress, tracked: Modifiers) -> bool {
        let replaced = self.presses.last().is_some_and(|prev| {
            let collapsed = collapses_into(prev, &press, tracked);
            if !collapsed && self.provisional {
                log::trace!("Dropping released modifier {}", prev);
            }
            collapsed || self.provisional
        });
        if replaced {
            self.presses.pop();
        }
        self.presses.push(press);
        self.provisional = false;
        replaced
    }

    /// Mark the last entry as provisional until the next push
    pub fn set_provisional(&mut self, provisional: bool) {
        self.provisional = provisional && !self.presses.is_empty();
    }

    pub fn is_provisional(&self) -> bool {
        self.provisional
    }

    pub fn as_slice(&self) -> &[KeyPress] {
        &self.presses
    }

    pub fn last(&self) -> Option<&KeyPress> {
        self.presses.last()
    }

    pub fn len(&self) -> usize {
        self.presses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presses.is_empty()
    }

    pub fn clear(&mut self) {
        self.presses.clear();
        self.provisional = false;
    }
}

/// Check if `prev` is a bare modifier press whose modifiers are all still
/// held during `next`
pub fn collapses_into(prev: &KeyPress, next: &KeyPress, tracked: Modifiers) -> bool {
    tracked.is_modifier_key(&prev.key) && prev.mods.is_subset(next.mods)
}
