// Keyseq Binding Type
// An ordered sequence of chords and its evaluation against press history

use std::fmt;

use smallvec::SmallVec;

use crate::modifier::Modifiers;
use crate::press::{Chord, KeyPress};

/// Classification of one binding against the current history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Every slot equals the history
    Matched,
    /// The history is a prefix of this binding
    Possible,
    /// The history is a prefix except for a trailing bare modifier press,
    /// which the next slot needs but which is not that slot yet
    Awaiting,
    /// The history cannot lead to this binding
    Dead,
}

/// A parsed binding: one chord, or several chords typed in order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    chords: SmallVec<[Chord; 2]>,
}

impl Binding {
    /// Create a binding from its chords.
    ///
    /// Returns `None` for an empty list; a binding always has at least one slot.
    pub fn from_chords(chords: impl IntoIterator<Item = Chord>) -> Option<Self> {
        let chords: SmallVec<[Chord; 2]> = chords.into_iter().collect();
        if chords.is_empty() {
            None
        } else {
            Some(Self { chords })
        }
    }

    /// Create a single-chord binding
    pub fn single(chord: Chord) -> Self {
        let mut chords = SmallVec::new();
        chords.push(chord);
        Self { chords }
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Check if this is a multi-chord sequence
    pub fn is_sequence(&self) -> bool {
        self.chords.len() > 1
    }

    /// Append the chords of `other` after this binding's chords
    pub fn concat(&self, other: &Binding) -> Binding {
        let mut chords = self.chords.clone();
        chords.extend(other.chords.iter().cloned());
        Binding { chords }
    }

    /// Evaluate this binding against the press history.
    ///
    /// Every entry but the last must equal its slot exactly. The last entry may
    /// instead be a bare modifier key (per `tracked`) whose modifiers are all
    /// required by the slot, giving [`MatchState::Awaiting`].
    pub fn evaluate(&self, history: &[KeyPress], tracked: Modifiers) -> MatchState {
        let Some((last, earlier)) = history.split_last() else {
            return MatchState::Dead;
        };
        if history.len() > self.chords.len() {
            return MatchState::Dead;
        }

        let prefix_equal = earlier
            .iter()
            .zip(self.chords.iter())
            .all(|(press, chord)| chord.matches(press));
        if !prefix_equal {
            return MatchState::Dead;
        }

        let slot = &self.chords[earlier.len()];
        if slot.matches(last) {
            if history.len() == self.chords.len() {
                MatchState::Matched
            } else {
                MatchState::Possible
            }
        } else if tracked.is_modifier_key(&last.key) && slot.awaits(last) {
            MatchState::Awaiting
        } else {
            MatchState::Dead
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.chords.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}
