// Keyseq Matcher Module
// Incremental classification of key presses against registered bindings

pub mod scope;
pub mod sequence;

use smallvec::SmallVec;

use crate::press::KeyPress;

pub use scope::{BindingTree, NodeId, ScopedMatcher};
pub use sequence::SequenceMatcher;

/// Index of a binding in registration order
pub type BindingId = usize;

/// Outcome of feeding one press to a matcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// Bindings fully matched by the history, in registration order
    pub matched: SmallVec<[BindingId; 2]>,
    /// At least one binding could still be completed by later presses
    pub possible: bool,
}

impl Verdict {
    /// Nothing matched and nothing can
    pub fn is_dead(&self) -> bool {
        self.matched.is_empty() && !self.possible
    }
}

/// A state machine over press history.
///
/// Implementations clear their history themselves when a press leaves no
/// binding possible; timeouts are driven from outside through [`Matcher::reset`].
pub trait Matcher: Send {
    /// Record a press and classify every binding against the new history
    fn advance(&mut self, press: KeyPress) -> Verdict;

    /// Drop the history
    fn reset(&mut self);

    /// Presses recorded since the last reset
    fn history(&self) -> &[KeyPress];

    /// Number of bindings this matcher was built with
    fn binding_count(&self) -> usize;
}
