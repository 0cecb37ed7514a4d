// Keyseq Sequence Matcher
// Flat matcher that evaluates every binding against the full history

use crate::binding::{Binding, MatchState};
use crate::matcher::{Matcher, Verdict};
use crate::modifier::Modifiers;
use crate::press::KeyPress;
use crate::state::History;

/// Matcher that re-evaluates every registered binding on each press
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    bindings: Vec<Binding>,
    history: History,
    tracked: Modifiers,
}

impl SequenceMatcher {
    pub fn new(bindings: Vec<Binding>, tracked: Modifiers) -> Self {
        Self {
            bindings,
            history: History::new(),
            tracked,
        }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

impl Matcher for SequenceMatcher {
    fn advance(&mut self, press: KeyPress) -> Verdict {
        log::trace!("Sequence matcher press: {}", press);
        self.history.push(press, self.tracked);

        let mut verdict = Verdict::default();
        let mut exact = false;
        let mut awaiting = false;
        for (id, binding) in self.bindings.iter().enumerate() {
            match binding.evaluate(self.history.as_slice(), self.tracked) {
                MatchState::Matched => {
                    verdict.matched.push(id);
                    exact = true;
                }
                MatchState::Possible => {
                    verdict.possible = true;
                    exact = true;
                }
                MatchState::Awaiting => {
                    verdict.possible = true;
                    awaiting = true;
                }
                MatchState::Dead => {}
            }
        }
        self.history.set_provisional(awaiting && !exact);

        if !verdict.possible {
            log::trace!("No binding possible after {} presses, resetting", self.history.len());
            self.history.clear();
        }
        verdict
    }

    fn reset(&mut self) {
        self.history.clear();
    }

    fn history(&self) -> &[KeyPress] {
        self.history.as_slice()
    }

    fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}
