// Keyseq Scoped Matcher
// Bindings folded into an immutable chord tree, walked with a frontier stack

use smallvec::SmallVec;

use crate::binding::Binding;
use crate::matcher::{BindingId, Matcher, Verdict};
use crate::modifier::Modifiers;
use crate::press::{Chord, KeyPress};
use crate::state::History;

/// Index of a node in a [`BindingTree`]
pub type NodeId = usize;

const ROOT: NodeId = 0;

type Frontier = SmallVec<[NodeId; 4]>;

#[derive(Debug, Clone)]
struct Node {
    /// `None` only for the root
    chord: Option<Chord>,
    children: SmallVec<[NodeId; 4]>,
    /// Bindings that end at this node
    bindings: SmallVec<[BindingId; 1]>,
}

impl Node {
    fn new(chord: Option<Chord>) -> Self {
        Self {
            chord,
            children: SmallVec::new(),
            bindings: SmallVec::new(),
        }
    }
}

/// Arena tree of chords. Bindings sharing a prefix share its nodes.
#[derive(Debug, Clone)]
pub struct BindingTree {
    nodes: Vec<Node>,
    binding_count: usize,
}

impl BindingTree {
    pub fn from_bindings(bindings: &[Binding]) -> Self {
        let mut tree = Self {
            nodes: vec![Node::new(None)],
            binding_count: bindings.len(),
        };
        for (id, binding) in bindings.iter().enumerate() {
            let mut node = ROOT;
            for chord in binding.chords() {
                node = tree.child_for(node, chord);
            }
            tree.nodes[node].bindings.push(id);
        }
        tree
    }

    fn child_for(&mut self, parent: NodeId, chord: &Chord) -> NodeId {
        let existing = self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].chord.as_ref() == Some(chord));
        if let Some(child) = existing {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(Node::new(Some(chord.clone())));
        self.nodes[parent].children.push(child);
        child
    }

    /// Total nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn binding_count(&self) -> usize {
        self.binding_count
    }

    fn chord(&self, node: NodeId) -> Option<&Chord> {
        self.nodes[node].chord.as_ref()
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    fn bindings_at(&self, node: NodeId) -> &[BindingId] {
        &self.nodes[node].bindings
    }
}

/// Matcher over a [`BindingTree`].
///
/// `frontiers[i]` holds the nodes reached by matching history entries `0..=i`
/// exactly. The tree itself is never modified.
#[derive(Debug, Clone)]
pub struct ScopedMatcher {
    tree: BindingTree,
    history: History,
    frontiers: Vec<Frontier>,
    tracked: Modifiers,
}

impl ScopedMatcher {
    pub fn new(bindings: &[Binding], tracked: Modifiers) -> Self {
        Self::from_tree(BindingTree::from_bindings(bindings), tracked)
    }

    pub fn from_tree(tree: BindingTree, tracked: Modifiers) -> Self {
        Self {
            tree,
            history: History::new(),
            frontiers: Vec::new(),
            tracked,
        }
    }

    pub fn tree(&self) -> &BindingTree {
        &self.tree
    }

    /// Nodes reached by the current history (the root when idle)
    pub fn frontier(&self) -> &[NodeId] {
        match self.frontiers.last() {
            Some(frontier) => frontier,
            None => std::slice::from_ref(&ROOT),
        }
    }

    fn clear(&mut self) {
        self.history.clear();
        self.frontiers.clear();
    }
}

impl Matcher for ScopedMatcher {
    fn advance(&mut self, press: KeyPress) -> Verdict {
        log::trace!("Scoped matcher press: {}", press);
        let bare_modifier = self.tracked.is_modifier_key(&press.key);
        if self.history.push(press, self.tracked) {
            self.frontiers.pop();
        }
        let Some(press) = self.history.last() else {
            return Verdict::default();
        };

        let mut next = Frontier::new();
        let mut provisional = false;
        for &node in self.frontier() {
            for &child in self.tree.children(node) {
                let Some(chord) = self.tree.chord(child) else {
                    continue;
                };
                if chord.matches(press) {
                    next.push(child);
                } else if bare_modifier && chord.awaits(press) {
                    provisional = true;
                }
            }
        }

        let mut verdict = Verdict {
            possible: provisional || next.iter().any(|&n| !self.tree.children(n).is_empty()),
            ..Verdict::default()
        };
        for &node in &next {
            verdict.matched.extend_from_slice(self.tree.bindings_at(node));
        }
        verdict.matched.sort_unstable();
        verdict.matched.dedup();

        if verdict.possible {
            self.history.set_provisional(next.is_empty());
            self.frontiers.push(next);
        } else {
            log::trace!("No scope continues after {} presses, resetting", self.history.len());
            self.clear();
        }
        verdict
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn history(&self) -> &[KeyPress] {
        self.history.as_slice()
    }

    fn binding_count(&self) -> usize {
        self.tree.binding_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_binding;
    use crate::matcher::SequenceMatcher;
    use crate::modifier::Platform;

    fn bindings(list: &[&str]) -> Vec<Binding> {
        list.iter().map(|b| parse_binding(b, Platform::Other)).collect()
    }

    fn key(key: &str) -> KeyPress {
        KeyPress::new(Modifiers::NONE, key, format!("Key{}", key.to_uppercase()))
    }

    fn ctrl() -> KeyPress {
        KeyPress::new(Modifiers::CONTROL, "Control", "ControlLeft")
    }

    fn ctrl_key(key: &str) -> KeyPress {
        KeyPress::new(Modifiers::CONTROL, key, format!("Key{}", key.to_uppercase()))
    }

    #[test]
    fn test_shared_prefixes_share_nodes() {
        let tree = BindingTree::from_bindings(&bindings(&["g g", "g g g", "g t"]));
        // root, g, g g, g g g, g t
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.binding_count(), 3);
    }

    #[test]
    fn test_frontier_moves_and_resets() {
        let mut m = ScopedMatcher::new(&bindings(&["g t"]), Modifiers::ALL);
        assert_eq!(m.frontier(), &[ROOT]);

        let verdict = m.advance(key("g"));
        assert!(verdict.possible);
        assert_ne!(m.frontier(), &[ROOT]);

        let verdict = m.advance(key("t"));
        assert_eq!(verdict.matched.as_slice(), &[0]);
        assert_eq!(m.frontier(), &[ROOT]);
        assert!(m.history().is_empty());
    }

    #[test]
    fn test_held_modifier_keeps_scope() {
        let mut m = ScopedMatcher::new(&bindings(&["g Control+k"]), Modifiers::ALL);
        m.advance(key("g"));
        assert!(m.advance(ctrl()).possible);
        let verdict = m.advance(ctrl_key("k"));
        assert_eq!(verdict.matched.as_slice(), &[0]);
    }

    #[test]
    fn test_released_modifier_leaves_scope() {
        let mut m = ScopedMatcher::new(&bindings(&["Control+KeyU", "g t"]), Modifiers::ALL);
        assert!(m.advance(ctrl()).possible);
        assert!(!m.history().is_empty());

        assert!(m.advance(key("g")).possible);
        assert_eq!(m.history().len(), 1);
        assert_eq!(m.advance(key("t")).matched.as_slice(), &[1]);
    }

    #[test]
    fn test_same_verdicts_as_flat_matcher() {
        let list = bindings(&[
            "g g",
            "g g g",
            "g t",
            "Shift+D",
            "y e e t",
            "Control+KeyU",
            "g Control+k",
            "Control+Alt+s a",
            "Ctrl+x",
            "e t",
            "Shift+KeyA",
            "Control+Control x",
        ]);
        let inputs: Vec<Vec<KeyPress>> = vec![
            vec![key("g"), key("g"), key("g")],
            vec![key("g"), key("t"), key("x")],
            vec![key("y"), key("e"), key("e"), key("t")],
            vec![key("y"), key("e"), key("t")],
            vec![KeyPress::new(Modifiers::SHIFT, "D", "KeyD")],
            vec![ctrl(), ctrl_key("u")],
            vec![key("g"), ctrl(), ctrl_key("k"), key("g")],
            vec![key("g"), ctrl(), key("k")],
            vec![
                ctrl(),
                KeyPress::new(Modifiers::CONTROL | Modifiers::ALT, "Alt", "AltLeft"),
                KeyPress::new(Modifiers::CONTROL | Modifiers::ALT, "s", "KeyS"),
                key("a"),
            ],
            vec![ctrl_key("x"), key("e"), key("t")],
            vec![ctrl(), key("y"), key("e"), key("e"), key("t")],
            vec![key("g"), ctrl(), key("t")],
            vec![
                KeyPress::new(Modifiers::SHIFT, "Shift", "ShiftLeft"),
                key("a"),
                KeyPress::new(Modifiers::SHIFT, "Shift", "ShiftLeft"),
                KeyPress::new(Modifiers::SHIFT, "A", "KeyA"),
            ],
            vec![ctrl(), key("x")],
        ];

        for presses in inputs {
            let mut flat = SequenceMatcher::new(list.clone(), Modifiers::ALL);
            let mut scoped = ScopedMatcher::new(&list, Modifiers::ALL);
            for press in presses {
                let expected = flat.advance(press.clone());
                let actual = scoped.advance(press.clone());
                assert_eq!(actual, expected, "diverged on {}", press);
                assert_eq!(scoped.history(), flat.history());
            }
        }
    }
}
