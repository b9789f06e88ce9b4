// src/graph/fragment.rs
//! Connected-component ("fragment") bookkeeping.
//!
//! Each fragment records the roots (parentless nodes) and the full node set
//! of one connected component. Fragments only ever grow: inserting an edge
//! that joins two components merges the later one into the survivor, and
//! every absorbed node is repointed before the merge returns.

use std::collections::BTreeSet;

use super::node::NodeId;

/// Index of a fragment in the arena. A merged-away fragment keeps its slot
/// but is drained; no live node points at it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FragId(pub usize);

/// One connected component. Invariant: `roots` is a subset of `nodes`.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    pub roots: BTreeSet<NodeId>,
    pub nodes: BTreeSet<NodeId>,
}

/// Arena of fragments.
#[derive(Debug, Default)]
pub struct Fragments {
    frags: Vec<Fragment>,
}

// Indexing is safe here: FragIds are only handed out by singleton() and
// every live node's frag field is kept current by merge().
#[allow(clippy::indexing_slicing)]
impl Fragments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the singleton fragment for a freshly constructed node.
    pub fn singleton(&mut self, node: NodeId) -> FragId {
        let id = FragId(self.frags.len());
        self.frags.push(Fragment {
            roots: [node].into(),
            nodes: [node].into(),
        });
        id
    }

    #[must_use]
    pub fn get(&self, id: FragId) -> &Fragment {
        &self.frags[id.0]
    }

    pub fn get_mut(&mut self, id: FragId) -> &mut Fragment {
        &mut self.frags[id.0]
    }

    /// Merges `from` into `into` (set union, in place) and returns the
    /// absorbed node set so the caller can repoint each node's fragment
    /// reference before anything else reads it. A self-merge is a no-op.
    pub fn merge(&mut self, into: FragId, from: FragId) -> Vec<NodeId> {
        if into == from {
            return Vec::new();
        }
        let absorbed = std::mem::take(&mut self.frags[from.0]);
        let survivor = &mut self.frags[into.0];
        survivor.roots.extend(absorbed.roots.iter().copied());
        survivor.nodes.extend(absorbed.nodes.iter().copied());
        absorbed.nodes.into_iter().collect()
    }
}
