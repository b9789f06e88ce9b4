// src/graph/node.rs
//! Core node types for the underspecified dependency graph.
//!
//! Nodes live in an arena owned by [`crate::graph::Graph`] and refer to each
//! other only through [`NodeId`] indices; there are no direct references.
//! A bundle that has been unified away keeps its arena slot but carries a
//! `redirect` to the canonical bundle, and every topology read resolves
//! through that indirection.

use std::collections::BTreeSet;

use super::fragment::FragId;

/// Index of a node in the graph's arena. Ids are assigned in construction
/// order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Semantics carried by an edge, beyond bare parent/child topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeLabel {
    /// Ordinary dependency attachment (wire label: null).
    Plain,
    /// Designated internal head of a bundle (wire label: "cbbhead").
    Top,
    /// Undesignated bundle member (wire label: "unspec").
    Unspec,
    /// Conjunct of a coordination node (wire label: "Conj").
    Conj,
    /// Anaphoric link, stored but not part of the tree (wire label: "Anaph").
    Anaph,
}

impl EdgeLabel {
    /// The label as it appears in the record; `None` for a plain edge.
    #[must_use]
    pub fn wire_name(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Top => Some("cbbhead"),
            Self::Unspec => Some("unspec"),
            Self::Conj => Some("Conj"),
            Self::Anaph => Some("Anaph"),
        }
    }

}

/// Variant-specific node data.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The unique root, named `$$`. Never has a parent.
    Root,
    /// Owns a non-empty token set, disjoint across all lexical nodes.
    Lexical { tokens: BTreeSet<String> },
    /// Coordination scaffolding; removed by the simplifier.
    Coordination {
        coords: BTreeSet<NodeId>,
        conjuncts: BTreeSet<NodeId>,
    },
    /// A CBB: members with at most one designated top, plus ordinary
    /// external children that modify the bundle as a whole.
    Bundle {
        members: BTreeSet<NodeId>,
        external_children: BTreeSet<NodeId>,
        top: Option<NodeId>,
        /// Real nodes that could be this bundle's resolved head.
        /// Computed by the upward pass.
        top_candidates: Option<BTreeSet<NodeId>>,
        /// Canonical bundle this one was unified into, if any. Redirects
        /// never chain: unification always targets an earlier canonical.
        redirect: Option<NodeId>,
    },
}

/// A node: shared topology plus its [`NodeKind`].
#[derive(Debug, Clone)]
pub struct Node {
    /// Inner name for lexical nodes (`x` of `W(x)`), full name otherwise.
    pub name: String,
    pub kind: NodeKind,
    pub children: BTreeSet<NodeId>,
    pub parents: BTreeSet<NodeId>,
    pub child_edges: BTreeSet<(NodeId, EdgeLabel)>,
    pub parent_edges: BTreeSet<(NodeId, EdgeLabel)>,
    /// Length of the longest path from this node down to a leaf.
    pub height: usize,
    /// Length of the longest path from a fragment root to this node;
    /// -1 while unset.
    pub depth: i64,
    pub frag: FragId,
    /// Real nodes this one could attach to in some full resolution.
    /// Computed by the downward pass; stays `None` for the root.
    pub parent_candidates: Option<BTreeSet<NodeId>>,
}

impl Node {
    #[must_use]
    pub fn new(name: String, kind: NodeKind, frag: FragId) -> Self {
        Self {
            name,
            kind,
            children: BTreeSet::new(),
            parents: BTreeSet::new(),
            child_edges: BTreeSet::new(),
            parent_edges: BTreeSet::new(),
            height: 0,
            depth: -1,
            frag,
            parent_candidates: None,
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    #[must_use]
    pub fn is_lexical(&self) -> bool {
        matches!(self.kind, NodeKind::Lexical { .. })
    }

    #[must_use]
    pub fn is_coord(&self) -> bool {
        matches!(self.kind, NodeKind::Coordination { .. })
    }

    #[must_use]
    pub fn is_bundle(&self) -> bool {
        matches!(self.kind, NodeKind::Bundle { .. })
    }

    /// Anything but a bundle: a node whose identity is fixed.
    #[must_use]
    pub fn is_firm(&self) -> bool {
        !self.is_bundle()
    }

    /// The name as it appears in records: `W(x)` / `MW(x)` for lexical
    /// nodes, the stored name otherwise.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.kind {
            NodeKind::Root => "W($$)".to_string(),
            NodeKind::Lexical { tokens } => {
                let prefix = if tokens.len() > 1 { "MW" } else { "W" };
                format!("{prefix}({})", self.name)
            }
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        let frag = FragId(0);
        let root = Node::new("$$".into(), NodeKind::Root, frag);
        assert_eq!(root.display_name(), "W($$)");

        let single = Node::new(
            "cat".into(),
            NodeKind::Lexical {
                tokens: ["cat".to_string()].into(),
            },
            frag,
        );
        assert_eq!(single.display_name(), "W(cat)");

        let multi = Node::new(
            "a_lot".into(),
            NodeKind::Lexical {
                tokens: ["a".to_string(), "lot".to_string()].into(),
            },
            frag,
        );
        assert_eq!(multi.display_name(), "MW(a_lot)");
    }

    #[test]
    fn test_wire_names_round() {
        assert_eq!(EdgeLabel::Plain.wire_name(), None);
        assert_eq!(EdgeLabel::Top.wire_name(), Some("cbbhead"));
        assert_eq!(EdgeLabel::Unspec.wire_name(), Some("unspec"));
    }
}
