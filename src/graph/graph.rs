// src/graph/graph.rs
//! The graph owner: node arena, fragment arena, name index, and the
//! edge-insertion primitives with cycle prevention and incremental
//! height/depth maintenance.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GraphError, Result};

use super::fragment::{FragId, Fragment, Fragments};
use super::node::{EdgeLabel, Node, NodeId, NodeKind};

/// An underspecified dependency graph over one tokenized utterance.
///
/// Owns every node ever constructed. Nodes are never destroyed; bundles
/// unified away and removed coordination nodes merely leave the `active`
/// working set (aliased bundles stay resolvable by name).
#[derive(Debug)]
pub struct Graph {
    /// The ordered token universe.
    pub tokens: Vec<String>,
    nodes: Vec<Node>,
    fragments: Fragments,
    /// Display name -> node. Never reassigns an existing name.
    names: BTreeMap<String, NodeId>,
    /// The working node set: everything still part of the graph.
    active: BTreeSet<NodeId>,
    root: NodeId,
    /// Token -> owning lexical node. A token belongs to at most one.
    pub(crate) token2lex: BTreeMap<String, NodeId>,
    /// Anaphoric links by display name, stored verbatim.
    pub(crate) anaph_links: BTreeSet<(String, String)>,
}

impl Graph {
    /// Creates an empty graph over `tokens` containing only the root `$$`.
    #[must_use]
    pub fn new(tokens: Vec<String>) -> Self {
        let mut graph = Self {
            tokens,
            nodes: Vec::new(),
            fragments: Fragments::new(),
            names: BTreeMap::new(),
            active: BTreeSet::new(),
            root: NodeId(0),
            token2lex: BTreeMap::new(),
            anaph_links: BTreeSet::new(),
        };
        let root = graph.new_node("$$", NodeKind::Root);
        graph.root = root;
        graph.names.insert("W($$)".to_string(), root);
        graph
    }

    /// Allocates a node (with its singleton fragment) and marks it active.
    pub(crate) fn new_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let frag = self.fragments.singleton(id);
        self.nodes.push(Node::new(name.into(), kind, frag));
        self.active.insert(id);
        id
    }

    /// Registers a display name for a node. Names are write-once.
    pub(crate) fn index_name(&mut self, display: String, id: NodeId) -> Result<()> {
        if let Some(existing) = self.names.get(&display) {
            return Err(GraphError::Construction(format!(
                "cannot reassign name {display:?} (already bound to {})",
                self.node(*existing).display_name()
            )));
        }
        self.names.insert(display, id);
        Ok(())
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    // Indexing is safe throughout: NodeIds are only created by new_node and
    // index into the append-only arena.
    #[allow(clippy::indexing_slicing)]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[allow(clippy::indexing_slicing)]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Follows a bundle alias to its canonical node, if any. Redirects
    /// never chain, so one step suffices.
    #[must_use]
    pub fn resolve(&self, id: NodeId) -> NodeId {
        match self.node(id).kind {
            NodeKind::Bundle {
                redirect: Some(canonical),
                ..
            } => canonical,
            _ => id,
        }
    }

    /// Looks a node up by its record name (`W(x)`, `MW(x)`, `CBB1`, ...).
    #[must_use]
    pub fn id_by_name(&self, display: &str) -> Option<NodeId> {
        self.names.get(display).copied()
    }

    /// A node's record name; an aliased bundle reports its canonical name.
    #[must_use]
    pub fn display_name(&self, id: NodeId) -> String {
        self.node(self.resolve(id)).display_name()
    }

    #[must_use]
    pub fn height(&self, id: NodeId) -> usize {
        self.node(self.resolve(id)).height
    }

    #[must_use]
    pub fn depth(&self, id: NodeId) -> i64 {
        self.node(self.resolve(id)).depth
    }

    /// The working node set (aliases and removed nodes excluded).
    #[must_use]
    pub fn active(&self) -> &BTreeSet<NodeId> {
        &self.active
    }

    pub(crate) fn deactivate(&mut self, id: NodeId) {
        self.active.remove(&id);
    }

    #[must_use]
    pub fn fragment(&self, id: NodeId) -> &Fragment {
        self.fragments.get(self.node(self.resolve(id)).frag)
    }

    pub(crate) fn fragment_mut(&mut self, id: FragId) -> &mut Fragment {
        self.fragments.get_mut(id)
    }

    /// All real (non-bundle) nodes in the working set.
    #[must_use]
    pub fn firm_nodes(&self) -> BTreeSet<NodeId> {
        self.active
            .iter()
            .copied()
            .filter(|&n| self.node(n).is_firm())
            .collect()
    }

    /// A bundle's computed top-candidate set, resolved through aliases.
    #[must_use]
    pub fn top_candidates(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        match &self.node(self.resolve(id)).kind {
            NodeKind::Bundle { top_candidates, .. } => top_candidates.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn set_top_candidates(&mut self, id: NodeId, set: BTreeSet<NodeId>) {
        let id = self.resolve(id);
        if let NodeKind::Bundle { top_candidates, .. } = &mut self.node_mut(id).kind {
            *top_candidates = Some(set);
        }
    }

    /// A node's computed parent-candidate set, resolved through aliases.
    #[must_use]
    pub fn parent_candidates(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.node(self.resolve(id)).parent_candidates.as_ref()
    }

    pub(crate) fn set_parent_candidates(&mut self, id: NodeId, set: BTreeSet<NodeId>) {
        let id = self.resolve(id);
        self.node_mut(id).parent_candidates = Some(set);
    }

    /// A bundle's member set (canonical through aliases).
    #[must_use]
    pub fn members_of(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        match &self.node(self.resolve(id)).kind {
            NodeKind::Bundle { members, .. } => Some(members),
            _ => None,
        }
    }

    /// True if `to` is reachable from `from` via child edges (including
    /// `from == to`).
    #[must_use]
    pub fn reachable(&self, from: NodeId, to: NodeId) -> bool {
        let target = self.resolve(to);
        let mut stack = vec![self.resolve(from)];
        let mut seen = BTreeSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if seen.insert(id) {
                for &c in &self.node(id).children {
                    stack.push(self.resolve(c));
                }
            }
        }
        false
    }

    /// The strict descendant set of a node (alias-resolved ids).
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> BTreeSet<NodeId> {
        let start = self.resolve(id);
        let mut out = BTreeSet::new();
        let mut stack: Vec<NodeId> = self.node(start).children.iter().copied().collect();
        while let Some(c) = stack.pop() {
            let c = self.resolve(c);
            if out.insert(c) {
                stack.extend(self.node(c).children.iter().copied());
            }
        }
        out.remove(&start);
        out
    }

    /// The union of token sets over a node and its lexical descendants.
    #[must_use]
    pub fn token_yield(&self, id: NodeId) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut collect = |node: &Node| {
            if let NodeKind::Lexical { tokens } = &node.kind {
                out.extend(tokens.iter().cloned());
            }
        };
        collect(self.node(self.resolve(id)));
        for d in self.descendants(id) {
            collect(self.node(d));
        }
        out
    }

    /// Inserts `child` under `parent` with `label`.
    ///
    /// Rejects self-attachment and any attachment of the root outside a
    /// designated-bundle-top role; refuses to create a cycle. On success raises the
    /// parent's height (propagating upward), merges the two fragments, and
    /// recomputes depth for the whole merged fragment — one insertion can
    /// change which nodes are reachable from which roots, so depths are
    /// re-derived from scratch rather than incremented.
    ///
    /// # Errors
    /// `GraphError::Construction` on an illegal endpoint pair,
    /// `GraphError::Cycle` if `child` already reaches `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, label: EdgeLabel) -> Result<()> {
        let parent = self.resolve(parent);
        let child = self.resolve(child);
        if parent == child {
            return Err(GraphError::Construction(format!(
                "cannot attach {} to itself",
                self.node(parent).display_name()
            )));
        }
        if self.node(child).is_root()
            && !(self.node(parent).is_bundle() && label == EdgeLabel::Top)
        {
            return Err(GraphError::Construction(
                "the root may only be pulled into a bundle as its designated top".to_string(),
            ));
        }
        if self.reachable(child, parent) {
            return Err(GraphError::Cycle {
                parent: self.node(parent).display_name(),
                child: self.node(child).display_name(),
            });
        }

        self.node_mut(parent).children.insert(child);
        self.node_mut(parent).child_edges.insert((child, label));
        self.node_mut(child).parents.insert(parent);
        self.node_mut(child).parent_edges.insert((parent, label));
        if label == EdgeLabel::Plain {
            if let NodeKind::Bundle {
                external_children, ..
            } = &mut self.node_mut(parent).kind
            {
                external_children.insert(child);
            }
        }

        let raised = self.node(child).height + 1;
        self.set_min_height(parent, raised);

        let parent_frag = self.node(parent).frag;
        let child_frag = self.node(child).frag;
        self.merge_fragments(parent_frag, child_frag);
        let frag = self.node(parent).frag;
        self.fragments.get_mut(frag).roots.remove(&child);
        self.recompute_depths(frag);
        Ok(())
    }

    /// Adds `node` to a bundle's member set and wires the member edge
    /// (`cbbhead` when `specified_top`, `unspec` otherwise).
    ///
    /// # Errors
    /// `GraphError::Construction` if the target is not a bundle or already
    /// has a different designated top; everything `add_child` rejects.
    pub fn add_member(&mut self, bundle: NodeId, node: NodeId, specified_top: bool) -> Result<()> {
        let bundle = self.resolve(bundle);
        let node = self.resolve(node);
        let bundle_name = self.node(bundle).display_name();
        let NodeKind::Bundle { members, top, .. } = &mut self.node_mut(bundle).kind else {
            return Err(GraphError::Construction(format!(
                "{bundle_name} is not a bundle and cannot take members"
            )));
        };
        members.insert(node);
        if specified_top {
            if top.is_some() && *top != Some(node) {
                return Err(GraphError::Construction(format!(
                    "bundle {bundle_name} can only have one specified top"
                )));
            }
            *top = Some(node);
        }
        let label = if specified_top {
            EdgeLabel::Top
        } else {
            EdgeLabel::Unspec
        };
        self.add_child(bundle, node, label)
    }

    /// Raises a node's height to at least `h` and propagates the increase
    /// through every transitive parent. Idempotent once heights dominate.
    pub(crate) fn set_min_height(&mut self, id: NodeId, h: usize) {
        let mut stack = vec![(id, h)];
        while let Some((id, h)) = stack.pop() {
            let id = self.resolve(id);
            if self.node(id).height < h {
                self.node_mut(id).height = h;
                let parents: Vec<NodeId> = self.node(id).parents.iter().copied().collect();
                for p in parents {
                    stack.push((p, h + 1));
                }
            }
        }
    }

    /// Repoints every absorbed node before returning, so no node observes a
    /// stale fragment after the merge.
    pub(crate) fn merge_fragments(&mut self, into: FragId, from: FragId) {
        for moved in self.fragments.merge(into, from) {
            self.node_mut(moved).frag = into;
        }
    }

    /// Resets every depth in the fragment and re-derives them top-down
    /// from the current root set.
    pub(crate) fn recompute_depths(&mut self, frag: FragId) {
        let members: Vec<NodeId> = self.fragments.get(frag).nodes.iter().copied().collect();
        for n in &members {
            let n = self.resolve(*n);
            self.node_mut(n).depth = -1;
        }
        let roots: Vec<NodeId> = self.fragments.get(frag).roots.iter().copied().collect();
        for r in roots {
            self.set_min_depth(r, 0);
        }
    }

    fn set_min_depth(&mut self, id: NodeId, d: i64) {
        let mut stack = vec![(id, d)];
        while let Some((id, d)) = stack.pop() {
            let id = self.resolve(id);
            if self.node(id).depth < d {
                self.node_mut(id).depth = d;
                let children: Vec<NodeId> = self.node(id).children.iter().copied().collect();
                for c in children {
                    stack.push((c, d + 1));
                }
            }
        }
    }
}
