// src/graph/candidates.rs
//! The two-pass candidate propagation engine.
//!
//! `upward` computes, per bundle, the real nodes that could be its resolved
//! internal head. `downward` then computes, per node, the real nodes it
//! could attach to in some full resolution. Both passes are idempotent on
//! an unchanged graph.

use std::collections::BTreeSet;

use crate::error::{GraphError, Result};

use super::graph::Graph;
use super::node::{EdgeLabel, NodeId};

/// A node's contribution as a potential head: a bundle contributes its
/// top-candidates, a real node contributes itself. The increasing-height /
/// increasing-depth visit orders guarantee a referenced bundle has already
/// been computed.
fn tops_or_self(graph: &Graph, id: NodeId) -> BTreeSet<NodeId> {
    let id = graph.resolve(id);
    if graph.node(id).is_bundle() {
        graph.top_candidates(id).cloned().unwrap_or_default()
    } else {
        BTreeSet::from([id])
    }
}

/// Bottom-up pass: computes `topCandidates` for every bundle.
///
/// Bundles are visited in increasing height order (name tie-break) so a
/// bundle-valued member is always resolved before its container.
///
/// # Errors
/// `GraphError::Construction` when a bundle carries more than one
/// designated-top edge.
pub fn upward(graph: &mut Graph) -> Result<()> {
    let mut order: Vec<NodeId> = graph
        .active()
        .iter()
        .copied()
        .filter(|&n| graph.node(n).is_bundle())
        .collect();
    order.sort_by_key(|&n| (graph.height(n), graph.node(n).name.clone()));

    for n in order {
        debug_assert!(
            !graph.node(n).is_coord(),
            "coordination must be simplified before the upward pass"
        );
        let edges: Vec<(NodeId, EdgeLabel)> = graph.node(n).child_edges.iter().copied().collect();
        if edges.iter().filter(|&&(_, l)| l == EdgeLabel::Top).count() > 1 {
            return Err(GraphError::Construction(format!(
                "bundle {} has more than one designated top",
                graph.node(n).name
            )));
        }

        let mut candidates = BTreeSet::new();
        for (child, label) in edges {
            match label {
                // A designated top fully determines the set.
                EdgeLabel::Top => {
                    candidates = tops_or_self(graph, child);
                    break;
                }
                EdgeLabel::Unspec => {
                    candidates.extend(tops_or_self(graph, child));
                }
                // Plain edges are external children, not members.
                _ => {}
            }
        }

        debug_assert!(!candidates.contains(&n));
        debug_assert!(
            candidates.iter().all(|&c| graph.node(c).is_firm()),
            "top candidates always resolve down to real nodes"
        );
        graph.set_top_candidates(n, candidates);
    }
    Ok(())
}

/// Top-down pass: computes `parentCandidates` for every non-root node.
///
/// Visits nodes in increasing depth order (name tie-break) so a bundle's
/// own parent-candidates exist before its members consult them.
///
/// # Errors
/// `GraphError::WellFormedness` if any node ends with an empty candidate
/// set: the annotation admits no legal resolution.
pub fn downward(graph: &mut Graph) -> Result<()> {
    let firm = graph.firm_nodes();
    let mut order: Vec<NodeId> = graph
        .active()
        .iter()
        .copied()
        .filter(|&n| !graph.node(n).is_root())
        .collect();
    order.sort_by_key(|&n| (graph.depth(n), graph.node(n).name.clone()));

    for n in order {
        // Maximal attachment set absent any constraint: every real node
        // except n itself and its descendants.
        let descendants = graph.descendants(n);
        let mut candidates: BTreeSet<NodeId> = firm
            .iter()
            .copied()
            .filter(|&x| x != n && !descendants.contains(&x))
            .collect();

        let parent_edges: Vec<(NodeId, EdgeLabel)> =
            graph.node(n).parent_edges.iter().copied().collect();
        for (parent, _) in parent_edges {
            let parent = graph.resolve(parent);
            if graph.node(parent).is_firm() {
                // A direct real attachment is unambiguous.
                candidates.retain(|&x| x == parent);
                continue;
            }
            let parent_tops = graph.top_candidates(parent).cloned().unwrap_or_default();
            let members = graph.members_of(parent).cloned().unwrap_or_default();
            if members.contains(&n) {
                let own_tops = tops_or_self(graph, n);
                let mut union = BTreeSet::new();
                if !parent_tops.is_disjoint(&own_tops) {
                    // n might be the bundle's resolved head, inheriting
                    // whatever could attach to the bundle as a whole.
                    if let Some(inherited) = graph.parent_candidates(parent) {
                        union.extend(inherited.iter().copied());
                    }
                }
                if own_tops != parent_tops {
                    // n might not be the head; it could instead attach to
                    // whichever sibling member becomes the resolved head.
                    for sibling in members.iter().copied().filter(|&s| s != n) {
                        union.extend(tops_or_self(graph, sibling));
                    }
                }
                candidates = candidates.intersection(&union).copied().collect();
            } else {
                // An edge into a bundle is really an edge into whichever
                // real node the bundle resolves to.
                candidates = candidates.intersection(&parent_tops).copied().collect();
            }
        }

        if candidates.is_empty() {
            return Err(GraphError::WellFormedness {
                node: graph.display_name(n),
            });
        }
        graph.set_parent_candidates(n, candidates);
    }
    Ok(())
}
