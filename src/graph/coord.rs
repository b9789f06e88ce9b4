// src/graph/coord.rs
//! Coordination simplification.
//!
//! Rewrites every coordination node into direct attachments to one
//! designated coordinator, then removes the coordination node entirely.
//! Nodes are processed in increasing height order so outer structures see
//! already-resolved inner heights.

use tracing::warn;

use crate::error::{GraphError, Result};

use super::graph::Graph;
use super::node::{EdgeLabel, NodeId, NodeKind};

/// Removes all coordination nodes from the graph, in place.
///
/// # Errors
/// `GraphError::Construction` when a coordination node has no coordinators
/// or the reattached heights are inconsistent with the chosen head.
pub fn simplify_coordination(graph: &mut Graph) -> Result<()> {
    let mut pending: Vec<NodeId> = graph
        .active()
        .iter()
        .copied()
        .filter(|&n| graph.node(n).is_coord())
        .collect();
    pending.sort_by_key(|&n| (graph.height(n), graph.node(n).name.clone()));
    for n in pending {
        simplify_one(graph, n)?;
    }
    Ok(())
}

fn simplify_one(graph: &mut Graph, n: NodeId) -> Result<()> {
    let NodeKind::Coordination { coords, conjuncts } = graph.node(n).kind.clone() else {
        return Ok(());
    };

    // Arbitrary but deterministic head choice: smallest coordinator name.
    let new_head = coords
        .iter()
        .copied()
        .min_by_key(|&c| graph.node(graph.resolve(c)).name.clone())
        .ok_or_else(|| {
            GraphError::Construction(format!(
                "coordination {} has no coordinators",
                graph.node(n).name
            ))
        })?;

    // Remaining coordinators and all conjuncts become ordinary children of
    // the head.
    let mut max_reattached: Option<usize> = None;
    let mut reattach: Vec<NodeId> = coords.union(&conjuncts).copied().collect();
    reattach.sort_by_key(|&c| graph.node(graph.resolve(c)).name.clone());
    for c in reattach {
        if graph.resolve(c) == graph.resolve(new_head) {
            continue;
        }
        max_reattached = Some(max_reattached.map_or(graph.height(c), |m| m.max(graph.height(c))));
        graph.add_child(new_head, c, EdgeLabel::Plain)?;
    }

    // Modifiers of the coordination node migrate to the head as well.
    let modifiers: Vec<NodeId> = graph.node(n).children.iter().copied().collect();
    for c in modifiers {
        graph.node_mut(c).parents.remove(&n);
        let stale: Vec<(NodeId, EdgeLabel)> = graph
            .node(c)
            .parent_edges
            .iter()
            .copied()
            .filter(|&(p, _)| p == n)
            .collect();
        for edge in stale {
            graph.node_mut(c).parent_edges.remove(&edge);
        }
        max_reattached = Some(max_reattached.map_or(graph.height(c), |m| m.max(graph.height(c))));
        graph.add_child(new_head, c, EdgeLabel::Plain)?;
    }

    if let Some(maxht) = max_reattached {
        if graph.height(new_head) != maxht + 1 {
            return Err(GraphError::Construction(format!(
                "inconsistent coordination structure at {}: head {} has height {}, expected {}",
                graph.node(n).name,
                graph.display_name(new_head),
                graph.height(new_head),
                maxht + 1
            )));
        }
    }

    let parents: Vec<NodeId> = graph.node(n).parents.iter().copied().collect();
    for &p in &parents {
        graph.add_child(p, new_head, EdgeLabel::Plain)?;
    }

    let old_depth = graph.depth(n);
    scrub(graph, n);
    let frag = graph.node(graph.resolve(new_head)).frag;
    graph.recompute_depths(frag);

    // Legitimate edge case: when the chosen head is also a bundle member it
    // keeps a greater depth than the coordination node it replaces.
    if graph.depth(new_head) != old_depth {
        warn!(
            coordination = %graph.node(n).name,
            head = %graph.display_name(new_head),
            old_depth,
            new_depth = graph.depth(new_head),
            "coordination head depth differs from removed node"
        );
    }
    Ok(())
}

/// Removes the coordination node from its parents' child sets, its
/// fragment, and the working set. Its own topology is cleared so nothing
/// can observe it afterwards.
fn scrub(graph: &mut Graph, n: NodeId) {
    let parents: Vec<NodeId> = graph.node(n).parents.iter().copied().collect();
    for p in parents {
        graph.node_mut(p).children.remove(&n);
        let stale: Vec<(NodeId, EdgeLabel)> = graph
            .node(p)
            .child_edges
            .iter()
            .copied()
            .filter(|&(c, _)| c == n)
            .collect();
        for edge in stale {
            graph.node_mut(p).child_edges.remove(&edge);
        }
    }
    let node = graph.node_mut(n);
    node.children.clear();
    node.child_edges.clear();
    node.parents.clear();
    node.parent_edges.clear();
    let frag = graph.node(n).frag;
    graph.fragment_mut(frag).nodes.remove(&n);
    graph.fragment_mut(frag).roots.remove(&n);
    graph.deactivate(n);
}
