// src/serialize.rs
//! Re-derives an annotation record from the current graph.
//!
//! Names come from current nodes (an aliased bundle reports its canonical
//! name), member links of multiword bundles are carried as token lists
//! rather than edges, and the root is omitted when it ended up childless.

use std::collections::BTreeMap;

use crate::graph::{Graph, NodeKind};
use crate::input::GraphRecord;

const ROOT_NAME: &str = "W($$)";

/// Serializes the working graph back to the record shape.
#[must_use]
pub fn to_record(graph: &Graph) -> GraphRecord {
    let mut nodes: Vec<String> = graph
        .active()
        .iter()
        .map(|&n| graph.display_name(n))
        .collect();
    nodes.sort();

    let mut node2words = BTreeMap::new();
    for &n in graph.active() {
        match &graph.node(n).kind {
            NodeKind::Lexical { tokens } => {
                node2words.insert(
                    graph.display_name(n),
                    in_utterance_order(graph, tokens.iter().cloned()),
                );
            }
            // A multiword relaxed to a bundle reports its member tokens;
            // the member edges themselves are excluded below.
            NodeKind::Bundle { members, .. } if graph.node(n).name.starts_with("CBBMW") => {
                let tokens = members
                    .iter()
                    .flat_map(|&m| graph.token_yield(m).into_iter());
                node2words.insert(graph.node(n).name.clone(), in_utterance_order(graph, tokens));
            }
            _ => {}
        }
    }

    let mut node_edges: Vec<(String, String, Option<String>)> = Vec::new();
    for &n in graph.active() {
        for &(parent, label) in &graph.node(n).parent_edges {
            let parent_name = graph.display_name(parent);
            if parent_name.starts_with("CBBMW") {
                continue;
            }
            node_edges.push((
                parent_name,
                graph.display_name(n),
                label.wire_name().map(String::from),
            ));
        }
    }
    for (parent, child) in &graph.anaph_links {
        node_edges.push((parent.clone(), child.clone(), Some("Anaph".to_string())));
    }
    node_edges.sort();
    // Alias and canonical member edges re-derive to the same triple.
    node_edges.dedup();

    if node_edges
        .iter()
        .any(|(p, c, _)| p == ROOT_NAME || c == ROOT_NAME)
    {
        node2words.insert(ROOT_NAME.to_string(), vec!["$$".to_string()]);
    } else {
        nodes.retain(|name| name != ROOT_NAME);
    }

    GraphRecord {
        tokens: graph.tokens.clone(),
        nodes,
        node2words,
        extra_node2words: BTreeMap::new(),
        node_edges,
    }
}

/// Orders a token set by its position in the utterance.
fn in_utterance_order(graph: &Graph, tokens: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = tokens.collect();
    out.sort_by_key(|t| graph.tokens.iter().position(|u| u == t));
    out.dedup();
    out
}
