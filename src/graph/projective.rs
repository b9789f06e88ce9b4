// src/graph/projective.rs
//! Projectivity check.
//!
//! A query over computed yields, not a mutation: a node is projective when
//! its full token yield occupies a contiguous span among the tokens that
//! participate in any multi-node fragment.

use std::collections::BTreeSet;

use tracing::debug;

use super::graph::Graph;

/// True when every node's yield is contiguous. Non-projectivity is a
/// result, not an error; the first offending node short-circuits to false.
#[must_use]
pub fn is_projective(graph: &Graph) -> bool {
    // Tokens whose lexical node sits in a multi-node fragment, in utterance
    // order. Singleton fragments cannot constrain word order.
    let used: Vec<&str> = graph
        .tokens
        .iter()
        .filter(|t| {
            graph
                .token2lex
                .get(t.as_str())
                .is_some_and(|&lex| graph.fragment(lex).nodes.len() > 1)
        })
        .map(String::as_str)
        .collect();

    for &n in graph.active() {
        if graph.node(n).is_root() || graph.fragment(n).nodes.len() < 2 {
            continue;
        }
        let mut offsets = BTreeSet::new();
        for token in graph.token_yield(n) {
            if let Some(pos) = used.iter().position(|&u| u == token) {
                offsets.insert(pos);
            }
        }
        let (Some(&min), Some(&max)) = (offsets.first(), offsets.last()) else {
            continue;
        };
        if max - min != offsets.len() - 1 {
            debug!(
                node = %graph.display_name(n),
                ?offsets,
                "non-projective yield"
            );
            return false;
        }
    }
    true
}
