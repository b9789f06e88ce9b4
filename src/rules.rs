// src/rules.rs
//! Flattens a graph into head-chain rule strings.
//!
//! Every maximal head-to-dependent path becomes one rule. A bundle
//! contributes its member names as a single parenthesized group and each
//! member starts a fresh path of its own. When two adjacent paths share a
//! head, they render as one straddling rule (`c > head < d`).

use crate::graph::{Graph, NodeId, NodeKind};

/// Extracts the rule strings for a built graph. Paths are sorted before
/// rendering so the output is reproducible.
#[must_use]
pub fn extract(graph: &Graph) -> Vec<String> {
    let mut paths: Vec<Vec<String>> = Vec::new();
    traverse(graph, graph.root(), Vec::new(), &mut paths);
    paths.sort();
    paths.retain(|p| p.len() > 1);
    render_paths(&paths)
}

fn traverse(graph: &Graph, id: NodeId, mut path: Vec<String>, paths: &mut Vec<Vec<String>>) {
    let id = graph.resolve(id);
    let node = graph.node(id);

    if let NodeKind::Bundle { members, .. } = &node.kind {
        path.push(member_group(graph, members.iter().copied()));
        paths.push(path);
        for &member in members {
            traverse(graph, member, Vec::new(), paths);
        }
        return;
    }
    path.push(node.name.clone());

    match node.child_edges.len() {
        0 => paths.push(path),
        1 => {
            for &(child, _) in &node.child_edges {
                traverse(graph, child, path.clone(), paths);
            }
        }
        _ => {
            // A branching head ends the running path; each child restarts
            // from the head alone.
            let head = node.name.clone();
            paths.push(path);
            for &(child, _) in &node.child_edges {
                traverse(graph, child, vec![head.clone()], paths);
            }
        }
    }
}

/// Renders a bundle's members as `( a b ... )`, nesting inner bundles.
fn member_group(graph: &Graph, members: impl Iterator<Item = NodeId>) -> String {
    let mut out = String::from("( ");
    for member in members {
        let member = graph.resolve(member);
        match &graph.node(member).kind {
            NodeKind::Bundle { members, .. } => {
                out.push_str(&member_group(graph, members.iter().copied()));
            }
            _ => out.push_str(&graph.node(member).name),
        }
        out.push(' ');
    }
    out.push(')');
    out
}

fn render_paths(paths: &[Vec<String>]) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 0;
    while i + 1 < paths.len() {
        let (p1, p2) = (&paths[i], &paths[i + 1]);
        if p1.first() == p2.first() {
            out.push(format!("{} {}", render_reverse(p1), render_forward(p2)));
            i += 2;
        } else {
            out.push(render_forward(p1));
            i += 1;
        }
    }
    if i + 1 == paths.len() {
        out.push(render_forward(&paths[i]));
    }
    out
}

/// `head < d1 < d2 < ...`
fn render_forward(path: &[String]) -> String {
    path.join(" < ")
}

/// `... > d2 > d1 >` with the shared head left for the forward half.
fn render_reverse(path: &[String]) -> String {
    let mut out = String::new();
    for name in path.iter().skip(1).rev() {
        out.push_str(name);
        out.push_str(" > ");
    }
    out.pop();
    out
}
