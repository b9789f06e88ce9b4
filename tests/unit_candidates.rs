// tests/unit_candidates.rs
//! End-to-end candidate propagation over the bundled fixture records.

use std::collections::BTreeSet;
use std::path::Path;

use fudge_graph::{
    downward, is_projective, simplify_coordination, upward, Graph, GraphRecord, NodeId,
};

fn load(name: &str) -> Graph {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let record = GraphRecord::from_path(&path).expect("fixture must load");
    let mut graph = Graph::from_record(&record).expect("fixture must build");
    simplify_coordination(&mut graph).expect("simplify");
    upward(&mut graph).expect("upward");
    downward(&mut graph).expect("downward");
    graph
}

fn names(graph: &Graph, set: &BTreeSet<NodeId>) -> BTreeSet<String> {
    set.iter().map(|&n| graph.display_name(n)).collect()
}

fn top_names(graph: &Graph, name: &str) -> BTreeSet<String> {
    let id = graph.id_by_name(name).expect("known node");
    names(graph, graph.top_candidates(id).expect("computed tops"))
}

fn parent_names(graph: &Graph, name: &str) -> BTreeSet<String> {
    let id = graph.id_by_name(name).expect("known node");
    names(graph, graph.parent_candidates(id).expect("computed parents"))
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(ToString::to_string).collect()
}

#[test]
fn test_g3_bundle_tops() {
    let g = load("g3.json");
    assert_eq!(top_names(&g, "CBB1"), set(&["W(Sandwich)"]));
    assert_eq!(top_names(&g, "CBB2"), set(&["W(standards)"]));
}

#[test]
fn test_g3_parent_candidates() {
    let g = load("g3.json");
    // The designated head inherits the bundle's attachment to the root.
    assert_eq!(parent_names(&g, "W(Sandwich)"), set(&["W($$)"]));
    assert_eq!(parent_names(&g, "CBB1"), set(&["W($$)"]));
    // Undesignated members can only land on a sibling member.
    assert_eq!(
        parent_names(&g, "W(A)"),
        set(&["W(Quality)", "W(Sandwich)", "W(Top)"])
    );
    assert_eq!(parent_names(&g, "W(artistic)"), set(&["W(standards)"]));
    // Real attachments stay pinned.
    assert_eq!(parent_names(&g, "W(made)"), set(&["W(Sandwich)"]));
    assert_eq!(parent_names(&g, "W(to)"), set(&["W(made)"]));
    assert_eq!(parent_names(&g, "CBB2"), set(&["W(to)"]));
}

#[test]
fn test_g3_is_projective() {
    let g = load("g3.json");
    assert!(is_projective(&g));
}

#[test]
fn test_g2_bundle_member_attachments() {
    let g = load("g2.json");
    assert_eq!(top_names(&g, "CBB1"), set(&["W(feel)"]));
    // feel is the only possible head, so it stands in for the bundle.
    assert_eq!(parent_names(&g, "W(feel)"), set(&["W(until)"]));
    assert_eq!(parent_names(&g, "CBB1"), set(&["W(until)"]));
    assert_eq!(parent_names(&g, "W(again)"), set(&["W(feel)"]));
    // An external child of the bundle attaches to its resolved head.
    assert_eq!(parent_names(&g, "W(you)"), set(&["W(feel)"]));
    assert_eq!(parent_names(&g, "W(until)"), set(&["MW(put_off)"]));
}

#[test]
fn test_g2_is_projective() {
    let g = load("g2.json");
    assert!(is_projective(&g));
}

#[test]
fn test_g1_coordination_flattens() {
    let g = load("g1.json");

    // Both coordination nodes are gone from the working set.
    for coord in ["$a", "$o"] {
        let id = g.id_by_name(coord).expect("name survives removal");
        assert!(!g.active().contains(&id), "{coord} still active");
    }

    // $a collapses onto its only coordinator, which adopts the conjuncts.
    let amp = g.id_by_name("MW(&_THEN)").unwrap();
    let tweet = g.id_by_name("W(tweet)").unwrap();
    let wait = g.id_by_name("W(wait)").unwrap();
    assert!(g.node(amp).children.contains(&tweet));
    assert!(g.node(amp).children.contains(&wait));

    // $o's coordinator "or" had no declared node; one was created for it.
    let or = g.id_by_name("W(or)").expect("coordinator node created");
    let two = g.id_by_name("W(2)").unwrap();
    let hour = g.id_by_name("W(hour)").unwrap();
    assert_eq!(g.node(or).children, BTreeSet::from([two, hour]));
    assert!(g.node(wait).children.contains(&or), "head replaces the node");

    assert_eq!(parent_names(&g, "W(or)"), set(&["W(wait)"]));
    assert_eq!(parent_names(&g, "W(hour)"), set(&["W(or)"]));
    assert!(is_projective(&g));
}

#[test]
fn test_fragments_cover_every_active_node() {
    let g = load("g2.json");
    for &n in g.active() {
        assert!(
            g.fragment(n).nodes.contains(&n),
            "{} missing from its fragment",
            g.display_name(n)
        );
    }
}
