// tests/unit_record.rs
//! Record I/O, re-serialization, and rule extraction.

use std::fs;
use std::path::Path;

use fudge_graph::rules;
use fudge_graph::serialize;
use fudge_graph::{downward, simplify_coordination, upward, Graph, GraphError, GraphRecord};

fn fixture(name: &str) -> GraphRecord {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    GraphRecord::from_path(&path).expect("fixture must load")
}

#[test]
fn test_load_from_file() {
    let d = tempfile::tempdir().unwrap();
    let path = d.path().join("record.json");
    fs::write(
        &path,
        r#"{"tokens": ["hi"], "nodes": ["W(hi)"],
            "node2words": {"W(hi)": ["hi"]}, "node_edges": []}"#,
    )
    .unwrap();
    let record = GraphRecord::from_path(&path).unwrap();
    assert_eq!(record.tokens, vec!["hi"]);
    Graph::from_record(&record).expect("loaded record must build");
}

#[test]
fn test_missing_file_reports_path() {
    let d = tempfile::tempdir().unwrap();
    let path = d.path().join("nope.json");
    let err = GraphRecord::from_path(&path).unwrap_err();
    match err {
        GraphError::Io { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected Io error, got {other}"),
    }
}

#[test]
fn test_serialize_round_trips_g3() {
    let record = fixture("g3.json");
    let mut g = Graph::from_record(&record).unwrap();
    simplify_coordination(&mut g).unwrap();
    upward(&mut g).unwrap();
    downward(&mut g).unwrap();

    let out = serialize::to_record(&g);
    assert_eq!(out.tokens, record.tokens);
    assert_eq!(out.nodes, record.nodes, "fixture node list is sorted");
    assert_eq!(out.node_edges, record.node_edges);
    assert_eq!(out.node2words, record.node2words);
    assert!(out.extra_node2words.is_empty());
}

#[test]
fn test_serialized_output_reparses() {
    let mut g = Graph::from_record(&fixture("g2.json")).unwrap();
    simplify_coordination(&mut g).unwrap();

    let out = serialize::to_record(&g);
    let json = serde_json::to_string(&out).unwrap();
    let reparsed = GraphRecord::from_str(&json).unwrap();
    Graph::from_record(&reparsed).expect("serialized record must rebuild");
}

#[test]
fn test_g3_rules() {
    let g = Graph::from_record(&fixture("g3.json")).unwrap();
    assert_eq!(
        rules::extract(&g),
        vec![
            "$$ < ( A Quality Sandwich Top )",
            "Sandwich < made < to < ( artistic standards )",
        ]
    );
}

#[test]
fn test_rules_cover_only_root_reachable_nodes() {
    // Nothing in g1 attaches to the root, so no rule chain starts.
    let mut g = Graph::from_record(&fixture("g1.json")).unwrap();
    simplify_coordination(&mut g).unwrap();
    assert!(rules::extract(&g).is_empty());

    // Adjacent paths sharing a head straddle into one rule; the bundle
    // renders as a parenthesized member group.
    let g2 = Graph::from_record(&fixture("g2.json")).unwrap();
    assert_eq!(
        rules::extract(&g2),
        vec![
            "are > $$ < lol",
            "put_off > maybe > $$ < was",
            "one > are < we",
            "feel < like < talking",
            "it > put_off < until < ( again feel )",
            "me > was < that",
            "was < weekend",
            "especially > weekend < this",
        ]
    );
}
