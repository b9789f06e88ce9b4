// src/input.rs
//! The structured annotation record consumed by the graph builder.
//!
//! Node names follow the FUDG convention: `W(x)` single-token lexical,
//! `MW(x)` multiword lexical, `CBB...` bundle (`CBBMW...` is a multiword
//! relaxed to a bundle), `$...` coordination, `W($$)` the implicit root.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// One annotated utterance: tokens, named nodes, and typed edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Ordered token identifiers for the utterance.
    pub tokens: Vec<String>,
    /// Declared node names (the root is implicit and need not be listed).
    pub nodes: Vec<String>,
    /// Lexical / multiword-bundle node name -> its token list.
    #[serde(default)]
    pub node2words: BTreeMap<String, Vec<String>>,
    /// Coordination node name -> list of (token, "Coord") pairs.
    #[serde(default)]
    pub extra_node2words: BTreeMap<String, Vec<(String, String)>>,
    /// (parent name, child name, label) triples, in annotation order.
    /// Label is one of null, "unspec", "cbbhead", "Conj", "Anaph".
    pub node_edges: Vec<(String, String, Option<String>)>,
}

impl GraphRecord {
    /// Parses a record from a JSON string.
    ///
    /// # Errors
    /// Returns `GraphError::Json` on malformed JSON.
    pub fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parses a record from any reader.
    ///
    /// # Errors
    /// Returns `GraphError::Json` on malformed JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads a record from a JSON file.
    ///
    /// # Errors
    /// Returns `GraphError::Io` (with the offending path) or `GraphError::Json`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| GraphError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_parses_minimal_json() {
        let record = GraphRecord::from_str(
            r#"{"tokens": ["a", "b"], "nodes": ["W(a)", "W(b)"],
                "node2words": {"W(a)": ["a"], "W(b)": ["b"]},
                "node_edges": [["W(a)", "W(b)", null]]}"#,
        )
        .expect("minimal record should parse");
        assert_eq!(record.tokens, vec!["a", "b"]);
        assert_eq!(record.node_edges.len(), 1);
        assert!(record.extra_node2words.is_empty(), "missing map defaults");
    }

    #[test]
    fn test_record_parses_labels_and_coord() {
        let record = GraphRecord::from_str(
            r#"{"tokens": ["x", "or", "y"], "nodes": ["W(x)", "W(y)", "$o"],
                "node2words": {"W(x)": ["x"], "W(y)": ["y"]},
                "extra_node2words": {"$o": [["or", "Coord"]]},
                "node_edges": [["$o", "W(x)", "Conj"], ["$o", "W(y)", "Conj"]]}"#,
        )
        .expect("coordination record should parse");
        assert_eq!(record.extra_node2words["$o"][0].0, "or");
        assert_eq!(record.node_edges[0].2.as_deref(), Some("Conj"));
    }

    #[test]
    fn test_record_rejects_bad_json() {
        let err = GraphRecord::from_str("{not json").unwrap_err();
        assert!(matches!(err, GraphError::Json(_)));
    }
}
