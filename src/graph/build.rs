// src/graph/build.rs
//! Constructs a [`Graph`] from an annotation record.
//!
//! Construction order is fixed: lexical nodes, then coordination nodes
//! (which depend on lexical), then multiword-bundle member attachment, then
//! all edges in record order, then bundle identity unification. Any
//! violation fails fast with a construction error.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::input::GraphRecord;

use super::graph::Graph;
use super::node::{EdgeLabel, NodeId, NodeKind};

fn empty_bundle() -> NodeKind {
    NodeKind::Bundle {
        members: BTreeSet::new(),
        external_children: BTreeSet::new(),
        top: None,
        top_candidates: None,
        redirect: None,
    }
}

impl Graph {
    /// Builds the graph for one record.
    ///
    /// # Errors
    /// `GraphError::Construction` on malformed input (unknown node name,
    /// duplicate token assignment, re-declared name, duplicate designated
    /// top), `GraphError::Cycle` on a cyclic annotation, and
    /// `GraphError::AliasInconsistency` when identical-member bundles
    /// disagree on their designated top.
    pub fn from_record(record: &GraphRecord) -> Result<Self> {
        let mut graph = Graph::new(record.tokens.clone());

        // Lexical nodes and bundle shells; coordination names are deferred
        // because coordinators may refer to lexical nodes declared here.
        let mut coord_names = Vec::new();
        let mut cbbmw_names = Vec::new();
        for name in &record.nodes {
            if name == "W($$)" {
                continue;
            }
            if let Some(inner) = strip_lex(name, "MW(").or_else(|| strip_lex(name, "W(")) {
                let words = record.node2words.get(name).ok_or_else(|| {
                    GraphError::Construction(format!("no node2words entry for {name:?}"))
                })?;
                graph.add_lexical(name.clone(), inner, words)?;
            } else if name.starts_with('$') {
                coord_names.push(name.clone());
            } else if name.starts_with("CBB") {
                if name.starts_with("CBBMW") {
                    cbbmw_names.push(name.clone());
                }
                let id = graph.new_node(name.clone(), empty_bundle());
                graph.index_name(name.clone(), id)?;
            } else {
                return Err(GraphError::Construction(format!(
                    "unrecognized node name {name:?}"
                )));
            }
        }
        coord_names.sort();
        cbbmw_names.sort();

        graph.build_coordinations(record, &coord_names)?;
        graph.attach_cbbmw_members(record, &cbbmw_names)?;
        graph.wire_edges(record)?;
        graph.unify_bundles()?;

        if graph.token2lex.is_empty() {
            return Err(GraphError::Construction(
                "record declares no lexical nodes".to_string(),
            ));
        }
        Ok(graph)
    }

    /// Creates and indexes one lexical node owning `words`.
    fn add_lexical(&mut self, display: String, inner: &str, words: &[String]) -> Result<NodeId> {
        if inner == "$$" {
            return Err(GraphError::Construction(
                "the name $$ is reserved for the root".to_string(),
            ));
        }
        let tokens: BTreeSet<String> = words.iter().cloned().collect();
        if tokens.is_empty() {
            return Err(GraphError::Construction(format!(
                "lexical node {display} owns no tokens"
            )));
        }
        for token in &tokens {
            if self.token2lex.contains_key(token) {
                return Err(GraphError::Construction(format!(
                    "token {token:?} is assigned to more than one lexical node"
                )));
            }
        }
        let id = self.new_node(inner, NodeKind::Lexical {
            tokens: tokens.clone(),
        });
        for token in tokens {
            self.token2lex.insert(token, id);
        }
        self.index_name(display, id)?;
        Ok(id)
    }

    fn build_coordinations(&mut self, record: &GraphRecord, names: &[String]) -> Result<()> {
        for name in names {
            let pairs = record.extra_node2words.get(name).ok_or_else(|| {
                GraphError::Construction(format!("no extra_node2words entry for {name:?}"))
            })?;
            let mut coords = BTreeSet::new();
            for (token, label) in pairs {
                if label != "Coord" {
                    return Err(GraphError::Construction(format!(
                        "coordination {name} carries label {label:?}, expected \"Coord\""
                    )));
                }
                // Coordinators may name tokens of declared multiwords; a
                // bare token gets a fresh lexical node.
                let lex = match self.token2lex.get(token) {
                    Some(&id) => id,
                    None => self.add_lexical(format!("W({token})"), token, &[token.clone()])?,
                };
                coords.insert(lex);
            }
            let id = self.new_node(name.clone(), NodeKind::Coordination {
                coords,
                conjuncts: BTreeSet::new(),
            });
            self.index_name(name.clone(), id)?;
        }
        Ok(())
    }

    /// A `CBBMW` is a multiword relaxed to a bundle: its words become
    /// undesignated members.
    fn attach_cbbmw_members(&mut self, record: &GraphRecord, names: &[String]) -> Result<()> {
        for name in names {
            let bundle = self
                .id_by_name(name)
                .ok_or_else(|| GraphError::Construction(format!("unknown bundle {name:?}")))?;
            let words = record.node2words.get(name).ok_or_else(|| {
                GraphError::Construction(format!("no node2words entry for {name:?}"))
            })?;
            for word in words {
                let display = format!("W({word})");
                let lex = match self.id_by_name(&display) {
                    Some(id) => id,
                    None => self.add_lexical(display, word, &[word.clone()])?,
                };
                self.add_member(bundle, lex, false)?;
            }
            if self.members_of(bundle).map_or(true, BTreeSet::is_empty) {
                return Err(GraphError::Construction(format!(
                    "multiword bundle {name} has no members"
                )));
            }
        }
        Ok(())
    }

    fn wire_edges(&mut self, record: &GraphRecord) -> Result<()> {
        for (parent, child, label) in &record.node_edges {
            let pid = self.id_by_name(parent).ok_or_else(|| {
                GraphError::Construction(format!("edge references unknown node {parent:?}"))
            })?;
            let cid = self.id_by_name(child).ok_or_else(|| {
                GraphError::Construction(format!("edge references unknown node {child:?}"))
            })?;
            match label.as_deref() {
                None => self.add_child(pid, cid, EdgeLabel::Plain)?,
                Some("unspec") => self.add_member(pid, cid, false)?,
                Some("cbbhead") => self.add_member(pid, cid, true)?,
                Some("Conj") => {
                    let NodeKind::Coordination { conjuncts, .. } = &mut self.node_mut(pid).kind
                    else {
                        return Err(GraphError::Construction(format!(
                            "Conj edge into non-coordination node {parent:?}"
                        )));
                    };
                    conjuncts.insert(cid);
                }
                Some("Anaph") => {
                    // Stored verbatim; anaphora is not part of the tree.
                    self.anaph_links.insert((parent.clone(), child.clone()));
                }
                Some(other) => {
                    return Err(GraphError::Construction(format!(
                        "unknown edge label {other:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Collapses bundles with identical member sets (§ bundle identity):
    /// scanning in name order, each later duplicate becomes an alias of the
    /// earliest equal bundle, so the merge choice is reproducible.
    fn unify_bundles(&mut self) -> Result<()> {
        let mut bundles: Vec<NodeId> = self
            .active()
            .iter()
            .copied()
            .filter(|&n| self.node(n).is_bundle())
            .collect();
        bundles.sort_by_key(|&n| self.node(n).name.clone());

        for i in 0..bundles.len() {
            for h in 0..i {
                let canonical = bundles[h];
                let later = bundles[i];
                if self.is_alias(canonical) {
                    continue;
                }
                if self.raw_members(canonical) == self.raw_members(later) {
                    self.alias_bundle(later, canonical)?;
                    break;
                }
            }
        }
        Ok(())
    }

    fn is_alias(&self, id: NodeId) -> bool {
        self.resolve(id) != id
    }

    /// Member set without alias resolution: two bundles are "identical" only
    /// if they were declared over the same member nodes.
    fn raw_members(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        match &self.node(id).kind {
            NodeKind::Bundle { members, .. } => Some(members),
            _ => None,
        }
    }

    /// Redirects `alias` to `canonical`, reconciling tops, adopting the
    /// larger height/depth, and absorbing the alias's external children.
    /// The alias leaves the working set but stays resolvable by name.
    fn alias_bundle(&mut self, alias: NodeId, canonical: NodeId) -> Result<()> {
        debug!(
            alias = %self.node(alias).name,
            canonical = %self.node(canonical).name,
            "merging identical-member bundles"
        );

        let (alias_top, alias_external) = match &self.node(alias).kind {
            NodeKind::Bundle {
                top,
                external_children,
                ..
            } => (*top, external_children.clone()),
            _ => return Ok(()),
        };

        let alias_height = self.node(alias).height;
        let alias_depth = self.node(alias).depth;
        let canonical_mut = self.node_mut(canonical);
        canonical_mut.height = canonical_mut.height.max(alias_height);
        canonical_mut.depth = canonical_mut.depth.max(alias_depth);

        let canonical_top = match &self.node(canonical).kind {
            NodeKind::Bundle { top, .. } => *top,
            _ => None,
        };
        match (canonical_top, alias_top) {
            (Some(a), Some(b)) if a != b => {
                return Err(GraphError::AliasInconsistency {
                    first: self.node(canonical).name.clone(),
                    second: self.node(alias).name.clone(),
                });
            }
            (None, Some(b)) => {
                if let NodeKind::Bundle { top, .. } = &mut self.node_mut(canonical).kind {
                    *top = Some(b);
                }
                self.promote_top_edge(canonical, b);
            }
            _ => {}
        }

        for child in alias_external {
            self.add_child(canonical, child, EdgeLabel::Plain)?;
        }

        if let NodeKind::Bundle { redirect, .. } = &mut self.node_mut(alias).kind {
            *redirect = Some(canonical);
        }
        self.deactivate(alias);
        Ok(())
    }

    /// Relabels the canonical bundle's member edge for an adopted top from
    /// `unspec` to the designated-top label, on both edge mirrors, so the
    /// head survives the merge.
    fn promote_top_edge(&mut self, bundle: NodeId, member: NodeId) {
        if self
            .node_mut(bundle)
            .child_edges
            .remove(&(member, EdgeLabel::Unspec))
        {
            self.node_mut(bundle)
                .child_edges
                .insert((member, EdgeLabel::Top));
            self.node_mut(member)
                .parent_edges
                .remove(&(bundle, EdgeLabel::Unspec));
            self.node_mut(member)
                .parent_edges
                .insert((bundle, EdgeLabel::Top));
        }
    }
}

fn strip_lex<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix)?.strip_suffix(')')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(json: &str) -> Result<Graph> {
        Graph::from_record(&GraphRecord::from_str(json).expect("fixture JSON must parse"))
    }

    #[test]
    fn test_duplicate_token_assignment_rejected() {
        let err = build(
            r#"{"tokens": ["a"], "nodes": ["W(a)", "MW(x)"],
                "node2words": {"W(a)": ["a"], "MW(x)": ["a", "b"]},
                "node_edges": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Construction(_)), "{err}");
    }

    #[test]
    fn test_unknown_edge_endpoint_rejected() {
        let err = build(
            r#"{"tokens": ["a"], "nodes": ["W(a)"],
                "node2words": {"W(a)": ["a"]},
                "node_edges": [["W(a)", "W(ghost)", null]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Construction(_)), "{err}");
    }

    #[test]
    fn test_duplicate_cbbhead_rejected() {
        let err = build(
            r#"{"tokens": ["a", "b"], "nodes": ["CBB1", "W(a)", "W(b)"],
                "node2words": {"W(a)": ["a"], "W(b)": ["b"]},
                "node_edges": [["CBB1", "W(a)", "cbbhead"], ["CBB1", "W(b)", "cbbhead"]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Construction(_)), "{err}");
    }

    #[test]
    fn test_reserved_root_name_rejected() {
        let err = build(
            r#"{"tokens": ["a"], "nodes": ["MW($$)"],
                "node2words": {"MW($$)": ["a"]},
                "node_edges": []}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Construction(_)), "{err}");
    }

    #[test]
    fn test_cyclic_annotation_rejected() {
        let err = build(
            r#"{"tokens": ["a", "b"], "nodes": ["W(a)", "W(b)"],
                "node2words": {"W(a)": ["a"], "W(b)": ["b"]},
                "node_edges": [["W(a)", "W(b)", null], ["W(b)", "W(a)", null]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }), "{err}");
    }

    #[test]
    fn test_identical_bundles_unify_keeping_top() {
        // CBB1 leaves the top open; CBB2 designates b. After unification
        // both names must resolve to a single bundle with top = b.
        let g = build(
            r#"{"tokens": ["a", "b"], "nodes": ["CBB1", "CBB2", "W(a)", "W(b)"],
                "node2words": {"W(a)": ["a"], "W(b)": ["b"]},
                "node_edges": [["CBB1", "W(a)", "unspec"], ["CBB1", "W(b)", "unspec"],
                               ["CBB2", "W(a)", "unspec"], ["CBB2", "W(b)", "cbbhead"]]}"#,
        )
        .expect("identical bundles must unify");

        let cbb1 = g.id_by_name("CBB1").unwrap();
        let cbb2 = g.id_by_name("CBB2").unwrap();
        assert_eq!(g.resolve(cbb2), cbb1, "later name aliases the earlier");
        assert!(g.active().contains(&cbb1));
        assert!(!g.active().contains(&cbb2), "alias leaves the working set");
        assert_eq!(g.display_name(cbb2), "CBB1");

        let b = g.id_by_name("W(b)").unwrap();
        match &g.node(g.resolve(cbb2)).kind {
            NodeKind::Bundle { top, .. } => assert_eq!(*top, Some(b)),
            other => panic!("expected bundle, got {other:?}"),
        }
        // The adopted top's member edge is relabeled on both mirrors, so
        // the head survives the merge for the upward pass.
        assert!(g.node(cbb1).child_edges.contains(&(b, EdgeLabel::Top)));
        assert!(!g.node(cbb1).child_edges.contains(&(b, EdgeLabel::Unspec)));
        assert!(g.node(b).parent_edges.contains(&(cbb1, EdgeLabel::Top)));
        assert!(!g.node(b).parent_edges.contains(&(cbb1, EdgeLabel::Unspec)));
        // Forwarded height/depth agree whichever name is queried.
        assert_eq!(g.height(cbb1), g.height(cbb2));
        assert_eq!(g.depth(cbb1), g.depth(cbb2));
    }

    #[test]
    fn test_conflicting_tops_are_inconsistent() {
        let err = build(
            r#"{"tokens": ["a", "b"], "nodes": ["CBB1", "CBB2", "W(a)", "W(b)"],
                "node2words": {"W(a)": ["a"], "W(b)": ["b"]},
                "node_edges": [["CBB1", "W(a)", "cbbhead"], ["CBB1", "W(b)", "unspec"],
                               ["CBB2", "W(a)", "unspec"], ["CBB2", "W(b)", "cbbhead"]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::AliasInconsistency { .. }), "{err}");
    }

    #[test]
    fn test_cbbmw_words_become_members() {
        let g = build(
            r#"{"tokens": ["new", "york"], "nodes": ["CBBMW1"],
                "node2words": {"CBBMW1": ["new", "york"]},
                "node_edges": []}"#,
        )
        .expect("CBBMW record must build");
        let cbb = g.id_by_name("CBBMW1").unwrap();
        assert_eq!(g.members_of(cbb).map(BTreeSet::len), Some(2));
        assert!(g.id_by_name("W(new)").is_some(), "members were created");
    }

    #[test]
    fn test_anaph_edges_kept_out_of_tree() {
        let g = build(
            r#"{"tokens": ["a", "b"], "nodes": ["W(a)", "W(b)"],
                "node2words": {"W(a)": ["a"], "W(b)": ["b"]},
                "node_edges": [["W(a)", "W(b)", "Anaph"]]}"#,
        )
        .expect("anaph record must build");
        let a = g.id_by_name("W(a)").unwrap();
        let b = g.id_by_name("W(b)").unwrap();
        assert!(g.node(a).children.is_empty());
        assert!(g.node(b).parents.is_empty());
        assert!(g
            .anaph_links
            .contains(&("W(a)".to_string(), "W(b)".to_string())));
    }
}
