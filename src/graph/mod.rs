// src/graph/mod.rs
//! Graph data model and derivation passes.
//!
//! Construction (`build`) enforces acyclicity and fragment bookkeeping,
//! `coord` removes coordination scaffolding, `candidates` runs the
//! upward/downward propagation, and `projective` answers the structural
//! well-formedness query.

pub mod build;
pub mod candidates;
pub mod coord;
pub mod fragment;
#[allow(clippy::module_inception)]
pub mod graph;
pub mod node;
pub mod projective;

pub use candidates::{downward, upward};
pub use coord::simplify_coordination;
pub use fragment::{FragId, Fragment};
pub use graph::Graph;
pub use node::{EdgeLabel, Node, NodeId, NodeKind};
pub use projective::is_projective;
