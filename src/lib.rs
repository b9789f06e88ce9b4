// src/lib.rs
//! Underspecified dependency graph core.
//!
//! Models FUDG-style annotation graphs in which some attachments are left
//! unresolved: "bundle" (CBB) nodes group members without fixing an internal
//! head, and edges into a bundle really target whichever member ends up as
//! its resolved head. The crate builds the graph from a structured record,
//! removes coordination scaffolding, and runs the two-pass candidate
//! propagation that characterizes every legal resolution.

pub mod error;
pub mod graph;
pub mod input;
pub mod rules;
pub mod serialize;

pub use error::{GraphError, Result};
pub use graph::{
    downward, is_projective, simplify_coordination, upward, EdgeLabel, Graph, NodeId, NodeKind,
};
pub use input::GraphRecord;
