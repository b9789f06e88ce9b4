// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed input: duplicate token assignment, unknown referenced node,
    /// duplicate designated bundle top, re-declaration of a reserved name,
    /// inconsistent coordination structure. Construction aborts.
    #[error("construction error: {0}")]
    Construction(String),

    /// An edge insertion would create a cycle. Signals an invalid annotation.
    #[error("adding {child} as a child of {parent} would create a cycle")]
    Cycle { parent: String, child: String },

    /// Two bundles declared identical-membership but with conflicting
    /// designated tops.
    #[error("bundles {first} and {second} have identical members but conflicting tops")]
    AliasInconsistency { first: String, second: String },

    /// A node's computed parent-candidate set is empty after the downward
    /// pass: the annotation admits no legal resolution.
    #[error("could not find any possible heads for {node}; is the annotation valid?")]
    WellFormedness { node: String },

    #[error("I/O error: {source} (path: {})", path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

// Allow `?` on std::io::Error by converting to GraphError::Io with unknown path.
impl From<std::io::Error> for GraphError {
    fn from(source: std::io::Error) -> Self {
        GraphError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
