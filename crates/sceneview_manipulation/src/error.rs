//! Manipulation error types

use std::path::PathBuf;

use sceneview_core::{CoreError, NodeId};
use thiserror::Error;

/// Errors raised while driving node manipulation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ManipulationError {
    /// Re-anchoring needs the manipulated node to sit directly under an
    /// anchor node
    #[error("Parent of node {0:?} is not an anchor node")]
    ParentNotAnchor(NodeId),

    /// The node is not registered with the transformation system
    #[error("Node {0:?} is not transformable")]
    NodeMissing(NodeId),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors raised while loading or validating a manipulation config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Result type for manipulation operations
pub type Result<T> = std::result::Result<T, ManipulationError>;
