//! Error types for graph construction and mutation.
//!
//! Per-tick evaluation never fails; these errors only surface from builders
//! and setters called by the host.

use crate::node::{NodeKey, NodeVariant};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    /// Key does not address a live node (never existed or already swept).
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeKey),

    /// Children are exclusively owned; a node can be attached only once.
    #[error("node {node:?} is already owned by {owner:?}")]
    AlreadyOwned { node: NodeKey, owner: NodeKey },

    /// The graph root is held by the graph itself and cannot be attached.
    #[error("node {0:?} is the graph root")]
    IsRoot(NodeKey),

    /// A node cannot become its own descendant.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeKey, child: NodeKey },

    #[error("node {node:?} is a {actual:?}, expected {expected:?}")]
    WrongVariant {
        node: NodeKey,
        expected: NodeVariant,
        actual: NodeVariant,
    },

    #[error("invalid blend range [{min}, {max}]")]
    InvalidBlendRange { min: f32, max: f32 },

    #[error("bone '{0}' is not part of the hierarchy")]
    UnknownBone(String),

    #[error(transparent)]
    Clip(#[from] ClipError),
}

/// Validation failures when building a keyframe clip.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ClipError {
    #[error("clip '{clip}' has an invalid duration {duration}")]
    InvalidDuration { clip: String, duration: f32 },

    #[error("channel {channel} of clip '{clip}' has non-monotonic key times")]
    NonMonotonicKeys { clip: String, channel: usize },

    #[error("channel {channel} of clip '{clip}' mixes value kinds")]
    MixedKinds { clip: String, channel: usize },
}
