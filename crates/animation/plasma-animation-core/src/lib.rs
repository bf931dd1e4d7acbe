//! Plasma Animation Core (engine-agnostic)
//!
//! A runtime blend tree evaluated once per tick into a pose. Nodes live in an
//! arena owned by [`AnimationGraph`]; each node is updated at most once per
//! frame id and may replace or remove itself, which is how finished
//! transitions and clips prune the tree over time. Loop and end events are
//! collected during traversal and dispatched afterwards.

pub mod clip;
pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod graph;
pub mod node;
pub mod print;
pub mod tracks;

// Re-exports for hosts
pub use clip::{
    sample_channel, AnimationClip, ClipChannel, ClipRef, Keyframe, KeyframeClip, PlayState,
    SampleDirection, SampleMode, SampleParams,
};
pub use config::GraphConfig;
pub use error::{ClipError, GraphError};
pub use events::{
    AnimationGraphEvent, EventList, EventRecorder, GraphEventKind, GraphListener, Outputs,
};
pub use frame::{lerp_frame, AnimationFrame, TrackValue};
pub use graph::AnimationGraph;
pub use node::{
    AnimationBlendMode, AnimationBlendType, AnimationNode, BasicAnimation, BlendSample,
    BlendSpace1D, BlendSpace2D, ChainNode, CrossBlend, DirectBlend, NodeKey, NodeKind, NodeStep,
    NodeVariant, PlayMode, SelectiveNode,
};
pub use print::NodeDescription;
pub use tracks::{
    BoneHierarchy, BoneId, BoneTransform, Skeleton, TrackProperty, TrackTable, TrackTarget,
};
pub use plasma_api_core::{Value, ValueKind};
