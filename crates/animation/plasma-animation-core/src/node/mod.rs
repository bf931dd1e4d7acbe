//! Blend tree nodes.
//!
//! Nodes live in the graph's arena and are addressed by [`NodeKey`]. Every
//! node carries the common playback state ([`AnimationNode`]) plus one
//! variant payload ([`NodeKind`]). Edges are plain keys held by the parent;
//! a node is owned by at most one parent at a time.
//!
//! Updating a node yields a [`NodeStep`]: keep the node, replace it with
//! another node, or remove it. The parent applies the edit to its own edge,
//! never the child.

pub mod basic;
pub mod blend;
pub mod blend_space;
pub mod chain;
pub mod selective;

use serde::{Deserialize, Serialize};

use crate::frame::AnimationFrame;

pub use basic::{BasicAnimation, PlayMode};
pub use blend::{
    normalized_time_scales, AnimationBlendMode, AnimationBlendType, CrossBlend, DirectBlend,
};
pub use blend_space::{barycentric, nearest_three, BlendSample, BlendSpace1D, BlendSpace2D};
pub use chain::ChainNode;
pub use selective::SelectiveNode;

slotmap::new_key_type! {
    /// Generational handle to a node in an [`AnimationGraph`](crate::AnimationGraph).
    pub struct NodeKey;
}

/// Outcome of updating one node for one frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeStep {
    /// The node stays in place.
    Continue,
    /// The parent must point its edge at this node instead.
    Replace(NodeKey),
    /// The node finished; the parent must drop the edge.
    Remove,
}

impl NodeStep {
    /// The node the parent edge should point at after this step, given the
    /// key that was updated.
    #[inline]
    pub fn resolve(self, updated: NodeKey) -> Option<NodeKey> {
        match self {
            NodeStep::Continue => Some(updated),
            NodeStep::Replace(next) => Some(next),
            NodeStep::Remove => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeVariant {
    Pose,
    BasicAnimation,
    BlendSpace1D,
    BlendSpace2D,
    DirectBlend,
    CrossBlend,
    Selective,
    Chain,
}

impl NodeVariant {
    pub fn name(self) -> &'static str {
        match self {
            NodeVariant::Pose => "PoseNode",
            NodeVariant::BasicAnimation => "BasicAnimation",
            NodeVariant::BlendSpace1D => "BlendSpace1D",
            NodeVariant::BlendSpace2D => "BlendSpace2D",
            NodeVariant::DirectBlend => "DirectBlend",
            NodeVariant::CrossBlend => "CrossBlend",
            NodeVariant::Selective => "SelectiveNode",
            NodeVariant::Chain => "ChainNode",
        }
    }
}

/// Variant payload of a node.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Frozen snapshot; the frame lives in the common node state.
    Pose,
    Basic(BasicAnimation),
    BlendSpace1D(BlendSpace1D),
    BlendSpace2D(BlendSpace2D),
    DirectBlend(DirectBlend),
    CrossBlend(CrossBlend),
    Selective(SelectiveNode),
    Chain(ChainNode),
}

impl NodeKind {
    pub fn variant(&self) -> NodeVariant {
        match self {
            NodeKind::Pose => NodeVariant::Pose,
            NodeKind::Basic(_) => NodeVariant::BasicAnimation,
            NodeKind::BlendSpace1D(_) => NodeVariant::BlendSpace1D,
            NodeKind::BlendSpace2D(_) => NodeVariant::BlendSpace2D,
            NodeKind::DirectBlend(_) => NodeVariant::DirectBlend,
            NodeKind::CrossBlend(_) => NodeVariant::CrossBlend,
            NodeKind::Selective(_) => NodeVariant::Selective,
            NodeKind::Chain(_) => NodeVariant::Chain,
        }
    }

    /// Child edges in evaluation order.
    pub fn children(&self) -> Vec<NodeKey> {
        match self {
            NodeKind::Pose | NodeKind::Basic(_) => Vec::new(),
            NodeKind::BlendSpace1D(space) => space.samples.iter().map(|s| s.node).collect(),
            NodeKind::BlendSpace2D(space) => space.samples.iter().map(|s| s.node).collect(),
            NodeKind::DirectBlend(b) => vec![b.a, b.b],
            NodeKind::CrossBlend(b) => vec![b.a, b.b],
            NodeKind::Selective(s) => s.a.into_iter().chain(Some(s.b)).collect(),
            NodeKind::Chain(c) => vec![c.a, c.b],
        }
    }

    /// Point every edge that targets `old` at `new`.
    pub(crate) fn replace_child(&mut self, old: NodeKey, new: NodeKey) {
        let swap = |edge: &mut NodeKey| {
            if *edge == old {
                *edge = new;
            }
        };
        match self {
            NodeKind::Pose | NodeKind::Basic(_) => {}
            NodeKind::BlendSpace1D(space) => {
                space.samples.iter_mut().for_each(|s| swap(&mut s.node))
            }
            NodeKind::BlendSpace2D(space) => {
                space.samples.iter_mut().for_each(|s| swap(&mut s.node))
            }
            NodeKind::DirectBlend(b) => {
                swap(&mut b.a);
                swap(&mut b.b);
            }
            NodeKind::CrossBlend(b) => {
                swap(&mut b.a);
                swap(&mut b.b);
            }
            NodeKind::Selective(s) => {
                if let Some(a) = s.a.as_mut() {
                    swap(a);
                }
                swap(&mut s.b);
            }
            NodeKind::Chain(c) => {
                swap(&mut c.a);
                swap(&mut c.b);
            }
        }
    }

    /// Drop an edge whose child finished. Binary combinators keep the stale
    /// edge because they collapse in the same update.
    pub(crate) fn detach_child(&mut self, child: NodeKey) {
        match self {
            NodeKind::BlendSpace1D(space) => space.samples.retain(|s| s.node != child),
            NodeKind::BlendSpace2D(space) => space.samples.retain(|s| s.node != child),
            NodeKind::Selective(s) if s.a == Some(child) => s.a = None,
            _ => {}
        }
    }
}

/// Common playback state shared by every variant, plus the variant payload.
#[derive(Clone, Debug)]
pub struct AnimationNode {
    pub(crate) time: f32,
    pub(crate) duration: f32,
    pub(crate) time_scale: f32,
    pub(crate) collapse_to_pose: bool,
    pub(crate) collapse_to_pose_on_finish: bool,
    /// Frame id of the last real update; `None` until the first one.
    pub(crate) last_updated: Option<u64>,
    /// Result of the last update, tagged with the frame it belongs to.
    pub(crate) last_returned: Option<(u64, NodeStep)>,
    pub(crate) frame: AnimationFrame,
    pub(crate) owner: Option<NodeKey>,
    pub(crate) kind: NodeKind,
}

impl AnimationNode {
    pub(crate) fn new(kind: NodeKind, collapse_to_pose_on_finish: bool) -> Self {
        Self {
            time: 0.0,
            duration: 0.0,
            time_scale: 1.0,
            collapse_to_pose: false,
            collapse_to_pose_on_finish,
            last_updated: None,
            last_returned: None,
            frame: AnimationFrame::new(),
            owner: None,
            kind,
        }
    }

    pub(crate) fn pose(frame: AnimationFrame) -> Self {
        let mut node = Self::new(NodeKind::Pose, true);
        node.frame = frame;
        node
    }

    pub fn variant(&self) -> NodeVariant {
        self.kind.variant()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> Vec<NodeKey> {
        self.kind.children()
    }

    /// Parent holding the edge to this node, if any.
    pub fn owner(&self) -> Option<NodeKey> {
        self.owner
    }

    /// Last computed frame.
    pub fn frame(&self) -> &AnimationFrame {
        &self.frame
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Set the playback time, clamped to `[0, duration]`.
    pub fn set_time(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.duration.max(0.0));
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    /// `time / duration`, or 0 for a zero-length node.
    pub fn normalized_time(&self) -> f32 {
        if self.duration == 0.0 {
            return 0.0;
        }
        self.time / self.duration
    }

    pub fn set_normalized_time(&mut self, normalized: f32) {
        self.time = normalized.clamp(0.0, 1.0) * self.duration;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    /// Freeze this subtree into a pose on its next update.
    pub fn collapse_to_pose(&mut self) {
        self.collapse_to_pose = true;
    }

    pub fn is_collapsing_to_pose(&self) -> bool {
        self.collapse_to_pose
    }

    pub fn collapse_to_pose_on_finish(&self) -> bool {
        self.collapse_to_pose_on_finish
    }

    pub fn set_collapse_to_pose_on_finish(&mut self, collapse: bool) {
        self.collapse_to_pose_on_finish = collapse;
    }

    pub fn has_updated_this_frame(&self, frame_id: u64) -> bool {
        self.last_updated == Some(frame_id)
    }

    pub fn has_updated_at_least_once(&self) -> bool {
        self.last_updated.is_some()
    }

    /// Memoized result for `frame_id`; `Continue` when the node updated this
    /// frame without recording a substitute.
    pub(crate) fn memo(&self, frame_id: u64) -> NodeStep {
        match self.last_returned {
            Some((id, step)) if id == frame_id => step,
            _ => NodeStep::Continue,
        }
    }

    /// Clip name for leaves, variant name otherwise.
    pub fn display_name(&self) -> String {
        match &self.kind {
            NodeKind::Basic(basic) => match basic.clip() {
                Some(clip) => clip.name().to_string(),
                None => self.variant().name().to_string(),
            },
            _ => self.variant().name().to_string(),
        }
    }

    pub fn as_basic(&self) -> Option<&BasicAnimation> {
        match &self.kind {
            NodeKind::Basic(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_basic_mut(&mut self) -> Option<&mut BasicAnimation> {
        match &mut self.kind {
            NodeKind::Basic(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_cross_blend(&self) -> Option<&CrossBlend> {
        match &self.kind {
            NodeKind::CrossBlend(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_cross_blend_mut(&mut self) -> Option<&mut CrossBlend> {
        match &mut self.kind {
            NodeKind::CrossBlend(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_blend_space_1d_mut(&mut self) -> Option<&mut BlendSpace1D> {
        match &mut self.kind {
            NodeKind::BlendSpace1D(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_blend_space_2d_mut(&mut self) -> Option<&mut BlendSpace2D> {
        match &mut self.kind {
            NodeKind::BlendSpace2D(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_selective(&self) -> Option<&SelectiveNode> {
        match &self.kind {
            NodeKind::Selective(s) => Some(s),
            _ => None,
        }
    }
}
