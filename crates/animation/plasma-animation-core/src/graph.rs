//! Graph: node arena, track table and the per-tick driver.
//!
//! Methods:
//! - builders (`build_*`) insert nodes and take exclusive ownership of children
//! - `set_root` / `cross_blend_to` pick what the graph plays
//! - `update` / `update_with` run one tick: sweep, frame id bump, root update,
//!   root replacement, pose output, event dispatch

use slotmap::SlotMap;

use crate::clip::{ClipRef, PlayState};
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::events::{EventList, GraphListener, Outputs};
use crate::frame::{lerp_frame, AnimationFrame};
use crate::node::{
    AnimationBlendType, AnimationNode, BasicAnimation, BlendSpace1D, BlendSpace2D, ChainNode,
    CrossBlend, DirectBlend, NodeKey, NodeKind, NodeStep, NodeVariant, PlayMode,
};
use crate::tracks::{Skeleton, TrackTable, TrackTarget};

/// One blend tree plus its clock. One instance per animated actor.
#[derive(Debug)]
pub struct AnimationGraph {
    pub(crate) nodes: SlotMap<NodeKey, AnimationNode>,
    pub(crate) tracks: TrackTable,
    pub(crate) time_scale: f32,
    cfg: GraphConfig,
    frame_id: u64,
    root: Option<NodeKey>,
    /// Nodes replaced or removed during the last tick; freed at the next one.
    graveyard: Vec<NodeKey>,
    outputs: Outputs,
}

impl Default for AnimationGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl AnimationGraph {
    pub fn new(cfg: GraphConfig) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(cfg.node_capacity),
            tracks: TrackTable::with_capacity(cfg.track_capacity),
            time_scale: cfg.time_scale,
            frame_id: 0,
            root: None,
            graveyard: Vec::new(),
            outputs: Outputs::default(),
            cfg,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.cfg
    }

    /// Id of the last completed tick; 0 before the first one.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    pub fn tracks(&self) -> &TrackTable {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn node(&self, key: NodeKey) -> Option<&AnimationNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut AnimationNode> {
        self.nodes.get_mut(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes currently allocated, retired ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node_ref(&self, key: NodeKey) -> Result<&AnimationNode, GraphError> {
        self.nodes.get(key).ok_or(GraphError::NodeNotFound(key))
    }

    pub(crate) fn node_mut_ref(&mut self, key: NodeKey) -> Result<&mut AnimationNode, GraphError> {
        self.nodes.get_mut(key).ok_or(GraphError::NodeNotFound(key))
    }

    // ---------------------------------------------------------------------
    // Track table

    /// Register a track target, relinking the tree if the table grew.
    pub fn register_track(&mut self, target: &TrackTarget) -> usize {
        let before = self.tracks.len();
        let index = self.tracks.get_or_insert(target);
        if self.tracks.len() != before {
            self.relink_root();
        }
        index
    }

    /// Register every bone track of `skeleton`, relinking the tree if the table grew.
    pub fn bind_skeleton(&mut self, skeleton: &Skeleton) {
        let before = self.tracks.len();
        skeleton.register_tracks(&mut self.tracks);
        if self.tracks.len() != before {
            self.relink_root();
        }
    }

    fn relink_root(&mut self) {
        if let Some(root) = self.root {
            // The root is live, so the walk cannot fail.
            let _ = self.relink_animations(root);
        }
    }

    /// Rebuild the play state of every clip leaf under `key`.
    pub fn relink_animations(&mut self, key: NodeKey) -> Result<(), GraphError> {
        self.node_ref(key)?;
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            stack.extend(node.children());
            let Some(clip) = node.as_basic().and_then(|b| b.clip.clone()) else {
                continue;
            };
            let play = PlayState::link(clip.as_ref(), &mut self.tracks);
            if let Some(basic) = self.nodes.get_mut(current).and_then(|n| n.as_basic_mut()) {
                basic.play = play;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Builders

    pub(crate) fn insert_pose(&mut self, frame: AnimationFrame) -> NodeKey {
        self.nodes.insert(AnimationNode::pose(frame))
    }

    pub(crate) fn insert(&mut self, kind: NodeKind) -> NodeKey {
        self.nodes
            .insert(AnimationNode::new(kind, self.cfg.collapse_to_pose_on_finish))
    }

    /// Frozen snapshot node.
    pub fn build_pose(&mut self, frame: AnimationFrame) -> NodeKey {
        self.insert_pose(frame)
    }

    /// Leaf playing `clip`. Its channels are registered in the track table.
    pub fn build_basic(&mut self, clip: ClipRef, play_mode: PlayMode) -> NodeKey {
        let before = self.tracks.len();
        let mut basic = BasicAnimation::new(Some(clip.clone()), play_mode);
        basic.play = PlayState::link(clip.as_ref(), &mut self.tracks);
        let key = self.insert(NodeKind::Basic(basic));
        if let Some(node) = self.nodes.get_mut(key) {
            node.duration = clip.duration();
        }
        if self.tracks.len() != before {
            self.relink_root();
        }
        key
    }

    /// Swap the clip of a leaf and relink it.
    pub fn set_clip(&mut self, key: NodeKey, clip: ClipRef) -> Result<(), GraphError> {
        let node = self.node_mut_ref(key)?;
        let variant = node.variant();
        let Some(basic) = node.as_basic_mut() else {
            return Err(GraphError::WrongVariant {
                node: key,
                expected: NodeVariant::BasicAnimation,
                actual: variant,
            });
        };
        basic.clip = Some(clip.clone());
        basic.play.clear();
        node.duration = clip.duration();
        node.time = node.time.clamp(0.0, node.duration);
        self.relink_animations(key)
    }

    /// Linear transition from `a` to `b` over `transition` seconds.
    pub fn build_direct_blend(
        &mut self,
        a: NodeKey,
        b: NodeKey,
        transition: f32,
    ) -> Result<NodeKey, GraphError> {
        self.check_free(&[a, b])?;
        let key = self.insert(NodeKind::DirectBlend(DirectBlend { a, b }));
        self.adopt_all(key);
        if let Some(node) = self.nodes.get_mut(key) {
            node.duration = transition;
        }
        Ok(key)
    }

    /// Cross-fade from `a` to `b` over `transition` seconds. `b` starts in
    /// phase with `a`.
    pub fn build_cross_blend(
        &mut self,
        a: NodeKey,
        b: NodeKey,
        transition: f32,
        blend_type: AnimationBlendType,
    ) -> Result<NodeKey, GraphError> {
        self.check_free(&[a, b])?;
        let mut cross = CrossBlend::new(a, b);
        cross.blend_type = blend_type;
        let key = self.insert(NodeKind::CrossBlend(cross));
        self.adopt_all(key);
        self.sync_cadence(key)?;
        if let Some(node) = self.nodes.get_mut(key) {
            node.time = 0.0;
            node.duration = transition;
        }
        Ok(key)
    }

    /// Play `a` to completion, then hand over to `b`.
    pub fn build_chain(&mut self, a: NodeKey, b: NodeKey) -> Result<NodeKey, GraphError> {
        self.check_free(&[a, b])?;
        let key = self.insert(NodeKind::Chain(ChainNode { a, b }));
        self.adopt_all(key);
        Ok(key)
    }

    pub fn build_blend_space_1d(&mut self) -> NodeKey {
        self.insert(NodeKind::BlendSpace1D(BlendSpace1D::default()))
    }

    pub fn build_blend_space_2d(&mut self) -> NodeKey {
        self.insert(NodeKind::BlendSpace2D(BlendSpace2D::default()))
    }

    /// Make `key` the tree the graph plays. The previous root, if any, is left
    /// detached in the arena; see [`remove_node`](Self::remove_node).
    pub fn set_root(&mut self, key: NodeKey) -> Result<(), GraphError> {
        let node = self.node_ref(key)?;
        if let Some(owner) = node.owner {
            return Err(GraphError::AlreadyOwned { node: key, owner });
        }
        self.root = Some(key);
        self.relink_animations(key)
    }

    pub fn root(&self) -> Option<NodeKey> {
        self.root
    }

    /// Detach and return the root without freeing it.
    pub fn take_root(&mut self) -> Option<NodeKey> {
        self.root.take()
    }

    /// Cross-fade from the current root (if any) into `target` and make the
    /// blend the new root. Without a root `target` becomes the root directly.
    pub fn cross_blend_to(
        &mut self,
        target: NodeKey,
        transition: f32,
        blend_type: AnimationBlendType,
    ) -> Result<NodeKey, GraphError> {
        let Some(current) = self.root.take() else {
            self.set_root(target)?;
            return Ok(target);
        };
        match self.build_cross_blend(current, target, transition, blend_type) {
            Ok(blend) => {
                self.set_root(blend)?;
                Ok(blend)
            }
            Err(err) => {
                self.root = Some(current);
                Err(err)
            }
        }
    }

    /// Free an unowned node and everything it owns. Removing the root clears it.
    pub fn remove_node(&mut self, key: NodeKey) -> Result<(), GraphError> {
        let node = self.node_ref(key)?;
        if let Some(owner) = node.owner {
            return Err(GraphError::AlreadyOwned { node: key, owner });
        }
        if self.root == Some(key) {
            self.root = None;
        }
        self.free_subtree(key, None);
        Ok(())
    }

    /// Deep copy of a subtree into fresh, unowned nodes with no update history.
    pub fn clone_node(&mut self, key: NodeKey) -> Result<NodeKey, GraphError> {
        let mut copy = self.node_ref(key)?.clone();
        copy.owner = None;
        copy.last_updated = None;
        copy.last_returned = None;
        let children = copy.children();
        let mut cloned = Vec::with_capacity(children.len());
        for child in children {
            let child_copy = self.clone_node(child)?;
            copy.kind.replace_child(child, child_copy);
            cloned.push(child_copy);
        }
        let new_key = self.nodes.insert(copy);
        for child in cloned {
            if let Some(node) = self.nodes.get_mut(child) {
                node.owner = Some(new_key);
            }
        }
        Ok(new_key)
    }

    /// Whether a clip named `name` is played by any leaf under `key`.
    pub fn is_playing_in_node(&self, key: NodeKey, name: &str) -> bool {
        let Some(node) = self.nodes.get(key) else {
            return false;
        };
        if let Some(clip) = node.as_basic().and_then(|b| b.clip()) {
            if clip.name() == name {
                return true;
            }
        }
        node.children()
            .into_iter()
            .any(|child| self.is_playing_in_node(child, name))
    }

    // ---------------------------------------------------------------------
    // Ownership

    /// Every child must be live, distinct, unowned and not the root.
    pub(crate) fn check_free(&self, children: &[NodeKey]) -> Result<(), GraphError> {
        for (i, &child) in children.iter().enumerate() {
            let node = self.node_ref(child)?;
            if let Some(owner) = node.owner {
                return Err(GraphError::AlreadyOwned { node: child, owner });
            }
            if self.root == Some(child) {
                return Err(GraphError::IsRoot(child));
            }
            if children[..i].contains(&child) {
                return Err(GraphError::AlreadyOwned {
                    node: child,
                    owner: child,
                });
            }
        }
        Ok(())
    }

    /// Attaching `child` below `parent` must not close a loop.
    pub(crate) fn check_attach(&self, parent: NodeKey, child: NodeKey) -> Result<(), GraphError> {
        self.check_free(&[child])?;
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(GraphError::Cycle { parent, child });
            }
            cursor = self.nodes.get(current).and_then(|n| n.owner);
        }
        Ok(())
    }

    fn adopt_all(&mut self, parent: NodeKey) {
        let children = self
            .nodes
            .get(parent)
            .map(|n| n.children())
            .unwrap_or_default();
        for child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.owner = Some(parent);
            }
        }
    }

    /// Point `parent`'s edge at `new` instead of `old`.
    fn adopt(&mut self, parent: NodeKey, old: NodeKey, new: NodeKey) {
        if let Some(node) = self.nodes.get_mut(new) {
            node.owner = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.kind.replace_child(old, new);
        }
    }

    /// Remove `key` and every descendant it still owns, except `keep`.
    fn free_subtree(&mut self, key: NodeKey, keep: Option<NodeKey>) {
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            if Some(current) == keep {
                continue;
            }
            let Some(node) = self.nodes.remove(current) else {
                continue;
            };
            for child in node.children() {
                let owned = self
                    .nodes
                    .get(child)
                    .is_some_and(|c| c.owner == Some(current));
                if owned {
                    stack.push(child);
                }
            }
        }
    }

    fn sweep(&mut self) {
        for key in std::mem::take(&mut self.graveyard) {
            if Some(key) == self.root {
                continue;
            }
            self.free_subtree(key, self.root);
        }
    }

    // ---------------------------------------------------------------------
    // Evaluation

    /// Update one node for `frame_id`, at most once per frame.
    pub(crate) fn update_node(
        &mut self,
        key: NodeKey,
        dt: f32,
        frame_id: u64,
        events: &mut EventList,
    ) -> NodeStep {
        let Some(node) = self.nodes.get_mut(key) else {
            log::warn!("update addressed to stale node {key:?}");
            return NodeStep::Remove;
        };
        debug_assert!(
            node.last_updated.map_or(true, |last| last <= frame_id),
            "node {key:?} updated with frame id {frame_id} after {:?}",
            node.last_updated
        );
        if node.has_updated_this_frame(frame_id) {
            return node.memo(frame_id);
        }

        let mut dt = dt;
        let collapsing = node.collapse_to_pose;
        if collapsing {
            if node.has_updated_at_least_once() {
                let frame = node.frame.clone();
                let pose = self.insert_pose(frame);
                return self.finish(key, frame_id, NodeStep::Replace(pose));
            }
            dt = 0.0;
        }
        // Marked before evaluating children so a re-entrant query sees the memo.
        node.last_updated = Some(frame_id);
        node.last_returned = None;

        let step = match node.variant() {
            NodeVariant::Pose => NodeStep::Continue,
            NodeVariant::BasicAnimation => self.update_basic(key, dt, events),
            NodeVariant::BlendSpace1D => self.update_blend_space_1d(key, dt, frame_id, events),
            NodeVariant::BlendSpace2D => self.update_blend_space_2d(key, dt, frame_id, events),
            NodeVariant::DirectBlend => self.update_direct_blend(key, dt, frame_id, events),
            NodeVariant::CrossBlend => self.update_cross_blend(key, dt, frame_id, events),
            NodeVariant::Selective => self.update_selective(key, dt, frame_id, events),
            NodeVariant::Chain => self.update_chain(key, dt, frame_id, events),
        };

        let step = match step {
            NodeStep::Continue if collapsing => {
                let frame = self
                    .nodes
                    .get(key)
                    .map(|n| n.frame.clone())
                    .unwrap_or_default();
                NodeStep::Replace(self.insert_pose(frame))
            }
            other => other,
        };
        self.finish(key, frame_id, step)
    }

    fn finish(&mut self, key: NodeKey, frame_id: u64, step: NodeStep) -> NodeStep {
        if let Some(node) = self.nodes.get_mut(key) {
            node.last_updated = Some(frame_id);
            node.last_returned = Some((frame_id, step));
        }
        if step != NodeStep::Continue {
            self.graveyard.push(key);
        }
        step
    }

    /// Update the child on `parent`'s edge and apply the resulting edit to
    /// that edge. Returns the node now on the edge, if any.
    pub(crate) fn update_child(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        dt: f32,
        frame_id: u64,
        events: &mut EventList,
    ) -> Option<NodeKey> {
        match self.update_node(child, dt, frame_id, events) {
            NodeStep::Continue => Some(child),
            NodeStep::Replace(next) => {
                self.adopt(parent, child, next);
                Some(next)
            }
            NodeStep::Remove => {
                if let Some(node) = self.nodes.get_mut(parent) {
                    node.kind.detach_child(child);
                }
                None
            }
        }
    }

    /// Replace the calling node with `survivor`'s subtree. The survivor is
    /// brought up to date first; the memo makes this free when it already is.
    pub(crate) fn collapse_to(
        &mut self,
        survivor: NodeKey,
        dt: f32,
        frame_id: u64,
        events: &mut EventList,
    ) -> NodeStep {
        match self
            .update_node(survivor, dt, frame_id, events)
            .resolve(survivor)
        {
            Some(next) => NodeStep::Replace(next),
            None => NodeStep::Remove,
        }
    }

    /// `frame(key) = lerp(frame(a), frame(b), t)`.
    pub(crate) fn lerp_children(&mut self, key: NodeKey, a: NodeKey, b: NodeKey, t: f32) {
        let Some(mut out) = self.nodes.get_mut(key).map(|n| std::mem::take(&mut n.frame)) else {
            return;
        };
        if let (Some(na), Some(nb)) = (self.nodes.get(a), self.nodes.get(b)) {
            lerp_frame(&na.frame, &nb.frame, t, &mut out);
        }
        if let Some(node) = self.nodes.get_mut(key) {
            node.frame = out;
        }
    }

    /// `frame(key) = frame(child)`.
    pub(crate) fn copy_child_frame(&mut self, key: NodeKey, child: NodeKey) {
        let Some(mut out) = self.nodes.get_mut(key).map(|n| std::mem::take(&mut n.frame)) else {
            return;
        };
        if let Some(source) = self.nodes.get(child) {
            out.copy_from(&source.frame);
        }
        if let Some(node) = self.nodes.get_mut(key) {
            node.frame = out;
        }
    }

    /// Replace the calling node with a pose of `frame(source)`.
    pub(crate) fn pose_of(&mut self, source: NodeKey) -> NodeStep {
        let frame = self
            .nodes
            .get(source)
            .map(|n| n.frame.clone())
            .unwrap_or_default();
        NodeStep::Replace(self.insert_pose(frame))
    }

    /// Advance the whole tree by `dt` seconds.
    pub fn update(&mut self, dt: f32) -> &Outputs {
        self.sweep();
        self.frame_id += 1;
        let frame_id = self.frame_id;
        log::trace!("animation graph tick {frame_id} (dt={dt})");

        let mut events = EventList::with_cap(self.cfg.max_events_per_tick);
        if let Some(root) = self.root {
            let step = self.update_node(root, dt, frame_id, &mut events);
            match step.resolve(root) {
                Some(next) => {
                    if next != root {
                        log::debug!("root {root:?} replaced by {next:?}");
                        if let Some(node) = self.nodes.get_mut(next) {
                            node.owner = None;
                        }
                        self.root = Some(next);
                    }
                    if let Some(node) = self.nodes.get(next) {
                        self.outputs.frame.copy_from(&node.frame);
                    }
                }
                None => {
                    log::debug!("root {root:?} finished");
                    self.root = None;
                }
            }
        }
        self.outputs.frame.resize(self.tracks.len());
        self.outputs.frame_id = frame_id;
        self.outputs.events = events.into_vec();
        &self.outputs
    }

    /// [`update`](Self::update), then hand the pose and every event to `listener`.
    pub fn update_with(&mut self, dt: f32, listener: &mut dyn GraphListener) {
        self.update(dt);
        listener.apply_pose(&self.tracks, &self.outputs.frame);
        for event in &self.outputs.events {
            listener.on_event(self, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::clip::{AnimationClip, SampleParams};
    use crate::events::GraphEventKind;
    use plasma_api_core::Value;

    #[derive(Debug, Default)]
    struct CountedClip {
        samples: AtomicUsize,
    }

    impl AnimationClip for CountedClip {
        fn name(&self) -> &str {
            "counted"
        }

        fn duration(&self) -> f32 {
            0.5
        }

        fn channel_targets(&self) -> &[TrackTarget] {
            &[]
        }

        fn update_frame(&self, _: &PlayState, _: &SampleParams, _: &mut AnimationFrame) {
            self.samples.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn pose(value: f32) -> AnimationFrame {
        let mut frame = AnimationFrame::with_len(1);
        frame.set(0, Value::Float(value));
        frame
    }

    #[test]
    fn repeated_update_in_one_frame_returns_the_memo() {
        let mut graph = AnimationGraph::default();
        let clip = Arc::new(CountedClip::default());
        let leaf = graph.build_basic(clip.clone(), PlayMode::PlayOnce);
        let mut events = EventList::with_cap(16);

        let first = graph.update_node(leaf, 1.0, 1, &mut events);
        let NodeStep::Replace(pose) = first else {
            panic!("finished leaf should be replaced, got {first:?}");
        };
        let second = graph.update_node(leaf, 1.0, 1, &mut events);
        assert_eq!(second, NodeStep::Replace(pose));

        assert_eq!(clip.samples.load(Ordering::SeqCst), 1);
        assert_eq!(events.len(), 1);
        let events = events.into_vec();
        assert_eq!(events[0].kind, GraphEventKind::AnimationEnded);
        assert_eq!(graph.node(pose).unwrap().variant(), NodeVariant::Pose);
    }

    #[test]
    fn children_are_exclusively_owned() {
        let mut graph = AnimationGraph::default();
        let a = graph.build_pose(pose(0.0));
        let b = graph.build_pose(pose(1.0));
        let c = graph.build_pose(pose(2.0));
        let blend = graph.build_direct_blend(a, b, 1.0).unwrap();
        assert_eq!(graph.node(a).unwrap().owner(), Some(blend));

        let err = graph.build_chain(a, c).unwrap_err();
        assert_eq!(err, GraphError::AlreadyOwned { node: a, owner: blend });
    }

    #[test]
    fn attaching_an_ancestor_is_a_cycle() {
        let mut graph = AnimationGraph::default();
        let space = graph.build_blend_space_1d();
        let outer = graph.build_blend_space_1d();
        graph.add_blend_sample_1d(outer, space, 0.0).unwrap();
        assert_eq!(
            graph.add_blend_sample_1d(space, outer, 0.0),
            Err(GraphError::Cycle {
                parent: space,
                child: outer
            })
        );
        assert_eq!(
            graph.add_blend_sample_1d(space, space, 0.0),
            Err(GraphError::AlreadyOwned {
                node: space,
                owner: outer
            })
        );
    }

    #[test]
    fn retired_nodes_are_swept_next_tick() {
        let mut graph = AnimationGraph::default();
        let a = graph.build_pose(pose(0.0));
        let b = graph.build_pose(pose(1.0));
        let blend = graph.build_direct_blend(a, b, 0.5).unwrap();
        graph.set_root(blend).unwrap();

        graph.update(1.0);
        // Blend finished and handed over to `b`; still addressable this tick.
        assert_eq!(graph.root(), Some(b));
        assert!(graph.contains(blend));
        assert!(graph.contains(a));
        assert_eq!(graph.node(b).unwrap().owner(), None);

        graph.update(0.1);
        assert!(!graph.contains(blend));
        assert!(!graph.contains(a));
        assert!(graph.contains(b));
    }

    #[test]
    fn remove_node_frees_owned_subtree() {
        let mut graph = AnimationGraph::default();
        let a = graph.build_pose(pose(0.0));
        let b = graph.build_pose(pose(1.0));
        let chain = graph.build_chain(a, b).unwrap();
        assert_eq!(graph.remove_node(a), Err(GraphError::AlreadyOwned { node: a, owner: chain }));
        graph.remove_node(chain).unwrap();
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn clone_node_copies_structure() {
        let mut graph = AnimationGraph::default();
        let a = graph.build_pose(pose(0.0));
        let b = graph.build_pose(pose(1.0));
        let blend = graph.build_direct_blend(a, b, 2.0).unwrap();
        let copy = graph.clone_node(blend).unwrap();

        let children = graph.node(copy).unwrap().children();
        assert_eq!(children.len(), 2);
        assert!(!children.contains(&a) && !children.contains(&b));
        for child in children {
            assert_eq!(graph.node(child).unwrap().owner(), Some(copy));
        }
        assert_eq!(graph.node(copy).unwrap().duration(), 2.0);
        assert_eq!(graph.node(copy).unwrap().owner(), None);
    }
}
