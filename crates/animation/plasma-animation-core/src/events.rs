//! Output contracts of one graph tick.
//!
//! Events are collected during traversal and only handed out once the whole
//! tree has been updated, so consumers never observe a half-updated tree.

use crate::clip::ClipRef;
use crate::frame::AnimationFrame;
use crate::graph::AnimationGraph;
use crate::node::{NodeKey, PlayMode};
use crate::tracks::{Skeleton, TrackTable};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GraphEventKind {
    /// A play-once animation reached its end.
    AnimationEnded,
    /// A looping or ping-pong animation wrapped around.
    AnimationLooped,
}

/// Discrete signal emitted by a leaf during a tick.
///
/// `node` stays addressable until the start of the next tick, even when the
/// leaf was replaced or removed in the tick that emitted the event.
#[derive(Clone, Debug)]
pub struct AnimationGraphEvent {
    pub kind: GraphEventKind,
    pub clip: ClipRef,
    pub play_mode: PlayMode,
    pub node: NodeKey,
}

/// Append-only event buffer for one traversal.
#[derive(Debug)]
pub struct EventList {
    events: Vec<AnimationGraphEvent>,
    cap: usize,
    dropped: usize,
}

impl EventList {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            events: Vec::new(),
            cap,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: AnimationGraphEvent) {
        if self.events.len() >= self.cap {
            self.dropped += 1;
            return;
        }
        self.events.push(event);
    }

    /// Push `count` copies of `event`; copies past the cap are counted as dropped.
    pub fn push_repeated(&mut self, event: AnimationGraphEvent, count: u64) {
        let room = self.cap.saturating_sub(self.events.len());
        let kept = usize::try_from(count).map_or(room, |n| n.min(room));
        let overflow = count.saturating_sub(kept as u64);
        self.dropped = self
            .dropped
            .saturating_add(usize::try_from(overflow).unwrap_or(usize::MAX));
        if kept > 0 {
            self.events.extend(std::iter::repeat(event).take(kept));
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_vec(self) -> Vec<AnimationGraphEvent> {
        if self.dropped > 0 {
            log::warn!(
                "dropped {} animation events over the per-tick cap of {}",
                self.dropped,
                self.cap
            );
        }
        self.events
    }
}

/// Result of the latest tick.
#[derive(Clone, Debug, Default)]
pub struct Outputs {
    pub frame_id: u64,
    /// Final pose, one slot per track of the graph's track table.
    pub frame: AnimationFrame,
    pub events: Vec<AnimationGraphEvent>,
}

/// Host hooks invoked by [`AnimationGraph::update_with`] after traversal.
pub trait GraphListener {
    /// Receives the final frame before any event is dispatched.
    fn apply_pose(&mut self, _tracks: &TrackTable, _frame: &AnimationFrame) {}

    fn on_event(&mut self, _graph: &AnimationGraph, _event: &AnimationGraphEvent) {}
}

impl GraphListener for Skeleton {
    fn apply_pose(&mut self, tracks: &TrackTable, frame: &AnimationFrame) {
        self.apply_frame(tracks, frame);
    }
}

/// Listener that records every event; handy for hosts that poll.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    pub events: Vec<AnimationGraphEvent>,
}

impl GraphListener for EventRecorder {
    fn on_event(&mut self, _graph: &AnimationGraph, event: &AnimationGraphEvent) {
        self.events.push(event.clone());
    }
}
