//! Leaf node driving one clip.
//!
//! Per update:
//! 1. `time += dt * graph_scale * direction * node_scale`
//! 2. when the time is outside `[0, duration]`:
//!    - PlayOnce: emit `AnimationEnded`, then collapse to a pose of the final
//!      frame (or finish with `Remove` when collapse-on-finish is off)
//!    - Pingpong: clamp, flip direction, emit `AnimationLooped`
//!    - Loop: wrap modulo the duration, emit one `AnimationLooped` per wrap
//! 3. sample the clip at `time`
//!
//! A zero-length clip never wraps or flips; on PlayOnce any movement of the
//! clock counts as reaching the end.

use serde::{Deserialize, Serialize};

use crate::clip::{ClipRef, PlayState, SampleParams};
use crate::events::{AnimationGraphEvent, EventList, GraphEventKind};
use crate::graph::AnimationGraph;
use crate::node::{NodeKey, NodeKind, NodeStep};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayMode {
    #[default]
    PlayOnce,
    Loop,
    Pingpong,
}

#[derive(Clone, Debug)]
pub struct BasicAnimation {
    pub(crate) clip: Option<ClipRef>,
    pub(crate) play_mode: PlayMode,
    /// +1 forward, -1 backward.
    pub(crate) direction: f32,
    pub(crate) play: PlayState,
    pub(crate) loop_count: u32,
}

impl BasicAnimation {
    pub(crate) fn new(clip: Option<ClipRef>, play_mode: PlayMode) -> Self {
        Self {
            clip,
            play_mode,
            direction: 1.0,
            play: PlayState::default(),
            loop_count: 0,
        }
    }

    pub fn clip(&self) -> Option<&ClipRef> {
        self.clip.as_ref()
    }

    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.play_mode = mode;
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    /// Number of loop/ping-pong transitions so far.
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn play_state(&self) -> &PlayState {
        &self.play
    }
}

/// Number of whole durations `time` lies outside `[0, duration]`.
fn loop_wraps(time: f32, duration: f32) -> u64 {
    let wraps = (time / duration).floor().abs().max(1.0);
    // `as` saturates, infinity included
    wraps as u64
}

/// `time` folded into `[0, duration)`.
fn wrap_time(time: f32, duration: f32) -> f32 {
    let wrapped = time.rem_euclid(duration);
    if wrapped.is_finite() && wrapped < duration {
        wrapped
    } else {
        0.0
    }
}

/// What the clock did this tick.
enum Advance {
    Playing,
    Finished,
}

impl AnimationGraph {
    pub(crate) fn update_basic(
        &mut self,
        key: NodeKey,
        dt: f32,
        events: &mut EventList,
    ) -> NodeStep {
        let graph_scale = self.time_scale;
        let track_count = self.tracks.len();
        let Some(node) = self.nodes.get_mut(key) else {
            return NodeStep::Remove;
        };
        let NodeKind::Basic(basic) = &mut node.kind else {
            return NodeStep::Continue;
        };
        let Some(clip) = basic.clip.clone() else {
            return NodeStep::Continue;
        };

        node.time += dt * graph_scale * basic.direction * node.time_scale;

        let play_mode = basic.play_mode;
        let event = |kind| AnimationGraphEvent {
            kind,
            clip: clip.clone(),
            play_mode,
            node: key,
        };

        let mut advance = Advance::Playing;
        if node.duration > 0.0 {
            if node.time > node.duration || node.time < 0.0 {
                match play_mode {
                    PlayMode::PlayOnce => {
                        events.push(event(GraphEventKind::AnimationEnded));
                        advance = Advance::Finished;
                    }
                    PlayMode::Pingpong => {
                        node.time = node.time.clamp(0.0, node.duration);
                        basic.direction = -basic.direction;
                        basic.loop_count = basic.loop_count.saturating_add(1);
                        events.push(event(GraphEventKind::AnimationLooped));
                    }
                    PlayMode::Loop => {
                        let wraps = loop_wraps(node.time, node.duration);
                        node.time = wrap_time(node.time, node.duration);
                        basic.loop_count = basic
                            .loop_count
                            .saturating_add(u32::try_from(wraps).unwrap_or(u32::MAX));
                        events.push_repeated(event(GraphEventKind::AnimationLooped), wraps);
                    }
                }
            }
        } else if play_mode == PlayMode::PlayOnce && node.time != 0.0 {
            events.push(event(GraphEventKind::AnimationEnded));
            advance = Advance::Finished;
        } else {
            node.time = 0.0;
        }

        if let Advance::Finished = advance {
            if !node.collapse_to_pose_on_finish {
                return NodeStep::Remove;
            }
            node.time = node.time.clamp(0.0, node.duration.max(0.0));
        }

        node.frame.resize(track_count);
        clip.update_frame(&basic.play, &SampleParams::game(node.time), &mut node.frame);

        match advance {
            Advance::Playing => NodeStep::Continue,
            Advance::Finished => {
                let frame = node.frame.clone();
                NodeStep::Replace(self.insert_pose(frame))
            }
        }
    }
}
