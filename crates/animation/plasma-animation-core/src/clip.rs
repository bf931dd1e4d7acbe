//! Clips: immutable source animation data and the sampling contract.
//!
//! The graph never mutates a clip. Clips are shared behind `Arc` so any number
//! of leaf nodes, across any number of graphs, may sample the same clip.
//!
//! Sampling model of [`KeyframeClip`]:
//! - Each channel has keyframes at absolute times (seconds), non-decreasing.
//! - Between two keys vector kinds lerp, rotations slerp, step kinds hold left.
//! - Before the first / after the last key the end value is held.

use std::fmt::Debug;
use std::sync::Arc;

use plasma_api_core::{lerp_values, Value};
use serde::{Deserialize, Serialize};

use crate::error::ClipError;
use crate::frame::AnimationFrame;
use crate::tracks::{TrackTable, TrackTarget};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleDirection {
    Forward,
    Backward,
}

/// Who is sampling. Game sampling is what the graph uses every tick; editor
/// sampling is for scrubbing tools.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleMode {
    Game,
    Editor,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleParams {
    pub direction: SampleDirection,
    pub mode: SampleMode,
    pub time: f32,
}

impl SampleParams {
    pub fn game(time: f32) -> Self {
        Self {
            direction: SampleDirection::Forward,
            mode: SampleMode::Game,
            time,
        }
    }
}

/// Per-node link from a clip's channels to graph track indices.
/// `bindings[c]` is the track index channel `c` writes to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayState {
    pub bindings: Vec<Option<usize>>,
}

impl PlayState {
    /// Resolve every channel of `clip`, registering targets the table has not seen.
    pub fn link(clip: &dyn AnimationClip, table: &mut TrackTable) -> Self {
        Self {
            bindings: clip
                .channel_targets()
                .iter()
                .map(|t| Some(table.get_or_insert(t)))
                .collect(),
        }
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Read-only animation source consumed by leaf nodes.
pub trait AnimationClip: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Length in seconds.
    fn duration(&self) -> f32;

    /// Target of each channel, in channel order.
    fn channel_targets(&self) -> &[TrackTarget];

    /// Write the value of every bound channel at `params.time` into `out`.
    /// Must not mutate the clip.
    fn update_frame(&self, play: &PlayState, params: &SampleParams, out: &mut AnimationFrame);
}

/// Shared handle to a clip.
pub type ClipRef = Arc<dyn AnimationClip>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipChannel {
    pub target: TrackTarget,
    pub keys: Vec<Keyframe>,
}

/// Keyframed clip with linear (and slerp) sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeClip {
    name: String,
    duration: f32,
    targets: Vec<TrackTarget>,
    channels: Vec<ClipChannel>,
}

impl KeyframeClip {
    /// Validate and build a clip. Key times must be finite and non-decreasing
    /// and every key of a channel must share one value kind.
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        channels: Vec<ClipChannel>,
    ) -> Result<Self, ClipError> {
        let name = name.into();
        if !duration.is_finite() || duration < 0.0 {
            return Err(ClipError::InvalidDuration {
                clip: name,
                duration,
            });
        }
        for (idx, ch) in channels.iter().enumerate() {
            let mut last = f32::NEG_INFINITY;
            for key in &ch.keys {
                if !key.time.is_finite() || key.time < last {
                    return Err(ClipError::NonMonotonicKeys {
                        clip: name,
                        channel: idx,
                    });
                }
                last = key.time;
            }
            if let Some(first) = ch.keys.first() {
                if ch.keys.iter().any(|k| k.value.kind() != first.value.kind()) {
                    return Err(ClipError::MixedKinds {
                        clip: name,
                        channel: idx,
                    });
                }
            }
        }
        let targets = channels.iter().map(|c| c.target.clone()).collect();
        Ok(Self {
            name,
            duration,
            targets,
            channels,
        })
    }

    /// Convenience: wrap into a shared clip handle.
    pub fn into_ref(self) -> ClipRef {
        Arc::new(self)
    }

    pub fn channels(&self) -> &[ClipChannel] {
        &self.channels
    }
}

/// Find the keys bracketing `time`: `(left, right, local_t)`.
fn find_segment(keys: &[Keyframe], time: f32) -> (usize, usize, f32) {
    let n = keys.len();
    if n <= 1 || time <= keys[0].time {
        return (0, 0, 0.0);
    }
    if time >= keys[n - 1].time {
        return (n - 1, n - 1, 0.0);
    }
    // First key strictly after `time`; the one before it is the left edge.
    let right = keys.partition_point(|k| k.time <= time);
    let left = right - 1;
    let span = (keys[right].time - keys[left].time).max(f32::EPSILON);
    let t = ((time - keys[left].time) / span).clamp(0.0, 1.0);
    (left, right, t)
}

/// Sample one channel at an absolute time.
pub fn sample_channel(channel: &ClipChannel, time: f32) -> Option<Value> {
    let keys = &channel.keys;
    if keys.is_empty() {
        return None;
    }
    let (l, r, t) = find_segment(keys, time);
    if l == r {
        return Some(keys[l].value.clone());
    }
    Some(lerp_values(&keys[l].value, &keys[r].value, t).unwrap_or_else(|| keys[l].value.clone()))
}

impl AnimationClip for KeyframeClip {
    fn name(&self) -> &str {
        &self.name
    }

    fn duration(&self) -> f32 {
        self.duration
    }

    fn channel_targets(&self) -> &[TrackTarget] {
        &self.targets
    }

    fn update_frame(&self, play: &PlayState, params: &SampleParams, out: &mut AnimationFrame) {
        let time = match params.direction {
            SampleDirection::Forward => params.time,
            SampleDirection::Backward => self.duration - params.time,
        };
        for (channel, binding) in self.channels.iter().zip(&play.bindings) {
            let Some(track) = *binding else {
                continue;
            };
            if let Some(value) = sample_channel(channel, time) {
                out.set(track, value);
            }
        }
    }
}
