//! Animation frames: positional per-track snapshots produced by every node.
//!
//! Track `i` of every frame in a graph refers to the same bone property; the
//! index is assigned once by the graph's [`TrackTable`](crate::tracks::TrackTable).

use plasma_api_core::{lerp_values, Value};
use serde::{Deserialize, Serialize};

/// One track slot. An inactive track carries no meaningful value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackValue {
    pub active: bool,
    pub value: Value,
}

impl TrackValue {
    pub fn active(value: Value) -> Self {
        Self {
            active: true,
            value,
        }
    }

    pub fn inactive() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub tracks: Vec<TrackValue>,
}

impl AnimationFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame of `len` inactive tracks.
    pub fn with_len(len: usize) -> Self {
        Self {
            tracks: vec![TrackValue::inactive(); len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Grow (with inactive tracks) or shrink to exactly `len` tracks.
    pub fn resize(&mut self, len: usize) {
        self.tracks.resize(len, TrackValue::inactive());
    }

    /// Set track `index`, growing the frame if needed.
    pub fn set(&mut self, index: usize, value: Value) {
        if index >= self.tracks.len() {
            self.resize(index + 1);
        }
        self.tracks[index] = TrackValue::active(value);
    }

    /// Active value of track `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.tracks
            .get(index)
            .filter(|t| t.active)
            .map(|t| &t.value)
    }

    /// Replace the contents with a copy of `other`, reusing the allocation.
    pub fn copy_from(&mut self, other: &AnimationFrame) {
        self.tracks.clone_from(&other.tracks);
    }
}

/// Blend two frames into `out` at parameter `t`.
///
/// Per track: when both sides are active, vector kinds lerp and rotations
/// slerp (unnormalized); kinds without an interpolation pass `a` through
/// unchanged. A track active on only one side copies that side.
pub fn lerp_frame(a: &AnimationFrame, b: &AnimationFrame, t: f32, out: &mut AnimationFrame) {
    let len = a.len().max(b.len());
    out.resize(len);
    let inactive = TrackValue::inactive();
    for (i, dest) in out.tracks.iter_mut().enumerate() {
        let ta = a.tracks.get(i).unwrap_or(&inactive);
        let tb = b.tracks.get(i).unwrap_or(&inactive);
        *dest = match (ta.active, tb.active) {
            (true, true) => {
                let value =
                    lerp_values(&ta.value, &tb.value, t).unwrap_or_else(|| ta.value.clone());
                TrackValue::active(value)
            }
            (true, false) => ta.clone(),
            (false, _) => tb.clone(),
        };
    }
}
