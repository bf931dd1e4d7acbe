//! Binary blends over a transition window `[0, duration]`.
//!
//! Both blends collapse to the surviving child as soon as either child
//! finishes, and to `b` once the window has elapsed.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::events::EventList;
use crate::graph::AnimationGraph;
use crate::node::{NodeKey, NodeKind, NodeStep, NodeVariant};

/// Linear transition from `a` to `b`; both children see the tick's `dt`.
#[derive(Clone, Debug)]
pub struct DirectBlend {
    pub(crate) a: NodeKey,
    pub(crate) b: NodeKey,
}

impl DirectBlend {
    pub fn a(&self) -> NodeKey {
        self.a
    }

    pub fn b(&self) -> NodeKey {
        self.b
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimationBlendType {
    /// Branch rates are whatever `time_scale_from`/`time_scale_to` say.
    #[default]
    Standard,
    /// Branch rates are interpolated so both branches cover the same fraction
    /// of their clip per second.
    Normalized,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimationBlendMode {
    /// The blend clock advances with the graph and completes on its own.
    #[default]
    Auto,
    /// The blend position is driven externally and never completes on its own.
    Manual,
}

/// Cross-fade with independent per-branch playback rates.
#[derive(Clone, Debug)]
pub struct CrossBlend {
    pub(crate) a: NodeKey,
    pub(crate) b: NodeKey,
    pub(crate) time_scale_from: f32,
    pub(crate) time_scale_to: f32,
    pub(crate) blend_type: AnimationBlendType,
    pub(crate) mode: AnimationBlendMode,
}

impl CrossBlend {
    pub(crate) fn new(a: NodeKey, b: NodeKey) -> Self {
        Self {
            a,
            b,
            time_scale_from: 1.0,
            time_scale_to: 1.0,
            blend_type: AnimationBlendType::Standard,
            mode: AnimationBlendMode::Auto,
        }
    }

    pub fn a(&self) -> NodeKey {
        self.a
    }

    pub fn b(&self) -> NodeKey {
        self.b
    }

    pub fn time_scale_from(&self) -> f32 {
        self.time_scale_from
    }

    pub fn time_scale_to(&self) -> f32 {
        self.time_scale_to
    }

    pub fn set_time_scales(&mut self, from: f32, to: f32) {
        self.time_scale_from = from;
        self.time_scale_to = to;
    }

    pub fn blend_type(&self) -> AnimationBlendType {
        self.blend_type
    }

    pub fn set_blend_type(&mut self, blend_type: AnimationBlendType) {
        self.blend_type = blend_type;
    }

    pub fn mode(&self) -> AnimationBlendMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AnimationBlendMode) {
        self.mode = mode;
    }
}

/// Playback rate (clip fractions per second) of a node of length `duration`.
#[inline]
fn rate(duration: f32) -> f32 {
    if duration > 0.0 {
        1.0 / duration
    } else {
        0.0
    }
}

/// Branch scales `(from, to)` and the clamped blend position for an external
/// scrub value `current` within `[min, max]`.
///
/// Inside the range both branches play at the interpolated rate scaled to
/// their own length. Outside it the nearer branch plays at `current / bound`
/// and the other branch is slaved to it.
pub fn normalized_time_scales(
    duration_a: f32,
    duration_b: f32,
    min: f32,
    max: f32,
    current: f32,
) -> (f32, f32, f32) {
    let rate_a = rate(duration_a);
    let rate_b = rate(duration_b);
    let blend = (current - min) / (max - min);

    let (from, to) = if blend < 0.0 {
        let from = current / min;
        (from, duration_b * from * rate_a)
    } else if blend > 1.0 {
        let to = current / max;
        (duration_a * to * rate_b, to)
    } else {
        let r = rate_a + (rate_b - rate_a) * blend;
        (duration_a * r, duration_b * r)
    };
    (from, to, blend.clamp(0.0, 1.0))
}

impl AnimationGraph {
    pub(crate) fn update_direct_blend(
        &mut self,
        key: NodeKey,
        dt: f32,
        frame_id: u64,
        events: &mut EventList,
    ) -> NodeStep {
        let graph_scale = self.time_scale;
        let Some(node) = self.nodes.get_mut(key) else {
            return NodeStep::Remove;
        };
        let NodeKind::DirectBlend(blend) = &node.kind else {
            return NodeStep::Continue;
        };
        let (a, b) = (blend.a, blend.b);

        node.time += dt * graph_scale * node.time_scale;
        if node.time > node.duration {
            return self.collapse_to(b, dt, frame_id, events);
        }
        let t = if node.duration > 0.0 {
            node.time / node.duration
        } else {
            1.0
        };

        let Some(a) = self.update_child(key, a, dt, frame_id, events) else {
            return self.collapse_to(b, dt, frame_id, events);
        };
        let Some(b) = self.update_child(key, b, dt, frame_id, events) else {
            return self.collapse_to(a, dt, frame_id, events);
        };

        self.lerp_children(key, a, b, t);
        NodeStep::Continue
    }

    pub(crate) fn update_cross_blend(
        &mut self,
        key: NodeKey,
        dt: f32,
        frame_id: u64,
        events: &mut EventList,
    ) -> NodeStep {
        let graph_scale = self.time_scale;
        let Some(node) = self.nodes.get_mut(key) else {
            return NodeStep::Remove;
        };
        let NodeKind::CrossBlend(blend) = &node.kind else {
            return NodeStep::Continue;
        };
        let (a, b, mode, blend_type) = (blend.a, blend.b, blend.mode, blend.blend_type);

        if mode == AnimationBlendMode::Auto {
            node.time += dt * graph_scale * node.time_scale;
        }
        let blend_t = if node.duration != 0.0 {
            node.time / node.duration
        } else {
            0.0
        };
        let (mut from, mut to) = (blend.time_scale_from, blend.time_scale_to);

        if mode == AnimationBlendMode::Auto && node.time > node.duration {
            return self.collapse_to(b, dt * to, frame_id, events);
        }

        if blend_type == AnimationBlendType::Normalized {
            let duration_a = self.nodes.get(a).map_or(0.0, |n| n.duration);
            let duration_b = self.nodes.get(b).map_or(0.0, |n| n.duration);
            let passed = rate(duration_a) + (rate(duration_b) - rate(duration_a)) * blend_t;
            from = passed * duration_a;
            to = passed * duration_b;
            if let Some(cross) = self.nodes.get_mut(key).and_then(|n| n.as_cross_blend_mut()) {
                cross.set_time_scales(from, to);
            }
        }

        let Some(a) = self.update_child(key, a, dt * from, frame_id, events) else {
            return self.collapse_to(b, dt * to, frame_id, events);
        };
        let Some(b) = self.update_child(key, b, dt * to, frame_id, events) else {
            return self.collapse_to(a, dt * from, frame_id, events);
        };

        self.lerp_children(key, a, b, blend_t);
        NodeStep::Continue
    }

    /// Set `b`'s time to `a`'s normalized time so both branches start in phase.
    pub fn sync_cadence(&mut self, key: NodeKey) -> Result<(), GraphError> {
        let (a, b) = self.cross_children(key)?;
        let normalized = self.node_ref(a)?.normalized_time();
        self.node_mut_ref(b)?.set_normalized_time(normalized);
        Ok(())
    }

    /// Map an external scrub value onto matching branch rates and the blend
    /// position. Switches the blend to `Standard` so the rates stick.
    pub fn set_normalized_time_scale(
        &mut self,
        key: NodeKey,
        min: f32,
        max: f32,
        current: f32,
    ) -> Result<(), GraphError> {
        if max == min || !min.is_finite() || !max.is_finite() {
            return Err(GraphError::InvalidBlendRange { min, max });
        }
        let (a, b) = self.cross_children(key)?;
        let duration_a = self.node_ref(a)?.duration;
        let duration_b = self.node_ref(b)?.duration;
        let (from, to, blend) = normalized_time_scales(duration_a, duration_b, min, max, current);

        let node = self.node_mut_ref(key)?;
        if let Some(cross) = node.as_cross_blend_mut() {
            cross.set_blend_type(AnimationBlendType::Standard);
            cross.set_time_scales(from, to);
        }
        node.set_normalized_time(blend);
        Ok(())
    }

    fn cross_children(&self, key: NodeKey) -> Result<(NodeKey, NodeKey), GraphError> {
        let node = self.node_ref(key)?;
        match node.as_cross_blend() {
            Some(cross) => Ok((cross.a, cross.b)),
            None => Err(GraphError::WrongVariant {
                node: key,
                expected: NodeVariant::CrossBlend,
                actual: node.variant(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-5, "left={a} right={b}");
    }

    #[test]
    fn normalized_scales_inside_range_match_rates() {
        // 1s walk, 0.5s run: halfway both cover 0.75 clips/s relative to their length.
        let (from, to, blend) = normalized_time_scales(1.0, 0.5, 0.0, 2.0, 1.0);
        approx(blend, 0.5);
        let r = 1.0 + (2.0 - 1.0) * 0.5;
        approx(from, 1.0 * r);
        approx(to, 0.5 * r);
        // Same fraction of each clip per second.
        approx(from / 1.0, to / 0.5);
    }

    #[test]
    fn normalized_scales_clamp_outside_range() {
        let (from, to, blend) = normalized_time_scales(1.0, 0.5, 1.0, 2.0, 0.5);
        approx(blend, 0.0);
        approx(from, 0.5);
        approx(to, 0.5 * 0.5 * 1.0);

        let (from, to, blend) = normalized_time_scales(1.0, 0.5, 1.0, 2.0, 4.0);
        approx(blend, 1.0);
        approx(to, 2.0);
        approx(from, 1.0 * 2.0 * 2.0);
    }
}
