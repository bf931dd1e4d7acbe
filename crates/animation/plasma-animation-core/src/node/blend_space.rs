//! Blend spaces: children placed at positions, blended by proximity to a
//! query position.
//!
//! 1D: the two samples bracketing the query are linearly blended; queries
//! beyond either end use the end sample alone.
//!
//! 2D: the three samples nearest to the query are blended by the query's
//! barycentric coordinates in their triangle. Outside the triangle the raw
//! coordinates extrapolate.
//!
//! Degenerate spaces collapse to a pose: an empty space freezes its last
//! frame, and a 2D space with fewer than three samples freezes the first
//! sample's frame (a 1D space needs only one).

use plasma_api_core::WeightedSum;

use crate::error::GraphError;
use crate::events::EventList;
use crate::frame::{AnimationFrame, TrackValue};
use crate::graph::AnimationGraph;
use crate::node::{NodeKey, NodeKind, NodeStep, NodeVariant};

/// One child of a blend space and where it sits.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendSample<P> {
    pub(crate) node: NodeKey,
    pub(crate) position: P,
}

impl<P: Copy> BlendSample<P> {
    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn position(&self) -> P {
        self.position
    }
}

#[derive(Clone, Debug, Default)]
pub struct BlendSpace1D {
    pub(crate) samples: Vec<BlendSample<f32>>,
    pub(crate) position: f32,
}

impl BlendSpace1D {
    pub fn samples(&self) -> &[BlendSample<f32>] {
        &self.samples
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn set_position(&mut self, position: f32) {
        self.position = position;
    }
}

#[derive(Clone, Debug, Default)]
pub struct BlendSpace2D {
    pub(crate) samples: Vec<BlendSample<[f32; 2]>>,
    pub(crate) position: [f32; 2],
}

impl BlendSpace2D {
    pub fn samples(&self) -> &[BlendSample<[f32; 2]>] {
        &self.samples
    }

    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    pub fn set_position(&mut self, position: [f32; 2]) {
        self.position = position;
    }

    pub fn set_x_position(&mut self, x: f32) {
        self.position[0] = x;
    }

    pub fn set_y_position(&mut self, y: f32) {
        self.position[1] = y;
    }
}

#[inline]
fn distance_sq(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Indices of the three points closest to `query`, nearest first.
///
/// Single pass with a running top three. On equal distance the point seen
/// first ranks higher. `None` with fewer than three points.
pub fn nearest_three(points: &[[f32; 2]], query: [f32; 2]) -> Option<[usize; 3]> {
    if points.len() < 3 {
        return None;
    }
    let mut best = [(usize::MAX, f32::INFINITY); 3];
    for (i, &p) in points.iter().enumerate() {
        let d = distance_sq(p, query);
        if d < best[0].1 {
            best[2] = best[1];
            best[1] = best[0];
            best[0] = (i, d);
        } else if d < best[1].1 {
            best[2] = best[1];
            best[1] = (i, d);
        } else if d < best[2].1 {
            best[2] = (i, d);
        }
    }
    // Infinite or NaN distances never enter the ranking.
    if best.iter().any(|(i, _)| *i == usize::MAX) {
        return None;
    }
    Some([best[0].0, best[1].0, best[2].0])
}

/// Barycentric coordinates `(u, v, w)` of `p` in triangle `(a, b, c)`, with
/// `u + v + w = 1`. `None` when the triangle is degenerate.
pub fn barycentric(p: [f32; 2], a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> Option<[f32; 3]> {
    let v0 = [b[0] - a[0], b[1] - a[1]];
    let v1 = [c[0] - a[0], c[1] - a[1]];
    let v2 = [p[0] - a[0], p[1] - a[1]];
    let denom = v0[0] * v1[1] - v1[0] * v0[1];
    let scale = (v0[0].abs() + v0[1].abs()) * (v1[0].abs() + v1[1].abs());
    if scale == 0.0 || denom.abs() <= 1e-6 * scale {
        return None;
    }
    let v = (v2[0] * v1[1] - v1[0] * v2[1]) / denom;
    let w = (v0[0] * v2[1] - v2[0] * v0[1]) / denom;
    Some([1.0 - v - w, v, w])
}

/// Blend up to three weighted frames track by track into `out`.
///
/// Weights are renormalized over the samples active on each track; a track
/// active nowhere stays inactive.
fn blend_weighted(inputs: &[(&AnimationFrame, f32)], out: &mut AnimationFrame) {
    let len = inputs.iter().map(|(f, _)| f.len()).max().unwrap_or(0);
    out.resize(len);
    for (i, dest) in out.tracks.iter_mut().enumerate() {
        let active: Vec<_> = inputs
            .iter()
            .filter_map(|(f, w)| f.get(i).map(|v| (v, *w)))
            .collect();
        let total: f32 = active.iter().map(|(_, w)| w).sum();
        let mut sum = WeightedSum::new();
        for (value, weight) in &active {
            let weight = if total.abs() > f32::EPSILON {
                weight / total
            } else {
                *weight
            };
            sum.add(value, weight);
        }
        *dest = match sum.finish() {
            Some(value) => TrackValue::active(value),
            None => TrackValue::inactive(),
        };
    }
}

impl AnimationGraph {
    pub(crate) fn update_blend_space_1d(
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
        node.time += dt * graph_scale * node.time_scale;
        let NodeKind::BlendSpace1D(space) = &node.kind else {
            return NodeStep::Continue;
        };
        let query = space.position;
        let mut ordered: Vec<(f32, NodeKey)> =
            space.samples.iter().map(|s| (s.position, s.node)).collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        match ordered.as_slice() {
            [] => {
                log::warn!("BlendSpace1D {key:?} has no samples; freezing its last frame");
                self.pose_of(key)
            }
            [(_, only)] => match self.update_child(key, *only, dt, frame_id, events) {
                Some(child) => self.pose_of(child),
                None => self.pose_of(key),
            },
            [(_, first), ..] if query.is_nan() => {
                log::warn!("BlendSpace1D {key:?} has a NaN position; following its first sample");
                self.follow_one(key, *first, dt, frame_id, events)
            }
            [(first_pos, first), ..] if query <= *first_pos => {
                self.follow_one(key, *first, dt, frame_id, events)
            }
            [.., (last_pos, last)] if query >= *last_pos => {
                self.follow_one(key, *last, dt, frame_id, events)
            }
            _ => {
                let hi = ordered.partition_point(|(p, _)| *p <= query);
                if hi == 0 || hi >= ordered.len() {
                    let (_, first) = ordered[0];
                    return self.follow_one(key, first, dt, frame_id, events);
                }
                let (lo_pos, lo) = ordered[hi - 1];
                let (hi_pos, hi) = ordered[hi];
                let span = hi_pos - lo_pos;
                let t = if span > 0.0 { (query - lo_pos) / span } else { 0.0 };

                let lo = self.update_child(key, lo, dt, frame_id, events);
                let hi = self.update_child(key, hi, dt, frame_id, events);
                match (lo, hi) {
                    (Some(lo), Some(hi)) => self.lerp_children(key, lo, hi, t),
                    (Some(only), None) | (None, Some(only)) => self.copy_child_frame(key, only),
                    (None, None) => {}
                }
                NodeStep::Continue
            }
        }
    }

    /// Update a single sample and mirror its frame.
    fn follow_one(
        &mut self,
        key: NodeKey,
        child: NodeKey,
        dt: f32,
        frame_id: u64,
        events: &mut EventList,
    ) -> NodeStep {
        if let Some(child) = self.update_child(key, child, dt, frame_id, events) {
            self.copy_child_frame(key, child);
        }
        NodeStep::Continue
    }

    pub(crate) fn update_blend_space_2d(
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
        node.time += dt * graph_scale * node.time_scale;
        let NodeKind::BlendSpace2D(space) = &node.kind else {
            return NodeStep::Continue;
        };
        let query = space.position;
        let positions: Vec<[f32; 2]> = space.samples.iter().map(|s| s.position).collect();
        let keys: Vec<NodeKey> = space.samples.iter().map(|s| s.node).collect();

        if keys.is_empty() {
            log::warn!("BlendSpace2D {key:?} has no samples; freezing its last frame");
            return self.pose_of(key);
        }
        let Some(nearest) = nearest_three(&positions, query) else {
            log::warn!(
                "BlendSpace2D {key:?} needs 3 samples, has {}; using the first",
                keys.len()
            );
            return match self.update_child(key, keys[0], dt, frame_id, events) {
                Some(child) => self.pose_of(child),
                None => self.pose_of(key),
            };
        };

        let [a, b, c] = nearest.map(|i| positions[i]);
        let weights = barycentric(query, a, b, c).unwrap_or_else(|| {
            log::warn!("BlendSpace2D {key:?}: nearest samples are collinear; using the closest");
            [1.0, 0.0, 0.0]
        });

        let mut live = Vec::with_capacity(3);
        for (slot, weight) in nearest.into_iter().zip(weights) {
            if let Some(child) = self.update_child(key, keys[slot], dt, frame_id, events) {
                live.push((child, weight));
            }
        }

        let Some(mut out) = self.nodes.get_mut(key).map(|n| std::mem::take(&mut n.frame)) else {
            return NodeStep::Remove;
        };
        let inputs: Vec<(&AnimationFrame, f32)> = live
            .iter()
            .filter_map(|(child, w)| self.nodes.get(*child).map(|n| (&n.frame, *w)))
            .collect();
        if !inputs.is_empty() {
            blend_weighted(&inputs, &mut out);
        }
        if let Some(node) = self.nodes.get_mut(key) {
            node.frame = out;
        }
        NodeStep::Continue
    }

    fn blend_space_samples(&self, space: NodeKey) -> Result<Vec<NodeKey>, GraphError> {
        let node = self.node_ref(space)?;
        match node.kind() {
            NodeKind::BlendSpace1D(_) | NodeKind::BlendSpace2D(_) => Ok(node.children()),
            _ => Err(GraphError::WrongVariant {
                node: space,
                expected: NodeVariant::BlendSpace2D,
                actual: node.variant(),
            }),
        }
    }

    /// Place `child` at `position` in a 1D space. Adding a child that is
    /// already a sample of this space is a no-op.
    pub fn add_blend_sample_1d(
        &mut self,
        space: NodeKey,
        child: NodeKey,
        position: f32,
    ) -> Result<(), GraphError> {
        if self.blend_space_samples(space)?.contains(&child) {
            return Ok(());
        }
        self.check_attach(space, child)?;
        let node = self.node_mut_ref(space)?;
        let variant = node.variant();
        let Some(s) = node.as_blend_space_1d_mut() else {
            return Err(GraphError::WrongVariant {
                node: space,
                expected: NodeVariant::BlendSpace1D,
                actual: variant,
            });
        };
        s.samples.push(BlendSample { node: child, position });
        self.node_mut_ref(child)?.owner = Some(space);
        self.relink_animations(space)
    }

    /// Place `child` at `position` in a 2D space. Adding a child that is
    /// already a sample of this space is a no-op.
    pub fn add_blend_sample_2d(
        &mut self,
        space: NodeKey,
        child: NodeKey,
        position: [f32; 2],
    ) -> Result<(), GraphError> {
        if self.blend_space_samples(space)?.contains(&child) {
            return Ok(());
        }
        self.check_attach(space, child)?;
        let node = self.node_mut_ref(space)?;
        let variant = node.variant();
        let Some(s) = node.as_blend_space_2d_mut() else {
            return Err(GraphError::WrongVariant {
                node: space,
                expected: NodeVariant::BlendSpace2D,
                actual: variant,
            });
        };
        s.samples.push(BlendSample { node: child, position });
        self.node_mut_ref(child)?.owner = Some(space);
        self.relink_animations(space)
    }

    /// Detach `child` from a blend space and hand it back to the caller
    /// unowned. Returns whether it was a sample.
    pub fn remove_blend_sample(
        &mut self,
        space: NodeKey,
        child: NodeKey,
    ) -> Result<bool, GraphError> {
        if !self.blend_space_samples(space)?.contains(&child) {
            return Ok(false);
        }
        self.node_mut_ref(space)?.kind.detach_child(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.owner = None;
        }
        self.relink_animations(space)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-5, "left={a} right={b}");
    }

    #[test]
    fn nearest_three_ranks_by_distance() {
        let points = [[0.0, 0.0], [10.0, 10.0], [1.0, 0.0], [0.0, 2.0], [5.0, 5.0]];
        assert_eq!(nearest_three(&points, [0.1, 0.1]), Some([0, 2, 3]));
        assert_eq!(nearest_three(&points[..2], [0.0, 0.0]), None);
    }

    #[test]
    fn nearest_three_prefers_first_seen_on_ties() {
        let points = [[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]];
        assert_eq!(nearest_three(&points, [0.0, 0.0]), Some([0, 1, 2]));
    }

    #[test]
    fn barycentric_weights_sum_to_one_inside_triangle() {
        let (a, b, c) = ([0.0, 0.0], [4.0, 0.0], [0.0, 4.0]);
        for p in [[1.0, 1.0], [0.5, 2.0], [2.0, 0.25], [1.3, 1.3]] {
            let w = barycentric(p, a, b, c).unwrap();
            approx(w.iter().sum(), 1.0);
            assert!(w.iter().all(|x| (0.0..=1.0).contains(x)), "{w:?}");
        }
        let w = barycentric(a, a, b, c).unwrap();
        approx(w[0], 1.0);
    }

    #[test]
    fn barycentric_rejects_collinear_points() {
        assert_eq!(barycentric([0.5, 0.5], [0.0, 0.0], [1.0, 1.0], [2.0, 2.0]), None);
    }
}
