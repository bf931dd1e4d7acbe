//! Blending utilities for track values.
//! - component-wise lerp for Float/Vec2/Vec3/Vec4
//! - unnormalized spherical interpolation for Quat
//! - weighted accumulation for n-way blends
//!
//! Step kinds (Bool/Text) and mismatched kinds have no blend defined; the
//! functions here report that with `None` and callers pick their own fallback.

use crate::{Value, ValueKind};

/// Below this angular distance slerp degrades to a plain lerp.
const SLERP_EPSILON: f32 = 1.0e-5;

#[inline]
fn lerp_f(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_array<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = lerp_f(a[i], b[i], t);
    }
    out
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

fn normalize4(q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv = len2.sqrt().recip();
        [q[0] * inv, q[1] * inv, q[2] * inv, q[3] * inv]
    } else {
        [0.0, 0.0, 0.0, 1.0]
    }
}

/// Spherical interpolation along the shortest arc without normalizing the
/// inputs or the result. Nearly parallel inputs fall back to a lerp.
pub fn slerp_unnormalized(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let mut end = b;
    let mut cos_theta = dot4(a, b);
    if cos_theta < 0.0 {
        cos_theta = -cos_theta;
        end = [-b[0], -b[1], -b[2], -b[3]];
    }

    let (s0, s1) = if 1.0 - cos_theta > SLERP_EPSILON {
        let theta = cos_theta.clamp(-1.0, 1.0).acos();
        let sin_theta = theta.sin();
        (
            ((1.0 - t) * theta).sin() / sin_theta,
            (t * theta).sin() / sin_theta,
        )
    } else {
        (1.0 - t, t)
    };

    [
        s0 * a[0] + s1 * end[0],
        s0 * a[1] + s1 * end[1],
        s0 * a[2] + s1 * end[2],
        s0 * a[3] + s1 * end[3],
    ]
}

/// Interpolate two values of the same kind.
///
/// Returns `None` when the kinds differ or the kind has no interpolation
/// (Bool/Text).
pub fn lerp_values(a: &Value, b: &Value, t: f32) -> Option<Value> {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Some(Value::Float(lerp_f(*x, *y, t))),
        (Value::Vec2(x), Value::Vec2(y)) => Some(Value::Vec2(lerp_array(x, y, t))),
        (Value::Vec3(x), Value::Vec3(y)) => Some(Value::Vec3(lerp_array(x, y, t))),
        (Value::Vec4(x), Value::Vec4(y)) => Some(Value::Vec4(lerp_array(x, y, t))),
        (Value::Quat(x), Value::Quat(y)) => Some(Value::Quat(slerp_unnormalized(*x, *y, t))),
        _ => None,
    }
}

/// Weighted n-way accumulation of one track.
///
/// Vector kinds sum component-wise; quaternions are aligned to the first
/// sample's hemisphere and renormalized on finish. Step kinds keep the sample
/// with the largest weight. Samples whose kind differs from the first one are
/// ignored.
#[derive(Clone, Debug, Default)]
pub struct WeightedSum {
    first: Option<Value>,
    sum: [f32; 4],
    best_weight: f32,
}

impl WeightedSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one weighted sample. Returns false when the sample was ignored.
    pub fn add(&mut self, value: &Value, weight: f32) -> bool {
        let (kind, align) = match &self.first {
            Some(Value::Quat(q)) => (ValueKind::Quat, Some(*q)),
            Some(first) => (first.kind(), None),
            None => {
                self.first = Some(value.clone());
                self.best_weight = weight;
                self.accumulate(value, weight, None);
                return true;
            }
        };
        if kind != value.kind() {
            return false;
        }
        if value.components().is_none() && weight > self.best_weight {
            self.first = Some(value.clone());
            self.best_weight = weight;
        }
        self.accumulate(value, weight, align);
        true
    }

    fn accumulate(&mut self, value: &Value, weight: f32, align: Option<[f32; 4]>) {
        let Some(components) = value.components() else {
            return;
        };
        let sign = match (value, align) {
            (Value::Quat(q), Some(reference)) if dot4(*q, reference) < 0.0 => -1.0,
            _ => 1.0,
        };
        for (slot, c) in self.sum.iter_mut().zip(components) {
            *slot += c * weight * sign;
        }
    }

    /// Produce the blended value, or `None` if nothing was added.
    pub fn finish(self) -> Option<Value> {
        let s = self.sum;
        match self.first? {
            Value::Float(_) => Some(Value::Float(s[0])),
            Value::Vec2(_) => Some(Value::Vec2([s[0], s[1]])),
            Value::Vec3(_) => Some(Value::Vec3([s[0], s[1], s[2]])),
            Value::Vec4(_) => Some(Value::Vec4(s)),
            Value::Quat(_) => Some(Value::Quat(normalize4(s))),
            step @ (Value::Bool(_) | Value::Text(_)) => Some(step),
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
    fn vec3_lerp_midpoint() {
        let v = lerp_values(&Value::vec3(0.0, 0.0, 0.0), &Value::vec3(2.0, 4.0, -2.0), 0.5);
        assert_eq!(v, Some(Value::vec3(1.0, 2.0, -1.0)));
    }

    #[test]
    fn text_and_mismatched_kinds_do_not_blend() {
        assert!(lerp_values(&Value::Text("a".into()), &Value::Text("b".into()), 0.5).is_none());
        assert!(lerp_values(&Value::Float(1.0), &Value::vec3(1.0, 1.0, 1.0), 0.5).is_none());
    }

    #[test]
    fn slerp_quarter_turn_halfway() {
        // identity -> 90 degrees about Z
        let h = std::f32::consts::FRAC_1_SQRT_2;
        let q = slerp_unnormalized([0.0, 0.0, 0.0, 1.0], [0.0, 0.0, h, h], 0.5);
        let angle = std::f32::consts::FRAC_PI_8;
        approx(q[2], angle.sin());
        approx(q[3], angle.cos());
    }

    #[test]
    fn slerp_takes_short_arc() {
        let q = slerp_unnormalized([0.0, 0.0, 0.0, 1.0], [0.0, 0.0, 0.0, -1.0], 0.5);
        approx(q[3].abs(), 1.0);
    }

    #[test]
    fn weighted_sum_of_vectors() {
        let mut acc = WeightedSum::new();
        acc.add(&Value::vec3(1.0, 0.0, 0.0), 0.25);
        acc.add(&Value::vec3(0.0, 1.0, 0.0), 0.75);
        assert!(!acc.add(&Value::Float(3.0), 1.0));
        assert_eq!(acc.finish(), Some(Value::vec3(0.25, 0.75, 0.0)));
    }

    #[test]
    fn weighted_sum_step_kind_keeps_heaviest() {
        let mut acc = WeightedSum::new();
        acc.add(&Value::Bool(false), 0.2);
        acc.add(&Value::Bool(true), 0.7);
        acc.add(&Value::Bool(false), 0.1);
        assert_eq!(acc.finish(), Some(Value::Bool(true)));
    }

    #[test]
    fn weighted_sum_quat_is_unit() {
        let mut acc = WeightedSum::new();
        acc.add(&Value::identity_quat(), 0.5);
        acc.add(&Value::quat(0.0, 0.0, 0.0, -1.0), 0.5);
        match acc.finish() {
            Some(Value::Quat(q)) => approx(dot4(q, q), 1.0),
            other => panic!("expected quat, got {other:?}"),
        }
    }
}
