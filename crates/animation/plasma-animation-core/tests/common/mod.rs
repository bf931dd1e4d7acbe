#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use plasma_animation_core::{
    AnimationClip, AnimationFrame, ClipChannel, ClipRef, Keyframe, KeyframeClip, PlayState,
    SampleParams, Skeleton, TrackProperty, TrackTarget, Value,
};

pub fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

pub fn float_at(frame: &AnimationFrame, track: usize) -> f32 {
    match frame.get(track) {
        Some(Value::Float(v)) => *v,
        other => panic!("track {track} is not an active float: {other:?}"),
    }
}

pub fn vec3_at(frame: &AnimationFrame, track: usize) -> [f32; 3] {
    match frame.get(track) {
        Some(Value::Vec3(v)) => *v,
        other => panic!("track {track} is not an active vec3: {other:?}"),
    }
}

/// Scalar channel going linearly from `from` at 0 to `to` at `duration`.
pub fn ramp_clip(name: &str, target: TrackTarget, duration: f32, from: f32, to: f32) -> ClipRef {
    KeyframeClip::new(
        name,
        duration,
        vec![ClipChannel {
            target,
            keys: vec![
                Keyframe {
                    time: 0.0,
                    value: Value::Float(from),
                },
                Keyframe {
                    time: duration,
                    value: Value::Float(to),
                },
            ],
        }],
    )
    .expect("valid clip")
    .into_ref()
}

/// Custom scalar property used by most tests.
pub fn weight_target(bone: &str) -> TrackTarget {
    TrackTarget::new(bone, TrackProperty::Custom("weight".into()))
}

/// Constant translation on `bone` for `duration` seconds.
pub fn hold_translation(name: &str, bone: &str, duration: f32, v: [f32; 3]) -> ClipRef {
    KeyframeClip::new(
        name,
        duration,
        vec![ClipChannel {
            target: TrackTarget::new(bone, TrackProperty::Translation),
            keys: vec![Keyframe {
                time: 0.0,
                value: Value::Vec3(v),
            }],
        }],
    )
    .expect("valid clip")
    .into_ref()
}

/// root -> spine -> (arm -> hand), root -> leg
pub fn humanoid() -> Skeleton {
    let mut s = Skeleton::new();
    s.add_bone("root", None).unwrap();
    s.add_bone("spine", Some("root")).unwrap();
    s.add_bone("arm", Some("spine")).unwrap();
    s.add_bone("hand", Some("arm")).unwrap();
    s.add_bone("leg", Some("root")).unwrap();
    s
}

/// Clip that counts how often it is sampled and writes the sample time.
#[derive(Debug)]
pub struct CountingClip {
    pub name: String,
    pub duration: f32,
    pub targets: Vec<TrackTarget>,
    pub samples: Arc<AtomicUsize>,
}

impl CountingClip {
    pub fn new(name: &str, duration: f32, target: TrackTarget) -> (ClipRef, Arc<AtomicUsize>) {
        let samples = Arc::new(AtomicUsize::new(0));
        let clip = CountingClip {
            name: name.to_string(),
            duration,
            targets: vec![target],
            samples: samples.clone(),
        };
        (Arc::new(clip), samples)
    }
}

impl AnimationClip for CountingClip {
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
        self.samples.fetch_add(1, Ordering::SeqCst);
        for track in play.bindings.iter().flatten() {
            out.set(*track, Value::Float(params.time));
        }
    }
}
