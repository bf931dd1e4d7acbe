mod common;

use std::sync::atomic::Ordering;

use common::{weight_target, CountingClip};
use plasma_animation_core::{AnimationBlendType, AnimationGraph, GraphEventKind, PlayMode};

#[test]
fn each_leaf_is_sampled_once_per_tick() {
    let mut graph = AnimationGraph::default();
    let (idle, idle_samples) = CountingClip::new("idle", 4.0, weight_target("root"));
    let (run, run_samples) = CountingClip::new("run", 4.0, weight_target("root"));
    let a = graph.build_basic(idle, PlayMode::Loop);
    let b = graph.build_basic(run, PlayMode::Loop);
    let blend = graph.build_direct_blend(a, b, 10.0).unwrap();
    graph.set_root(blend).unwrap();

    for tick in 1..=5 {
        graph.update(0.1);
        assert_eq!(idle_samples.load(Ordering::SeqCst), tick);
        assert_eq!(run_samples.load(Ordering::SeqCst), tick);
        assert!(graph.node(a).unwrap().has_updated_this_frame(graph.frame_id()));
    }
}

#[test]
fn collapsing_onto_an_updated_sibling_reuses_its_result() {
    let mut graph = AnimationGraph::default();
    let (idle, idle_samples) = CountingClip::new("idle", 10.0, weight_target("root"));
    let (wave, wave_samples) = CountingClip::new("wave", 0.5, weight_target("arm"));
    let a = graph.build_basic(idle, PlayMode::Loop);
    let b = graph.build_basic(wave, PlayMode::PlayOnce);
    graph.node_mut(b).unwrap().set_collapse_to_pose_on_finish(false);
    let blend = graph
        .build_cross_blend(a, b, 5.0, AnimationBlendType::Standard)
        .unwrap();
    graph.set_root(blend).unwrap();

    graph.update(0.25);
    assert_eq!(idle_samples.load(Ordering::SeqCst), 1);
    assert_eq!(wave_samples.load(Ordering::SeqCst), 1);

    // `b` finishes, the blend collapses onto `a`, which already ran this tick.
    let out = graph.update(0.5);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].kind, GraphEventKind::AnimationEnded);
    assert_eq!(out.events[0].node, b);
    assert_eq!(idle_samples.load(Ordering::SeqCst), 2);
    assert_eq!(wave_samples.load(Ordering::SeqCst), 1);
    assert_eq!(graph.root(), Some(a));

    // Event nodes stay addressable until the next tick.
    assert!(graph.contains(b));
    graph.update(0.1);
    assert!(!graph.contains(b));
    assert!(!graph.contains(blend));
}
