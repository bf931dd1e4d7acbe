mod common;

use common::{approx, float_at, ramp_clip, weight_target};
use plasma_animation_core::{AnimationGraph, GraphConfig, GraphEventKind, NodeVariant, PlayMode};

#[test]
fn play_once_ends_once_and_collapses_to_pose() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("wave", weight_target("arm"), 2.0, 0.0, 1.0);
    let leaf = graph.build_basic(clip, PlayMode::PlayOnce);
    graph.set_root(leaf).unwrap();

    let out = graph.update(1.0);
    assert!(out.events.is_empty());
    assert!(approx(float_at(&out.frame, 0), 0.5, 1e-5));

    // Landing exactly on the end is still inside the clip.
    assert!(graph.update(1.0).events.is_empty());
    assert_eq!(graph.root(), Some(leaf));

    let out = graph.update(1.0);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].kind, GraphEventKind::AnimationEnded);
    assert_eq!(out.events[0].clip.name(), "wave");
    assert_eq!(out.events[0].play_mode, PlayMode::PlayOnce);
    assert_eq!(out.events[0].node, leaf);
    assert!(approx(float_at(&out.frame, 0), 1.0, 1e-5));

    let root = graph.root().unwrap();
    assert_ne!(root, leaf);
    assert_eq!(graph.node(root).unwrap().variant(), NodeVariant::Pose);

    // The frozen pose keeps producing the final frame and no more events.
    let out = graph.update(1.0);
    assert!(out.events.is_empty());
    assert!(approx(float_at(&out.frame, 0), 1.0, 1e-5));
}

#[test]
fn play_once_without_collapse_is_removed() {
    let cfg = GraphConfig {
        collapse_to_pose_on_finish: false,
        ..GraphConfig::default()
    };
    let mut graph = AnimationGraph::new(cfg);
    let clip = ramp_clip("wave", weight_target("arm"), 2.0, 0.0, 1.0);
    let leaf = graph.build_basic(clip, PlayMode::PlayOnce);
    graph.set_root(leaf).unwrap();

    graph.update(1.5);
    let out = graph.update(1.0).clone();
    assert_eq!(out.events.len(), 1);
    assert_eq!(graph.root(), None);
    // The last produced frame stays on the outputs.
    assert!(approx(float_at(&out.frame, 0), 0.75, 1e-5));

    // Retired leaf is swept on the next tick.
    assert!(graph.contains(leaf));
    graph.update(0.1);
    assert!(!graph.contains(leaf));
}

#[test]
fn pingpong_reflects_at_the_end() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("sway", weight_target("spine"), 1.0, 0.0, 1.0);
    let leaf = graph.build_basic(clip, PlayMode::Pingpong);
    graph.set_root(leaf).unwrap();

    assert!(graph.update(0.6).events.is_empty());
    let out = graph.update(0.6);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].kind, GraphEventKind::AnimationLooped);

    let node = graph.node(leaf).unwrap();
    assert!(approx(node.time(), 1.0, 1e-6));
    let basic = node.as_basic().unwrap();
    assert_eq!(basic.direction(), -1.0);
    assert_eq!(basic.loop_count(), 1);

    graph.update(0.3);
    assert!(approx(graph.node(leaf).unwrap().time(), 0.7, 1e-5));
}

#[test]
fn loop_wraps_around() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("walk", weight_target("root"), 1.0, 0.0, 1.0);
    let leaf = graph.build_basic(clip, PlayMode::Loop);
    graph.set_root(leaf).unwrap();

    let out = graph.update(1.3);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].kind, GraphEventKind::AnimationLooped);
    assert!(approx(float_at(&out.frame, 0), 0.3, 1e-5));
    assert!(approx(graph.node(leaf).unwrap().time(), 0.3, 1e-5));

    // Several wraps in one tick emit one event per wrap.
    let out = graph.update(2.0);
    assert_eq!(out.events.len(), 2);
}

#[test]
fn pingpong_reflects_at_the_start() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("sway", weight_target("spine"), 1.0, 0.0, 1.0);
    let leaf = graph.build_basic(clip, PlayMode::Pingpong);
    graph.set_root(leaf).unwrap();

    graph.update(0.6);
    assert_eq!(graph.update(0.6).events.len(), 1);
    assert!(graph.update(0.6).events.is_empty());

    let out = graph.update(0.6);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].kind, GraphEventKind::AnimationLooped);
    assert!(approx(float_at(&out.frame, 0), 0.0, 1e-6));

    let node = graph.node(leaf).unwrap();
    assert_eq!(node.time(), 0.0);
    let basic = node.as_basic().unwrap();
    assert_eq!(basic.direction(), 1.0);
    assert_eq!(basic.loop_count(), 2);

    graph.update(0.3);
    assert!(approx(graph.node(leaf).unwrap().time(), 0.3, 1e-5));
}

#[test]
fn loop_wraps_backwards_under_negative_scale() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("walk", weight_target("root"), 1.0, 0.0, 1.0);
    let leaf = graph.build_basic(clip, PlayMode::Loop);
    graph.node_mut(leaf).unwrap().set_time_scale(-1.0);
    graph.set_root(leaf).unwrap();

    let out = graph.update(0.25);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].kind, GraphEventKind::AnimationLooped);
    assert!(approx(float_at(&out.frame, 0), 0.75, 1e-5));
    assert!(approx(graph.node(leaf).unwrap().time(), 0.75, 1e-5));

    // 0.75 - 2.5 crosses the start twice.
    let out = graph.update(2.5);
    assert_eq!(out.events.len(), 2);
    assert!(approx(graph.node(leaf).unwrap().time(), 0.25, 1e-5));
}

#[test]
fn loop_wraps_a_huge_step_at_once() {
    let cfg = GraphConfig {
        max_events_per_tick: 8,
        ..GraphConfig::default()
    };
    let mut graph = AnimationGraph::new(cfg);
    let clip = ramp_clip("flutter", weight_target("root"), 1.0e-4, 0.0, 1.0);
    let leaf = graph.build_basic(clip, PlayMode::Loop);
    graph.set_root(leaf).unwrap();

    let out = graph.update(1.0e4);
    // Looped events are capped, the rest are dropped.
    assert_eq!(out.events.len(), 8);
    assert!(out
        .events
        .iter()
        .all(|e| e.kind == GraphEventKind::AnimationLooped));

    let node = graph.node(leaf).unwrap();
    assert!(node.time() >= 0.0 && node.time() < 1.0e-4);
    assert!(node.as_basic().unwrap().loop_count() > 8);
}

#[test]
fn zero_duration_never_spins() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("blink", weight_target("root"), 0.0, 1.0, 1.0);
    let looping = graph.build_basic(clip.clone(), PlayMode::Loop);
    graph.set_root(looping).unwrap();
    for _ in 0..3 {
        assert!(graph.update(1.0).events.is_empty());
    }
    assert_eq!(graph.node(looping).unwrap().time(), 0.0);

    let mut graph = AnimationGraph::default();
    let once = graph.build_basic(clip, PlayMode::PlayOnce);
    graph.set_root(once).unwrap();
    let out = graph.update(0.5);
    assert_eq!(out.events.len(), 1);
    assert_eq!(out.events[0].kind, GraphEventKind::AnimationEnded);
}

#[test]
fn graph_and_node_time_scales_multiply() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("walk", weight_target("root"), 4.0, 0.0, 4.0);
    let leaf = graph.build_basic(clip, PlayMode::Loop);
    graph.set_root(leaf).unwrap();
    graph.set_time_scale(2.0);
    graph.node_mut(leaf).unwrap().set_time_scale(0.5);

    graph.update(1.0);
    assert!(approx(graph.node(leaf).unwrap().time(), 1.0, 1e-6));
}

#[test]
fn collapse_to_pose_freezes_a_live_leaf() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("walk", weight_target("root"), 2.0, 0.0, 2.0);
    let leaf = graph.build_basic(clip, PlayMode::Loop);
    graph.set_root(leaf).unwrap();

    graph.update(0.5);
    graph.node_mut(leaf).unwrap().collapse_to_pose();
    let out = graph.update(0.5);
    // Frozen at the last computed frame, not advanced.
    assert!(approx(float_at(&out.frame, 0), 0.5, 1e-5));
    let root = graph.root().unwrap();
    assert_eq!(graph.node(root).unwrap().variant(), NodeVariant::Pose);
}

#[test]
fn collapse_before_first_update_samples_at_current_time() {
    let mut graph = AnimationGraph::default();
    let clip = ramp_clip("walk", weight_target("root"), 2.0, 0.0, 2.0);
    let leaf = graph.build_basic(clip, PlayMode::Loop);
    graph.node_mut(leaf).unwrap().set_time(1.5);
    graph.node_mut(leaf).unwrap().collapse_to_pose();
    graph.set_root(leaf).unwrap();

    let out = graph.update(10.0);
    assert!(approx(float_at(&out.frame, 0), 1.5, 1e-5));
    assert!(out.events.is_empty());
}
