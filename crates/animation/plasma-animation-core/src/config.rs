//! Graph configuration.

use serde::{Deserialize, Serialize};

/// Configuration for one animation graph instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Initial global time scale applied on top of every node's own scale.
    pub time_scale: f32,

    /// Capacity hints for the node arena and the track table.
    pub node_capacity: usize,
    pub track_capacity: usize,

    /// Events beyond this count in a single tick are dropped with a warning.
    pub max_events_per_tick: usize,

    /// Default `collapse_to_pose_on_finish` for newly built nodes.
    pub collapse_to_pose_on_finish: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            node_capacity: 64,
            track_capacity: 64,
            max_events_per_tick: 1024,
            collapse_to_pose_on_finish: true,
        }
    }
}
