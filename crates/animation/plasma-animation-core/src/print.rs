//! Diagnostics: indented text dump and a serializable snapshot of a subtree.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::graph::AnimationGraph;
use crate::node::{NodeKey, NodeKind, NodeVariant, PlayMode};

const INDENT: &str = "|   ";

/// Serializable view of one node and its subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub variant: NodeVariant,
    pub name: String,
    pub time: f32,
    pub duration: f32,
    pub time_scale: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_mode: Option<PlayMode>,
    /// Query position of blend spaces (1 or 2 components).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescription>,
}

impl AnimationGraph {
    /// Human-readable dump of the subtree under `key`, one node per line.
    pub fn print_node(&self, key: NodeKey) -> String {
        let mut out = String::new();
        self.print_into(key, 0, &mut out);
        out
    }

    fn print_into(&self, key: NodeKey, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        let Some(node) = self.nodes.get(key) else {
            let _ = writeln!(out, "<missing {key:?}>");
            return;
        };
        let _ = match &node.kind {
            NodeKind::Pose => writeln!(out, "Pose"),
            NodeKind::Basic(_) => writeln!(
                out,
                "BasicAnimation: {}, at: {}s of {}s",
                node.display_name(),
                node.time,
                node.duration
            ),
            NodeKind::BlendSpace1D(space) => writeln!(out, "BlendSpace1D at {}:", space.position),
            NodeKind::BlendSpace2D(space) => writeln!(
                out,
                "BlendSpace2D at ({}, {}):",
                space.position[0], space.position[1]
            ),
            NodeKind::DirectBlend(_) => writeln!(out, "Direct-Blend between:"),
            NodeKind::CrossBlend(_) => writeln!(out, "Cross-Blend between:"),
            NodeKind::Selective(_) => writeln!(out, "Isolated-Blend between:"),
            NodeKind::Chain(_) => writeln!(out, "Chain A then B:"),
        };
        for child in node.children() {
            self.print_into(child, depth + 1, out);
        }
    }

    /// Log the whole tree at debug level.
    pub fn debug_print_tree(&self) {
        match self.root() {
            Some(root) => log::debug!("animation graph:\n{}", self.print_node(root)),
            None => log::debug!("animation graph: <empty>"),
        }
    }

    pub fn describe(&self, key: NodeKey) -> Option<NodeDescription> {
        let node = self.nodes.get(key)?;
        let position = match &node.kind {
            NodeKind::BlendSpace1D(space) => Some(vec![space.position]),
            NodeKind::BlendSpace2D(space) => Some(space.position.to_vec()),
            _ => None,
        };
        Some(NodeDescription {
            variant: node.variant(),
            name: node.display_name(),
            time: node.time,
            duration: node.duration,
            time_scale: node.time_scale,
            play_mode: node.as_basic().map(|b| b.play_mode()),
            position,
            children: node
                .children()
                .into_iter()
                .filter_map(|child| self.describe(child))
                .collect(),
        })
    }
}
