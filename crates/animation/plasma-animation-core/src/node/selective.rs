//! Per-track override of `a` by `b` below a root bone.

use hashbrown::HashSet;

use crate::error::GraphError;
use crate::events::EventList;
use crate::frame::TrackValue;
use crate::graph::AnimationGraph;
use crate::node::{NodeKey, NodeKind, NodeStep, NodeVariant};
use crate::tracks::{BoneHierarchy, BoneId};

#[derive(Clone, Debug)]
pub struct SelectiveNode {
    /// Base layer; tracks outside the selection come from here.
    pub(crate) a: Option<NodeKey>,
    /// Override layer for the selected tracks.
    pub(crate) b: NodeKey,
    pub(crate) root: Option<BoneId>,
    pub(crate) selected: HashSet<usize>,
}

impl SelectiveNode {
    pub fn a(&self) -> Option<NodeKey> {
        self.a
    }

    pub fn b(&self) -> NodeKey {
        self.b
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn is_selected(&self, track: usize) -> bool {
        self.selected.contains(&track)
    }

    pub fn selected(&self) -> &HashSet<usize> {
        &self.selected
    }
}

impl AnimationGraph {
    /// Layer `b` over `a` on every track of `root_bone` and its descendants.
    /// The selection is computed once, against the current track table.
    pub fn build_selective(
        &mut self,
        a: Option<NodeKey>,
        b: NodeKey,
        root_bone: &str,
        hierarchy: &dyn BoneHierarchy,
    ) -> Result<NodeKey, GraphError> {
        let selected = self.tracks.indices_under(root_bone, hierarchy)?;
        let children: Vec<NodeKey> = a.into_iter().chain(Some(b)).collect();
        self.check_free(&children)?;
        let key = self.insert(NodeKind::Selective(SelectiveNode {
            a,
            b,
            root: Some(root_bone.to_string()),
            selected,
        }));
        for child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.owner = Some(key);
            }
        }
        Ok(key)
    }

    /// Re-derive the selection of a selective node from `root_bone`.
    pub fn set_selective_root(
        &mut self,
        key: NodeKey,
        root_bone: &str,
        hierarchy: &dyn BoneHierarchy,
    ) -> Result<(), GraphError> {
        let selected = self.tracks.indices_under(root_bone, hierarchy)?;
        let node = self.node_mut_ref(key)?;
        match &mut node.kind {
            NodeKind::Selective(s) => {
                s.root = Some(root_bone.to_string());
                s.selected = selected;
                Ok(())
            }
            other => Err(GraphError::WrongVariant {
                node: key,
                expected: NodeVariant::Selective,
                actual: other.variant(),
            }),
        }
    }

    pub(crate) fn update_selective(
        &mut self,
        key: NodeKey,
        dt: f32,
        frame_id: u64,
        events: &mut EventList,
    ) -> NodeStep {
        let Some(node) = self.nodes.get(key) else {
            return NodeStep::Remove;
        };
        let NodeKind::Selective(sel) = &node.kind else {
            return NodeStep::Continue;
        };
        let (a, b) = (sel.a, sel.b);
        let dt = dt * node.time_scale;

        let a = a.and_then(|a| self.update_child(key, a, dt, frame_id, events));
        let Some(b) = self.update_child(key, b, dt, frame_id, events) else {
            return match a {
                Some(a) => self.collapse_to(a, dt, frame_id, events),
                None => NodeStep::Remove,
            };
        };

        let Some(mut out) = self.nodes.get_mut(key).map(|n| std::mem::take(&mut n.frame)) else {
            return NodeStep::Remove;
        };
        let frame_b = self.nodes.get(b).map(|n| &n.frame);
        if let (Some(node), Some(frame_b)) = (self.nodes.get(key), frame_b) {
            if let NodeKind::Selective(sel) = &node.kind {
                let frame_a = a.and_then(|a| self.nodes.get(a)).map(|n| &n.frame);
                let len = frame_a.map_or(0, |f| f.len()).max(frame_b.len());
                out.resize(len);
                let inactive = TrackValue::inactive();
                for (i, dest) in out.tracks.iter_mut().enumerate() {
                    let source = if sel.selected.contains(&i) {
                        frame_b.tracks.get(i)
                    } else {
                        frame_a.and_then(|f| f.tracks.get(i))
                    };
                    dest.clone_from(source.unwrap_or(&inactive));
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(key) {
            node.frame = out;
        }
        NodeStep::Continue
    }
}
