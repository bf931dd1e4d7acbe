//! Sequencing: `a` plays to completion, then `b` takes over.

use crate::events::EventList;
use crate::graph::AnimationGraph;
use crate::node::{NodeKey, NodeKind, NodeStep};

#[derive(Clone, Debug)]
pub struct ChainNode {
    pub(crate) a: NodeKey,
    pub(crate) b: NodeKey,
}

impl ChainNode {
    pub fn a(&self) -> NodeKey {
        self.a
    }

    pub fn b(&self) -> NodeKey {
        self.b
    }
}

impl AnimationGraph {
    /// `b` is not touched while `a` plays. Once `a` finishes the chain is
    /// replaced by `b`, which starts with this tick's `dt`.
    pub(crate) fn update_chain(
        &mut self,
        key: NodeKey,
        dt: f32,
        frame_id: u64,
        events: &mut EventList,
    ) -> NodeStep {
        let Some(NodeKind::Chain(chain)) = self.nodes.get(key).map(|n| &n.kind) else {
            return NodeStep::Remove;
        };
        let (a, b) = (chain.a, chain.b);

        match self.update_child(key, a, dt, frame_id, events) {
            Some(a) => {
                self.copy_child_frame(key, a);
                NodeStep::Continue
            }
            None => self.collapse_to(b, dt, frame_id, events),
        }
    }
}
