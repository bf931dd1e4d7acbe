//! Track table, bone hierarchy walking and the pose sink.
//!
//! The graph owns one [`TrackTable`] mapping `(bone, property)` targets to
//! stable track indices. Clips resolve their channels through it into a
//! [`PlayState`](crate::clip::PlayState), and selective nodes derive their
//! masks from it via a [`BoneHierarchy`].

use hashbrown::{HashMap, HashSet};
use plasma_api_core::Value;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::frame::AnimationFrame;

/// Bones are identified by name.
pub type BoneId = String;

/// Which property of a bone a track drives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackProperty {
    Translation,
    Rotation,
    Scale,
    /// Any other animatable property, addressed by name.
    Custom(String),
}

/// Canonical target of one track.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackTarget {
    pub bone: BoneId,
    pub property: TrackProperty,
}

impl TrackTarget {
    pub fn new(bone: impl Into<BoneId>, property: TrackProperty) -> Self {
        Self {
            bone: bone.into(),
            property,
        }
    }
}

/// Stable `target -> index` assignment shared by every node of one graph.
/// Indices are never reused or reordered once assigned.
#[derive(Clone, Debug, Default)]
pub struct TrackTable {
    targets: Vec<TrackTarget>,
    index: HashMap<TrackTarget, usize>,
}

impl TrackTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            targets: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Index of `target`, assigning the next free index if it is new.
    pub fn get_or_insert(&mut self, target: &TrackTarget) -> usize {
        if let Some(&idx) = self.index.get(target) {
            return idx;
        }
        let idx = self.targets.len();
        self.targets.push(target.clone());
        self.index.insert(target.clone(), idx);
        idx
    }

    pub fn index_of(&self, target: &TrackTarget) -> Option<usize> {
        self.index.get(target).copied()
    }

    pub fn target(&self, index: usize) -> Option<&TrackTarget> {
        self.targets.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TrackTarget)> {
        self.targets.iter().enumerate()
    }

    /// Every track index whose bone is `root` or one of its descendants.
    pub fn indices_under(
        &self,
        root: &str,
        hierarchy: &dyn BoneHierarchy,
    ) -> Result<HashSet<usize>, GraphError> {
        if !hierarchy.contains(root) {
            return Err(GraphError::UnknownBone(root.to_string()));
        }
        let mut bones: HashSet<BoneId> = HashSet::new();
        let mut stack = vec![root.to_string()];
        while let Some(bone) = stack.pop() {
            if !bones.insert(bone.clone()) {
                continue;
            }
            stack.extend(hierarchy.children(&bone));
        }
        Ok(self
            .iter()
            .filter(|(_, t)| bones.contains(&t.bone))
            .map(|(i, _)| i)
            .collect())
    }
}

/// Walks a transform hierarchy. Implemented by hosts over their scene graph;
/// [`Skeleton`] is the in-crate implementation.
pub trait BoneHierarchy {
    fn contains(&self, bone: &str) -> bool;
    fn children(&self, bone: &str) -> Vec<BoneId>;
}

/// Local transform of one bone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneTransform {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

#[derive(Clone, Debug)]
struct Bone {
    parent: Option<usize>,
    children: Vec<usize>,
    local: BoneTransform,
    custom: HashMap<String, Value>,
}

/// Minimal bone hierarchy with local transforms.
///
/// Serves both as the hierarchy walker for selective masks and as the pose
/// sink the final frame is written to.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    names: Vec<BoneId>,
    lookup: HashMap<BoneId, usize>,
    bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone under `parent` (or as a root). Re-adding a name is a no-op.
    pub fn add_bone(&mut self, name: &str, parent: Option<&str>) -> Result<(), GraphError> {
        if self.lookup.contains_key(name) {
            return Ok(());
        }
        let parent_idx = match parent {
            Some(p) => Some(
                *self
                    .lookup
                    .get(p)
                    .ok_or_else(|| GraphError::UnknownBone(p.to_string()))?,
            ),
            None => None,
        };
        let idx = self.bones.len();
        self.bones.push(Bone {
            parent: parent_idx,
            children: Vec::new(),
            local: BoneTransform::default(),
            custom: HashMap::new(),
        });
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), idx);
        if let Some(p) = parent_idx {
            self.bones[p].children.push(idx);
        }
        Ok(())
    }

    pub fn bone_names(&self) -> &[BoneId] {
        &self.names
    }

    pub fn parent(&self, bone: &str) -> Option<&str> {
        let idx = *self.lookup.get(bone)?;
        self.bones[idx].parent.map(|p| self.names[p].as_str())
    }

    pub fn local_transform(&self, bone: &str) -> Option<&BoneTransform> {
        self.lookup.get(bone).map(|&i| &self.bones[i].local)
    }

    pub fn custom_property(&self, bone: &str, name: &str) -> Option<&Value> {
        self.lookup
            .get(bone)
            .and_then(|&i| self.bones[i].custom.get(name))
    }

    /// Register translation/rotation/scale tracks for every bone, in bone order.
    pub fn register_tracks(&self, table: &mut TrackTable) {
        for name in &self.names {
            for property in [
                TrackProperty::Translation,
                TrackProperty::Rotation,
                TrackProperty::Scale,
            ] {
                table.get_or_insert(&TrackTarget::new(name.clone(), property));
            }
        }
    }

    /// Write every active track of `frame` to the matching bone property.
    /// Tracks whose bone is unknown or whose value kind does not fit are skipped.
    pub fn apply_frame(&mut self, table: &TrackTable, frame: &AnimationFrame) {
        for (idx, track) in frame.tracks.iter().enumerate() {
            if !track.active {
                continue;
            }
            let Some(target) = table.target(idx) else {
                continue;
            };
            let Some(&bone_idx) = self.lookup.get(&target.bone) else {
                continue;
            };
            let bone = &mut self.bones[bone_idx];
            match (&target.property, &track.value) {
                (TrackProperty::Translation, Value::Vec3(v)) => bone.local.translation = *v,
                (TrackProperty::Rotation, Value::Quat(q)) => bone.local.rotation = *q,
                (TrackProperty::Scale, Value::Vec3(v)) => bone.local.scale = *v,
                (TrackProperty::Custom(name), value) => {
                    bone.custom.insert(name.clone(), value.clone());
                }
                _ => {}
            }
        }
    }
}

impl BoneHierarchy for Skeleton {
    fn contains(&self, bone: &str) -> bool {
        self.lookup.contains_key(bone)
    }

    fn children(&self, bone: &str) -> Vec<BoneId> {
        self.lookup
            .get(bone)
            .map(|&i| {
                self.bones[i]
                    .children
                    .iter()
                    .map(|&c| self.names[c].clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
