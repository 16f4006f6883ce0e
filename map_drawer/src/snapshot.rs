use std::collections::{BTreeSet, HashMap};

use slamview_core::math::CameraPose;

use crate::map::{KeyFrameGraph, KeyFrameId, MapObject, MapPoint, MapSource};

/// One keyframe in a [`MapSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrameNode {
    pub id: KeyFrameId,
    /// Camera-from-world pose.
    pub pose: CameraPose,
    pub bad: bool,
    /// Covisible keyframes and their shared-observation weights.
    pub covisibility: Vec<(KeyFrameId, u32)>,
    pub parent: Option<KeyFrameId>,
    pub loop_edges: BTreeSet<KeyFrameId>,
}

impl KeyFrameNode {
    pub fn new(id: KeyFrameId, pose: CameraPose) -> Self {
        Self {
            id,
            pose,
            bad: false,
            covisibility: Vec::new(),
            parent: None,
            loop_edges: BTreeSet::new(),
        }
    }
}

/// An owned, in-memory copy of the map.
///
/// Implements [`MapSource`] for producers that publish a copy of the map
/// each frame, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MapSnapshot {
    keyframes: Vec<KeyFrameNode>,
    index: HashMap<KeyFrameId, usize>,
    points: Vec<MapPoint>,
    reference_points: Vec<MapPoint>,
    objects: Vec<MapObject>,
}

impl MapSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyframe, replacing one with the same id.
    pub fn add_keyframe(&mut self, node: KeyFrameNode) {
        match self.index.get(&node.id) {
            Some(&slot) => self.keyframes[slot] = node,
            None => {
                self.index.insert(node.id, self.keyframes.len());
                self.keyframes.push(node);
            }
        }
    }

    pub fn keyframe(&self, id: KeyFrameId) -> Option<&KeyFrameNode> {
        self.index.get(&id).map(|&slot| &self.keyframes[slot])
    }

    fn keyframe_mut(&mut self, id: KeyFrameId) -> Option<&mut KeyFrameNode> {
        self.index.get(&id).map(|&slot| &mut self.keyframes[slot])
    }

    /// Record a symmetric covisibility link.
    ///
    /// Ids without a keyframe are recorded on the side that exists only.
    pub fn connect(&mut self, a: KeyFrameId, b: KeyFrameId, weight: u32) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(node) = self.keyframe_mut(from) {
                match node.covisibility.iter_mut().find(|(id, _)| *id == to) {
                    Some(entry) => entry.1 = weight,
                    None => node.covisibility.push((to, weight)),
                }
            }
        }
    }

    /// Set the spanning-tree parent of `child`.
    pub fn set_parent(&mut self, child: KeyFrameId, parent: KeyFrameId) {
        if let Some(node) = self.keyframe_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Record a symmetric loop-closure link.
    pub fn add_loop_edge(&mut self, a: KeyFrameId, b: KeyFrameId) {
        if let Some(node) = self.keyframe_mut(a) {
            node.loop_edges.insert(b);
        }
        if let Some(node) = self.keyframe_mut(b) {
            node.loop_edges.insert(a);
        }
    }

    /// Flag a keyframe as culled. It stays in the table.
    pub fn mark_bad(&mut self, id: KeyFrameId) {
        if let Some(node) = self.keyframe_mut(id) {
            node.bad = true;
        }
    }

    pub fn add_map_point(&mut self, point: MapPoint) {
        self.points.push(point);
    }

    pub fn set_reference_points(&mut self, points: Vec<MapPoint>) {
        self.reference_points = points;
    }

    pub fn add_object(&mut self, object: MapObject) {
        self.objects.push(object);
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }
}

impl KeyFrameGraph for MapSnapshot {
    fn keyframe_ids(&self) -> Vec<KeyFrameId> {
        self.keyframes.iter().map(|kf| kf.id).collect()
    }

    fn keyframe_pose(&self, id: KeyFrameId) -> Option<CameraPose> {
        self.keyframe(id).map(|kf| kf.pose)
    }

    fn is_bad(&self, id: KeyFrameId) -> bool {
        self.keyframe(id).is_none_or(|kf| kf.bad)
    }

    fn covisibles_by_weight(&self, id: KeyFrameId, min_weight: u32) -> Vec<KeyFrameId> {
        let Some(node) = self.keyframe(id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<(KeyFrameId, u32)> = node
            .covisibility
            .iter()
            .copied()
            .filter(|&(_, weight)| weight >= min_weight)
            .collect();
        neighbors.sort_by(|a, b| b.1.cmp(&a.1));
        neighbors.into_iter().map(|(id, _)| id).collect()
    }

    fn parent(&self, id: KeyFrameId) -> Option<KeyFrameId> {
        self.keyframe(id).and_then(|kf| kf.parent)
    }

    fn loop_edges(&self, id: KeyFrameId) -> Vec<KeyFrameId> {
        self.keyframe(id)
            .map(|kf| kf.loop_edges.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl MapSource for MapSnapshot {
    fn map_points(&self) -> Vec<MapPoint> {
        self.points.clone()
    }

    fn reference_map_points(&self) -> Vec<MapPoint> {
        self.reference_points.clone()
    }

    fn map_objects(&self) -> Vec<MapObject> {
        self.objects.clone()
    }
}
