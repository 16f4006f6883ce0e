//! Read-only view of the SLAM map.
//!
//! The map, its keyframes, points and objects are owned by the mapping
//! pipeline. The drawer only reads through these traits. Keyframes refer to
//! each other by [`KeyFrameId`]; an id that no longer resolves (or resolves
//! to a bad keyframe) is skipped, never dereferenced.

use slamview_core::math::{CameraPose, ObjectPose, Vec3, Vec3d, render_matrix};

/// Keyframe identity. Ids are totally ordered; edge deduplication relies on it.
pub type KeyFrameId = u64;

/// A triangulated map point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    pub id: u64,
    /// World position.
    pub position: [f32; 3],
    /// Culled by the mapper; never drawn.
    pub bad: bool,
}

impl MapPoint {
    pub fn new(id: u64, position: [f32; 3]) -> Self {
        Self {
            id,
            position,
            bad: false,
        }
    }

    /// Mark the point as culled.
    #[must_use]
    pub fn into_bad(mut self) -> Self {
        self.bad = true;
        self
    }
}

/// A detected 3D object and its ellipsoid/cuboid proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub id: u64,
    /// Object-from-world pose.
    pub pose: ObjectPose,
    /// Semi-axis lengths along the object's local X, Y and Z.
    pub scale: Vec3d,
    /// Detector class; selects the palette color.
    pub class_id: u32,
    /// Explicit RGB color in `[0, 1]`. Proxies and object points are always
    /// drawn in the class palette color; a set color only turns the cuboid red.
    pub color: Option<[f32; 3]>,
    /// The proxy geometry is valid only once the object is initialized.
    pub initialized: bool,
    pub bad: bool,
    /// Map points associated with this object.
    pub points: Vec<MapPoint>,
}

impl MapObject {
    /// An uninitialized object with unit scale at the world origin.
    pub fn new(id: u64, class_id: u32) -> Self {
        Self {
            id,
            pose: ObjectPose::identity(),
            scale: Vec3d::new(1.0, 1.0, 1.0),
            class_id,
            color: None,
            initialized: false,
            bad: false,
            points: Vec::new(),
        }
    }

    /// Set pose and scale and mark the proxy as initialized.
    #[must_use]
    pub fn with_proxy(mut self, pose: ObjectPose, scale: Vec3d) -> Self {
        self.pose = pose;
        self.scale = scale;
        self.initialized = true;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: Vec<MapPoint>) -> Self {
        self.points = points;
        self
    }

    /// The 8 corners of the proxy's bounding box in world coordinates:
    /// `world_from_object * (±sx, ±sy, ±sz)`.
    pub fn box_corners(&self) -> Vec<[f32; 3]> {
        let world_from_object = render_matrix(&self.pose);
        let s = self.scale;
        let mut corners = Vec::with_capacity(8);
        for &z in &[-s.z, s.z] {
            for &(x, y) in &[(-s.x, -s.y), (s.x, -s.y), (s.x, s.y), (-s.x, s.y)] {
                let local = Vec3::new(x as f32, y as f32, z as f32);
                corners.push(world_from_object.transform_point(&local).into());
            }
        }
        corners
    }
}

/// Keyframe graph: poses plus covisibility, spanning-tree and loop relations.
pub trait KeyFrameGraph {
    /// All keyframes currently in the map, in iteration order.
    fn keyframe_ids(&self) -> Vec<KeyFrameId>;

    /// Camera-from-world pose, or `None` if the id is unknown.
    fn keyframe_pose(&self, id: KeyFrameId) -> Option<CameraPose>;

    /// Whether the keyframe was culled. Unknown ids count as bad.
    fn is_bad(&self, id: KeyFrameId) -> bool;

    /// Covisible keyframes sharing at least `min_weight` observations,
    /// strongest first.
    fn covisibles_by_weight(&self, id: KeyFrameId, min_weight: u32) -> Vec<KeyFrameId>;

    /// Spanning-tree parent.
    fn parent(&self, id: KeyFrameId) -> Option<KeyFrameId>;

    /// Keyframes linked to this one by loop closures.
    fn loop_edges(&self, id: KeyFrameId) -> Vec<KeyFrameId>;

    /// Camera center in world coordinates.
    fn camera_center(&self, id: KeyFrameId) -> Option<Vec3> {
        self.keyframe_pose(id).map(|pose| pose.camera_center())
    }
}

/// Everything the scene assembler reads from the map.
pub trait MapSource: KeyFrameGraph {
    fn map_points(&self) -> Vec<MapPoint>;

    /// Points of the current local map, optionally highlighted.
    fn reference_map_points(&self) -> Vec<MapPoint>;

    fn map_objects(&self) -> Vec<MapObject>;
}
