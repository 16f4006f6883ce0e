//! Line geometry for keyframes, the live camera and object proxies.

use slamview_core::math::{ObjectPose, RenderMatrix, Vec3, Vec3d, render_matrix};

/// A line segment in world coordinates.
pub type Segment = [[f32; 3]; 2];

/// Object class colors (RGB, `[0, 1]`), indexed by `class_id % 7`.
///
/// Placeholder values: the detector's own class palette is not available here.
pub const PALETTE: [[f32; 3]; 7] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.5, 0.0],
];

/// Palette color for an object class.
pub fn palette_color(class_id: u32) -> [f32; 3] {
    PALETTE[class_id as usize % PALETTE.len()]
}

/// Frustum dimensions in the camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumSize {
    pub half_width: f32,
    pub half_height: f32,
    pub depth: f32,
}

impl FrustumSize {
    /// Derive the frustum from its half-width: height `0.75 w`, depth `0.6 w`.
    pub fn from_width(w: f32) -> Self {
        Self {
            half_width: w,
            half_height: w * 0.75,
            depth: w * 0.6,
        }
    }

    /// Apex followed by the four far corners, in the camera frame.
    pub fn points(&self) -> [Vec3; 5] {
        let (w, h, z) = (self.half_width, self.half_height, self.depth);
        [
            Vec3::zeros(),
            Vec3::new(w, h, z),
            Vec3::new(w, -h, z),
            Vec3::new(-w, -h, z),
            Vec3::new(-w, h, z),
        ]
    }
}

/// Point index pairs of the 8 frustum segments: apex to each corner, then
/// the far rectangle.
const FRUSTUM_EDGES: [(usize, usize); 8] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 2),
    (4, 3),
    (4, 1),
    (3, 2),
];

/// Frustum wireframe placed by a world-from-camera matrix.
pub fn frustum_wireframe(size: FrustumSize, world_from_camera: &RenderMatrix) -> [Segment; 8] {
    let points = size
        .points()
        .map(|p| -> [f32; 3] { world_from_camera.transform_point(&p).into() });
    FRUSTUM_EDGES.map(|(a, b)| [points[a], points[b]])
}

/// Wireframe over the 8 corners of an object box.
///
/// The corners come in no particular order, so every unordered pair is
/// connected: 28 segments. Only 12 of them are box edges.
///
/// # Panics
///
/// Panics if `corners` does not hold exactly 8 points.
pub fn cuboid_wireframe(corners: &[[f32; 3]]) -> Vec<Segment> {
    assert_eq!(
        corners.len(),
        8,
        "cuboid wireframe needs exactly 8 corners, got {}",
        corners.len()
    );
    let mut segments = Vec::with_capacity(28);
    for (m, first) in corners.iter().enumerate() {
        for next in &corners[m + 1..] {
            segments.push([*first, *next]);
        }
    }
    segments
}

/// Draw transform for an ellipsoid proxy: `render_matrix(pose) * diag(scale)`.
///
/// Applied to a unit sphere it yields the object's ellipsoid in world space.
pub fn quadric_transform(pose: &ObjectPose, scale: &Vec3d) -> RenderMatrix {
    render_matrix(pose).scaled([scale.x as f32, scale.y as f32, scale.z as f32])
}

/// Coordinate axes from the origin: X red, Y green, Z blue.
pub fn axes_segments(length: f32) -> [(Segment, [f32; 4]); 3] {
    [
        ([[0.0; 3], [length, 0.0, 0.0]], [1.0, 0.0, 0.0, 1.0]),
        ([[0.0; 3], [0.0, length, 0.0]], [0.0, 1.0, 0.0, 1.0]),
        ([[0.0; 3], [0.0, 0.0, length]], [0.0, 0.0, 1.0, 1.0]),
    ]
}
