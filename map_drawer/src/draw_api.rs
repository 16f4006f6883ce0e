use std::sync::Arc;

use slamview_core::math::{ObjectPose, RenderMatrix, Vec3d};
use slamview_core::mesh::WireMesh;

use crate::draw_list::DrawList;
use crate::geometry::{
    FrustumSize, axes_segments, cuboid_wireframe, frustum_wireframe, quadric_transform,
};
use crate::graph::GraphEdge;

impl DrawList {
    /// Draw a camera frustum (8 segments) placed by a world-from-camera matrix.
    pub fn draw_frustum(
        &mut self,
        world_from_camera: &RenderMatrix,
        size: FrustumSize,
        color: [f32; 4],
        width: f32,
    ) {
        let segments = frustum_wireframe(size, world_from_camera);
        self.push_lines(segments.to_vec(), color, width);
    }

    /// Draw all 28 pairwise segments between 8 box corners.
    ///
    /// # Panics
    ///
    /// Panics if `corners` does not hold exactly 8 points.
    pub fn draw_cuboid(&mut self, corners: &[[f32; 3]], color: [f32; 4], width: f32) {
        self.push_lines(cuboid_wireframe(corners), color, width);
    }

    /// Draw a unit-sphere mesh as the ellipsoid `pose * diag(scale)`.
    pub fn draw_quadric(
        &mut self,
        pose: &ObjectPose,
        scale: &Vec3d,
        sphere: Arc<WireMesh>,
        color: [f32; 4],
        width: f32,
    ) {
        self.push_mesh(quadric_transform(pose, scale), sphere, color, width);
    }

    /// Draw graph edges as one line batch.
    pub fn draw_edges(&mut self, edges: &[GraphEdge], color: [f32; 4], width: f32) {
        self.push_lines(edges.iter().map(GraphEdge::segment).collect(), color, width);
    }

    /// Draw a world axes gizmo (R=X, G=Y, B=Z).
    pub fn draw_axes(&mut self, length: f32, width: f32) {
        for (segment, color) in axes_segments(length) {
            self.push_lines(vec![segment], color, width);
        }
    }
}

#[cfg(test)]
mod tests {
    use slamview_core::mesh::generators::generate_wire_sphere;

    use super::*;
    use crate::draw_list::DrawCall;

    #[test]
    fn test_draw_frustum() {
        let mut list = DrawList::new();
        list.draw_frustum(
            &RenderMatrix::IDENTITY,
            FrustumSize::from_width(0.05),
            [0.0, 0.0, 1.0, 1.0],
            1.0,
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list.line_vertices().len(), 16); // 8 segments * 2 vertices
    }

    #[test]
    fn test_draw_cuboid() {
        let corners = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let mut list = DrawList::new();
        list.draw_cuboid(&corners, [1.0, 0.0, 0.0, 1.0], 3.0);
        assert_eq!(list.line_vertices().len(), 56); // 28 segments * 2 vertices
    }

    #[test]
    fn test_draw_quadric() {
        let sphere = Arc::new(generate_wire_sphere(1.0, 14, 9));
        let mut list = DrawList::new();
        list.draw_quadric(
            &ObjectPose::identity(),
            &Vec3d::new(1.0, 2.0, 3.0),
            sphere,
            [1.0; 4],
            2.0,
        );
        match &list.calls()[0] {
            DrawCall::Mesh { transform, .. } => {
                assert_eq!(transform.get(0, 0), 1.0);
                assert_eq!(transform.get(1, 1), 2.0);
                assert_eq!(transform.get(2, 2), 3.0);
            }
            other => panic!("expected a mesh draw, got {other:?}"),
        }
    }

    #[test]
    fn test_draw_axes() {
        let mut list = DrawList::new();
        list.draw_axes(2.0, 1.0);
        assert_eq!(list.len(), 3);
        assert_eq!(list.segment_count(), 3);
    }
}
