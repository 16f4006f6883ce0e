use std::sync::Arc;

use slamview_core::math::{CameraPose, RenderMatrix, render_matrix};
use slamview_core::mesh::WireMesh;
use slamview_core::mesh::generators::generate_wire_sphere;
use slamview_core::settings::ViewerSettings;

use crate::draw_list::DrawList;
use crate::geometry::{FrustumSize, palette_color};
use crate::graph::build_graph_edges;
use crate::map::{MapObject, MapSource};
use crate::pose_state::CameraPoseState;

const MAP_POINT_COLOR: [f32; 4] = [0.6, 0.6, 0.6, 1.0];
const REFERENCE_POINT_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const KEYFRAME_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const GRAPH_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 0.6];
const CAMERA_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const CUBOID_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const CUBOID_COLORED_OBJECT_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const ELLIPSOID_LINE_WIDTH: f32 = 2.0;
const AXES_LENGTH: f32 = 2.0;

/// Which layers [`MapDrawer::draw_frame`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    pub draw_points: bool,
    /// Highlight the current local map in red on top of the point cloud.
    pub draw_reference_points: bool,
    pub draw_keyframes: bool,
    pub draw_graph: bool,
    pub draw_current_camera: bool,
    pub draw_ellipsoids: bool,
    pub draw_cuboids: bool,
    pub draw_axes: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            draw_points: true,
            draw_reference_points: false,
            draw_keyframes: true,
            draw_graph: true,
            draw_current_camera: true,
            draw_ellipsoids: true,
            draw_cuboids: false,
            draw_axes: false,
        }
    }
}

/// Turns a map into draw calls.
///
/// Holds the viewer settings, the shared live camera pose and the unit
/// sphere used for object ellipsoids. `MapDrawer` is `Send + Sync`: the
/// tracking thread calls [`set_current_camera_pose`](Self::set_current_camera_pose)
/// through an `Arc` while the render thread assembles frames.
///
/// Only initialized, non-bad objects get proxies; bad points and keyframes
/// are never drawn. A skipped entity never stops the rest of the frame.
pub struct MapDrawer {
    settings: ViewerSettings,
    camera_pose: CameraPoseState,
    sphere: Arc<WireMesh>,
}

impl MapDrawer {
    pub fn new(settings: ViewerSettings) -> Self {
        let sphere = Arc::new(generate_wire_sphere(
            1.0,
            settings.ellipsoid_slices,
            settings.ellipsoid_stacks,
        ));
        log::debug!(
            "MapDrawer created: keyframe size {}, camera size {}, ellipsoid {}x{}",
            settings.keyframe_size,
            settings.camera_size,
            settings.ellipsoid_slices,
            settings.ellipsoid_stacks
        );
        Self {
            settings,
            camera_pose: CameraPoseState::new(),
            sphere,
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    /// The shared pose slot, for producers that want to hold it directly.
    pub fn pose_state(&self) -> &CameraPoseState {
        &self.camera_pose
    }

    /// Unit sphere mesh shared by all ellipsoid draws.
    pub fn sphere(&self) -> &Arc<WireMesh> {
        &self.sphere
    }

    /// Store the latest camera-from-world pose from tracking.
    pub fn set_current_camera_pose(&self, pose: CameraPose) {
        self.camera_pose.set_pose(pose);
    }

    /// World-from-camera matrix of the live camera; identity before the
    /// first pose.
    pub fn current_camera_matrix(&self) -> RenderMatrix {
        self.camera_pose.render_matrix()
    }

    /// Map points, optionally the reference subset, and object points.
    ///
    /// Nothing is drawn when the map holds no points at all. A cloud of
    /// only bad points still lets object points through.
    pub fn draw_map_points<M: MapSource + ?Sized>(
        &self,
        map: &M,
        draw_reference_points: bool,
        list: &mut DrawList,
    ) {
        if self.draw_point_cloud(map, draw_reference_points, list)
            && self.settings.draw_object_points
        {
            self.draw_object_points(&map.map_objects(), list);
        }
    }

    /// Returns `false` when the map has no points, bad or not.
    fn draw_point_cloud<M: MapSource + ?Sized>(
        &self,
        map: &M,
        draw_reference_points: bool,
        list: &mut DrawList,
    ) -> bool {
        let points = map.map_points();
        if points.is_empty() {
            return false;
        }
        list.push_points(
            valid_positions(&points),
            MAP_POINT_COLOR,
            self.settings.point_size * 2.0,
        );

        if draw_reference_points {
            list.push_points(
                valid_positions(&map.reference_map_points()),
                REFERENCE_POINT_COLOR,
                self.settings.point_size * 2.0,
            );
        }
        true
    }

    fn draw_object_points(&self, objects: &[MapObject], list: &mut DrawList) {
        for object in objects {
            if object.bad || object.points.is_empty() {
                continue;
            }
            list.push_points(
                valid_positions(&object.points),
                class_color(object),
                self.settings.point_size * 3.0,
            );
        }
    }

    /// Keyframe frusta and the keyframe graph.
    pub fn draw_keyframes<M: MapSource + ?Sized>(
        &self,
        map: &M,
        draw_keyframes: bool,
        draw_graph: bool,
        list: &mut DrawList,
    ) {
        if draw_keyframes {
            let size = FrustumSize::from_width(self.settings.keyframe_size);
            for id in map.keyframe_ids() {
                if map.is_bad(id) {
                    continue;
                }
                let Some(pose) = map.keyframe_pose(id) else {
                    continue;
                };
                list.draw_frustum(
                    &render_matrix(&pose),
                    size,
                    KEYFRAME_COLOR,
                    self.settings.keyframe_line_width,
                );
            }
        }

        if draw_graph {
            let edges = build_graph_edges(map, self.settings.covisibility_min_weight);
            list.draw_edges(&edges, GRAPH_COLOR, self.settings.graph_line_width);
        }
    }

    /// Live camera frustum placed by a world-from-camera matrix.
    pub fn draw_current_camera(&self, world_from_camera: &RenderMatrix, list: &mut DrawList) {
        list.draw_frustum(
            world_from_camera,
            FrustumSize::from_width(self.settings.camera_size),
            CAMERA_COLOR,
            self.settings.camera_line_width,
        );
    }

    /// Ellipsoid proxies of initialized objects, colored by class.
    pub fn draw_ellipsoids<M: MapSource + ?Sized>(&self, map: &M, list: &mut DrawList) {
        self.draw_object_ellipsoids(&map.map_objects(), list);
    }

    fn draw_object_ellipsoids(&self, objects: &[MapObject], list: &mut DrawList) {
        for object in objects.iter().filter(|o| is_drawable_proxy(o)) {
            list.draw_quadric(
                &object.pose,
                &object.scale,
                Arc::clone(&self.sphere),
                class_color(object),
                ELLIPSOID_LINE_WIDTH,
            );
        }
    }

    /// Box wireframes of initialized objects.
    pub fn draw_cuboids<M: MapSource + ?Sized>(&self, map: &M, list: &mut DrawList) {
        self.draw_object_cuboids(&map.map_objects(), list);
    }

    fn draw_object_cuboids(&self, objects: &[MapObject], list: &mut DrawList) {
        for object in objects.iter().filter(|o| is_drawable_proxy(o)) {
            let color = if object.color.is_some() {
                CUBOID_COLORED_OBJECT_COLOR
            } else {
                CUBOID_COLOR
            };
            list.draw_cuboid(&object.box_corners(), color, self.settings.camera_line_width);
        }
    }

    /// World axes gizmo.
    pub fn draw_axes(&self, list: &mut DrawList) {
        list.draw_axes(AXES_LENGTH, self.settings.graph_line_width);
    }

    /// Assemble a whole frame.
    ///
    /// Order: map points, keyframes and graph, live camera, ellipsoids,
    /// cuboids, axes. Objects are fetched from the map once per frame.
    pub fn draw_frame<M: MapSource + ?Sized>(&self, map: &M, options: &FrameOptions) -> DrawList {
        let mut list = DrawList::new();

        let draw_object_points = options.draw_points && self.settings.draw_object_points;
        let objects = if draw_object_points || options.draw_ellipsoids || options.draw_cuboids {
            map.map_objects()
        } else {
            Vec::new()
        };

        if options.draw_points
            && self.draw_point_cloud(map, options.draw_reference_points, &mut list)
            && draw_object_points
        {
            self.draw_object_points(&objects, &mut list);
        }
        if options.draw_keyframes || options.draw_graph {
            self.draw_keyframes(map, options.draw_keyframes, options.draw_graph, &mut list);
        }
        if options.draw_current_camera {
            self.draw_current_camera(&self.current_camera_matrix(), &mut list);
        }
        if options.draw_ellipsoids {
            self.draw_object_ellipsoids(&objects, &mut list);
        }
        if options.draw_cuboids {
            self.draw_object_cuboids(&objects, &mut list);
        }
        if options.draw_axes {
            self.draw_axes(&mut list);
        }

        log::debug!(
            "Assembled frame: {} draw calls, {} segments",
            list.len(),
            list.segment_count()
        );
        list
    }
}

impl Default for MapDrawer {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}

fn valid_positions(points: &[crate::map::MapPoint]) -> Vec<[f32; 3]> {
    points
        .iter()
        .filter(|p| !p.bad)
        .map(|p| p.position)
        .collect()
}

fn is_drawable_proxy(object: &MapObject) -> bool {
    object.initialized && !object.bad
}

/// Palette color of the object's class. The palette wins over any
/// explicit object color.
fn class_color(object: &MapObject) -> [f32; 4] {
    rgba(palette_color(object.class_id))
}

fn rgba(rgb: [f32; 3]) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}

#[cfg(test)]
mod tests {
    use slamview_core::math::{Mat3, ObjectPose, Vec3, Vec3d};

    use super::*;
    use crate::draw_list::DrawCall;
    use crate::map::{KeyFrameGraph, MapPoint};
    use crate::snapshot::{KeyFrameNode, MapSnapshot};

    fn keyframe_at(id: u64, x: f32) -> KeyFrameNode {
        KeyFrameNode::new(id, CameraPose::new(Mat3::identity(), Vec3::new(-x, 0.0, 0.0)))
    }

    fn object(id: u64, initialized: bool) -> MapObject {
        let object = MapObject::new(id, id as u32);
        if initialized {
            object.with_proxy(ObjectPose::identity(), Vec3d::new(0.5, 0.5, 0.5))
        } else {
            object
        }
    }

    #[test]
    fn test_empty_map_yields_only_camera() {
        let drawer = MapDrawer::default();
        let list = drawer.draw_frame(&MapSnapshot::new(), &FrameOptions::default());
        assert_eq!(list.len(), 1);
        assert!(matches!(list.calls()[0], DrawCall::Lines { color, .. } if color == CAMERA_COLOR));
    }

    #[test]
    fn test_empty_map_without_camera_yields_nothing() {
        let drawer = MapDrawer::default();
        let options = FrameOptions {
            draw_current_camera: false,
            draw_cuboids: true,
            draw_reference_points: true,
            ..FrameOptions::default()
        };
        assert!(drawer.draw_frame(&MapSnapshot::new(), &options).is_empty());
    }

    #[test]
    fn test_bad_points_are_skipped() {
        let mut map = MapSnapshot::new();
        map.add_map_point(MapPoint::new(1, [1.0, 0.0, 0.0]));
        map.add_map_point(MapPoint::new(2, [2.0, 0.0, 0.0]).into_bad());
        let drawer = MapDrawer::default();
        let mut list = DrawList::new();
        drawer.draw_map_points(&map, false, &mut list);
        assert_eq!(list.point_vertices().len(), 1);
        match &list.calls()[0] {
            DrawCall::Points { size, color, .. } => {
                assert_eq!(*size, drawer.settings().point_size * 2.0);
                assert_eq!(*color, MAP_POINT_COLOR);
            }
            other => panic!("unexpected draw call {other:?}"),
        }
    }

    #[test]
    fn test_reference_points_highlighted() {
        let mut map = MapSnapshot::new();
        map.add_map_point(MapPoint::new(1, [1.0, 0.0, 0.0]));
        map.set_reference_points(vec![MapPoint::new(1, [1.0, 0.0, 0.0])]);
        let drawer = MapDrawer::default();
        let mut list = DrawList::new();
        drawer.draw_map_points(&map, true, &mut list);
        assert_eq!(list.len(), 2);
        assert!(matches!(list.calls()[1], DrawCall::Points { color, .. } if color == REFERENCE_POINT_COLOR));
    }

    #[test]
    fn test_object_points_skip_empty_subsets() {
        let mut map = MapSnapshot::new();
        map.add_map_point(MapPoint::new(1, [0.0; 3]));
        map.add_object(object(1, true));
        map.add_object(object(2, false).with_points(vec![MapPoint::new(5, [3.0; 3])]));
        map.add_object(object(3, true).with_points(vec![MapPoint::new(6, [4.0; 3]).into_bad()]));
        let drawer = MapDrawer::default();
        let mut list = DrawList::new();
        drawer.draw_map_points(&map, false, &mut list);
        // map points + object 2's points; object 3 has only a bad point
        assert_eq!(list.len(), 2);
        match &list.calls()[1] {
            DrawCall::Points {
                positions,
                color,
                size,
            } => {
                assert_eq!(positions, &vec![[3.0; 3]]);
                assert_eq!(*color, rgba(palette_color(2)));
                assert_eq!(*size, drawer.settings().point_size * 3.0);
            }
            other => panic!("unexpected draw call {other:?}"),
        }
    }

    #[test]
    fn test_object_points_disabled_by_settings() {
        let mut map = MapSnapshot::new();
        map.add_map_point(MapPoint::new(1, [0.0; 3]));
        map.add_object(object(1, true).with_points(vec![MapPoint::new(5, [3.0; 3])]));
        let settings = ViewerSettings {
            draw_object_points: false,
            ..ViewerSettings::default()
        };
        let mut list = DrawList::new();
        MapDrawer::new(settings).draw_map_points(&map, false, &mut list);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_keyframes_skip_bad() {
        let mut map = MapSnapshot::new();
        map.add_keyframe(keyframe_at(1, 0.0));
        map.add_keyframe(keyframe_at(2, 1.0));
        map.mark_bad(2);
        let drawer = MapDrawer::default();
        let mut list = DrawList::new();
        drawer.draw_keyframes(&map, true, false, &mut list);
        assert_eq!(list.len(), 1);
        assert_eq!(list.segment_count(), 8);
    }

    #[test]
    fn test_graph_uses_configured_threshold() {
        let mut map = MapSnapshot::new();
        map.add_keyframe(keyframe_at(1, 0.0));
        map.add_keyframe(keyframe_at(2, 1.0));
        map.connect(1, 2, 30);
        let mut list = DrawList::new();
        MapDrawer::default().draw_keyframes(&map, false, true, &mut list);
        assert!(list.is_empty());

        let settings = ViewerSettings {
            covisibility_min_weight: 15,
            ..ViewerSettings::default()
        };
        MapDrawer::new(settings).draw_keyframes(&map, false, true, &mut list);
        assert_eq!(list.segment_count(), 1);
        assert!(matches!(list.calls()[0], DrawCall::Lines { color, .. } if color == GRAPH_COLOR));
    }

    #[test]
    fn test_ellipsoids_only_for_initialized_objects() {
        let mut map = MapSnapshot::new();
        map.add_object(object(1, true));
        map.add_object(object(2, false));
        let mut bad = object(3, true);
        bad.bad = true;
        map.add_object(bad);
        let drawer = MapDrawer::default();
        let mut list = DrawList::new();
        drawer.draw_ellipsoids(&map, &mut list);
        assert_eq!(list.len(), 1);
        match &list.calls()[0] {
            DrawCall::Mesh {
                mesh, color, width, ..
            } => {
                assert!(Arc::ptr_eq(mesh, drawer.sphere()));
                assert_eq!(*color, rgba(palette_color(1)));
                assert_eq!(*width, ELLIPSOID_LINE_WIDTH);
            }
            other => panic!("unexpected draw call {other:?}"),
        }
    }

    #[test]
    fn test_palette_wins_over_explicit_color() {
        let mut map = MapSnapshot::new();
        map.add_object(
            MapObject::new(1, 2)
                .with_proxy(ObjectPose::identity(), Vec3d::new(0.5, 0.5, 0.5))
                .with_color([0.2, 0.4, 0.6])
                .with_points(vec![MapPoint::new(7, [1.0; 3])]),
        );
        map.add_map_point(MapPoint::new(1, [0.0; 3]));
        let list = MapDrawer::default().draw_frame(&map, &FrameOptions::default());
        let expected = rgba(palette_color(2));
        assert!(
            list.calls()
                .iter()
                .any(|call| matches!(call, DrawCall::Mesh { color, .. } if *color == expected))
        );
        assert!(
            list.point_vertices()
                .iter()
                .any(|v| v.position == [1.0; 3] && v.color == expected)
        );
    }

    #[test]
    fn test_all_bad_cloud_keeps_object_points() {
        let mut map = MapSnapshot::new();
        map.add_map_point(MapPoint::new(1, [0.0; 3]).into_bad());
        map.add_object(MapObject::new(1, 0).with_points(vec![MapPoint::new(2, [1.0, 2.0, 3.0])]));

        let mut list = DrawList::new();
        MapDrawer::default().draw_map_points(&map, true, &mut list);
        let points = list.point_vertices();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].position, [1.0, 2.0, 3.0]);

        let options = FrameOptions {
            draw_current_camera: false,
            ..FrameOptions::default()
        };
        let frame = MapDrawer::default().draw_frame(&map, &options);
        assert_eq!(frame.point_vertices(), points);
    }

    #[test]
    fn test_no_points_at_all_skips_object_points() {
        let mut map = MapSnapshot::new();
        map.add_object(MapObject::new(1, 0).with_points(vec![MapPoint::new(2, [1.0; 3])]));
        let mut list = DrawList::new();
        MapDrawer::default().draw_map_points(&map, false, &mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn test_frame_matches_per_layer_draws() {
        let mut map = MapSnapshot::new();
        map.add_map_point(MapPoint::new(1, [0.0; 3]));
        map.add_object(object(1, true).with_points(vec![MapPoint::new(5, [3.0; 3])]));
        map.add_object(object(2, true).with_color([0.1, 0.1, 0.1]));
        let drawer = MapDrawer::default();
        let options = FrameOptions {
            draw_keyframes: false,
            draw_graph: false,
            draw_current_camera: false,
            draw_cuboids: true,
            ..FrameOptions::default()
        };

        let mut expected = DrawList::new();
        drawer.draw_map_points(&map, false, &mut expected);
        drawer.draw_ellipsoids(&map, &mut expected);
        drawer.draw_cuboids(&map, &mut expected);
        assert_eq!(drawer.draw_frame(&map, &options), expected);
    }

    #[test]
    fn test_pose_state_is_shared_with_drawer() {
        let drawer = MapDrawer::default();
        drawer.set_current_camera_pose(CameraPose::new(
            Mat3::identity(),
            Vec3::new(-1.0, 0.0, 0.0),
        ));
        assert!(drawer.pose_state().has_pose());
        assert_eq!(drawer.current_camera_matrix().origin(), Vec3::new(1.0, 0.0, 0.0));

        drawer.pose_state().clear();
        assert_eq!(drawer.current_camera_matrix(), RenderMatrix::IDENTITY);
    }

    #[test]
    fn test_cuboid_colors() {
        let mut map = MapSnapshot::new();
        map.add_object(object(1, true));
        map.add_object(object(2, true).with_color([0.1, 0.1, 0.1]));
        let mut list = DrawList::new();
        MapDrawer::default().draw_cuboids(&map, &mut list);
        assert_eq!(list.len(), 2);
        assert_eq!(list.segment_count(), 56);
        assert!(matches!(list.calls()[0], DrawCall::Lines { color, .. } if color == CUBOID_COLOR));
        assert!(
            matches!(list.calls()[1], DrawCall::Lines { color, .. } if color == CUBOID_COLORED_OBJECT_COLOR)
        );
    }

    #[test]
    fn test_current_camera_follows_pose() {
        let drawer = MapDrawer::default();
        assert_eq!(drawer.current_camera_matrix(), RenderMatrix::IDENTITY);
        drawer.set_current_camera_pose(CameraPose::new(Mat3::identity(), Vec3::new(0.0, 0.0, -4.0)));
        assert_eq!(drawer.current_camera_matrix().origin(), Vec3::new(0.0, 0.0, 4.0));

        let list = drawer.draw_frame(&MapSnapshot::new(), &FrameOptions::default());
        match &list.calls()[0] {
            DrawCall::Lines { segments, .. } => assert_eq!(segments[0][0], [0.0, 0.0, 4.0]),
            other => panic!("unexpected draw call {other:?}"),
        }
    }

    #[test]
    fn test_frame_order() {
        let mut map = MapSnapshot::new();
        map.add_map_point(MapPoint::new(1, [0.0; 3]));
        map.add_keyframe(keyframe_at(1, 0.0));
        map.add_keyframe(keyframe_at(2, 1.0));
        map.set_parent(2, 1);
        map.add_object(object(1, true));
        let options = FrameOptions {
            draw_cuboids: true,
            draw_axes: true,
            ..FrameOptions::default()
        };
        let list = MapDrawer::default().draw_frame(&map, &options);
        // points, 2 keyframes, graph, camera, ellipsoid, cuboid, 3 axes
        assert_eq!(list.len(), 10);
        assert!(matches!(list.calls()[0], DrawCall::Points { .. }));
        assert!(matches!(list.calls()[5], DrawCall::Mesh { .. }));
        assert_eq!(map.keyframe_ids().len(), 2);
    }

    #[test]
    fn test_drawer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MapDrawer>();
    }
}
