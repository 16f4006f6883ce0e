//! Map drawing for a live SLAM system.
//!
//! Turns a map (keyframes, their graph, map points and 3D object proxies)
//! plus the live camera pose into an ordered [`DrawList`] that a rendering
//! backend can replay. The live pose is shared: tracking writes it while
//! the render thread reads it.
//!
//! # Architecture
//!
//! - [`MapDrawer`] - Scene assembler (share behind an `Arc`)
//! - [`CameraPoseState`] - Mutex-guarded live camera pose
//! - [`build_graph_edges`] - Deduplicated keyframe graph edges
//! - [`DrawList`] - Draw calls for one frame, flattenable to [`ColoredVertex`] buffers
//! - [`MapSource`] - What the drawer reads from a map; [`MapSnapshot`] is an owned implementation
//!
//! # Usage
//!
//! ```ignore
//! // Setup (once)
//! let settings = ViewerSettings::load(Path::new("viewer.toml"))?;
//! let drawer = Arc::new(MapDrawer::new(settings));
//!
//! // Tracking thread, per frame:
//! drawer.set_current_camera_pose(tracked_pose);
//!
//! // Render thread, per frame:
//! let list = drawer.draw_frame(&map, &FrameOptions::default());
//! upload_lines(bytemuck::cast_slice(&list.line_vertices()));
//! upload_points(bytemuck::cast_slice(&list.point_vertices()));
//! ```

mod draw_api;
mod draw_list;
mod drawer;
pub mod geometry;
pub mod graph;
mod map;
mod pose_state;
mod snapshot;
mod vertex;

pub use draw_list::{DrawCall, DrawList};
pub use drawer::{FrameOptions, MapDrawer};
pub use graph::{DEFAULT_COVISIBILITY_MIN_WEIGHT, EdgeKind, GraphEdge, build_graph_edges};
pub use map::{KeyFrameGraph, KeyFrameId, MapObject, MapPoint, MapSource};
pub use pose_state::CameraPoseState;
pub use snapshot::{KeyFrameNode, MapSnapshot};
pub use vertex::ColoredVertex;
