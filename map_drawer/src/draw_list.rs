use std::sync::Arc;

use slamview_core::math::RenderMatrix;
use slamview_core::mesh::WireMesh;

use crate::geometry::Segment;
use crate::vertex::ColoredVertex;

/// One draw call for the rendering backend.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// A batch of points in world space.
    Points {
        positions: Vec<[f32; 3]>,
        color: [f32; 4],
        size: f32,
    },
    /// A batch of line segments in world space.
    Lines {
        segments: Vec<Segment>,
        color: [f32; 4],
        width: f32,
    },
    /// A shared wire mesh placed by a transform.
    Mesh {
        transform: RenderMatrix,
        mesh: Arc<WireMesh>,
        color: [f32; 4],
        width: f32,
    },
}

/// Ordered draw calls for one frame.
///
/// Empty batches are dropped on push, so an empty map produces an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    calls: Vec<DrawCall>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a point batch.
    pub fn push_points(&mut self, positions: Vec<[f32; 3]>, color: [f32; 4], size: f32) {
        if positions.is_empty() {
            return;
        }
        self.calls.push(DrawCall::Points {
            positions,
            color,
            size,
        });
    }

    /// Push a line batch.
    pub fn push_lines(&mut self, segments: Vec<Segment>, color: [f32; 4], width: f32) {
        if segments.is_empty() {
            return;
        }
        self.calls.push(DrawCall::Lines {
            segments,
            color,
            width,
        });
    }

    /// Push a transformed mesh draw.
    pub fn push_mesh(
        &mut self,
        transform: RenderMatrix,
        mesh: Arc<WireMesh>,
        color: [f32; 4],
        width: f32,
    ) {
        if mesh.vertex_count() == 0 {
            return;
        }
        self.calls.push(DrawCall::Mesh {
            transform,
            mesh,
            color,
            width,
        });
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Append all calls of `other`, keeping their order.
    pub fn append(&mut self, other: &mut DrawList) {
        self.calls.append(&mut other.calls);
    }

    /// Total number of segments across line batches and mesh draws.
    pub fn segment_count(&self) -> usize {
        self.calls
            .iter()
            .map(|call| match call {
                DrawCall::Points { .. } => 0,
                DrawCall::Lines { segments, .. } => segments.len(),
                DrawCall::Mesh { mesh, .. } => mesh.segment_count(),
            })
            .sum()
    }

    /// Flatten line batches and mesh draws into a world-space line list.
    ///
    /// Mesh vertices are transformed on the CPU. Line widths are dropped;
    /// backends that honor them should walk [`calls`](Self::calls) instead.
    pub fn line_vertices(&self) -> Vec<ColoredVertex> {
        let mut vertices = Vec::with_capacity(self.segment_count() * 2);
        for call in &self.calls {
            match call {
                DrawCall::Points { .. } => {}
                DrawCall::Lines {
                    segments, color, ..
                } => {
                    for [start, end] in segments {
                        vertices.push(ColoredVertex::new(*start, *color));
                        vertices.push(ColoredVertex::new(*end, *color));
                    }
                }
                DrawCall::Mesh {
                    transform,
                    mesh,
                    color,
                    ..
                } => {
                    vertices.extend(
                        mesh.transformed(transform)
                            .into_iter()
                            .map(|p| ColoredVertex::new(p, *color)),
                    );
                }
            }
        }
        vertices
    }

    /// Flatten point batches into a point list.
    pub fn point_vertices(&self) -> Vec<ColoredVertex> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Points {
                    positions, color, ..
                } => Some(positions.iter().map(|p| ColoredVertex::new(*p, *color))),
                _ => None,
            })
            .flatten()
            .collect()
    }
}
