//! CPU-side wireframe meshes and generators.
//!
//! - [`WireMesh`] - a line-list mesh: every two consecutive vertices form one segment
//! - Generators for the shapes the map viewer instances (unit sphere)

pub mod generators;

use crate::math::{RenderMatrix, Vec3};

/// A line-list mesh held on the CPU.
///
/// Vertices are stored in pairs, one pair per segment, so a backend can
/// upload them directly with line-list topology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireMesh {
    vertices: Vec<[f32; 3]>,
    label: Option<String>,
}

impl WireMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append one segment.
    pub fn push_segment(&mut self, start: [f32; 3], end: [f32; 3]) {
        self.vertices.push(start);
        self.vertices.push(end);
    }

    /// Segment endpoints, two per segment.
    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// Number of vertices (twice the segment count).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of line segments.
    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }

    /// Debug label, if set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Copy of the vertices transformed by `transform`.
    pub fn transformed(&self, transform: &RenderMatrix) -> Vec<[f32; 3]> {
        self.vertices
            .iter()
            .map(|v| transform.transform_point(&Vec3::from(*v)).into())
            .collect()
    }
}
