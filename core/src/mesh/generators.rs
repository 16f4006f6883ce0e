//! Wireframe generators for common shapes.

use std::f32::consts::PI;

use super::WireMesh;

/// Default number of slices (around the polar axis) for object ellipsoids.
pub const DEFAULT_SPHERE_SLICES: u32 = 14;

/// Default number of stacks (pole to pole) for object ellipsoids.
pub const DEFAULT_SPHERE_STACKS: u32 = 9;

/// Generate a wireframe UV sphere with its polar axis along +Z.
///
/// Draws `stacks - 1` latitude rings of `slices` segments each, and
/// `slices` meridians of `stacks` segments each running from the north
/// pole (+Z) to the south pole. The result has
/// `(stacks - 1) * slices + slices * stacks` segments.
///
/// # Arguments
///
/// * `radius` - Sphere radius
/// * `slices` - Number of subdivisions around the Z axis
/// * `stacks` - Number of subdivisions along the Z axis
pub fn generate_wire_sphere(radius: f32, slices: u32, stacks: u32) -> WireMesh {
    let mut mesh = WireMesh::new().with_label("wire_sphere");
    if slices == 0 || stacks == 0 {
        return mesh;
    }

    let point = |stack: u32, slice: u32| -> [f32; 3] {
        let theta = stack as f32 * PI / stacks as f32;
        let phi = slice as f32 * 2.0 * PI / slices as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        [
            radius * sin_theta * cos_phi,
            radius * sin_theta * sin_phi,
            radius * cos_theta,
        ]
    };

    // Latitude rings (poles excluded)
    for stack in 1..stacks {
        for slice in 0..slices {
            mesh.push_segment(point(stack, slice), point(stack, slice + 1));
        }
    }

    // Meridians
    for slice in 0..slices {
        for stack in 0..stacks {
            mesh.push_segment(point(stack, slice), point(stack + 1, slice));
        }
    }

    mesh
}
