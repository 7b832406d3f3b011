//! View frustum culling for chunk bounding cubes.
//!
//! Planes are extracted from the combined view-projection matrix
//! (Gribb-Hartmann) for WGPU's `[0, 1]` clip-space depth.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector4};

/// Box-versus-view-volume test consumed by the chunk manager's render step.
pub trait FrustumPredicate {
    /// Whether an axis-aligned cube is at least partly inside the view volume.
    ///
    /// # Arguments
    /// * `center` - Cube centre in world space
    /// * `half_extent` - Half the cube's edge length
    fn cube_in_frustum(&self, center: Point3<f32>, half_extent: f32) -> bool;
}

/// Predicate that accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCulling;

impl FrustumPredicate for NoCulling {
    fn cube_in_frustum(&self, _center: Point3<f32>, _half_extent: f32) -> bool {
        true
    }
}

/// Six inward-facing planes, each `(a, b, c, d)` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vector4<f32>; 6],
}

impl Frustum {
    /// Extracts the planes of `view_proj`.
    pub fn from_view_projection(view_proj: &Matrix4<f32>) -> Self {
        let rows = [
            view_proj.row(0),
            view_proj.row(1),
            view_proj.row(2),
            view_proj.row(3),
        ];

        let mut planes = [
            rows[3] + rows[0], // left
            rows[3] - rows[0], // right
            rows[3] + rows[1], // bottom
            rows[3] - rows[1], // top
            rows[2],           // near
            rows[3] - rows[2], // far
        ];

        for plane in &mut planes {
            let length = plane.truncate().magnitude();
            if length > 0.0 {
                *plane /= length;
            }
        }

        Self { planes }
    }
}

impl FrustumPredicate for Frustum {
    fn cube_in_frustum(&self, center: Point3<f32>, half_extent: f32) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            // Distance of the corner furthest along the normal.
            let reach = half_extent * (normal.x.abs() + normal.y.abs() + normal.z.abs());
            normal.x * center.x + normal.y * center.y + normal.z * center.z + plane.w + reach >= 0.0
        })
    }
}
