//! # Camera State Management
//!
//! The camera context threaded through each frame: where the camera is, how it
//! projects, and the frustum derived from both.
//!
//! ## Core Components
//! - `Camera`: Position and orientation in 3D space
//! - `Projection`: Perspective projection settings
//! - `Frustum`: View volume planes used to cull chunks
//!
//! The frustum is not tracked automatically; call `update_frustum` after moving
//! or turning the camera.

use cgmath::{Matrix4, Point3};

pub mod camera;
pub mod frustum;

use camera::{Camera, Projection};
use frustum::Frustum;

/// The camera context for a frame.
#[derive(Debug, Clone)]
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Projection settings
    pub projection: Projection,
    frustum: Frustum,
}

impl CameraState {
    /// Creates a camera state with its frustum already computed.
    pub fn new(camera: Camera, projection: Projection) -> Self {
        let frustum = Frustum::from_view_projection(&(projection.calc_matrix() * camera.calc_matrix()));
        Self {
            camera,
            projection,
            frustum,
        }
    }

    /// Combined view-projection matrix.
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }

    /// Recomputes the frustum from the current camera and projection.
    pub fn update_frustum(&mut self) {
        self.frustum = Frustum::from_view_projection(&self.view_projection());
    }

    /// The frustum as of the last `update_frustum`.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// The camera's world-space position.
    pub fn position(&self) -> Point3<f32> {
        self.camera.position
    }
}
