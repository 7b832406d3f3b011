//! Rendering interface for the voxel engine.
//!
//! The chunk pipeline produces CPU-side meshes; drawing them is delegated to a
//! [`RenderBackend`]. A GPU backend uploads `ChunkMesh::vertex_bytes` with the
//! layout from [`PackedVertex::desc`] and draws the index buffer as a triangle
//! list.

use cgmath::Matrix4;

pub mod meshing;
pub mod vertex;

pub use meshing::ChunkMesh;
pub use vertex::PackedVertex;

/// Something that can draw chunk meshes.
pub trait RenderBackend {
    /// Issues a draw of `mesh` placed with the world-space `transform`.
    fn draw_chunk(&mut self, mesh: &ChunkMesh, transform: Matrix4<f32>);
}

/// Backend that draws nothing and only tallies what it was asked to draw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Number of draw calls issued
    pub draw_calls: usize,
    /// Total triangles across all draws
    pub triangles: usize,
    /// Vertex and index bytes a GPU backend would have uploaded
    pub bytes: usize,
}

impl RenderBackend for RenderStats {
    fn draw_chunk(&mut self, mesh: &ChunkMesh, _transform: Matrix4<f32>) {
        self.draw_calls += 1;
        self.triangles += mesh.triangle_count();
        self.bytes += mesh.vertex_bytes().len() + mesh.index_bytes().len();
    }
}
