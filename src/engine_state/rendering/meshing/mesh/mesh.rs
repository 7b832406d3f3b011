//! CPU-side mesh buffers for a single chunk.

use crate::engine_state::rendering::vertex::PackedVertex;

/// The packed vertex and index buffers describing a chunk's visible surface.
///
/// Topology is a triangle list. Indices are relative to the start of
/// `vertices`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkMesh {
    pub(super) vertices: Vec<PackedVertex>,
    pub(super) indices: Vec<u32>,
}

impl ChunkMesh {
    /// Creates a mesh with no geometry.
    pub fn empty() -> Self {
        ChunkMesh::default()
    }

    /// The packed vertices.
    pub fn vertices(&self) -> &[PackedVertex] {
        &self.vertices
    }

    /// The triangle list indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of emitted vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of emitted indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles in the index buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The vertex buffer as raw bytes, ready for a buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index buffer as raw bytes, ready for a buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
