//! Meshing for voxel chunks.
//!
//! Converts a chunk's block grid into packed vertex and index buffers that a
//! render backend can upload as-is.

pub mod mesh;

pub use mesh::{build_chunk_mesh, ChunkMesh, MeshError};
