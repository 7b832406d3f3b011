//! Chunk mesh buffers and the cube meshing algorithm that fills them.

pub mod cube;
#[allow(clippy::module_inception)]
pub mod mesh;

pub use cube::{build_chunk_mesh, MeshError};
pub use mesh::ChunkMesh;
