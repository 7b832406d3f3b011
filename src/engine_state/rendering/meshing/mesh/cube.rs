//! Face-culled cube meshing.
//!
//! Every active block contributes one quad per exposed face. A face is exposed
//! when its neighbour inside the same chunk is inactive. Neighbours outside the
//! chunk never occlude, so faces on the chunk boundary are always emitted even
//! when the adjacent chunk is solid there.

use cgmath::Point3;
use log::trace;
use thiserror::Error;
use web_time::Instant;

use crate::engine_state::{
    rendering::vertex::PackedVertex,
    voxels::{
        block::{
            atlas::{self, AtlasCell},
            block_side::BlockSide,
            block_type::BlockType,
            Block, BLOCK_RENDER_SIZE,
        },
        chunk::{chunk_iteration::ChunkBlockIterator, local_index, CHUNK_SIZE},
    },
};

use super::mesh::ChunkMesh;

/// Worst-case vertex count: every block emits every face.
pub const MAX_CHUNK_VERTICES: usize = CHUNK_SIZE * 6 * 4;
/// Worst-case index count: every block emits every face.
pub const MAX_CHUNK_INDICES: usize = CHUNK_SIZE * 6 * 6;

/// Placeholder normal id given to corners before a face claims them.
const UNASSIGNED_NORMAL: u32 = 1;

/// Errors raised while meshing a chunk.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// An active block uses a type with no texture atlas entry.
    #[error("active block {block_type:?} at local {local:?} has no texture atlas entry")]
    MissingAtlasEntry {
        /// The offending block type
        block_type: BlockType,
        /// Position of the block inside its chunk
        local: Point3<i32>,
    },
}

/// Unit cube corners as half-size offsets, `p1..p8`.
const CORNER_OFFSETS: [[i32; 3]; 8] = [
    [-1, -1, 1],
    [1, -1, 1],
    [1, 1, 1],
    [-1, 1, 1],
    [1, -1, -1],
    [-1, -1, -1],
    [-1, 1, -1],
    [1, 1, -1],
];

/// For each face: the corner used by each of its four vertices and the
/// `(du, dv)` offset into the face's atlas cell.
const FACE_CORNERS: [[(usize, u32, u32); 4]; 6] = [
    // front
    [(0, 0, 1), (1, 1, 1), (2, 1, 0), (3, 0, 0)],
    // back
    [(4, 0, 1), (5, 1, 1), (6, 1, 0), (7, 0, 0)],
    // left
    [(1, 0, 1), (4, 1, 1), (7, 1, 0), (2, 0, 0)],
    // right
    [(5, 0, 1), (0, 1, 1), (3, 1, 0), (6, 0, 0)],
    // top
    [(3, 0, 0), (2, 1, 0), (7, 1, 1), (6, 0, 1)],
    // bottom
    [(5, 0, 0), (4, 1, 0), (1, 1, 1), (0, 0, 1)],
];

/// Builds the mesh for a full chunk block grid.
///
/// Buffers are reserved for the worst case up front and trimmed once the scan
/// completes.
///
/// # Arguments
/// * `blocks` - The chunk's flat block grid, indexed `x + y*16 + z*256`
///
/// # Returns
/// The finished mesh, or `MeshError::MissingAtlasEntry` if any active block has
/// no atlas entry. No partial mesh is returned in that case.
pub fn build_chunk_mesh(blocks: &[Block]) -> Result<ChunkMesh, MeshError> {
    let start = Instant::now();

    let mut vertices = Vec::with_capacity(MAX_CHUNK_VERTICES);
    let mut indices = Vec::with_capacity(MAX_CHUNK_INDICES);

    for (local, block) in ChunkBlockIterator::new(blocks) {
        let cells = atlas::face_cells(block.block_type).ok_or(MeshError::MissingAtlasEntry {
            block_type: block.block_type,
            local,
        })?;
        let corners = cube_corners(local);

        for side in BlockSide::all() {
            if is_occluded(blocks, local, side) {
                continue;
            }
            push_face(
                &mut vertices,
                &mut indices,
                &corners,
                side,
                cells[side as usize],
            );
        }
    }

    vertices.shrink_to_fit();
    indices.shrink_to_fit();

    trace!(
        "Meshed chunk: {} vertices, {} indices in {:?}",
        vertices.len(),
        indices.len(),
        start.elapsed()
    );

    Ok(ChunkMesh { vertices, indices })
}

/// Packs the eight corners of the block at `local` with placeholder face attributes.
fn cube_corners(local: Point3<i32>) -> [PackedVertex; 8] {
    let half = BLOCK_RENDER_SIZE / 2;
    CORNER_OFFSETS.map(|[dx, dy, dz]| {
        PackedVertex::encode(
            BLOCK_RENDER_SIZE * local.x + dx * half,
            BLOCK_RENDER_SIZE * local.y + dy * half,
            BLOCK_RENDER_SIZE * local.z + dz * half,
            UNASSIGNED_NORMAL,
            0,
            0,
        )
    })
}

/// Whether the in-chunk neighbour across `side` is active.
fn is_occluded(blocks: &[Block], local: Point3<i32>, side: BlockSide) -> bool {
    let neighbor = local + side.neighbor_offset();
    local_index(neighbor)
        .and_then(|index| blocks.get(index))
        .is_some_and(|block| block.is_active)
}

fn push_face(
    vertices: &mut Vec<PackedVertex>,
    indices: &mut Vec<u32>,
    corners: &[PackedVertex; 8],
    side: BlockSide,
    cell: AtlasCell,
) {
    let base = vertices.len() as u32;
    for (corner, du, dv) in FACE_CORNERS[side as usize] {
        vertices.push(corners[corner].update_face_attrs(
            side.normal_id(),
            cell.u + du,
            cell.v + dv,
        ));
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;

    fn empty_grid() -> Vec<Block> {
        vec![Block::air(); CHUNK_SIZE]
    }

    fn set(blocks: &mut [Block], x: i32, y: i32, z: i32, block: Block) {
        let index = local_index(Point3::new(x, y, z)).unwrap();
        blocks[index] = block;
    }

    #[test]
    fn empty_chunk_has_no_geometry() {
        let mesh = build_chunk_mesh(&empty_grid()).unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.index_count(), 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn isolated_block_emits_six_faces() {
        let mut blocks = empty_grid();
        set(&mut blocks, 5, 6, 7, Block::new(BlockType::Stone));

        let mesh = build_chunk_mesh(&blocks).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_bytes().len(), 4 * mesh.vertex_count());
        assert_eq!(mesh.index_bytes().len(), 4 * mesh.index_count());
        assert_eq!(&mesh.vertex_bytes()[..4], &mesh.vertices()[0].raw().to_ne_bytes());
    }

    #[test]
    fn fully_surrounded_block_contributes_no_faces() {
        let mut blocks = empty_grid();
        let centre = Point3::new(8, 8, 8);
        set(&mut blocks, centre.x, centre.y, centre.z, Block::new(BlockType::Dirt));
        for side in BlockSide::all() {
            let n = centre + side.neighbor_offset();
            set(&mut blocks, n.x, n.y, n.z, Block::new(BlockType::Dirt));
        }

        let mesh = build_chunk_mesh(&blocks).unwrap();
        // Each of the six neighbours shows five faces; the centre shows none.
        assert_eq!(mesh.vertex_count(), 6 * 5 * 4);
        assert_eq!(mesh.index_count(), 6 * 5 * 6);
    }

    #[test]
    fn full_chunk_emits_only_boundary_faces() {
        let blocks = vec![Block::new(BlockType::Sand); CHUNK_SIZE];
        let mesh = build_chunk_mesh(&blocks).unwrap();

        let per_side = (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;
        assert_eq!(mesh.vertex_count(), 6 * per_side * 4);
    }

    #[test]
    fn boundary_face_is_always_exposed() {
        let mut blocks = empty_grid();
        set(&mut blocks, 15, 0, 0, Block::new(BlockType::Stone));
        set(&mut blocks, 14, 0, 0, Block::new(BlockType::Stone));

        let mesh = build_chunk_mesh(&blocks).unwrap();
        // Two blocks sharing one face: 12 - 2 faces.
        assert_eq!(mesh.vertex_count(), 10 * 4);

        let left_normal = BlockSide::Left.normal_id();
        let max_x = BLOCK_RENDER_SIZE * 15 + 1;
        assert!(mesh
            .vertices()
            .iter()
            .any(|v| v.decode().normal == left_normal && v.decode().x == max_x));
    }

    #[test]
    fn faces_carry_normal_and_atlas_cell() {
        let mut blocks = empty_grid();
        set(&mut blocks, 0, 0, 0, Block::new(BlockType::Grass));
        let mesh = build_chunk_mesh(&blocks).unwrap();

        let top: Vec<_> = mesh
            .vertices()
            .iter()
            .map(|v| v.decode())
            .filter(|d| d.normal == BlockSide::Top.normal_id())
            .collect();
        assert_eq!(top.len(), 4);
        let mut uv: Vec<_> = top.iter().map(|d| (d.u, d.v)).collect();
        uv.sort();
        assert_eq!(uv, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert!(top.iter().all(|d| d.y == 1));

        // Corners of block (0,0,0) reach one half-size below the origin.
        assert!(mesh.vertices().iter().any(|v| v.decode().x == -1));
    }

    #[test]
    fn quad_indices_follow_fixed_winding() {
        let mut blocks = empty_grid();
        set(&mut blocks, 3, 3, 3, Block::new(BlockType::Wood));
        let mesh = build_chunk_mesh(&blocks).unwrap();
        assert_eq!(&mesh.indices()[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&mesh.indices()[6..12], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn missing_atlas_entry_aborts_the_chunk() {
        let mut blocks = empty_grid();
        set(&mut blocks, 0, 0, 0, Block::new(BlockType::Stone));
        set(&mut blocks, 4, 2, 9, Block::new(BlockType::Default));

        let err = build_chunk_mesh(&blocks).unwrap_err();
        assert_eq!(
            err,
            MeshError::MissingAtlasEntry {
                block_type: BlockType::Default,
                local: Point3::new(4, 2, 9),
            }
        );
    }
}
