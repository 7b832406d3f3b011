//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a 16x16x16 block grid stored as a
//! flat array, its generated mesh, and the flags that track where it is in its
//! lifecycle.
//!
//! ## Lifecycle
//!
//! `Unloaded -> Loaded -> Setup`, with `Setup -> Setup` on rebuild.
//!
//! * **load** is O(1) and does no geometry work.
//! * **setup** runs terrain generation if the grid has not been populated yet,
//!   then builds the mesh.
//! * **rebuild** discards the old mesh and meshes the current blocks again.
//!
//! A chunk never goes back to `Unloaded`.
//!
//! ## Storage
//!
//! Blocks are stored at index `x + y * 16 + z * 256`. The chunk's `position` is
//! the world-space minimum corner, and a chunk spans `CHUNK_WORLD_SIZE` world
//! units per axis.

use cgmath::{Matrix4, Point3, Vector3};
use log::trace;

use super::{
    block::{Block, BLOCK_RENDER_SIZE},
    terrain::TerrainGenerator,
    world::WorldError,
};
use crate::engine_state::rendering::meshing::{build_chunk_mesh, ChunkMesh, MeshError};

pub mod chunk_iteration;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: usize = (CHUNK_PLANE_SIZE * CHUNK_DIMENSION) as usize;
/// Edge length of a chunk in world units.
pub const CHUNK_WORLD_SIZE: i32 = CHUNK_DIMENSION * BLOCK_RENDER_SIZE;

/// Storage index of a local block position.
///
/// # Returns
/// `None` if any coordinate lies outside `0..CHUNK_DIMENSION`.
pub fn local_index(local: Point3<i32>) -> Option<usize> {
    let range = 0..CHUNK_DIMENSION;
    if range.contains(&local.x) && range.contains(&local.y) && range.contains(&local.z) {
        Some((local.x + local.y * CHUNK_DIMENSION + local.z * CHUNK_PLANE_SIZE) as usize)
    } else {
        None
    }
}

/// Local block position of a storage index. Inverse of [`local_index`].
pub fn local_position(index: usize) -> Point3<i32> {
    let index = index as i32;
    Point3::new(
        index % CHUNK_DIMENSION,
        (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
        index / CHUNK_PLANE_SIZE,
    )
}

/// Represents a 16x16x16 collection of voxel blocks in the world.
#[derive(Debug)]
pub struct Chunk {
    /// World-space minimum corner of the chunk.
    position: Point3<i32>,
    /// Flat block grid, always `CHUNK_SIZE` long.
    blocks: Vec<Block>,
    /// Last successfully built mesh.
    mesh: ChunkMesh,
    /// Whether terrain generation has written the grid.
    populated: bool,
    loaded: bool,
    has_setup: bool,
}

impl Chunk {
    /// Creates an unloaded chunk with every block inactive.
    ///
    /// # Arguments
    /// * `position` - World-space minimum corner of the chunk
    pub fn new(position: Point3<i32>) -> Self {
        Chunk {
            position,
            blocks: vec![Block::air(); CHUNK_SIZE],
            mesh: ChunkMesh::empty(),
            populated: false,
            loaded: false,
            has_setup: false,
        }
    }

    /// World-space minimum corner.
    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    /// Marks the chunk as loaded. Does no geometry work.
    pub fn load(&mut self) {
        self.loaded = true;
    }

    /// Populates the grid if needed and builds the mesh.
    ///
    /// A chunk that is set up is also loaded.
    ///
    /// # Errors
    /// Propagates `MeshError` from meshing. The chunk then stays not set up and
    /// keeps whatever mesh it had.
    pub fn setup(&mut self, terrain: &dyn TerrainGenerator) -> Result<(), MeshError> {
        if !self.populated {
            self.populate(terrain);
        }
        self.mesh = build_chunk_mesh(&self.blocks)?;
        self.loaded = true;
        self.has_setup = true;
        trace!(
            "Chunk at {:?} set up with {} triangles",
            self.position,
            self.mesh.triangle_count()
        );
        Ok(())
    }

    /// Runs `terrain` over the grid and marks it populated.
    pub fn populate(&mut self, terrain: &dyn TerrainGenerator) {
        terrain.generate_chunk(self.position, &mut self.blocks);
        self.populated = true;
    }

    /// Replaces the mesh with one built from the current blocks.
    ///
    /// # Errors
    /// On `MeshError` the previous mesh is left in place.
    pub fn rebuild_mesh(&mut self) -> Result<(), MeshError> {
        self.mesh = build_chunk_mesh(&self.blocks)?;
        Ok(())
    }

    /// Whether the chunk has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the chunk has a built mesh.
    pub fn is_setup(&self) -> bool {
        self.has_setup
    }

    /// Whether terrain generation has written the grid.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// The current mesh. Stale after a block edit until the chunk is rebuilt.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// The block at a local position, if it lies inside the chunk.
    pub fn get_block(&self, local: Point3<i32>) -> Option<Block> {
        local_index(local).map(|index| self.blocks[index])
    }

    /// Overwrites the block at a local position.
    ///
    /// The mesh is not touched; queue the chunk for rebuild to refresh it.
    ///
    /// # Errors
    /// `WorldError::BlockOutOfBounds` if `local` lies outside the chunk.
    pub fn set_block(&mut self, local: Point3<i32>, block: Block) -> Result<(), WorldError> {
        let index = local_index(local).ok_or(WorldError::BlockOutOfBounds { local })?;
        self.blocks[index] = block;
        Ok(())
    }

    /// Centre of the chunk's bounding cube in world space.
    pub fn center(&self) -> Point3<f32> {
        let half = (CHUNK_WORLD_SIZE / 2) as f32;
        Point3::new(
            self.position.x as f32 + half,
            self.position.y as f32 + half,
            self.position.z as f32 + half,
        )
    }

    /// Model transform placing the chunk mesh in the world.
    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(
            self.position.x as f32,
            self.position.y as f32,
            self.position.z as f32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, terrain::PlainsTerrain};

    struct EmptyTerrain;

    impl TerrainGenerator for EmptyTerrain {
        fn generate_chunk(&self, _position: Point3<i32>, blocks: &mut [Block]) {
            blocks.fill(Block::air());
        }
    }

    #[test]
    fn local_index_round_trips_and_rejects_outside() {
        for index in [0, 1, 15, 16, 255, 256, 4095] {
            assert_eq!(local_index(local_position(index)), Some(index));
        }
        assert_eq!(local_index(Point3::new(16, 0, 0)), None);
        assert_eq!(local_index(Point3::new(0, -1, 0)), None);
    }

    #[test]
    fn lifecycle_moves_through_load_and_setup() {
        let mut chunk = Chunk::new(Point3::new(0, -32, 0));
        assert!(!chunk.is_loaded() && !chunk.is_setup());

        chunk.load();
        assert!(chunk.is_loaded() && !chunk.is_setup());

        chunk.setup(&PlainsTerrain).unwrap();
        assert!(chunk.is_setup() && chunk.is_loaded() && chunk.is_populated());
        assert!(!chunk.mesh().is_empty());
    }

    #[test]
    fn empty_chunk_sets_up_with_empty_mesh() {
        let mut chunk = Chunk::new(Point3::new(32, 0, 32));
        chunk.load();
        chunk.setup(&EmptyTerrain).unwrap();
        assert_eq!(chunk.mesh().vertex_count(), 0);
        assert_eq!(chunk.mesh().index_count(), 0);
    }

    #[test]
    fn edits_need_a_rebuild_to_show() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.load();
        chunk.setup(&EmptyTerrain).unwrap();

        chunk
            .set_block(Point3::new(1, 1, 1), Block::new(BlockType::Wood))
            .unwrap();
        assert!(chunk.mesh().is_empty());
        assert_eq!(
            chunk.get_block(Point3::new(1, 1, 1)),
            Some(Block::new(BlockType::Wood))
        );
        assert_eq!(chunk.get_block(Point3::new(-1, 1, 1)), None);

        chunk.rebuild_mesh().unwrap();
        assert_eq!(chunk.mesh().vertex_count(), 24);
    }

    #[test]
    fn failed_rebuild_keeps_previous_mesh() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.load();
        chunk.setup(&EmptyTerrain).unwrap();
        chunk
            .set_block(Point3::new(0, 0, 0), Block::new(BlockType::Stone))
            .unwrap();
        chunk.rebuild_mesh().unwrap();

        chunk
            .set_block(Point3::new(2, 0, 0), Block::new(BlockType::Default))
            .unwrap();
        assert!(chunk.rebuild_mesh().is_err());
        assert_eq!(chunk.mesh().vertex_count(), 24);
    }

    #[test]
    fn set_block_rejects_outside_positions() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        let err = chunk
            .set_block(Point3::new(0, 16, 0), Block::new(BlockType::Dirt))
            .unwrap_err();
        assert!(matches!(err, WorldError::BlockOutOfBounds { .. }));
    }

    #[test]
    fn bounding_cube_centre_is_offset_by_half_a_chunk() {
        let chunk = Chunk::new(Point3::new(-64, 0, 32));
        assert_eq!(chunk.center(), Point3::new(-48.0, 16.0, 48.0));
    }
}
