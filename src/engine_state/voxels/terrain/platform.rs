//! A single floating platform under the origin.

use cgmath::Point3;

use super::{column_index, TerrainGenerator};
use crate::engine_state::voxels::{
    block::{block_type::BlockType, Block},
    chunk::CHUNK_DIMENSION,
};

/// Chunks whose corner lies within this many world units of the origin on X and Z get a floor.
const PLATFORM_EXTENT: i32 = 16;

/// Clears the grid, then lays stone across y=0 for chunks near the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformTerrain;

impl TerrainGenerator for PlatformTerrain {
    fn generate_chunk(&self, position: Point3<i32>, blocks: &mut [Block]) {
        blocks.fill(Block::air());

        if position.x.abs() > PLATFORM_EXTENT || position.z.abs() > PLATFORM_EXTENT {
            return;
        }
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                if let Some(index) = column_index(x, 0, z) {
                    blocks[index] = Block::new(BlockType::Stone);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_SIZE;

    #[test]
    fn floor_only_near_origin() {
        let mut blocks = vec![Block::new(BlockType::Wood); CHUNK_SIZE];
        PlatformTerrain.generate_chunk(Point3::new(0, 0, -32), &mut blocks);
        assert!(blocks.iter().all(|b| !b.is_active));

        PlatformTerrain.generate_chunk(Point3::new(0, 64, 0), &mut blocks);
        let active: Vec<_> = blocks.iter().filter(|b| b.is_active).collect();
        assert_eq!(active.len(), (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize);
        assert!(active.iter().all(|b| b.block_type == BlockType::Stone));
        assert!(blocks[..CHUNK_DIMENSION as usize].iter().all(|b| b.is_active));
    }
}
