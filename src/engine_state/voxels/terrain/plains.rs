//! Flat layered terrain.

use cgmath::Point3;

use super::{column_index, TerrainGenerator};
use crate::engine_state::voxels::{
    block::{block_type::BlockType, Block},
    chunk::CHUNK_DIMENSION,
};

/// Every chunk is solid: stone below y=10, dirt up to y=14, grass on y=15.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainsTerrain;

impl PlainsTerrain {
    fn band(y: i32) -> BlockType {
        match y {
            0..=9 => BlockType::Stone,
            10..=14 => BlockType::Dirt,
            _ => BlockType::Grass,
        }
    }
}

impl TerrainGenerator for PlainsTerrain {
    fn generate_chunk(&self, _position: Point3<i32>, blocks: &mut [Block]) {
        for y in 0..CHUNK_DIMENSION {
            let block = Block::new(Self::band(y));
            for z in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    if let Some(index) = column_index(x, y, z) {
                        blocks[index] = block;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::{local_index, CHUNK_SIZE};

    #[test]
    fn bands_are_stone_dirt_grass() {
        let mut blocks = vec![Block::air(); CHUNK_SIZE];
        PlainsTerrain.generate_chunk(Point3::new(0, 0, 0), &mut blocks);

        assert!(blocks.iter().all(|b| b.is_active));
        let at = |y| blocks[local_index(Point3::new(3, y, 4)).unwrap()].block_type;
        assert_eq!(at(0), BlockType::Stone);
        assert_eq!(at(9), BlockType::Stone);
        assert_eq!(at(10), BlockType::Dirt);
        assert_eq!(at(14), BlockType::Dirt);
        assert_eq!(at(15), BlockType::Grass);
    }
}
