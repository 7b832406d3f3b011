//! Rolling hills from a 2D Perlin height field.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use super::{column_index, TerrainGenerator};
use crate::engine_state::voxels::{
    block::{block_type::BlockType, Block, BLOCK_RENDER_SIZE},
    chunk::CHUNK_DIMENSION,
};

/// Scaling applied to world block coordinates before sampling noise.
pub const HILLS_FREQUENCY: f64 = 0.05;
/// Height swing of the surface in blocks.
pub const HILLS_AMPLITUDE: f64 = 5.0;
/// Lowest surface height inside a chunk.
pub const MIN_SURFACE_HEIGHT: i32 = 5;
/// Number of dirt layers under the grass.
const DIRT_DEPTH: i32 = 5;

/// Grass surface at a noise-driven height, dirt beneath, stone below that.
///
/// Only the X/Z position of a chunk affects its shape, so every chunk in a
/// column carries the same surface.
pub struct HillsTerrain {
    perlin: Perlin,
}

impl HillsTerrain {
    /// Creates a hills strategy seeded with `seed`.
    pub fn new(seed: u32) -> Self {
        HillsTerrain {
            perlin: Perlin::new(seed),
        }
    }

    /// Surface height for a world block column, clamped to the chunk.
    pub fn surface_height(&self, block_x: i32, block_z: i32) -> i32 {
        let sample = self.perlin.get([
            f64::from(block_x) * HILLS_FREQUENCY,
            0.0,
            f64::from(block_z) * HILLS_FREQUENCY,
        ]);
        let height = CHUNK_DIMENSION - ((sample + 1.0) * HILLS_AMPLITUDE) as i32;
        height.clamp(MIN_SURFACE_HEIGHT, CHUNK_DIMENSION - 1)
    }

    fn column_block(y: i32, surface: i32) -> Block {
        if y > surface {
            Block::air()
        } else if y == surface {
            Block::new(BlockType::Grass)
        } else if y > surface - DIRT_DEPTH {
            Block::new(BlockType::Dirt)
        } else {
            Block::new(BlockType::Stone)
        }
    }
}

impl TerrainGenerator for HillsTerrain {
    fn generate_chunk(&self, position: Point3<i32>, blocks: &mut [Block]) {
        let origin_x = position.x.div_euclid(BLOCK_RENDER_SIZE);
        let origin_z = position.z.div_euclid(BLOCK_RENDER_SIZE);

        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let surface = self.surface_height(origin_x + x, origin_z + z);
                for y in 0..CHUNK_DIMENSION {
                    if let Some(index) = column_index(x, y, z) {
                        blocks[index] = Self::column_block(y, surface);
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
    fn columns_are_grass_over_dirt_over_stone() {
        let terrain = HillsTerrain::new(1337);
        let mut blocks = vec![Block::new(BlockType::Water); CHUNK_SIZE];
        terrain.generate_chunk(Point3::new(64, 0, -96), &mut blocks);

        for (x, z) in [(0, 0), (7, 3), (15, 15)] {
            let surface = terrain.surface_height(32 + x, -48 + z);
            assert!((MIN_SURFACE_HEIGHT..CHUNK_DIMENSION).contains(&surface));
            let at = |y| blocks[local_index(Point3::new(x, y, z)).unwrap()];

            assert_eq!(at(surface), Block::new(BlockType::Grass));
            assert_eq!(at(surface - 1), Block::new(BlockType::Dirt));
            assert_eq!(at(surface - 4), Block::new(BlockType::Dirt));
            assert_eq!(at(surface - 5), Block::new(BlockType::Stone));
            assert_eq!(at(0), Block::new(BlockType::Stone));
            for y in surface + 1..CHUNK_DIMENSION {
                assert!(!at(y).is_active);
            }
        }
        assert!(blocks.iter().all(|b| b.block_type != BlockType::Water));
    }

    #[test]
    fn same_seed_same_surface() {
        let a = HillsTerrain::new(42);
        let b = HillsTerrain::new(42);
        for x in -20..20 {
            assert_eq!(a.surface_height(x, x * 3), b.surface_height(x, x * 3));
        }
    }
}
