//! # Terrain Generation
//!
//! Terrain strategies fill a chunk's block grid given the chunk's world-space
//! position. A strategy must write every element of the grid it is handed; the
//! grid may contain stale data from a previous use.
//!
//! The strategy is picked once when the chunk manager is built, through
//! [`TerrainKind`], and shared by every generation and setup call after that.

use std::sync::Arc;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::block::{block_type::BlockType, Block};

mod hills;
mod plains;
mod platform;

pub use hills::HillsTerrain;
pub use plains::PlainsTerrain;
pub use platform::PlatformTerrain;

/// Fills chunk block grids.
pub trait TerrainGenerator: Send + Sync {
    /// Writes every element of `blocks` for the chunk whose minimum corner is `position`.
    ///
    /// # Arguments
    /// * `position` - World-space minimum corner of the chunk
    /// * `blocks` - The chunk's flat grid, indexed `x + y*16 + z*256`
    fn generate_chunk(&self, position: Point3<i32>, blocks: &mut [Block]);
}

/// Selects a terrain strategy from configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    /// Half the blocks active, random placeable materials.
    Random,
    /// Flat stone, dirt and grass bands filling every chunk.
    Plains,
    /// A single stone layer under the origin.
    Platform,
    /// Perlin height field.
    #[default]
    Hills,
}

impl TerrainKind {
    /// Builds the strategy this kind names.
    pub fn build(self, seed: u32) -> Arc<dyn TerrainGenerator> {
        match self {
            TerrainKind::Random => Arc::new(RandomTerrain::new(seed)),
            TerrainKind::Plains => Arc::new(PlainsTerrain),
            TerrainKind::Platform => Arc::new(PlatformTerrain),
            TerrainKind::Hills => Arc::new(HillsTerrain::new(seed)),
        }
    }
}

/// Each block is active with probability one half and gets a random placeable type.
///
/// The random stream is seeded from the chunk position, so generation is
/// repeatable and worker threads never share a sequence.
#[derive(Debug, Clone)]
pub struct RandomTerrain {
    seed: u32,
}

impl RandomTerrain {
    /// Creates a random strategy with the given base seed.
    pub fn new(seed: u32) -> Self {
        RandomTerrain { seed }
    }

    fn chunk_seed(&self, position: Point3<i32>) -> u64 {
        let mut hash = u64::from(self.seed) ^ 0xCBF2_9CE4_8422_2325;
        for coordinate in [position.x, position.y, position.z] {
            hash ^= coordinate as u32 as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
        }
        hash
    }
}

impl TerrainGenerator for RandomTerrain {
    fn generate_chunk(&self, position: Point3<i32>, blocks: &mut [Block]) {
        let mut rng = fastrand::Rng::with_seed(self.chunk_seed(position));
        for block in blocks.iter_mut() {
            *block = Block {
                is_active: rng.bool(),
                block_type: BlockType::random(&mut rng),
            };
        }
    }
}

/// Grid index helper shared by the height-band strategies.
fn column_index(x: i32, y: i32, z: i32) -> Option<usize> {
    super::chunk::local_index(Point3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_SIZE;

    fn stale_grid() -> Vec<Block> {
        vec![Block::new(BlockType::Default); CHUNK_SIZE]
    }

    #[test]
    fn random_terrain_writes_every_element() {
        let mut blocks = stale_grid();
        RandomTerrain::new(1337).generate_chunk(Point3::new(0, 0, 0), &mut blocks);

        assert!(blocks.iter().all(|b| b.block_type != BlockType::Default));
        let active = blocks.iter().filter(|b| b.is_active).count();
        assert!(active > CHUNK_SIZE / 4 && active < CHUNK_SIZE * 3 / 4);
    }

    #[test]
    fn random_terrain_is_repeatable_per_position() {
        let terrain = RandomTerrain::new(9);
        let mut a = stale_grid();
        let mut b = stale_grid();
        let mut c = stale_grid();
        terrain.generate_chunk(Point3::new(32, 0, -64), &mut a);
        terrain.generate_chunk(Point3::new(32, 0, -64), &mut b);
        terrain.generate_chunk(Point3::new(64, 0, -64), &mut c);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn every_kind_builds_a_strategy() {
        for kind in [
            TerrainKind::Random,
            TerrainKind::Plains,
            TerrainKind::Platform,
            TerrainKind::Hills,
        ] {
            let terrain = kind.build(1);
            let mut blocks = stale_grid();
            terrain.generate_chunk(Point3::new(0, 0, 0), &mut blocks);
            assert!(blocks
                .iter()
                .all(|b| !b.is_active || b.block_type != BlockType::Default));
        }
    }
}
