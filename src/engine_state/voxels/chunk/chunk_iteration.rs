//! # Chunk Iteration Module
//!
//! Iteration over the active blocks of a chunk's flat block grid, yielding each
//! block together with its local position.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::local_position;

/// An iterator over all active blocks in a chunk block grid.
///
/// Blocks are visited in storage order (x fastest, then y, then z). Inactive
/// blocks are skipped.
pub struct ChunkBlockIterator<'a> {
    /// The grid being iterated
    blocks: &'a [Block],
    /// Next storage index to inspect
    offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new iterator positioned before the first block of `blocks`.
    pub fn new(blocks: &'a [Block]) -> Self {
        ChunkBlockIterator { blocks, offset: 0 }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, Block);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(block) = self.blocks.get(self.offset) {
            let index = self.offset;
            self.offset += 1;
            if block.is_active {
                return Some((local_position(index), *block));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.blocks.len().saturating_sub(self.offset)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{local_index, CHUNK_SIZE},
    };

    #[test]
    fn yields_only_active_blocks_with_positions() {
        let mut blocks = vec![Block::air(); CHUNK_SIZE];
        let a = Point3::new(1, 0, 0);
        let b = Point3::new(3, 15, 2);
        blocks[local_index(a).unwrap()] = Block::new(BlockType::Dirt);
        blocks[local_index(b).unwrap()] = Block::new(BlockType::Water);

        let visited: Vec<_> = ChunkBlockIterator::new(&blocks).collect();
        assert_eq!(visited.len(), 2);
        assert_eq!(visited[0], (a, Block::new(BlockType::Dirt)));
        assert_eq!(visited[1], (b, Block::new(BlockType::Water)));
    }
}
