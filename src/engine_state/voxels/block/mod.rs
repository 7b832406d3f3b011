//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, the texture atlas
//! table and the block value itself.

use block_type::BlockType;

pub mod atlas;
pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Edge length of one block in world units.
pub const BLOCK_RENDER_SIZE: i32 = 2;

/// Represents a single voxel block in the world.
///
/// A plain value with no identity of its own; it only exists inside a chunk's
/// block grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// Whether the block is solid and should be meshed.
    pub is_active: bool,
    /// The material of this block.
    pub block_type: BlockType,
}

impl Block {
    /// Creates a new active block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            is_active: true,
            block_type,
        }
    }

    /// An inactive block. Terrain strategies use it to clear cells.
    pub fn air() -> Self {
        Block::default()
    }
}
