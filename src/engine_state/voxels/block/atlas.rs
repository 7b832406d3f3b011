//! Static texture atlas table.
//!
//! Maps a block type to the atlas cell of each of its six faces, ordered
//! [Front, Back, Left, Right, Top, Bottom]. `BlockType::Default` has no entry.

use phf::phf_map;

use super::{block_side::BlockSide, block_type::BlockType, BlockTypeSize};

/// One cell of the texture atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasCell {
    /// Column
    pub u: u32,
    /// Row
    pub v: u32,
}

impl AtlasCell {
    /// Creates a cell at column `u`, row `v`.
    pub const fn new(u: u32, v: u32) -> Self {
        AtlasCell { u, v }
    }
}

/// Atlas cells for every face of a block.
pub type FaceCells = [AtlasCell; 6];

const fn uniform(u: u32, v: u32) -> FaceCells {
    [AtlasCell::new(u, v); 6]
}

const GRASS_SIDE: AtlasCell = AtlasCell::new(3, 0);

static BLOCK_ATLAS: phf::Map<BlockTypeSize, FaceCells> = phf_map! {
    1u8 => [
        GRASS_SIDE,
        GRASS_SIDE,
        GRASS_SIDE,
        GRASS_SIDE,
        AtlasCell::new(0, 0),
        AtlasCell::new(2, 0),
    ],
    2u8 => uniform(0, 11),
    3u8 => uniform(2, 0),
    4u8 => uniform(13, 12),
    5u8 => uniform(1, 0),
    6u8 => uniform(4, 0),
};

/// Looks up the atlas cells for every face of `block_type`.
///
/// # Returns
/// `None` when the type has no entry, which is a configuration error for any
/// active block.
pub fn face_cells(block_type: BlockType) -> Option<&'static FaceCells> {
    BLOCK_ATLAS.get(&block_type.as_int())
}

/// Looks up the atlas cell of a single face.
pub fn face_cell(block_type: BlockType, side: BlockSide) -> Option<AtlasCell> {
    face_cells(block_type).map(|cells| cells[side as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_placeable_type_has_an_entry() {
        for block_type in BlockType::PLACEABLE {
            assert!(face_cells(block_type).is_some(), "{block_type:?} missing");
        }
        assert!(face_cells(BlockType::Default).is_none());
    }

    #[test]
    fn grass_uses_distinct_top_and_bottom() {
        assert_eq!(face_cell(BlockType::Grass, BlockSide::Top), Some(AtlasCell::new(0, 0)));
        assert_eq!(face_cell(BlockType::Grass, BlockSide::Bottom), Some(AtlasCell::new(2, 0)));
        assert_eq!(face_cell(BlockType::Grass, BlockSide::Left), Some(AtlasCell::new(3, 0)));
        assert_eq!(face_cell(BlockType::Water, BlockSide::Front), Some(AtlasCell::new(13, 12)));
    }
}
