//! # Block Type Module
//!
//! This module defines the materials a block can be made of, along with
//! conversions to and from the compact integer representation.

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block materials.
///
/// The discriminants are stable: they key the texture atlas table and are the
/// values stored when a block type is written out as a `BlockTypeSize`.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum BlockType {
    /// Placeholder material. Has no atlas entry and must never be active.
    #[default]
    Default = 0,
    /// Grass on top, dirt underneath, grassy sides.
    Grass = 1,
    /// Sand on every face.
    Sand = 2,
    /// Dirt on every face.
    Dirt = 3,
    /// Water on every face.
    Water = 4,
    /// Stone on every face.
    Stone = 5,
    /// Wood on every face.
    Wood = 6,
}

impl BlockType {
    /// Every material that terrain generation may place.
    pub const PLACEABLE: [BlockType; 6] = [
        BlockType::Grass,
        BlockType::Sand,
        BlockType::Dirt,
        BlockType::Water,
        BlockType::Stone,
        BlockType::Wood,
    ];

    /// Converts a `BlockTypeSize` to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the value is not a known discriminant.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// The compact integer representation of this type.
    pub fn as_int(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Draws a placeable material uniformly from `rng`.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::PLACEABLE[rng.usize(..Self::PLACEABLE.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_conversion_matches_discriminants() {
        for block_type in BlockType::PLACEABLE {
            assert_eq!(BlockType::from_int(block_type.as_int()), Some(block_type));
        }
        assert_eq!(BlockType::from_int(0), Some(BlockType::Default));
        assert_eq!(BlockType::from_int(7), None);
    }

    #[test]
    fn random_never_yields_default() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            assert_ne!(BlockType::random(&mut rng), BlockType::Default);
        }
    }
}
