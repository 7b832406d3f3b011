//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the neighbour each
//! face looks at when deciding whether it is exposed.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminant is the normal id packed into every vertex of that face and
/// the index of the face in an atlas entry.
///
/// The order is: [Front, Back, Left, Right, Top, Bottom]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    Front = 0,

    /// The back face (facing negative Z)
    Back = 1,

    /// The left face (facing positive X)
    Left = 2,

    /// The right face (facing negative X)
    Right = 3,

    /// The top face (facing positive Y)
    Top = 4,

    /// The bottom face (facing negative Y)
    Bottom = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in emission order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Left,
            BlockSide::Right,
            BlockSide::Top,
            BlockSide::Bottom,
        ]
    }

    /// The normal id stored in the packed vertex.
    pub fn normal_id(self) -> u32 {
        self as u32
    }

    /// Offset from a block to the neighbour that can hide this face.
    pub fn neighbor_offset(self) -> Vector3<i32> {
        match self {
            BlockSide::Front => Vector3::new(0, 0, 1),
            BlockSide::Back => Vector3::new(0, 0, -1),
            BlockSide::Left => Vector3::new(1, 0, 0),
            BlockSide::Right => Vector3::new(-1, 0, 0),
            BlockSide::Top => Vector3::new(0, 1, 0),
            BlockSide::Bottom => Vector3::new(0, -1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_unit_and_pairwise_opposite() {
        let sides = BlockSide::all();
        for pair in sides.chunks(2) {
            assert_eq!(pair[0].neighbor_offset(), -pair[1].neighbor_offset());
        }
        for side in sides {
            let o = side.neighbor_offset();
            assert_eq!(o.x.abs() + o.y.abs() + o.z.abs(), 1);
        }
    }
}
