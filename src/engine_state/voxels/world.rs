//! # World Module
//!
//! This module provides the `WorldGrid`, a dense array of chunk slots covering
//! a fixed cube of world space centred on the origin.
//!
//! ## Addressing
//!
//! The grid spans `WORLD_DIMENSION` chunks per axis. A world position maps to a
//! slot through `(p + HALF_WORLD_EXTENT) / CHUNK_WORLD_SIZE` on each axis, and
//! the slot index is `x + y * W + z * W²`. Positions outside
//! `[-HALF_WORLD_EXTENT, HALF_WORLD_EXTENT)` are rejected with
//! `WorldError::OutOfBounds`.
//!
//! ## Thread Safety
//!
//! Every slot has its own mutex. Generation workers filling different slots
//! never contend; two workers racing for the same slot are serialized, so a
//! slot is filled at most once. Slots are never emptied again.

use std::sync::{Mutex, MutexGuard};

use cgmath::Point3;
use thiserror::Error;

use crate::core::{lock_recovering, MtResource};
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_WORLD_SIZE};

/// Number of chunk slots along each world axis.
pub const WORLD_DIMENSION: i32 = 16;
/// Total number of chunk slots in the grid.
pub const WORLD_SLOT_COUNT: usize = (WORLD_DIMENSION * WORLD_DIMENSION * WORLD_DIMENSION) as usize;
/// Half the edge length of the world cube in world units.
pub const HALF_WORLD_EXTENT: i32 = WORLD_DIMENSION * CHUNK_WORLD_SIZE / 2;

/// Shared handle to a chunk stored in the grid.
pub type ChunkHandle = MtResource<Chunk>;

/// Errors raised when addressing the world.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// A world position outside the grid.
    #[error("world position {position:?} lies outside the chunk grid")]
    OutOfBounds {
        /// The rejected world position
        position: Point3<i32>,
    },
    /// A block position outside its chunk.
    #[error("local block position {local:?} lies outside the chunk")]
    BlockOutOfBounds {
        /// The rejected local position
        local: Point3<i32>,
    },
    /// A valid slot that has not been generated yet.
    #[error("no chunk has been generated at {position:?}")]
    MissingChunk {
        /// World position of the empty slot
        position: Point3<i32>,
    },
}

/// Maps a world position to its slot index.
///
/// # Errors
/// `WorldError::OutOfBounds` if the position lies outside the world cube.
pub fn chunk_index_from_chunk_pos(position: Point3<i32>) -> Result<usize, WorldError> {
    let axis = |p: i32| {
        let slot = p.checked_add(HALF_WORLD_EXTENT)?.div_euclid(CHUNK_WORLD_SIZE);
        (0..WORLD_DIMENSION).contains(&slot).then_some(slot)
    };
    match (axis(position.x), axis(position.y), axis(position.z)) {
        (Some(x), Some(y), Some(z)) => {
            Ok((x + y * WORLD_DIMENSION + z * WORLD_DIMENSION * WORLD_DIMENSION) as usize)
        }
        _ => Err(WorldError::OutOfBounds { position }),
    }
}

/// World position (minimum corner) of the chunk stored at `index`.
///
/// # Returns
/// `None` if `index` is not a valid slot.
pub fn position_of(index: usize) -> Option<Point3<i32>> {
    if index >= WORLD_SLOT_COUNT {
        return None;
    }
    let index = index as i32;
    let to_world = |slot: i32| slot * CHUNK_WORLD_SIZE - HALF_WORLD_EXTENT;
    Some(Point3::new(
        to_world(index % WORLD_DIMENSION),
        to_world((index / WORLD_DIMENSION) % WORLD_DIMENSION),
        to_world(index / (WORLD_DIMENSION * WORLD_DIMENSION)),
    ))
}

/// A dense, fixed-size grid of lazily filled chunk slots.
pub struct WorldGrid {
    slots: Vec<Mutex<Option<ChunkHandle>>>,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldGrid {
    /// Creates a grid with every slot empty.
    pub fn new() -> Self {
        WorldGrid {
            slots: (0..WORLD_SLOT_COUNT).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Locks a single slot.
    ///
    /// # Returns
    /// `None` if `index` is not a valid slot.
    pub fn lock_slot(&self, index: usize) -> Option<MutexGuard<'_, Option<ChunkHandle>>> {
        self.slots.get(index).map(lock_recovering)
    }

    /// The chunk stored at `index`, if the slot has been filled.
    pub fn chunk(&self, index: usize) -> Option<ChunkHandle> {
        self.lock_slot(index).and_then(|slot| slot.clone())
    }

    /// The chunk whose slot contains the world position.
    ///
    /// # Errors
    /// `WorldError::OutOfBounds` for positions outside the grid.
    pub fn chunk_at(&self, position: Point3<i32>) -> Result<Option<ChunkHandle>, WorldError> {
        Ok(self.chunk(chunk_index_from_chunk_pos(position)?))
    }

    /// Number of filled slots.
    pub fn populated_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| lock_recovering(slot).is_some())
            .count()
    }

    /// Total number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_slot_round_trips_through_its_position() {
        for index in 0..WORLD_SLOT_COUNT {
            let position = position_of(index).unwrap();
            assert_eq!(chunk_index_from_chunk_pos(position), Ok(index));
        }
        assert_eq!(position_of(WORLD_SLOT_COUNT), None);
    }

    #[test]
    fn grid_corners_map_to_extreme_slots() {
        assert_eq!(chunk_index_from_chunk_pos(Point3::new(-256, -256, -256)), Ok(0));
        assert_eq!(
            chunk_index_from_chunk_pos(Point3::new(224, 224, 224)),
            Ok(WORLD_SLOT_COUNT - 1)
        );
        assert_eq!(chunk_index_from_chunk_pos(Point3::new(0, 0, 0)), Ok(8 + 8 * 16 + 8 * 256));
    }

    #[test]
    fn positions_outside_the_world_are_rejected() {
        for position in [
            Point3::new(256, 0, 0),
            Point3::new(0, -257, 0),
            Point3::new(0, 0, 10_000),
            Point3::new(i32::MAX, 0, 0),
            Point3::new(0, i32::MAX - 100, 0),
            Point3::new(0, 0, i32::MIN),
            Point3::new(i32::MIN, i32::MIN, i32::MIN),
        ] {
            assert_eq!(
                chunk_index_from_chunk_pos(position),
                Err(WorldError::OutOfBounds { position })
            );
        }
    }

    #[test]
    fn slots_fill_independently() {
        let grid = WorldGrid::new();
        assert_eq!(grid.slot_count(), WORLD_SLOT_COUNT);
        assert_eq!(grid.populated_count(), 0);

        let position = Point3::new(32, -64, 96);
        let index = chunk_index_from_chunk_pos(position).unwrap();
        *grid.lock_slot(index).unwrap() = Some(MtResource::new(Chunk::new(position)));

        assert_eq!(grid.populated_count(), 1);
        let chunk = grid.chunk_at(position).unwrap().unwrap();
        assert_eq!(chunk.get().position(), position);
        assert!(grid.chunk_at(Point3::new(0, 0, 0)).unwrap().is_none());
        assert!(grid.lock_slot(WORLD_SLOT_COUNT).is_none());
    }
}
