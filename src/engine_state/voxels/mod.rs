//! # Voxel World
//!
//! Block data, chunk storage and the streaming machinery that keeps the
//! neighbourhood of the camera generated, meshed and ready to draw.
//!
//! ## Architecture
//!
//! * **Block**: Block types, faces and the texture atlas table
//! * **Chunk**: Fixed 16x16x16 block grids with their CPU mesh
//! * **World**: The fixed 16x16x16 grid of chunk slots around the origin
//! * **Terrain**: Strategies that fill a chunk's blocks
//! * **Tasks**: Chunk generation work run on the worker pool
//! * **Chunk Manager**: Per-frame load, setup, rebuild and render list upkeep
//!
//! ## Thread Safety
//!
//! Each world slot has its own lock and each chunk sits behind an `MtResource`.
//! Generation tasks touch only the slot they were given.

pub mod block;
pub mod chunk;
pub mod chunk_manager;
pub mod tasks;
pub mod terrain;
pub mod world;
