//! # Voxel Task System
//!
//! Tasks run on the worker pool on behalf of the chunk manager.

pub mod chunk_generation_task;
