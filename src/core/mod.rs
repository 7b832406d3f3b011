//! # Core Module
//!
//! Shared-state primitives used by the chunk pipeline and its worker pool.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `lock_recovering`: Mutex locking that survives a poisoned lock
//!
//! ## Usage
//! ```rust
//! use voxel_chunk_engine::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

use std::sync::{Mutex, MutexGuard};

pub mod mt_resource;

pub use mt_resource::MtResource;

/// Locks `mutex`, taking the guard back out of a poisoned lock.
pub fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
