//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, one of which is published per
//! world slot by pregeneration and by the camera-driven chunker.
//!
//! A task locks only its own slot. If the slot is empty it builds the chunk,
//! runs terrain generation on it, stores it and appends the slot to the
//! visibility list. The visibility list has its own mutex and is always taken
//! after the slot lock.

use std::sync::{Arc, Mutex};

use cgmath::Point3;
use log::trace;

use crate::{
    core::{lock_recovering, MtResource},
    engine_state::{
        task_management::task::{Task, TaskResult},
        voxels::{
            chunk::Chunk, chunk_manager::chunk_queue::ChunkQueue, terrain::TerrainGenerator,
            world::WorldGrid,
        },
    },
};

/// Tally of what a generation batch did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    /// Slots that received a new chunk
    pub created: usize,
    /// Existing, unloaded chunks put back on the visibility list
    pub requeued: usize,
    /// Slots left as they were
    pub skipped: usize,
    /// Tasks that panicked; their slots stay empty
    pub failed: usize,
}

/// What a single task did to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenerationOutcome {
    /// A new chunk was stored.
    Created,
    /// The chunk already existed and was queued for visibility again.
    Requeued,
    /// Nothing changed.
    Skipped,
}

/// Fills one world slot.
pub struct ChunkGenerationTask {
    grid: Arc<WorldGrid>,
    visibility: Arc<Mutex<ChunkQueue>>,
    terrain: Arc<dyn TerrainGenerator>,
    index: usize,
    position: Point3<i32>,
    requeue_unloaded: bool,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `grid` - The shared world grid
    /// * `visibility` - The shared visibility list
    /// * `terrain` - Strategy used to populate the new chunk
    /// * `index` - Slot index of `position`
    /// * `position` - World-space minimum corner of the chunk
    /// * `requeue_unloaded` - Put an existing chunk that is not loaded back on the visibility list
    pub fn new(
        grid: Arc<WorldGrid>,
        visibility: Arc<Mutex<ChunkQueue>>,
        terrain: Arc<dyn TerrainGenerator>,
        index: usize,
        position: Point3<i32>,
        requeue_unloaded: bool,
    ) -> Self {
        ChunkGenerationTask {
            grid,
            visibility,
            terrain,
            index,
            position,
            requeue_unloaded,
        }
    }

    fn fill_slot(&self) -> GenerationOutcome {
        let Some(mut slot) = self.grid.lock_slot(self.index) else {
            return GenerationOutcome::Skipped;
        };

        if let Some(existing) = slot.as_ref() {
            if self.requeue_unloaded && !existing.get().is_loaded() {
                lock_recovering(&self.visibility).push(self.index);
                return GenerationOutcome::Requeued;
            }
            return GenerationOutcome::Skipped;
        }

        let mut chunk = Chunk::new(self.position);
        chunk.populate(self.terrain.as_ref());
        *slot = Some(MtResource::new(chunk));

        lock_recovering(&self.visibility).push(self.index);
        GenerationOutcome::Created
    }
}

impl Task<GenerationReport> for ChunkGenerationTask {
    fn describe(&self) -> String {
        format!("generate chunk at {:?}", self.position)
    }

    fn process(&self) -> Box<dyn TaskResult<GenerationReport> + Send> {
        let outcome = self.fill_slot();
        trace!("Slot {} at {:?}: {:?}", self.index, self.position, outcome);
        Box::new(outcome)
    }
}

impl TaskResult<GenerationReport> for GenerationOutcome {
    fn handle_result(self: Box<Self>, report: &mut GenerationReport) {
        match *self {
            GenerationOutcome::Created => report.created += 1,
            GenerationOutcome::Requeued => report.requeued += 1,
            GenerationOutcome::Skipped => report.skipped += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{terrain::PlainsTerrain, world::chunk_index_from_chunk_pos};

    fn task(
        grid: &Arc<WorldGrid>,
        visibility: &Arc<Mutex<ChunkQueue>>,
        position: Point3<i32>,
        requeue_unloaded: bool,
    ) -> ChunkGenerationTask {
        ChunkGenerationTask::new(
            grid.clone(),
            visibility.clone(),
            Arc::new(PlainsTerrain),
            chunk_index_from_chunk_pos(position).unwrap(),
            position,
            requeue_unloaded,
        )
    }

    #[test]
    fn empty_slot_is_filled_once() {
        let grid = Arc::new(WorldGrid::new());
        let visibility = Arc::new(Mutex::new(ChunkQueue::new()));
        let position = Point3::new(0, -32, 64);

        assert_eq!(task(&grid, &visibility, position, false).fill_slot(), GenerationOutcome::Created);
        assert_eq!(task(&grid, &visibility, position, false).fill_slot(), GenerationOutcome::Skipped);

        let chunk = grid.chunk_at(position).unwrap().unwrap();
        assert!(chunk.get().is_populated());
        assert_eq!(visibility.lock().unwrap().len(), 1);
    }

    #[test]
    fn unloaded_chunk_is_requeued_only_when_asked() {
        let grid = Arc::new(WorldGrid::new());
        let visibility = Arc::new(Mutex::new(ChunkQueue::new()));
        let position = Point3::new(32, 0, 0);
        task(&grid, &visibility, position, false).fill_slot();
        visibility.lock().unwrap().clear();

        assert_eq!(task(&grid, &visibility, position, true).fill_slot(), GenerationOutcome::Requeued);
        assert_eq!(visibility.lock().unwrap().len(), 1);

        grid.chunk_at(position).unwrap().unwrap().get_mut().load();
        assert_eq!(task(&grid, &visibility, position, true).fill_slot(), GenerationOutcome::Skipped);
    }
}
