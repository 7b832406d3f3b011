//! # Chunk Manager
//!
//! Turns a moving camera into bounded, per-frame chunk work.
//!
//! ## Frame Pipeline
//!
//! `update` runs these steps in order, on the calling thread:
//!
//! 1. **Load**: up to `chunks_per_frame` chunks from the load list are loaded.
//!    Only chunks that actually change state count towards the quota.
//! 2. **Setup**: every loaded chunk on the setup list that is not set up yet
//!    gets terrain (if needed) and a mesh. No quota.
//! 3. **Rebuild**: up to `chunks_per_frame` set-up chunks are meshed again.
//! 4. **Visibility**: every chunk on the visibility list is queued for load
//!    and setup.
//! 5. **Render list**: rebuilt from the visibility list, keeping chunks that
//!    are set up, inside the render range and inside the frustum.
//!
//! What happens to load and rebuild entries past the quota depends on the
//! `QuotaPolicy`. The setup list is always emptied, even when a setup fails.
//! A failed setup ends the frame: rebuild, visibility and render list are
//! skipped and the render list from the previous frame stays in place.
//!
//! ## Generation
//!
//! `pregenerate_chunks` and `update_async_chunker` publish one
//! `ChunkGenerationTask` per slot to the worker pool and block until every
//! task has reported back.
//!
//! ## Locking
//!
//! Generation tasks take a slot lock, then the visibility lock. Code here never
//! holds the visibility lock while locking a slot or a chunk.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{debug, info, warn};
use thiserror::Error;
use web_time::Instant;

use crate::core::lock_recovering;
use crate::engine_state::{
    camera_state::frustum::FrustumPredicate,
    config::{QuotaPolicy, StreamingConfig},
    rendering::{meshing::MeshError, RenderBackend},
    task_management::{task::Task, TaskError, TaskManager},
    voxels::{
        block::Block,
        chunk::CHUNK_WORLD_SIZE,
        tasks::chunk_generation_task::{ChunkGenerationTask, GenerationReport},
        terrain::TerrainGenerator,
        world::{
            chunk_index_from_chunk_pos, position_of, ChunkHandle, WorldError,
            WorldGrid, HALF_WORLD_EXTENT, WORLD_SLOT_COUNT,
        },
    },
};

pub mod chunk_queue;

use chunk_queue::ChunkQueue;

/// Errors that stop the streaming pipeline.
#[derive(Debug, Error)]
pub enum StreamingError {
    /// A chunk could not be meshed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// A world or block position was out of range.
    #[error(transparent)]
    World(#[from] WorldError),
    /// The worker pool failed.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// An axis-aligned box of chunk positions, snapped to chunk boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Minimum corner
    pub start: Point3<i32>,
    /// Maximum corner
    pub end: Point3<i32>,
}

impl ChunkRange {
    /// Whether `position` lies inside the range, bounds included.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        (self.start.x..=self.end.x).contains(&position.x)
            && (self.start.y..=self.end.y).contains(&position.y)
            && (self.start.z..=self.end.z).contains(&position.z)
    }
}

/// What one `update` call did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Chunks that became loaded
    pub loaded: usize,
    /// Chunks that became set up
    pub set_up: usize,
    /// Chunks re-meshed
    pub rebuilt: usize,
    /// Chunks on the render list
    pub rendered: usize,
    /// Load entries left for later frames
    pub pending_load: usize,
    /// Rebuild entries left for later frames
    pub pending_rebuild: usize,
    /// Chunks on the visibility list
    pub visible: usize,
}

/// Rounds `number` up to the next multiple of `fixed_base`.
///
/// Zero in either argument leaves `number` unchanged.
pub fn round_up(number: f32, fixed_base: f32) -> f32 {
    if fixed_base != 0.0 && number != 0.0 {
        (number / fixed_base).ceil() * fixed_base
    } else {
        number
    }
}

/// Owns the world grid and drives chunk streaming.
pub struct ChunkManager {
    config: StreamingConfig,
    grid: Arc<WorldGrid>,
    visibility: Arc<Mutex<ChunkQueue>>,
    terrain: Arc<dyn TerrainGenerator>,
    task_manager: TaskManager<GenerationReport>,
    load_list: ChunkQueue,
    setup_list: ChunkQueue,
    rebuild_list: ChunkQueue,
    render_list: Vec<usize>,
    last_chunker_position: Option<Point3<f32>>,
}

impl ChunkManager {
    /// Creates a manager using the terrain strategy named in `config`.
    ///
    /// # Errors
    /// `StreamingError::Task` if the worker pool cannot be started.
    pub fn new(config: StreamingConfig) -> Result<Self, StreamingError> {
        let terrain = config.terrain.build(config.seed);
        Self::with_terrain(config, terrain)
    }

    /// Creates a manager with an explicit terrain strategy.
    pub fn with_terrain(
        mut config: StreamingConfig,
        terrain: Arc<dyn TerrainGenerator>,
    ) -> Result<Self, StreamingError> {
        config.sanitize();
        let task_manager = TaskManager::new(config.worker_count)?;
        Ok(ChunkManager {
            config,
            grid: Arc::new(WorldGrid::new()),
            visibility: Arc::new(Mutex::new(ChunkQueue::new())),
            terrain,
            task_manager,
            load_list: ChunkQueue::new(),
            setup_list: ChunkQueue::new(),
            rebuild_list: ChunkQueue::new(),
            render_list: Vec::new(),
            last_chunker_position: None,
        })
    }

    /// Current settings.
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Mutable settings, read again on every frame.
    pub fn config_mut(&mut self) -> &mut StreamingConfig {
        &mut self.config
    }

    /// The shared world grid.
    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    /// The chunk at a world position, if generated.
    pub fn chunk_at(&self, position: Point3<i32>) -> Result<Option<ChunkHandle>, WorldError> {
        self.grid.chunk_at(position)
    }

    /// Number of chunks on the visibility list.
    pub fn visible_count(&self) -> usize {
        lock_recovering(&self.visibility).len()
    }

    /// Slot indices drawn by the last `render`.
    pub fn render_list(&self) -> &[usize] {
        &self.render_list
    }

    /// Generates a chunk for every slot of the world the config allows.
    ///
    /// Blocks until the whole batch has finished.
    pub fn pregenerate_chunks(&mut self) -> Result<GenerationReport, StreamingError> {
        let positions: Vec<_> = (0..WORLD_SLOT_COUNT)
            .filter_map(|index| position_of(index).map(|position| (index, position)))
            .filter(|(_, position)| self.config.allows_height(position.y))
            .collect();

        self.run_generation("Pregeneration", positions, false)
    }

    /// Fills the generation range around `camera_position`.
    ///
    /// Only the part of the range inside the world is generated, so a camera
    /// outside the world creates nothing. Does nothing when generation is disabled or the camera has not moved
    /// since the previous call. Existing chunks that are not loaded yet are put
    /// back on the visibility list.
    ///
    /// # Returns
    /// The batch report, or `None` if no batch ran.
    pub fn update_async_chunker(
        &mut self,
        camera_position: Point3<f32>,
    ) -> Result<Option<GenerationReport>, StreamingError> {
        if !self.config.generation_enabled {
            return Ok(None);
        }
        if self.last_chunker_position == Some(camera_position) {
            return Ok(None);
        }
        self.last_chunker_position = Some(camera_position);

        let range = self.get_chunk_gen_range(camera_position);
        let start = range.start.map(|p| p.max(-HALF_WORLD_EXTENT));
        let end = range.end.map(|p| p.min(HALF_WORLD_EXTENT));
        if start != range.start || end != range.end {
            debug!("Generation range {:?} cut to the world", range);
        }

        let mut positions = Vec::new();
        for z in (start.z..end.z).step_by(CHUNK_WORLD_SIZE as usize) {
            for y in (start.y..end.y).step_by(CHUNK_WORLD_SIZE as usize) {
                if !self.config.allows_height(y) {
                    continue;
                }
                for x in (start.x..end.x).step_by(CHUNK_WORLD_SIZE as usize) {
                    let position = Point3::new(x, y, z);
                    match chunk_index_from_chunk_pos(position) {
                        Ok(index) => positions.push((index, position)),
                        Err(err) => debug!("Skipping generation: {err}"),
                    }
                }
            }
        }

        self.run_generation("Chunker", positions, true).map(Some)
    }

    fn run_generation(
        &mut self,
        label: &str,
        positions: Vec<(usize, Point3<i32>)>,
        requeue_unloaded: bool,
    ) -> Result<GenerationReport, StreamingError> {
        let start = Instant::now();
        let tasks: Vec<_> = positions
            .into_iter()
            .map(|(index, position)| {
                Box::new(ChunkGenerationTask::new(
                    self.grid.clone(),
                    self.visibility.clone(),
                    self.terrain.clone(),
                    index,
                    position,
                    requeue_unloaded,
                )) as Box<dyn Task<GenerationReport> + Send>
            })
            .collect();
        let count = tasks.len();

        let mut report = GenerationReport::default();
        let batch = self.task_manager.run_batch(tasks, &mut report)?;
        report.failed = batch.failures.len();
        if report.failed > 0 {
            warn!(
                "{} of {} generation task(s) failed; their slots stay empty",
                report.failed, count
            );
        }

        info!(
            "{label}: {} created, {} requeued, {} skipped, {} failed in {:?}",
            report.created,
            report.requeued,
            report.skipped,
            report.failed,
            start.elapsed()
        );
        Ok(report)
    }

    /// Advances the streaming pipeline by one frame.
    ///
    /// # Arguments
    /// * `dt` - Time since the previous frame
    /// * `camera_position` - World-space camera position for this frame
    /// * `frustum` - View volume for the render list
    ///
    /// # Errors
    /// `StreamingError::Mesh` if a chunk cannot be meshed.
    pub fn update(
        &mut self,
        dt: Duration,
        camera_position: Point3<f32>,
        frustum: &dyn FrustumPredicate,
    ) -> Result<FrameStats, StreamingError> {
        let loaded = self.update_load_list();
        let set_up = self.update_setup_list()?;
        let rebuilt = self.update_rebuild_list()?;
        let visible = self.update_visibility_list();
        self.update_render_list(camera_position, frustum);

        let stats = FrameStats {
            loaded,
            set_up,
            rebuilt,
            rendered: self.render_list.len(),
            pending_load: self.load_list.len(),
            pending_rebuild: self.rebuild_list.len(),
            visible,
        };
        debug!("Frame ({:?}): {:?}", dt, stats);
        Ok(stats)
    }

    fn update_load_list(&mut self) -> usize {
        let mut loaded = 0;
        while loaded < self.config.chunks_per_frame {
            let Some(index) = self.load_list.pop_front() else {
                break;
            };
            if let Some(chunk) = self.grid.chunk(index) {
                let mut chunk = chunk.get_mut();
                if !chunk.is_loaded() {
                    chunk.load();
                    loaded += 1;
                }
            }
        }
        if self.config.quota_policy == QuotaPolicy::DropExcess {
            self.load_list.clear();
        }
        loaded
    }

    fn update_setup_list(&mut self) -> Result<usize, StreamingError> {
        let mut set_up = 0;
        while let Some(index) = self.setup_list.pop_front() {
            let Some(chunk) = self.grid.chunk(index) else {
                continue;
            };
            let mut chunk = chunk.get_mut();
            if chunk.is_loaded() && !chunk.is_setup() {
                if let Err(err) = chunk.setup(self.terrain.as_ref()) {
                    self.setup_list.clear();
                    return Err(err.into());
                }
                set_up += 1;
            }
        }
        Ok(set_up)
    }

    fn update_rebuild_list(&mut self) -> Result<usize, StreamingError> {
        let mut rebuilt = 0;
        while rebuilt < self.config.chunks_per_frame {
            let Some(index) = self.rebuild_list.pop_front() else {
                break;
            };
            let Some(chunk) = self.grid.chunk(index) else {
                continue;
            };
            let mut chunk = chunk.get_mut();
            if chunk.is_loaded() && chunk.is_setup() {
                chunk.rebuild_mesh()?;
                rebuilt += 1;
            }
        }
        if self.config.quota_policy == QuotaPolicy::DropExcess {
            self.rebuild_list.clear();
        }
        Ok(rebuilt)
    }

    fn update_visibility_list(&mut self) -> usize {
        let visible = self.visible_indices();
        for &index in &visible {
            self.load_list.push(index);
            self.setup_list.push(index);
        }
        visible.len()
    }

    fn update_render_list(&mut self, camera_position: Point3<f32>, frustum: &dyn FrustumPredicate) {
        self.render_list.clear();
        let range = self.get_chunk_render_range(camera_position);
        let half_extent = (CHUNK_WORLD_SIZE / 2) as f32;

        for index in self.visible_indices() {
            let Some(chunk) = self.grid.chunk(index) else {
                continue;
            };
            let chunk = chunk.get();
            if !(chunk.is_loaded() && chunk.is_setup()) {
                continue;
            }
            if !range.contains(chunk.position()) {
                continue;
            }
            if !frustum.cube_in_frustum(chunk.center(), half_extent) {
                continue;
            }
            self.render_list.push(index);
        }
    }

    /// Snapshot of the visibility list, taken so no slot is locked while it is held.
    fn visible_indices(&self) -> Vec<usize> {
        lock_recovering(&self.visibility).iter().collect()
    }

    /// Draws every chunk on the render list.
    ///
    /// # Returns
    /// Number of draw calls issued.
    pub fn render(&self, backend: &mut dyn RenderBackend) -> usize {
        let mut drawn = 0;
        for &index in &self.render_list {
            if let Some(chunk) = self.grid.chunk(index) {
                let chunk = chunk.get();
                backend.draw_chunk(chunk.mesh(), chunk.transform());
                drawn += 1;
            }
        }
        drawn
    }

    /// Box around `camera_position` that the chunker fills.
    pub fn get_chunk_gen_range(&self, camera_position: Point3<f32>) -> ChunkRange {
        Self::range_around(camera_position, self.config.chunk_gen_distance)
    }

    /// Box around `camera_position` that chunks are drawn in.
    pub fn get_chunk_render_range(&self, camera_position: Point3<f32>) -> ChunkRange {
        Self::range_around(camera_position, self.config.chunk_render_distance)
    }

    fn range_around(camera_position: Point3<f32>, distance: u32) -> ChunkRange {
        let chunk_size = CHUNK_WORLD_SIZE as f32;
        let reach = Vector3::new(1.0, 1.0, 1.0) * (distance as f32 * chunk_size);
        let snap = |p: Point3<f32>| p.map(|c| round_up(c, chunk_size) as i32);
        ChunkRange {
            start: snap(camera_position - reach),
            end: snap(camera_position + reach),
        }
    }

    /// Queues the chunk containing `chunk_position` for a mesh rebuild.
    ///
    /// # Errors
    /// `WorldError::OutOfBounds` for positions outside the world.
    pub fn queue_chunk_to_rebuild(&mut self, chunk_position: Point3<i32>) -> Result<(), WorldError> {
        let index = chunk_index_from_chunk_pos(chunk_position)?;
        self.rebuild_list.push(index);
        Ok(())
    }

    /// Replaces one block and queues its chunk for rebuild.
    ///
    /// # Arguments
    /// * `chunk_position` - World-space minimum corner of the chunk
    /// * `local` - Block position inside the chunk
    /// * `block` - The new block
    ///
    /// # Errors
    /// `WorldError` if the chunk is outside the world or not generated, or
    /// `local` lies outside the chunk.
    pub fn set_block(
        &mut self,
        chunk_position: Point3<i32>,
        local: Point3<i32>,
        block: Block,
    ) -> Result<(), WorldError> {
        let index = chunk_index_from_chunk_pos(chunk_position)?;
        let chunk = self.grid.chunk(index).ok_or(WorldError::MissingChunk {
            position: chunk_position,
        })?;
        chunk.get_mut().set_block(local, block)?;
        self.rebuild_list.push(index);
        Ok(())
    }
}
