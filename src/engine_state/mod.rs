//! # Engine State Module
//!
//! Ties the camera to the chunk pipeline and drives one frame at a time.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - Camera, projection and view frustum
//! * `config` - Streaming settings
//! * `rendering` - Chunk meshing and the render backend seam
//! * `task_management` - Worker pool for chunk generation
//! * `voxels` - Voxel data, chunks, terrain and streaming
//!
//! ## Frame Order
//!
//! `process_frame` runs the chunker at the camera's new position, refreshes the
//! frustum, advances the chunk manager and finally draws the render list.

use std::time::Duration;

use log::info;

use camera_state::CameraState;
use config::StreamingConfig;
use rendering::RenderBackend;
use voxels::{
    chunk_manager::{ChunkManager, FrameStats, StreamingError},
    tasks::chunk_generation_task::GenerationReport,
};

pub mod camera_state;
pub mod config;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```no_run
/// use voxel_chunk_engine::engine_state::{
///     camera_state::{camera::{Camera, Projection}, CameraState},
///     config::StreamingConfig,
///     rendering::RenderStats,
///     EngineState,
/// };
/// use std::time::Duration;
///
/// let camera = Camera::new((0.0, 16.0, 0.0), cgmath::Deg(0.0), cgmath::Deg(-20.0));
/// let projection = Projection::new(1280, 720, cgmath::Deg(45.0), 0.1, 1000.0);
/// let mut engine = EngineState::new(StreamingConfig::default(), CameraState::new(camera, projection))?;
///
/// let mut backend = RenderStats::default();
/// loop {
///     engine.process_frame(Duration::from_millis(16), &mut backend)?;
/// }
/// # Ok::<(), voxel_chunk_engine::engine_state::voxels::chunk_manager::StreamingError>(())
/// ```
pub struct EngineState {
    /// Camera state driving streaming and culling
    pub camera_state: CameraState,
    /// The chunk pipeline
    pub chunk_manager: ChunkManager,
    frame: u64,
}

impl EngineState {
    /// Creates a new engine state.
    ///
    /// # Errors
    /// `StreamingError::Task` if the worker pool cannot be started.
    pub fn new(config: StreamingConfig, camera_state: CameraState) -> Result<Self, StreamingError> {
        let chunk_manager = ChunkManager::new(config)?;
        info!(
            "Engine state created with {} worker(s), terrain {:?}",
            chunk_manager.config().worker_count,
            chunk_manager.config().terrain
        );
        Ok(Self {
            camera_state,
            chunk_manager,
            frame: 0,
        })
    }

    /// Generates every chunk of the world up front.
    pub fn pregenerate(&mut self) -> Result<GenerationReport, StreamingError> {
        self.chunk_manager.pregenerate_chunks()
    }

    /// Runs one frame and draws it through `backend`.
    ///
    /// # Arguments
    /// * `dt` - The time elapsed since the last frame
    /// * `backend` - Receives one draw per chunk on the render list
    pub fn process_frame(
        &mut self,
        dt: Duration,
        backend: &mut dyn RenderBackend,
    ) -> Result<FrameStats, StreamingError> {
        let position = self.camera_state.position();

        if self.chunk_manager.config().generation_enabled {
            self.chunk_manager.update_async_chunker(position)?;
        }

        self.camera_state.update_frustum();
        let stats = self
            .chunk_manager
            .update(dt, position, self.camera_state.frustum())?;
        self.chunk_manager.render(backend);

        self.frame += 1;
        Ok(stats)
    }

    /// Number of frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}
