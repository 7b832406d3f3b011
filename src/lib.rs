#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Chunk Engine
//!
//! Chunk streaming and meshing for a block world: a fixed grid of 16³-block
//! chunks around the origin is generated on a worker pool, loaded and meshed
//! under a per-frame budget, and culled against the camera before drawing.
//!
//! ## Key Modules
//!
//! * `core` - Shared-state primitives
//! * `engine_state` - Camera, configuration, meshing, worker pool and the voxel world
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(err) = voxel_chunk_engine::run() {
//!         eprintln!("{err}");
//!     }
//! }
//! ```
//!
//! Set `RUST_LOG` to control log output and `VOXEL_ENGINE_CONFIG` to point at a
//! JSON streaming config.

use std::time::Duration;

use cgmath::{Deg, Vector3};
use log::info;
use thiserror::Error;
use web_time::Instant;

use engine_state::{
    camera_state::{
        camera::{Camera, Projection},
        CameraState,
    },
    config::{ConfigError, StreamingConfig},
    rendering::RenderStats,
    voxels::chunk_manager::StreamingError,
    EngineState,
};

pub mod core;
pub mod engine_state;

/// Environment variable holding the path of a JSON streaming config.
pub const CONFIG_ENV_VAR: &str = "VOXEL_ENGINE_CONFIG";

/// Frames flown by the demo.
pub const DEMO_FRAMES: u32 = 120;

const DEMO_FRAME_TIME: Duration = Duration::from_millis(16);
const DEMO_SPEED: f32 = 4.0;

/// Errors that end `run`.
#[derive(Debug, Error)]
pub enum RunError {
    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The streaming pipeline failed.
    #[error(transparent)]
    Streaming(#[from] StreamingError),
}

/// Reads the config named by `VOXEL_ENGINE_CONFIG`, or the defaults.
pub fn load_config() -> Result<StreamingConfig, ConfigError> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => {
            info!("Loading config from {path}");
            StreamingConfig::load(path)
        }
        Err(_) => Ok(StreamingConfig::default()),
    }
}

/// Runs the headless demo: pregenerates the world, then flies the camera along
/// +X for `DEMO_FRAMES` frames against a statistics-only backend.
pub fn run() -> Result<(), RunError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = load_config()?;
    let camera = Camera::new((0.0, 8.0, 0.0), Deg(0.0), Deg(-15.0));
    let projection = Projection::new(1280, 720, Deg(45.0), 0.1, 1000.0);
    let mut engine = EngineState::new(config, CameraState::new(camera, projection))?;

    let start = Instant::now();
    let report = engine.pregenerate()?;
    info!(
        "Pregeneration: {} chunk(s) in {:?}",
        report.created,
        start.elapsed()
    );

    let mut backend = RenderStats::default();
    let mut totals = (0, 0, 0);
    let start = Instant::now();
    for _ in 0..DEMO_FRAMES {
        let stats = engine.process_frame(DEMO_FRAME_TIME, &mut backend)?;
        totals.0 += stats.loaded;
        totals.1 += stats.set_up;
        totals.2 += stats.rendered;

        let forward = engine.camera_state.camera.forward();
        engine
            .camera_state
            .camera
            .translate(Vector3::new(forward.x, 0.0, forward.z) * DEMO_SPEED);
    }

    info!(
        "{} frame(s) in {:?}: {} loaded, {} set up, {} chunk draws, {} draw call(s), {} triangle(s), {} byte(s) uploaded",
        engine.frame_count(),
        start.elapsed(),
        totals.0,
        totals.1,
        totals.2,
        backend.draw_calls,
        backend.triangles,
        backend.bytes
    );
    Ok(())
}
