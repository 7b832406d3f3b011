//! # Streaming Configuration
//!
//! Runtime settings for chunk streaming, loadable from JSON. Every field has a
//! default, so a config file only needs to name what it changes.
//!
//! ```json
//! {
//!     "chunk_gen_distance": 6,
//!     "terrain": "plains",
//!     "quota_policy": "drop_excess"
//! }
//! ```

use std::{fs, num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::voxels::terrain::TerrainKind;

/// Smallest distance, in chunks, accepted for generation and rendering.
pub const MIN_CHUNK_DISTANCE: u32 = 1;
/// Largest distance, in chunks, accepted for generation and rendering.
pub const MAX_CHUNK_DISTANCE: u32 = 16;

/// What happens to load and rebuild entries beyond the per-frame quota.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaPolicy {
    /// Leftover entries stay queued for the next frame.
    #[default]
    Retain,
    /// The list is cleared every frame; leftovers are dropped.
    DropExcess,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid configuration JSON.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings read by the chunk manager every frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Radius, in chunks, of the box the chunker fills around the camera.
    pub chunk_gen_distance: u32,
    /// Radius, in chunks, of the box chunks are drawn in.
    pub chunk_render_distance: u32,
    /// Maximum loads and rebuilds performed per frame.
    pub chunks_per_frame: usize,
    /// Treatment of entries beyond `chunks_per_frame`.
    pub quota_policy: QuotaPolicy,
    /// Whether camera movement triggers chunk generation.
    pub generation_enabled: bool,
    /// Number of generation worker threads.
    pub worker_count: usize,
    /// Terrain strategy.
    pub terrain: TerrainKind,
    /// Seed handed to the terrain strategy.
    pub seed: u32,
    /// Chunks whose minimum corner lies above this world Y are never generated.
    pub vertical_ceiling: Option<i32>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        StreamingConfig {
            chunk_gen_distance: 4,
            chunk_render_distance: 3,
            chunks_per_frame: 12,
            quota_policy: QuotaPolicy::default(),
            generation_enabled: true,
            worker_count: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
            terrain: TerrainKind::default(),
            seed: 1337,
            vertical_ceiling: None,
        }
    }
}

impl StreamingConfig {
    /// Parses a JSON document, then clamps distances into range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: StreamingConfig = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Clamps distances to `MIN_CHUNK_DISTANCE..=MAX_CHUNK_DISTANCE` and the worker count to at least one.
    pub fn sanitize(&mut self) {
        self.chunk_gen_distance = num::clamp(self.chunk_gen_distance, MIN_CHUNK_DISTANCE, MAX_CHUNK_DISTANCE);
        self.chunk_render_distance =
            num::clamp(self.chunk_render_distance, MIN_CHUNK_DISTANCE, MAX_CHUNK_DISTANCE);
        self.worker_count = self.worker_count.max(1);
    }

    /// Whether a chunk at world Y `y` may be generated.
    pub fn allows_height(&self, y: i32) -> bool {
        self.vertical_ceiling.map_or(true, |ceiling| y <= ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = StreamingConfig::from_json_str("{}").unwrap();
        let defaults = StreamingConfig::default();
        assert_eq!(config, defaults);
        assert_eq!(config.chunk_gen_distance, 4);
        assert_eq!(config.chunk_render_distance, 3);
        assert_eq!(config.chunks_per_frame, 12);
        assert_eq!(config.quota_policy, QuotaPolicy::Retain);
        assert_eq!(config.terrain, TerrainKind::Hills);
    }

    #[test]
    fn named_fields_override_and_distances_clamp() {
        let config = StreamingConfig::from_json_str(
            r#"{
                "chunk_gen_distance": 40,
                "chunk_render_distance": 0,
                "quota_policy": "drop_excess",
                "terrain": "platform",
                "vertical_ceiling": -2,
                "worker_count": 0
            }"#,
        )
        .unwrap();

        assert_eq!(config.chunk_gen_distance, MAX_CHUNK_DISTANCE);
        assert_eq!(config.chunk_render_distance, MIN_CHUNK_DISTANCE);
        assert_eq!(config.quota_policy, QuotaPolicy::DropExcess);
        assert_eq!(config.terrain, TerrainKind::Platform);
        assert_eq!(config.worker_count, 1);
        assert!(config.allows_height(-32));
        assert!(!config.allows_height(0));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = StreamingConfig::from_json_str("{ \"seed\": \"abc\" }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = StreamingConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
