//! # Voxel Chunk Engine Demo
//!
//! Runs the headless streaming demo from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    if let Err(err) = voxel_chunk_engine::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
