//! # Image Pipeline Bench
//!
//! Applies a fixed sequence of image filters to a batch of independent
//! files and measures how four execution strategies - sequential,
//! process-pool, process-pool-futures, thread-pool - scale with worker
//! count.
//!
//! ## Core Property
//! The filter pipeline is a pure function and every task writes to a
//! unique path, so the output file set and bytes are identical across
//! strategies and worker counts. Only wall time differs, which is what
//! makes the speedup/efficiency comparison meaningful.
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation
//! layers:
//! - `core` - Dataset, filters, executors, benchmark harness, report sinks
//! - `events` - Event-driven progress reporting
//! - `error` - Error types at the granularity failures propagate
//! - `cli` - Command-line interface (in the binary)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{BenchError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
