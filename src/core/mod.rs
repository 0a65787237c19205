//! # Core Module
//!
//! The UI-agnostic benchmark engine.
//!
//! ## Modules
//! - `dataset` - Enumerates the input image files
//! - `codec` - Decodes and encodes images
//! - `filters` - The fixed filter pipeline every strategy runs
//! - `executor` - The four interchangeable execution strategies
//! - `benchmark` - Drives the (strategy x worker-count) matrix
//! - `report` - Persists benchmark records as CSV/JSON

pub mod benchmark;
pub mod codec;
pub mod dataset;
pub mod executor;
pub mod filters;
pub mod report;

// Re-export commonly used types
pub use benchmark::{BenchmarkHarness, BenchmarkRecord, BenchmarkReport};
pub use executor::{ImageTask, StrategyKind, TaskExecutor, WorkerCommand};
pub use filters::FilterPipeline;
