//! # Error Module
//!
//! Error types for the pipeline benchmark.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, stage names, what went wrong
//! - **Fail at the right granularity** - dataset errors abort the whole run,
//!   task errors abort only the configuration that owns them
//! - **No retries** - a benchmark must never silently re-run work it is timing

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Executor error: {0}")]
    Executor(#[from] ExecutorError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while enumerating the input dataset.
///
/// All of these are fatal: they abort the benchmark before any executor
/// is invoked.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset directory not found: {path}")]
    NotFound { path: PathBuf },

    #[error("No images with a recognized extension in {path}")]
    Empty { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while processing a single image task.
///
/// These escalate to a fail-fast abort of the configuration that owns the
/// task, never of the whole benchmark matrix.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Stage '{stage}' was given an invalid {width}x{height} buffer")]
    InvalidShape {
        stage: String,
        width: u32,
        height: u32,
    },

    #[error("Failed to encode image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

/// Errors raised by an execution strategy.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// A task failed inside a worker. Carries the first failure observed
    /// after all in-flight work has drained.
    #[error("Task {task} failed in worker: {message}")]
    TaskFailure { task: PathBuf, message: String },

    #[error("Failed to spawn worker process: {source}")]
    WorkerSpawn {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build thread pool: {message}")]
    PoolBuild { message: String },

    #[error("Worker protocol violation: {message}")]
    WorkerProtocol { message: String },
}

/// Errors raised while persisting benchmark results
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write results to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, BenchError>;

impl ExecutorError {
    /// Wrap a per-task error as it crosses the execution-strategy boundary.
    pub fn from_task(task: PathBuf, error: &TaskError) -> Self {
        ExecutorError::TaskFailure {
            task,
            message: error.to_string(),
        }
    }
}
