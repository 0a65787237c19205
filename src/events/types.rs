//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::benchmark::BenchmarkRecord;

/// All events emitted by the benchmark pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Dataset loading events
    Dataset(DatasetEvent),
    /// Per-configuration execution events
    Exec(ExecEvent),
    /// Benchmark-level events
    Benchmark(BenchmarkEvent),
}

/// Events while enumerating the input dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatasetEvent {
    /// Listing has started
    Started { path: PathBuf },
    /// Listing completed
    Loaded { total_images: usize },
}

/// Events while an executor runs one configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecEvent {
    /// The executor started over the full task list
    Started {
        method: String,
        workers: usize,
        total_tasks: usize,
    },
    /// Progress update after a task finished
    Progress(ExecProgress),
    /// A task failed; the configuration is being aborted
    TaskFailed { path: PathBuf, message: String },
    /// The executor finished and all outstanding work has drained
    Completed { elapsed_ms: u64 },
}

/// Progress information during execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecProgress {
    /// Number of tasks completed so far
    pub completed: usize,
    /// Total number of tasks submitted
    pub total: usize,
    /// Source path of the task that just finished
    pub current_path: PathBuf,
}

/// Benchmark-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BenchmarkEvent {
    /// The benchmark run has started
    Started { total_configurations: usize },
    /// The sequential baseline finished; its time anchors all speedups
    BaselineCompleted { time_secs: f64 },
    /// A (strategy, worker-count) configuration is starting
    ConfigStarted { method: String, workers: usize },
    /// A configuration finished and produced a record
    ConfigCompleted { record: BenchmarkRecord },
    /// A configuration failed; whether the matrix continues is policy
    ConfigFailed {
        method: String,
        workers: usize,
        message: String,
    },
    /// Thread-pool speedup is suspiciously close to 1.0 for a multi-worker
    /// run, so the ratio likely measures lock contention, not parallelism
    LockBoundSuspected {
        workers: usize,
        speedup: f64,
    },
    /// The whole matrix finished
    Completed { total_records: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_to_json() {
        let event = Event::Exec(ExecEvent::Progress(ExecProgress {
            completed: 3,
            total: 10,
            current_path: PathBuf::from("/data/img_003.png"),
        }));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("img_003.png"));
    }
}
