//! # Executor Module
//!
//! The pluggable task-execution strategies the benchmark compares.
//!
//! All four strategies satisfy the same [`TaskExecutor`] contract: run the
//! same ordered list of independent [`ImageTask`]s through the same
//! [`FilterPipeline`] and report wall time plus per-task outcomes. Because
//! the pipeline is pure and every task writes to a unique output path, the
//! set of output files and their bytes is identical across strategies and
//! worker counts - only the elapsed time differs.
//!
//! | Strategy           | Concurrency unit | Aggregation order  |
//! |--------------------|------------------|--------------------|
//! | Sequential         | calling thread   | submission order   |
//! | ProcessPool        | child processes  | submission order   |
//! | ProcessPoolFutures | child processes  | completion order   |
//! | ThreadPool         | OS threads       | completion order   |
//!
//! The process-based strategies hand **paths, not pixel data** to their
//! workers; each child decodes its own image. Only lightweight descriptors
//! ever cross the process boundary.
//!
//! Failure semantics are fail-fast at the run granularity: after the first
//! task failure no new tasks are issued, in-flight work drains, and `run`
//! returns the first error as [`ExecutorError::TaskFailure`].

mod process_futures;
mod process_pool;
mod sequential;
mod thread_pool;
mod worker;

pub use process_futures::ProcessPoolFuturesExecutor;
pub use process_pool::ProcessPoolExecutor;
pub use sequential::SequentialExecutor;
pub use thread_pool::ThreadPoolExecutor;
pub use worker::{serve, WorkerCommand};

use crate::core::codec;
use crate::core::filters::FilterPipeline;
use crate::error::{ExecutorError, TaskError};
use crate::events::{null_sender, EventSender};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// One unit of work: process a single image file end to end.
///
/// Immutable once created; identity is the source path. Consumed exactly
/// once by exactly one executor invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTask {
    /// Path of the input image
    pub source: PathBuf,
    /// Directory the processed image is written to
    pub output_dir: PathBuf,
}

impl ImageTask {
    pub fn new(source: PathBuf, output_dir: PathBuf) -> Self {
        Self { source, output_dir }
    }

    /// Output location: the source file name inside the output directory.
    /// Unique per task, so concurrent writes never collide.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.source.file_name().unwrap_or_default())
    }
}

/// Result of one task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub task: ImageTask,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl ExecutionOutcome {
    fn success(task: ImageTask, elapsed: Duration) -> Self {
        Self {
            task,
            elapsed,
            error: None,
        }
    }

    fn failure(task: ImageTask, elapsed: Duration, message: String) -> Self {
        Self {
            task,
            elapsed,
            error: Some(message),
        }
    }
}

/// Aggregated result of one executor run
#[derive(Debug)]
pub struct ExecutionReport {
    /// Wall time for the whole run
    pub elapsed: Duration,
    /// Per-task outcomes, in the order the strategy promises
    pub outcomes: Vec<ExecutionOutcome>,
}

/// Decode -> filter -> encode for one task.
///
/// This is the leaf every strategy shares. The in-process strategies call
/// it directly; the `worker` subcommand calls it inside the child process,
/// which is what keeps image bytes from ever crossing the process boundary.
pub fn process_task(task: &ImageTask, pipeline: &FilterPipeline) -> Result<(), TaskError> {
    let image = codec::decode(&task.source)?;
    let processed = pipeline.apply(&image)?;
    codec::encode(&processed, &task.output_path())
}

/// A task-execution strategy.
///
/// Implementations must be substitutable for one another: same tasks, same
/// pipeline, same outputs; only scheduling and elapsed time differ.
pub trait TaskExecutor: Send + Sync {
    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// Run all tasks without progress reporting
    fn run(
        &self,
        tasks: &[ImageTask],
        pipeline: &FilterPipeline,
        workers: usize,
    ) -> Result<ExecutionReport, ExecutorError> {
        self.run_with_events(tasks, pipeline, workers, &null_sender())
    }

    /// Run all tasks, reporting progress via events
    fn run_with_events(
        &self,
        tasks: &[ImageTask],
        pipeline: &FilterPipeline,
        workers: usize,
        events: &EventSender,
    ) -> Result<ExecutionReport, ExecutorError>;
}

/// The four interchangeable strategies, selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    Sequential,
    ProcessPool,
    ProcessPoolFutures,
    ThreadPool,
}

impl StrategyKind {
    /// Stable label used in records, CSV output and directory names
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::Sequential => "sequential",
            StrategyKind::ProcessPool => "process-pool",
            StrategyKind::ProcessPoolFutures => "process-pool-futures",
            StrategyKind::ThreadPool => "thread-pool",
        }
    }

    /// Build the executor for this strategy.
    ///
    /// `worker_command` is only consulted by the process-based strategies;
    /// it tells them how to launch the child worker binary.
    pub fn build(&self, worker_command: WorkerCommand) -> Box<dyn TaskExecutor> {
        match self {
            StrategyKind::Sequential => Box::new(SequentialExecutor),
            StrategyKind::ProcessPool => Box::new(ProcessPoolExecutor::new(worker_command)),
            StrategyKind::ProcessPoolFutures => {
                Box::new(ProcessPoolFuturesExecutor::new(worker_command))
            }
            StrategyKind::ThreadPool => Box::new(ThreadPoolExecutor),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn output_path_keeps_the_source_file_name() {
        let task = ImageTask::new(
            PathBuf::from("/data/input/img_007.png"),
            PathBuf::from("/data/output/sequential"),
        );
        assert_eq!(
            task.output_path(),
            PathBuf::from("/data/output/sequential/img_007.png")
        );
    }

    #[test]
    fn strategy_labels_are_stable() {
        assert_eq!(StrategyKind::Sequential.label(), "sequential");
        assert_eq!(StrategyKind::ProcessPool.label(), "process-pool");
        assert_eq!(
            StrategyKind::ProcessPoolFutures.label(),
            "process-pool-futures"
        );
        assert_eq!(StrategyKind::ThreadPool.label(), "thread-pool");
    }

    #[test]
    fn process_task_writes_the_output_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("in.png");
        RgbImage::from_pixel(6, 6, Rgb([90, 120, 60]))
            .save(&source)
            .unwrap();

        let task = ImageTask::new(source, temp_dir.path().join("out"));
        process_task(&task, &FilterPipeline::standard()).unwrap();

        assert!(task.output_path().exists());
    }

    #[test]
    fn process_task_fails_on_unreadable_input() {
        let temp_dir = TempDir::new().unwrap();
        let task = ImageTask::new(
            temp_dir.path().join("missing.png"),
            temp_dir.path().join("out"),
        );

        let result = process_task(&task, &FilterPipeline::standard());
        assert!(matches!(result, Err(TaskError::Decode { .. })));
    }
}
