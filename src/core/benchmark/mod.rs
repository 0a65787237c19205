//! # Benchmark Module
//!
//! Drives every configured (strategy, worker-count) configuration over the
//! same dataset and derives comparable speedup/efficiency figures.
//!
//! A run moves through fixed phases: load dataset -> sequential baseline
//! (exactly once; its time is immutable for the rest of the run) -> one
//! executor run per matrix configuration -> completed. Dataset problems
//! abort before any executor is invoked. A failing configuration aborts
//! only itself; whether the matrix then continues is the explicit
//! `halt_on_config_failure` policy flag.
//!
//! Every configuration writes to its own `<method>_<workers>` directory
//! under the output root, so runs can be diffed against the baseline
//! output to verify strategy equivalence.

use crate::core::dataset;
use crate::core::executor::{ImageTask, SequentialExecutor, StrategyKind, TaskExecutor, WorkerCommand};
use crate::core::filters::FilterPipeline;
use crate::error::{BenchError, Result};
use crate::events::{null_sender, BenchmarkEvent, Event, EventSender};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A thread-pool configuration with two or more workers whose speedup
/// lands below this is reported as lock-bound rather than parallel.
const LOCK_BOUND_SPEEDUP: f64 = 1.1;

/// One row of benchmark output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Strategy label (`sequential`, `process-pool`, ...)
    pub method: String,
    /// Worker count for this configuration
    pub workers: usize,
    /// Wall time in seconds
    pub time: f64,
    /// Baseline time divided by this configuration's time
    pub speedup: f64,
    /// Speedup divided by worker count
    pub efficiency: f64,
}

/// A configuration that failed and was skipped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFailure {
    pub method: String,
    pub workers: usize,
    pub message: String,
}

/// Everything a benchmark run produced
#[derive(Debug)]
pub struct BenchmarkReport {
    /// One record per successful configuration, baseline first
    pub records: Vec<BenchmarkRecord>,
    /// Configurations that failed (empty on a clean run)
    pub failures: Vec<ConfigFailure>,
    /// Wall time for the whole matrix including the baseline
    pub total: Duration,
}

/// Configuration for a benchmark run
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Directory holding the input images
    pub dataset_dir: PathBuf,
    /// Cap on the number of images (None = all)
    pub limit: Option<usize>,
    /// Root directory for per-configuration outputs
    pub output_root: PathBuf,
    /// Worker counts to test each strategy with
    pub worker_counts: Vec<usize>,
    /// Strategies in the matrix (the baseline is always run regardless)
    pub strategies: Vec<StrategyKind>,
    /// Abort the whole matrix on the first failing configuration
    pub halt_on_config_failure: bool,
    /// How to launch child workers (None = current executable)
    pub worker_command: Option<WorkerCommand>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::new(),
            limit: None,
            output_root: PathBuf::from("output"),
            worker_counts: vec![1, 2, 4],
            strategies: vec![
                StrategyKind::ProcessPool,
                StrategyKind::ProcessPoolFutures,
                StrategyKind::ThreadPool,
            ],
            halt_on_config_failure: false,
            worker_command: None,
        }
    }
}

/// Builder for benchmark configuration
pub struct BenchmarkBuilder {
    config: BenchmarkConfig,
}

impl BenchmarkBuilder {
    pub fn new() -> Self {
        Self {
            config: BenchmarkConfig::default(),
        }
    }

    /// Set the dataset directory
    pub fn dataset_dir(mut self, dir: PathBuf) -> Self {
        self.config.dataset_dir = dir;
        self
    }

    /// Cap the number of images used
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.config.limit = limit;
        self
    }

    /// Set the output root directory
    pub fn output_root(mut self, dir: PathBuf) -> Self {
        self.config.output_root = dir;
        self
    }

    /// Set the worker counts to test
    pub fn worker_counts(mut self, counts: Vec<usize>) -> Self {
        self.config.worker_counts = counts;
        self
    }

    /// Set the strategies in the matrix
    pub fn strategies(mut self, strategies: Vec<StrategyKind>) -> Self {
        self.config.strategies = strategies;
        self
    }

    /// Abort the matrix on the first failing configuration
    pub fn halt_on_config_failure(mut self, halt: bool) -> Self {
        self.config.halt_on_config_failure = halt;
        self
    }

    /// Override how child worker processes are launched
    pub fn worker_command(mut self, command: WorkerCommand) -> Self {
        self.config.worker_command = Some(command);
        self
    }

    pub fn build(self) -> BenchmarkHarness {
        BenchmarkHarness {
            config: self.config,
        }
    }
}

impl Default for BenchmarkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The benchmark orchestrator
pub struct BenchmarkHarness {
    config: BenchmarkConfig,
}

impl BenchmarkHarness {
    pub fn builder() -> BenchmarkBuilder {
        BenchmarkBuilder::new()
    }

    /// Run the full matrix without events
    pub fn run(&self) -> Result<BenchmarkReport> {
        self.run_with_events(&null_sender())
    }

    /// Run the full matrix, reporting progress via events
    pub fn run_with_events(&self, events: &EventSender) -> Result<BenchmarkReport> {
        let start = Instant::now();

        let paths = dataset::list_images_with_events(
            &self.config.dataset_dir,
            self.config.limit,
            events,
        )?;

        let worker_command = match &self.config.worker_command {
            Some(command) => command.clone(),
            None => WorkerCommand::current_exe()?,
        };

        let total_configurations =
            self.config.strategies.len() * self.config.worker_counts.len();
        events.send(Event::Benchmark(BenchmarkEvent::Started {
            total_configurations,
        }));

        let pipeline = FilterPipeline::standard();
        let mut records = Vec::with_capacity(total_configurations + 1);
        let mut failures = Vec::new();

        // Baseline: the sequential time every other configuration is
        // measured against. A baseline failure is fatal - without it no
        // speedup is computable.
        tracing::info!(images = paths.len(), "running sequential baseline");
        let baseline_tasks = make_tasks(&paths, &self.config.output_root.join("sequential"));
        let baseline = SequentialExecutor
            .run_with_events(&baseline_tasks, &pipeline, 1, events)?;
        let baseline_secs = baseline.elapsed.as_secs_f64();

        records.push(BenchmarkRecord {
            method: StrategyKind::Sequential.label().to_string(),
            workers: 1,
            time: baseline_secs,
            speedup: 1.0,
            efficiency: 1.0,
        });
        events.send(Event::Benchmark(BenchmarkEvent::BaselineCompleted {
            time_secs: baseline_secs,
        }));

        for strategy in &self.config.strategies {
            for &workers in &self.config.worker_counts {
                events.send(Event::Benchmark(BenchmarkEvent::ConfigStarted {
                    method: strategy.label().to_string(),
                    workers,
                }));

                let output_dir = self
                    .config
                    .output_root
                    .join(format!("{}_{}", strategy.label(), workers));
                fs::create_dir_all(&output_dir).map_err(|e| {
                    BenchError::Config(format!(
                        "cannot create output directory {}: {e}",
                        output_dir.display()
                    ))
                })?;

                let tasks = make_tasks(&paths, &output_dir);
                let executor = strategy.build(worker_command.clone());

                match executor.run_with_events(&tasks, &pipeline, workers, events) {
                    Ok(report) => {
                        let time = report.elapsed.as_secs_f64();
                        let speedup = baseline_secs / time;
                        let efficiency = speedup / workers as f64;
                        tracing::info!(
                            method = strategy.label(),
                            workers,
                            time_secs = time,
                            speedup,
                            efficiency,
                            "configuration completed"
                        );

                        if *strategy == StrategyKind::ThreadPool
                            && workers >= 2
                            && speedup < LOCK_BOUND_SPEEDUP
                        {
                            tracing::warn!(
                                workers,
                                speedup,
                                "thread-pool speedup is close to 1.0; the ratio likely \
                                 reflects serialized compute, not parallel scaling"
                            );
                            events.send(Event::Benchmark(BenchmarkEvent::LockBoundSuspected {
                                workers,
                                speedup,
                            }));
                        }

                        let record = BenchmarkRecord {
                            method: strategy.label().to_string(),
                            workers,
                            time,
                            speedup,
                            efficiency,
                        };
                        events.send(Event::Benchmark(BenchmarkEvent::ConfigCompleted {
                            record: record.clone(),
                        }));
                        records.push(record);
                    }
                    Err(e) => {
                        tracing::error!(
                            method = strategy.label(),
                            workers,
                            error = %e,
                            "configuration failed"
                        );
                        events.send(Event::Benchmark(BenchmarkEvent::ConfigFailed {
                            method: strategy.label().to_string(),
                            workers,
                            message: e.to_string(),
                        }));

                        if self.config.halt_on_config_failure {
                            return Err(e.into());
                        }
                        failures.push(ConfigFailure {
                            method: strategy.label().to_string(),
                            workers,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        events.send(Event::Benchmark(BenchmarkEvent::Completed {
            total_records: records.len(),
        }));

        Ok(BenchmarkReport {
            records,
            failures,
            total: start.elapsed(),
        })
    }
}

/// Build the task list for one configuration's output directory
pub fn make_tasks(paths: &[PathBuf], output_dir: &Path) -> Vec<ImageTask> {
    paths
        .iter()
        .map(|path| ImageTask::new(path.clone(), output_dir.to_path_buf()))
        .collect()
}
