//! As-completed process-pool execution.

use super::worker::{run_worker_pool, WorkerCommand};
use super::{ExecutionReport, ImageTask, StrategyKind, TaskExecutor};
use crate::core::filters::FilterPipeline;
use crate::error::ExecutorError;
use crate::events::{Event, EventSender, ExecEvent};
use std::time::Instant;

/// Runs tasks on a fixed pool of child processes, aggregating outcomes in
/// **completion order**.
///
/// Tasks are submitted eagerly; the run does not return until every
/// submitted task has completed or the pool has drained after a failure.
/// Unlike [`super::ProcessPoolExecutor`] this variant makes no promise
/// about result ordering - the two differ only in that aggregation
/// discipline, which mirrors a real divergence between map-style pools and
/// future-collecting pools.
pub struct ProcessPoolFuturesExecutor {
    command: WorkerCommand,
}

impl ProcessPoolFuturesExecutor {
    pub fn new(command: WorkerCommand) -> Self {
        Self { command }
    }
}

impl TaskExecutor for ProcessPoolFuturesExecutor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ProcessPoolFutures
    }

    fn run_with_events(
        &self,
        tasks: &[ImageTask],
        _pipeline: &FilterPipeline,
        workers: usize,
        events: &EventSender,
    ) -> Result<ExecutionReport, ExecutorError> {
        events.send(Event::Exec(ExecEvent::Started {
            method: self.kind().label().to_string(),
            workers,
            total_tasks: tasks.len(),
        }));

        let start = Instant::now();
        let indexed =
            run_worker_pool(tasks, workers, &self.command, self.kind().label(), events)?;
        let elapsed = start.elapsed();

        // Keep completion order; surface the first failure observed
        let outcomes: Vec<_> = indexed.into_iter().map(|(_, outcome)| outcome).collect();

        if let Some(failed) = outcomes.iter().find(|o| o.error.is_some()) {
            return Err(ExecutorError::TaskFailure {
                task: failed.task.source.clone(),
                message: failed.error.clone().unwrap_or_default(),
            });
        }

        events.send(Event::Exec(ExecEvent::Completed {
            elapsed_ms: elapsed.as_millis() as u64,
        }));

        Ok(ExecutionReport { elapsed, outcomes })
    }
}
