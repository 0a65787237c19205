//! Map-style process-pool execution.

use super::worker::{run_worker_pool, WorkerCommand};
use super::{ExecutionReport, ImageTask, StrategyKind, TaskExecutor};
use crate::core::filters::FilterPipeline;
use crate::error::ExecutorError;
use crate::events::{Event, EventSender, ExecEvent};
use std::time::Instant;

/// Runs tasks on a fixed pool of child processes, aggregating outcomes in
/// **submission order** - the map contract.
///
/// Workers share no memory with the parent: each child re-decodes its own
/// image from the path it is handed. The pipeline argument is therefore
/// unused here; every child builds its own pipeline once at startup and
/// reuses it across tasks.
pub struct ProcessPoolExecutor {
    command: WorkerCommand,
}

impl ProcessPoolExecutor {
    pub fn new(command: WorkerCommand) -> Self {
        Self { command }
    }
}

impl TaskExecutor for ProcessPoolExecutor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ProcessPool
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
        let mut indexed =
            run_worker_pool(tasks, workers, &self.command, self.kind().label(), events)?;
        let elapsed = start.elapsed();

        // Restore submission order before anything inspects the results
        indexed.sort_by_key(|(idx, _)| *idx);
        let outcomes: Vec<_> = indexed.into_iter().map(|(_, outcome)| outcome).collect();

        // First error in submission order, surfaced only after the drain
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
