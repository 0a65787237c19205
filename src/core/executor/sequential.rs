//! Single-threaded baseline execution.

use super::{process_task, ExecutionOutcome, ExecutionReport, ImageTask, StrategyKind, TaskExecutor};
use crate::core::filters::FilterPipeline;
use crate::error::ExecutorError;
use crate::events::{Event, EventSender, ExecEvent, ExecProgress};
use std::time::Instant;

/// Runs every task on the calling thread in strict submission order.
///
/// Its elapsed time is the baseline all speedup and efficiency figures are
/// computed against. Fails fast: the first task error aborts the run
/// immediately, with no further tasks attempted.
pub struct SequentialExecutor;

impl TaskExecutor for SequentialExecutor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sequential
    }

    fn run_with_events(
        &self,
        tasks: &[ImageTask],
        pipeline: &FilterPipeline,
        _workers: usize,
        events: &EventSender,
    ) -> Result<ExecutionReport, ExecutorError> {
        events.send(Event::Exec(ExecEvent::Started {
            method: self.kind().label().to_string(),
            workers: 1,
            total_tasks: tasks.len(),
        }));

        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(tasks.len());

        for (idx, task) in tasks.iter().enumerate() {
            let task_start = Instant::now();
            match process_task(task, pipeline) {
                Ok(()) => {
                    outcomes.push(ExecutionOutcome::success(task.clone(), task_start.elapsed()));
                    events.send(Event::Exec(ExecEvent::Progress(ExecProgress {
                        completed: idx + 1,
                        total: tasks.len(),
                        current_path: task.source.clone(),
                    })));
                }
                Err(e) => {
                    events.send(Event::Exec(ExecEvent::TaskFailed {
                        path: task.source.clone(),
                        message: e.to_string(),
                    }));
                    return Err(ExecutorError::from_task(task.source.clone(), &e));
                }
            }
        }

        let elapsed = start.elapsed();
        events.send(Event::Exec(ExecEvent::Completed {
            elapsed_ms: elapsed.as_millis() as u64,
        }));

        Ok(ExecutionReport { elapsed, outcomes })
    }
}
