//! Thread-pool execution inside a single process.

use super::{process_task, ExecutionOutcome, ExecutionReport, ImageTask, StrategyKind, TaskExecutor};
use crate::core::filters::FilterPipeline;
use crate::error::ExecutorError;
use crate::events::{Event, EventSender, ExecEvent, ExecProgress};
use crossbeam_channel::unbounded;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

/// Runs tasks on a fixed-size pool of OS threads sharing this process's
/// address space. The pipeline is shared by reference; each task owns its
/// own image buffer, so no cross-task mutable state exists.
///
/// Submission is eager and completion order is arbitrary; the run only
/// returns once every submitted task has finished.
///
/// # Comparability caveat
///
/// Thread-pool speedup over the sequential baseline is only meaningful
/// because the filter stages are native compiled code that runs
/// concurrently on separate buffers. A runtime whose compute sections
/// serialize on a process-wide lock would report speedups near 1.0 here
/// regardless of worker count. The benchmark harness flags multi-worker
/// thread-pool results that land within 10% of the baseline instead of
/// treating the ratio as meaningful parallel speedup.
pub struct ThreadPoolExecutor;

impl TaskExecutor for ThreadPoolExecutor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ThreadPool
    }

    fn run_with_events(
        &self,
        tasks: &[ImageTask],
        pipeline: &FilterPipeline,
        workers: usize,
        events: &EventSender,
    ) -> Result<ExecutionReport, ExecutorError> {
        let workers = workers.max(1);
        events.send(Event::Exec(ExecEvent::Started {
            method: self.kind().label().to_string(),
            workers,
            total_tasks: tasks.len(),
        }));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| ExecutorError::PoolBuild {
                message: e.to_string(),
            })?;

        let start = Instant::now();
        let (tx, rx) = unbounded();
        let abort = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);
        let total = tasks.len();

        // The scope blocks until every spawned task has finished, which is
        // the wait-for-all barrier the contract requires.
        pool.scope(|scope| {
            for task in tasks {
                let tx = tx.clone();
                let abort = &abort;
                let completed = &completed;
                scope.spawn(move |_| {
                    // A failure already aborted the run; drain without work
                    if abort.load(Ordering::SeqCst) {
                        return;
                    }

                    let task_start = Instant::now();
                    let outcome = match process_task(task, pipeline) {
                        Ok(()) => {
                            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                            events.send(Event::Exec(ExecEvent::Progress(ExecProgress {
                                completed: done,
                                total,
                                current_path: task.source.clone(),
                            })));
                            ExecutionOutcome::success(task.clone(), task_start.elapsed())
                        }
                        Err(e) => {
                            abort.store(true, Ordering::SeqCst);
                            events.send(Event::Exec(ExecEvent::TaskFailed {
                                path: task.source.clone(),
                                message: e.to_string(),
                            }));
                            ExecutionOutcome::failure(
                                task.clone(),
                                task_start.elapsed(),
                                e.to_string(),
                            )
                        }
                    };
                    let _ = tx.send(outcome);
                });
            }
        });
        drop(tx);

        // Completion order, not submission order
        let outcomes: Vec<ExecutionOutcome> = rx.iter().collect();
        let elapsed = start.elapsed();

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
