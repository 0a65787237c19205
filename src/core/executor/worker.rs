//! Child-process worker plumbing shared by the process-pool strategies.
//!
//! The parent keeps a fixed pool of long-lived child processes (the hidden
//! `worker` subcommand of this binary) and hands each child one task at a
//! time over its stdin. A task descriptor is a single line:
//!
//! ```text
//! <source path> TAB <output dir>
//! ```
//!
//! The child decodes the image itself, runs the standard pipeline, encodes
//! the result and answers with exactly one line on stdout:
//!
//! ```text
//! ok TAB <output path>
//! err TAB <message>
//! ```
//!
//! Only these path strings ever cross the process boundary - pixel data is
//! decoded and re-encoded entirely inside the child, so per-task IPC cost
//! stays independent of image size.

use super::{process_task, ExecutionOutcome, ImageTask};
use crate::core::filters::FilterPipeline;
use crate::error::ExecutorError;
use crate::events::{Event, EventSender, ExecEvent, ExecProgress};
use crossbeam_channel::unbounded;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

/// How to launch a child worker process.
///
/// Defaults to re-invoking the current executable with the hidden `worker`
/// subcommand; tests point it at an explicitly built binary instead.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl WorkerCommand {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self { program, args }
    }

    /// The current executable's `worker` subcommand
    pub fn current_exe() -> Result<Self, ExecutorError> {
        let program =
            std::env::current_exe().map_err(|source| ExecutorError::WorkerSpawn { source })?;
        Ok(Self::new(program, vec!["worker".to_string()]))
    }
}

/// Parent-side handle for one child worker
struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    fn spawn(command: &WorkerCommand) -> Result<Self, ExecutorError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| ExecutorError::WorkerSpawn { source })?;

        let stdin = child.stdin.take().ok_or_else(|| ExecutorError::WorkerProtocol {
            message: "worker stdin unavailable".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| ExecutorError::WorkerProtocol {
            message: "worker stdout unavailable".to_string(),
        })?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Hand one task to the child and block for its reply.
    ///
    /// `Ok(Ok(()))` is success, `Ok(Err(msg))` a task-level failure inside
    /// the child, `Err(..)` a broken worker (died, garbage output).
    fn process(&mut self, task: &ImageTask) -> Result<Result<(), String>, ExecutorError> {
        writeln!(
            self.stdin,
            "{}\t{}",
            task.source.display(),
            task.output_dir.display()
        )
        .map_err(|e| ExecutorError::WorkerProtocol {
            message: format!("failed to submit task to worker: {e}"),
        })?;
        self.stdin.flush().map_err(|e| ExecutorError::WorkerProtocol {
            message: format!("failed to flush worker stdin: {e}"),
        })?;

        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .map_err(|e| ExecutorError::WorkerProtocol {
                message: format!("failed to read worker reply: {e}"),
            })?;
        if read == 0 {
            return Err(ExecutorError::WorkerProtocol {
                message: "worker exited before replying".to_string(),
            });
        }

        match line.trim_end().split_once('\t') {
            Some(("ok", _)) => Ok(Ok(())),
            Some(("err", message)) => Ok(Err(message.to_string())),
            _ => Err(ExecutorError::WorkerProtocol {
                message: format!("unexpected worker reply: {line:?}"),
            }),
        }
    }

    /// Close stdin so the child sees EOF, then reap it.
    fn shutdown(mut self) {
        drop(self.stdin);
        let _ = self.child.wait();
    }
}

/// Run the child-side worker loop on the current process's stdio.
///
/// Builds the pipeline once, then processes one task descriptor per stdin
/// line until EOF. Task failures are reported as `err` lines, not exits:
/// whether a failure aborts the run is the parent's decision.
pub fn serve() -> io::Result<()> {
    let pipeline = FilterPipeline::standard();
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    for line in stdin.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let reply = match line.split_once('\t') {
            Some((source, output_dir)) => {
                let task = ImageTask::new(PathBuf::from(source), PathBuf::from(output_dir));
                match process_task(&task, &pipeline) {
                    Ok(()) => format!("ok\t{}", task.output_path().display()),
                    Err(e) => format!("err\t{}", sanitize(&e.to_string())),
                }
            }
            None => format!("err\t{}", sanitize(&format!("malformed task line: {line:?}"))),
        };

        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }

    Ok(())
}

// Replies are line-framed; error text must not break the framing.
fn sanitize(message: &str) -> String {
    message.replace(['\n', '\r', '\t'], " ")
}

/// Drive `tasks` through a fixed pool of child workers.
///
/// Returns `(submission index, outcome)` pairs in **completion order**; the
/// caller decides whether to re-sort into submission order. After the first
/// task failure no further tasks are issued, but every task already handed
/// to a child is drained before this returns.
pub(super) fn run_worker_pool(
    tasks: &[ImageTask],
    workers: usize,
    command: &WorkerCommand,
    method: &'static str,
    events: &EventSender,
) -> Result<Vec<(usize, ExecutionOutcome)>, ExecutorError> {
    let pool_size = workers.max(1).min(tasks.len().max(1));

    let mut children = Vec::with_capacity(pool_size);
    for _ in 0..pool_size {
        children.push(WorkerProcess::spawn(command)?);
    }
    tracing::debug!(method, workers = pool_size, "worker pool spawned");

    let (task_tx, task_rx) = unbounded();
    for pair in tasks.iter().enumerate() {
        // The channel is pre-filled and closed; feeders drain it until it
        // is empty or the abort flag stops them.
        let _ = task_tx.send(pair);
    }
    drop(task_tx);

    let (result_tx, result_rx) = unbounded();
    let abort = AtomicBool::new(false);
    let completed = AtomicUsize::new(0);
    let total = tasks.len();

    thread::scope(|scope| {
        let handles: Vec<_> = children
            .into_iter()
            .map(|mut worker| {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let abort = &abort;
                let completed = &completed;
                scope.spawn(move || -> Result<(), ExecutorError> {
                    while let Ok((idx, task)) = task_rx.recv() {
                        if abort.load(Ordering::SeqCst) {
                            break;
                        }

                        let task_start = Instant::now();
                        let reply = match worker.process(task) {
                            Ok(reply) => reply,
                            Err(e) => {
                                abort.store(true, Ordering::SeqCst);
                                worker.shutdown();
                                return Err(e);
                            }
                        };
                        let elapsed = task_start.elapsed();

                        let outcome = match reply {
                            Ok(()) => {
                                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                                events.send(Event::Exec(ExecEvent::Progress(ExecProgress {
                                    completed: done,
                                    total,
                                    current_path: task.source.clone(),
                                })));
                                ExecutionOutcome::success(task.clone(), elapsed)
                            }
                            Err(message) => {
                                abort.store(true, Ordering::SeqCst);
                                events.send(Event::Exec(ExecEvent::TaskFailed {
                                    path: task.source.clone(),
                                    message: message.clone(),
                                }));
                                ExecutionOutcome::failure(task.clone(), elapsed, message)
                            }
                        };
                        let _ = result_tx.send((idx, outcome));
                    }
                    worker.shutdown();
                    Ok(())
                })
            })
            .collect();
        drop(result_tx);

        let collected: Vec<(usize, ExecutionOutcome)> = result_rx.iter().collect();

        for handle in handles {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => {
                    return Err(ExecutorError::WorkerProtocol {
                        message: "worker feeder thread panicked".to_string(),
                    })
                }
            }
        }

        Ok(collected)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_flattens_newlines_and_tabs() {
        assert_eq!(sanitize("a\nb\tc\r"), "a b c ");
    }

    #[test]
    fn current_exe_command_targets_the_worker_subcommand() {
        let command = WorkerCommand::current_exe().unwrap();
        assert_eq!(command.args, vec!["worker".to_string()]);
    }
}
