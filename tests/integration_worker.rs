//! Integration tests for the process-pool strategies and the child worker
//! protocol, driving the real `pipeline-bench` binary.

use image::{Rgb, RgbImage};
use image_pipeline_bench::core::benchmark::BenchmarkHarness;
use image_pipeline_bench::core::executor::{
    ImageTask, ProcessPoolExecutor, ProcessPoolFuturesExecutor, SequentialExecutor, StrategyKind,
    TaskExecutor, WorkerCommand,
};
use image_pipeline_bench::core::filters::FilterPipeline;
use image_pipeline_bench::error::ExecutorError;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn worker_command() -> WorkerCommand {
    WorkerCommand::new(
        PathBuf::from(env!("CARGO_BIN_EXE_pipeline-bench")),
        vec!["worker".to_string()],
    )
}

fn write_dataset(dir: &Path, count: usize) -> Vec<PathBuf> {
    fs::create_dir_all(dir).unwrap();
    (0..count)
        .map(|i| {
            let path = dir.join(format!("img_{i:02}.png"));
            RgbImage::from_fn(20, 15, |x, y| {
                Rgb([
                    ((x * 9 + i as u32 * 17) % 256) as u8,
                    ((y * 23) % 256) as u8,
                    ((x * y + i as u32) % 256) as u8,
                ])
            })
            .save(&path)
            .unwrap();
            path
        })
        .collect()
}

fn tasks_for(paths: &[PathBuf], output_dir: &Path) -> Vec<ImageTask> {
    paths
        .iter()
        .map(|p| ImageTask::new(p.clone(), output_dir.to_path_buf()))
        .collect()
}

fn output_bytes(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().to_string(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}

#[test]
fn worker_subcommand_processes_task_lines_until_eof() {
    let temp = TempDir::new().unwrap();
    let paths = write_dataset(&temp.path().join("input"), 2);
    let output_dir = temp.path().join("out");

    let mut child = Command::new(env!("CARGO_BIN_EXE_pipeline-bench"))
        .arg("worker")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    let stdout = BufReader::new(child.stdout.take().unwrap());
    let mut lines = stdout.lines();

    for path in &paths {
        writeln!(stdin, "{}\t{}", path.display(), output_dir.display()).unwrap();
        stdin.flush().unwrap();

        let reply = lines.next().unwrap().unwrap();
        assert!(reply.starts_with("ok\t"), "unexpected reply: {reply}");
    }

    drop(stdin);
    let status = child.wait().unwrap();
    assert!(status.success());

    for path in &paths {
        assert!(output_dir.join(path.file_name().unwrap()).exists());
    }
}

#[test]
fn worker_subcommand_reports_task_failures_without_exiting() {
    let temp = TempDir::new().unwrap();
    let corrupt = temp.path().join("broken.png");
    fs::write(&corrupt, b"not an image at all").unwrap();
    let valid = write_dataset(&temp.path().join("input"), 1).remove(0);
    let output_dir = temp.path().join("out");

    let mut child = Command::new(env!("CARGO_BIN_EXE_pipeline-bench"))
        .arg("worker")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    let stdout = BufReader::new(child.stdout.take().unwrap());
    let mut lines = stdout.lines();

    writeln!(stdin, "{}\t{}", corrupt.display(), output_dir.display()).unwrap();
    stdin.flush().unwrap();
    let reply = lines.next().unwrap().unwrap();
    assert!(reply.starts_with("err\t"), "unexpected reply: {reply}");

    // The worker is still alive and serves the next task
    writeln!(stdin, "{}\t{}", valid.display(), output_dir.display()).unwrap();
    stdin.flush().unwrap();
    let reply = lines.next().unwrap().unwrap();
    assert!(reply.starts_with("ok\t"), "unexpected reply: {reply}");

    drop(stdin);
    assert!(child.wait().unwrap().success());
}

#[test]
fn process_pool_preserves_submission_order_in_outcomes() {
    let temp = TempDir::new().unwrap();
    let paths = write_dataset(&temp.path().join("input"), 5);
    let tasks = tasks_for(&paths, &temp.path().join("out"));

    let executor = ProcessPoolExecutor::new(worker_command());
    let report = executor
        .run(&tasks, &FilterPipeline::standard(), 2)
        .unwrap();

    assert_eq!(report.outcomes.len(), 5);
    for (outcome, task) in report.outcomes.iter().zip(&tasks) {
        assert_eq!(outcome.task.source, task.source);
    }
}

#[test]
fn process_pool_outputs_match_sequential_byte_for_byte() {
    let temp = TempDir::new().unwrap();
    let paths = write_dataset(&temp.path().join("input"), 4);

    let seq_dir = temp.path().join("seq");
    SequentialExecutor
        .run(
            &tasks_for(&paths, &seq_dir),
            &FilterPipeline::standard(),
            1,
        )
        .unwrap();

    let pool_dir = temp.path().join("pool");
    ProcessPoolExecutor::new(worker_command())
        .run(
            &tasks_for(&paths, &pool_dir),
            &FilterPipeline::standard(),
            2,
        )
        .unwrap();

    let futures_dir = temp.path().join("futures");
    ProcessPoolFuturesExecutor::new(worker_command())
        .run(
            &tasks_for(&paths, &futures_dir),
            &FilterPipeline::standard(),
            2,
        )
        .unwrap();

    let reference = output_bytes(&seq_dir);
    assert_eq!(reference.len(), 4);
    assert_eq!(reference, output_bytes(&pool_dir));
    assert_eq!(reference, output_bytes(&futures_dir));
}

#[test]
fn process_futures_waits_for_every_submitted_task() {
    let temp = TempDir::new().unwrap();
    let paths = write_dataset(&temp.path().join("input"), 6);
    let tasks = tasks_for(&paths, &temp.path().join("out"));

    let executor = ProcessPoolFuturesExecutor::new(worker_command());
    let report = executor
        .run(&tasks, &FilterPipeline::standard(), 3)
        .unwrap();

    // Completion order is arbitrary, but the set must be complete
    assert_eq!(report.outcomes.len(), 6);
    let mut sources: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| o.task.source.clone())
        .collect();
    sources.sort();
    let mut expected = paths.clone();
    expected.sort();
    assert_eq!(sources, expected);
}

#[test]
fn corrupt_file_fails_the_configuration_after_draining() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input");
    let paths = write_dataset(&input, 3);
    let corrupt = input.join("zz_corrupt.png");
    fs::write(&corrupt, b"garbage").unwrap();

    let mut all_paths = paths;
    all_paths.push(corrupt.clone());
    let tasks = tasks_for(&all_paths, &temp.path().join("out"));

    let executor = ProcessPoolExecutor::new(worker_command());
    let result = executor.run(&tasks, &FilterPipeline::standard(), 2);

    match result {
        Err(ExecutorError::TaskFailure { task, .. }) => {
            assert_eq!(task, corrupt);
        }
        other => panic!("expected TaskFailure, got {other:?}"),
    }
}

#[test]
fn full_matrix_with_process_strategies_produces_equivalent_outputs() {
    let temp = TempDir::new().unwrap();
    write_dataset(&temp.path().join("input"), 3);

    let harness = BenchmarkHarness::builder()
        .dataset_dir(temp.path().join("input"))
        .output_root(temp.path().join("output"))
        .strategies(vec![
            StrategyKind::ProcessPool,
            StrategyKind::ProcessPoolFutures,
            StrategyKind::ThreadPool,
        ])
        .worker_counts(vec![2])
        .worker_command(worker_command())
        .build();

    let report = harness.run().unwrap();

    assert!(report.failures.is_empty());
    // baseline + 3 configurations
    assert_eq!(report.records.len(), 4);

    let output = temp.path().join("output");
    let reference = output_bytes(&output.join("sequential"));
    for dir in ["process-pool_2", "process-pool-futures_2", "thread-pool_2"] {
        assert_eq!(
            reference,
            output_bytes(&output.join(dir)),
            "outputs diverged in {dir}"
        );
    }
}
