//! # CLI Module
//!
//! Command-line interface for the pipeline benchmark.
//!
//! ## Usage
//! ```bash
//! # Benchmark the default strategy matrix over a dataset
//! pipeline-bench bench data/input/images --limit 200
//!
//! # Custom worker counts and strategies
//! pipeline-bench bench data/input/images --workers 1,2,4,8 --strategies thread-pool
//!
//! # Run a single strategy once
//! pipeline-bench run data/input/images --strategy process-pool --workers 4
//! ```
//!
//! The hidden `worker` subcommand is the child-process entry point used by
//! the process-pool strategies; it is never invoked by hand.

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_pipeline_bench::core::benchmark::{BenchmarkHarness, BenchmarkReport};
use image_pipeline_bench::core::executor::{self, StrategyKind, TaskExecutor, WorkerCommand};
use image_pipeline_bench::core::filters::FilterPipeline;
use image_pipeline_bench::core::{benchmark, dataset, report};
use image_pipeline_bench::error::{BenchError, Result};
use image_pipeline_bench::events::{self, BenchmarkEvent, Event, ExecEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;
use std::thread;

/// Image Pipeline Bench - compare execution strategies on equal terms
#[derive(Parser, Debug)]
#[command(name = "pipeline-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Benchmark every configured (strategy, worker-count) pair
    Bench {
        /// Directory containing the input images
        dataset: PathBuf,

        /// Use only the first N images (sorted by file name)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Root directory for processed outputs
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Worker counts to test, comma separated
        #[arg(short, long, value_delimiter = ',', default_values_t = vec![1, 2, 4])]
        workers: Vec<usize>,

        /// Strategies to include in the matrix
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_values_t = vec![
                Strategy::ProcessPool,
                Strategy::ProcessPoolFutures,
                Strategy::ThreadPool,
            ]
        )]
        strategies: Vec<Strategy>,

        /// Where to write the CSV results
        #[arg(long, default_value = "benchmark_results.csv")]
        csv: PathBuf,

        /// Also write the results as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Abort the whole matrix on the first failing configuration
        /// (default: record the failure and continue)
        #[arg(long)]
        halt_on_failure: bool,

        /// Verbose progress output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run a single strategy once over a dataset
    Run {
        /// Directory containing the input images
        dataset: PathBuf,

        /// Execution strategy
        #[arg(short, long, default_value_t = Strategy::Sequential)]
        strategy: Strategy,

        /// Worker count (ignored by sequential)
        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Use only the first N images
        #[arg(short, long)]
        limit: Option<usize>,

        /// Root directory for processed outputs
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Child worker loop: one task descriptor per stdin line
    #[command(hide = true)]
    Worker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Everything on the calling thread; the baseline
    Sequential,
    /// Fixed pool of child processes, results in submission order
    ProcessPool,
    /// Fixed pool of child processes, results as completed
    ProcessPoolFutures,
    /// Fixed pool of threads in this process, results as completed
    ThreadPool,
}

impl From<Strategy> for StrategyKind {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Sequential => StrategyKind::Sequential,
            Strategy::ProcessPool => StrategyKind::ProcessPool,
            Strategy::ProcessPoolFutures => StrategyKind::ProcessPoolFutures,
            Strategy::ThreadPool => StrategyKind::ThreadPool,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(StrategyKind::from(*self).label())
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            dataset,
            limit,
            output,
            workers,
            strategies,
            csv,
            json,
            halt_on_failure,
            verbose,
        } => run_bench(
            dataset,
            limit,
            output,
            workers,
            strategies,
            csv,
            json,
            halt_on_failure,
            verbose,
        ),
        Commands::Run {
            dataset,
            strategy,
            workers,
            limit,
            output,
        } => run_single(dataset, strategy, workers, limit, output),
        Commands::Worker => {
            executor::serve().map_err(|e| BenchError::Config(format!("worker loop failed: {e}")))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_bench(
    dataset: PathBuf,
    limit: Option<usize>,
    output: PathBuf,
    workers: Vec<usize>,
    strategies: Vec<Strategy>,
    csv: PathBuf,
    json: Option<PathBuf>,
    halt_on_failure: bool,
    verbose: bool,
) -> Result<()> {
    if workers.iter().any(|&w| w == 0) {
        return Err(BenchError::Config(
            "worker counts must be at least 1".to_string(),
        ));
    }

    let term = Term::stderr();
    term.write_line(&format!(
        "{} {}",
        style("Image Pipeline Bench").bold().cyan(),
        style(env!("CARGO_PKG_VERSION")).dim()
    ))
    .ok();

    let harness = BenchmarkHarness::builder()
        .dataset_dir(dataset)
        .limit(limit)
        .output_root(output)
        .worker_counts(workers)
        .strategies(strategies.into_iter().map(Into::into).collect())
        .halt_on_config_failure(halt_on_failure)
        .build();

    let (sender, receiver) = events::channel();

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );

    let progress_clone = progress.clone();
    let term_clone = term.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Exec(ExecEvent::Started {
                    method,
                    workers,
                    total_tasks,
                }) => {
                    progress_clone.set_length(total_tasks as u64);
                    progress_clone.set_position(0);
                    progress_clone.set_message(format!("{method} ({workers} workers)"));
                }
                Event::Exec(ExecEvent::Progress(p)) => {
                    progress_clone.set_position(p.completed as u64);
                    if verbose {
                        progress_clone.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .to_string(),
                        );
                    }
                }
                Event::Exec(ExecEvent::TaskFailed { path, message }) => {
                    progress_clone.suspend(|| {
                        term_clone
                            .write_line(&format!(
                                "{} {}: {}",
                                style("✗").red().bold(),
                                path.display(),
                                message
                            ))
                            .ok();
                    });
                }
                Event::Benchmark(BenchmarkEvent::BaselineCompleted { time_secs }) => {
                    progress_clone.suspend(|| {
                        term_clone
                            .write_line(&format!(
                                "  baseline: {}",
                                style(format!("{time_secs:.2}s")).cyan()
                            ))
                            .ok();
                    });
                }
                Event::Benchmark(BenchmarkEvent::LockBoundSuspected { workers, speedup }) => {
                    progress_clone.suspend(|| {
                        term_clone
                            .write_line(&format!(
                                "{} thread-pool speedup {:.2} with {} workers is close to 1.0; \
                                 likely lock-bound, not parallel",
                                style("!").yellow().bold(),
                                speedup,
                                workers
                            ))
                            .ok();
                    });
                }
                Event::Benchmark(BenchmarkEvent::Completed { .. }) => {
                    progress_clone.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = harness.run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();
    progress.finish_and_clear();

    let report = result?;

    report::write_csv(&report, &csv)?;
    if let Some(json_path) = &json {
        report::write_json(&report, json_path)?;
    }

    print_summary(&term, &report);
    term.write_line(&format!(
        "\nResults written to {}",
        style(csv.display()).green()
    ))
    .ok();

    Ok(())
}

fn run_single(
    dataset: PathBuf,
    strategy: Strategy,
    workers: usize,
    limit: Option<usize>,
    output: PathBuf,
) -> Result<()> {
    if workers == 0 {
        return Err(BenchError::Config(
            "worker count must be at least 1".to_string(),
        ));
    }

    let kind = StrategyKind::from(strategy);
    let paths = dataset::list_images(&dataset, limit)?;
    let tasks = benchmark::make_tasks(&paths, &output.join(kind.label()));

    let pipeline = FilterPipeline::standard();
    let executor = kind.build(WorkerCommand::current_exe()?);

    let term = Term::stderr();
    term.write_line(&format!(
        "Processing {} images with {} ({} workers)...",
        paths.len(),
        kind.label(),
        workers
    ))
    .ok();

    let report = executor.run(&tasks, &pipeline, workers)?;

    term.write_line(&format!(
        "{} {} images in {}",
        style("✓").green().bold(),
        report.outcomes.len(),
        style(format!("{:.2}s", report.elapsed.as_secs_f64())).cyan()
    ))
    .ok();

    Ok(())
}

fn print_summary(term: &Term, report: &BenchmarkReport) {
    term.write_line("").ok();
    term.write_line(&format!("{} Benchmark Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {:<22} {:>7} {:>10} {:>9} {:>11}",
        style("method").bold(),
        style("workers").bold(),
        style("time").bold(),
        style("speedup").bold(),
        style("efficiency").bold()
    ))
    .ok();

    for record in &report.records {
        term.write_line(&format!(
            "  {:<22} {:>7} {:>9.2}s {:>9.2} {:>11.2}",
            record.method, record.workers, record.time, record.speedup, record.efficiency
        ))
        .ok();
    }

    for failure in &report.failures {
        term.write_line(&format!(
            "  {:<22} {:>7} {}",
            style(&failure.method).red(),
            failure.workers,
            style(format!("failed: {}", failure.message)).red()
        ))
        .ok();
    }

    term.write_line(&format!(
        "\n  total wall time: {}",
        style(format!("{:.1}s", report.total.as_secs_f64())).dim()
    ))
    .ok();
}
