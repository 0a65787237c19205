//! # pipeline-bench CLI
//!
//! Command-line interface for the image pipeline benchmark.
//!
//! ## Usage
//! ```bash
//! pipeline-bench bench data/input/images --limit 200
//! pipeline-bench run data/input/images --strategy thread-pool --workers 4
//! ```

mod cli;

use image_pipeline_bench::Result;

fn main() -> Result<()> {
    image_pipeline_bench::init_tracing();
    cli::run()
}
