//! # Report Module
//!
//! Persists benchmark records.
//!
//! CSV columns are fixed: `method, workers, time, speedup, efficiency` -
//! one row per tested configuration plus one for the sequential baseline.
//! JSON export carries the same records plus any configuration failures.

use crate::core::benchmark::BenchmarkReport;
use crate::error::ReportError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write benchmark records as CSV
pub fn export_csv<W: Write>(report: &BenchmarkReport, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "method,workers,time,speedup,efficiency")?;

    for record in &report.records {
        writeln!(
            writer,
            "{},{},{:.6},{:.4},{:.4}",
            record.method, record.workers, record.time, record.speedup, record.efficiency
        )?;
    }

    Ok(())
}

/// Write benchmark records (and failures) as pretty-printed JSON
pub fn export_json<W: Write>(report: &BenchmarkReport, mut writer: W) -> std::io::Result<()> {
    let output = serde_json::json!({
        "records": report.records,
        "failures": report.failures,
        "total_secs": report.total.as_secs_f64(),
    });
    let rendered = serde_json::to_string_pretty(&output)?;
    writeln!(writer, "{rendered}")
}

/// Write the CSV report to a file path
pub fn write_csv(report: &BenchmarkReport, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    export_csv(report, BufWriter::new(file)).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the JSON report to a file path
pub fn write_json(report: &BenchmarkReport, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    export_json(report, BufWriter::new(file)).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::benchmark::{BenchmarkRecord, ConfigFailure};
    use std::time::Duration;

    fn sample_report() -> BenchmarkReport {
        BenchmarkReport {
            records: vec![
                BenchmarkRecord {
                    method: "sequential".to_string(),
                    workers: 1,
                    time: 8.0,
                    speedup: 1.0,
                    efficiency: 1.0,
                },
                BenchmarkRecord {
                    method: "process-pool".to_string(),
                    workers: 4,
                    time: 2.5,
                    speedup: 3.2,
                    efficiency: 0.8,
                },
            ],
            failures: vec![ConfigFailure {
                method: "thread-pool".to_string(),
                workers: 2,
                message: "worker exploded".to_string(),
            }],
            total: Duration::from_secs_f64(12.5),
        }
    }

    #[test]
    fn csv_has_the_fixed_header_and_one_row_per_record() {
        let mut buffer = Vec::new();
        export_csv(&sample_report(), &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "method,workers,time,speedup,efficiency");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("sequential,1,"));
        assert!(lines[2].starts_with("process-pool,4,"));
    }

    #[test]
    fn csv_baseline_row_shows_unit_ratios() {
        let mut buffer = Vec::new();
        export_csv(&sample_report(), &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let baseline = text.lines().nth(1).unwrap();
        assert!(baseline.ends_with("1.0000,1.0000"));
    }

    #[test]
    fn json_round_trips_records_and_failures() {
        let mut buffer = Vec::new();
        export_json(&sample_report(), &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["records"].as_array().unwrap().len(), 2);
        assert_eq!(value["failures"][0]["method"], "thread-pool");
        assert!(value["total_secs"].as_f64().unwrap() > 12.0);
    }

    #[test]
    fn write_csv_reports_the_failing_path() {
        let result = write_csv(
            &sample_report(),
            Path::new("/nonexistent/dir/results.csv"),
        );
        match result {
            Err(ReportError::Write { path, .. }) => {
                assert!(path.ends_with("results.csv"));
            }
            Ok(()) => panic!("expected write to fail"),
        }
    }
}
