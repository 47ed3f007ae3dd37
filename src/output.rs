use crate::errors::{AppError, AppResult};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Size and timing of one written table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteSummary {
    pub rows: usize,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl WriteSummary {
    /// Output size in MB, rounded to two decimals.
    pub fn size_mb(&self) -> f64 {
        round_two_decimals(self.bytes as f64 / BYTES_PER_MB)
    }

    /// MB written per second of query time; the whole size when no time elapsed.
    pub fn throughput_mb_s(&self) -> f64 {
        let mb = self.bytes as f64 / BYTES_PER_MB;
        let secs = self.elapsed.as_secs_f64();
        round_two_decimals(if secs > 0.0 { mb / secs } else { mb })
    }

    /// Rows per second of query time.
    pub fn rows_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            round_two_decimals(self.rows as f64 / secs)
        } else {
            self.rows as f64
        }
    }

    /// Elapsed time as `HH:MM:SS`.
    pub fn elapsed_hms(&self) -> String {
        let total = self.elapsed.as_secs();
        format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    }
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Writes `df` as a Parquet file and returns what was written.
///
/// Parent directories are created when missing. `started` is the moment the query began,
/// used for the elapsed time and throughput logged on completion.
pub fn write_parquet(df: &mut DataFrame, path: &Path, started: Instant) -> AppResult<WriteSummary> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::IoError(format!(
                "Failed to create output directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let mut file = File::create(path).map_err(|e| {
        AppError::IoError(format!("Failed to create Parquet file {}: {e}", path.display()))
    })?;
    ParquetWriter::new(&mut file)
        .finish(df)
        .map_err(|e| AppError::IoError(format!("Failed to write Parquet file: {e}")))?;

    let bytes = fs::metadata(path)
        .map_err(|e| {
            AppError::IoError(format!(
                "Failed to read Parquet file metadata {}: {e}",
                path.display()
            ))
        })?
        .len();

    let summary = WriteSummary {
        rows: df.height(),
        bytes,
        elapsed: started.elapsed(),
    };
    info!(
        path = %path.display(),
        rows = summary.rows,
        columns = df.width(),
        elapsed = summary.elapsed_hms(),
        output_size_mb = summary.size_mb(),
        throughput_mb_s = summary.throughput_mb_s(),
        rows_per_sec = summary.rows_per_sec(),
        "Parquet file written"
    );

    Ok(summary)
}
