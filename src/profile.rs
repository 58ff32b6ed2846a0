//! Benchmark orchestration: codec sweep and multithreaded read

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

use crate::codec::{Codec, CompressionMethod};
use crate::dispatch::{DispatchOutcome, FileWorkerDispatcher};
use crate::error::{ProfileError, Result};
use crate::files::{delete_file, file_label, file_size};
use crate::pixels::PixelBuffer;
use crate::results::{ResultsStore, Sample, SampleField};
use crate::stats::StatsSummary;

#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub prefix: String,
    pub width: usize,
    pub height: usize,
    pub threads: usize,
    pub cleanup: bool,
    pub methods: Vec<CompressionMethod>,
}

impl SweepOptions {
    /// Every compression method over a square image.
    pub fn new(prefix: impl Into<String>, size: usize, threads: usize) -> Self {
        Self {
            prefix: prefix.into(),
            width: size,
            height: size,
            threads,
            cleanup: false,
            methods: CompressionMethod::ALL.to_vec(),
        }
    }

    pub fn file_name(&self, codec: &dyn Codec, method: CompressionMethod) -> PathBuf {
        PathBuf::from(format!("{}{}.{}", self.prefix, method.name(), codec.extension()))
    }
}

/// Encode and decode a synthetic image with every method, one sample per method.
///
/// An encode or decode failure skips that method; a missing output file is fatal.
pub fn run_codec_sweep(codec: &dyn Codec, options: &SweepOptions) -> Result<ResultsStore> {
    info!(
        "=== Generating random data: {}x{}, threads {} ===",
        options.width, options.height, options.threads
    );
    let pixels = PixelBuffer::synthetic(options.width, options.height);

    info!("=== Profiling compressions ===");
    let mut results = ResultsStore::new();
    for &method in &options.methods {
        let path = options.file_name(codec, method);
        if let Some(sample) = profile_method(codec, &pixels, &path, method, options.threads)? {
            results.enroll(method.name(), sample);
        }

        if options.cleanup {
            delete_file(&path);
        }
    }

    Ok(results)
}

fn profile_method(
    codec: &dyn Codec,
    pixels: &PixelBuffer,
    path: &Path,
    method: CompressionMethod,
    threads: usize,
) -> Result<Option<Sample>> {
    let start = Instant::now();
    if let Err(e) = codec.encode(pixels, path, method, threads) {
        error!("Error saving {} ({}): {}", path.display(), method.name(), e);
        return Ok(None);
    }
    let compression = start.elapsed();

    let size = file_size(path)?;
    info!("=== {} ===", method.description());
    info!("{:>15}: {:.6} seconds", "compression", compression.as_secs_f64());

    let start = Instant::now();
    if let Err(e) = codec.decode(path, threads) {
        error!("Error loading {} ({}): {}", path.display(), method.name(), e);
        return Ok(None);
    }
    let decompression = start.elapsed();
    info!("{:>15}: {:.6} seconds", "decompression", decompression.as_secs_f64());

    Ok(Some(Sample::new(
        compression.as_millis() as u64,
        decompression.as_millis() as u64,
        size,
    )))
}

#[derive(Debug)]
pub struct ReadBenchmark {
    pub results: ResultsStore,
    pub outcome: DispatchOutcome,
}

impl ReadBenchmark {
    /// Statistics over the read times that were actually recorded.
    ///
    /// Files whose read failed keep their enrolled placeholder and are left out.
    pub fn read_stats(&self, want_median: bool) -> StatsSummary<u64> {
        let read_times: Vec<u64> = self
            .outcome
            .recorded
            .iter()
            .filter_map(|label| self.results.get(label))
            .map(|sample| sample.field(SampleField::Decompression))
            .collect();
        StatsSummary::compute(&read_times, want_median)
    }
}

/// Read every file with `workers` frame workers of `threads` threads each.
///
/// All files are enrolled with their size before any worker starts, so a file that
/// cannot be stat'ed or a file listed twice aborts the benchmark up front.
pub fn run_read_benchmark(
    codec: &dyn Codec,
    files: &[PathBuf],
    workers: usize,
    threads: usize,
) -> Result<ReadBenchmark> {
    let dispatcher = FileWorkerDispatcher::new(workers, threads)?;
    info!(
        "=== Profiling read from a file with {} threads per frame, and {} worker frames",
        threads, workers
    );

    let mut results = ResultsStore::new();
    for path in files {
        let label = file_label(path);
        if results.contains(&label) {
            return Err(ProfileError::InvalidConfig(format!(
                "{} is listed more than once",
                label
            )));
        }
        results.enroll(label, Sample::new(0, 0, file_size(path)?));
    }

    let outcome = dispatcher.run(codec, files, &results);
    info!(
        "Read {}/{} files in {:.6} seconds",
        outcome.completed,
        outcome.files,
        outcome.elapsed.as_secs_f64()
    );

    Ok(ReadBenchmark { results, outcome })
}
