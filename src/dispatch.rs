//! Frame workers for the multithreaded read benchmark
//!
//! ## How It Works
//!
//! 1. One shared atomic cursor indexes the file list
//! 2. M frame workers (plain threads) each own a private task pool of T threads
//! 3. A frame worker claims the next file with `fetch_add`, reads it in T row bands
//!    on its own pool, records the read time, and claims again until the list is
//!    exhausted
//!
//! At most `M * T` region reads are in flight. Every file is claimed by exactly one
//! frame worker, which is what lets result updates go without a lock.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::chunked::chunked_read;
use crate::codec::Codec;
use crate::error::{ProfileError, Result};
use crate::files::file_label;
use crate::pool::TaskPool;
use crate::results::{ResultsStore, SampleField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// From dispatch start until every frame worker has been joined
    pub elapsed: Duration,
    pub files: usize,
    /// Files whose read time was recorded
    pub completed: usize,
    /// Labels of the recorded files, sorted
    pub recorded: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct FileWorkerDispatcher {
    workers: usize,
    threads_per_file: usize,
}

impl FileWorkerDispatcher {
    pub fn new(workers: usize, threads_per_file: usize) -> Result<Self> {
        if workers == 0 || threads_per_file == 0 {
            return Err(ProfileError::InvalidConfig(format!(
                "workers ({}) and threads per file ({}) must be at least 1",
                workers, threads_per_file
            )));
        }
        Ok(Self { workers, threads_per_file })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn threads_per_file(&self) -> usize {
        self.threads_per_file
    }

    /// Read every file once and store its read time under its label.
    ///
    /// Every label in `files` must already be enrolled in `store`, once.
    pub fn run(
        &self,
        codec: &dyn Codec,
        files: &[PathBuf],
        store: &ResultsStore,
    ) -> DispatchOutcome {
        let cursor = AtomicUsize::new(0);

        let start = Instant::now();
        let mut recorded = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.workers)
                .filter_map(|worker_id| {
                    let cursor = &cursor;
                    let spawned = thread::Builder::new()
                        .name(format!("frame-worker-{}", worker_id))
                        .spawn_scoped(scope, move || {
                            self.frame_worker(codec, files, store, cursor)
                        });

                    match spawned {
                        Ok(handle) => Some(handle),
                        Err(e) => {
                            error!("Failed to spawn frame worker {}: {}", worker_id, e);
                            None
                        }
                    }
                })
                .collect();

            let mut recorded = Vec::new();
            for handle in handles {
                match handle.join() {
                    Ok(labels) => recorded.extend(labels),
                    Err(_) => {
                        error!("Frame worker exited abnormally, its recorded files are not counted")
                    }
                }
            }
            recorded
        });
        let elapsed = start.elapsed();
        recorded.sort();

        DispatchOutcome {
            elapsed,
            files: files.len(),
            completed: recorded.len(),
            recorded,
        }
    }

    /// Claim files until the list is exhausted; returns the labels it recorded.
    fn frame_worker(
        &self,
        codec: &dyn Codec,
        files: &[PathBuf],
        store: &ResultsStore,
        cursor: &AtomicUsize,
    ) -> Vec<String> {
        let mut recorded = Vec::new();
        let pool = match TaskPool::new(self.threads_per_file) {
            Ok(pool) => pool,
            Err(e) => {
                error!("Frame worker could not start its task pool: {}", e);
                return recorded;
            }
        };

        loop {
            let index = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(path) = files.get(index) else {
                break;
            };
            let label = file_label(path);

            match chunked_read(codec, path, self.threads_per_file, &pool) {
                Ok(read) if read.is_complete() => {
                    info!(
                        "{:>15}: {:.6} seconds ({})",
                        "decompression",
                        read.elapsed.as_secs_f64(),
                        label
                    );
                    let elapsed_ms = read.elapsed_ms();
                    match store.update_field(&label, SampleField::Decompression, elapsed_ms) {
                        Ok(()) => recorded.push(label),
                        Err(e) => error!("Cannot record read time: {}", e),
                    }
                }
                Ok(read) => {
                    warn!(
                        "{}: only {}/{} regions read, read time not recorded",
                        label, read.completed, read.regions
                    );
                }
                Err(e) => error!("Error reading {}: {}", label, e),
            }
        }

        recorded
    }
}
