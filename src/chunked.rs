//! Chunked multithreaded read of a single file

use crossbeam_channel::bounded;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::codec::Codec;
use crate::error::Result;
use crate::pool::TaskPool;
use crate::region::{compute_bands, read_region};

/// Outcome of one chunked read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkedRead {
    /// Wall-clock time from band submission until the last band finished
    pub elapsed: Duration,
    pub regions: usize,
    pub completed: usize,
}

impl ChunkedRead {
    /// Every band decoded without error
    pub fn is_complete(&self) -> bool {
        self.completed == self.regions
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Read `path` as `thread_count` row bands decoded on `pool`.
///
/// Opening the file is not part of the measured time. Band failures are logged by
/// the band itself and show up as `completed < regions`.
pub fn chunked_read(
    codec: &dyn Codec,
    path: &Path,
    thread_count: usize,
    pool: &TaskPool,
) -> Result<ChunkedRead> {
    let source = codec.open(path)?;
    let bands = compute_bands(source.data_window(), thread_count);
    let regions = bands.len();
    let completed = Arc::new(AtomicUsize::new(0));

    // Nothing is ever sent: the receiver disconnects once every band task has
    // dropped its sender, whether the band succeeded, failed or panicked.
    let (done_tx, done_rx) = bounded::<()>(0);

    let start = Instant::now();
    for band in bands {
        let source = Arc::clone(&source);
        let completed = Arc::clone(&completed);
        let done = done_tx.clone();
        pool.enqueue(move || {
            read_region(source.as_ref(), band, &completed);
            drop(done);
        });
    }
    drop(done_tx);

    let _ = done_rx.recv();
    let elapsed = start.elapsed();

    let completed = completed.load(Ordering::Relaxed);
    debug!(
        "{}: all regions read in {:?}, completed {}/{}",
        path.display(),
        elapsed,
        completed,
        regions
    );

    Ok(ChunkedRead { elapsed, regions, completed })
}
