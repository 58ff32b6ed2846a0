//! Row-band regions and the per-band reader

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tracing::{debug, error};

use crate::codec::{DataWindow, RegionSource};

/// Contiguous horizontal slice of an image, rows `y_start..=y_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    pub y_start: i32,
    pub y_end: i32,
    pub width: usize,
}

impl RowBand {
    pub fn rows(&self) -> usize {
        (i64::from(self.y_end) - i64::from(self.y_start) + 1).max(0) as usize
    }
}

/// Split the rows of `window` into contiguous bands, one per thread.
///
/// Parallelism is clamped to the image height so no band is ever empty. Every band
/// gets `height / n` rows and the last one also takes the remainder.
pub fn compute_bands(window: DataWindow, thread_count: usize) -> Vec<RowBand> {
    let height = window.height();
    let bands = thread_count.min(height);
    if bands == 0 {
        return Vec::new();
    }

    let chunk_size = (height / bands) as i64;
    let width = window.width();

    (0..bands)
        .map(|i| {
            let y_start = i64::from(window.y_min) + i as i64 * chunk_size;
            let y_end = if i == bands - 1 {
                i64::from(window.y_max)
            } else {
                y_start + chunk_size - 1
            };
            RowBand {
                y_start: y_start as i32,
                y_end: y_end as i32,
                width,
            }
        })
        .collect()
}

/// Decode one band into a private buffer and count it as completed.
///
/// Failures are logged and leave `completed` untouched.
pub fn read_region(source: &dyn RegionSource, band: RowBand, completed: &AtomicUsize) {
    let mut pixels = vec![0u8; band.rows() * band.width * source.bytes_per_pixel()];

    match source.read_rows(band, &mut pixels) {
        Ok(()) => {
            completed.fetch_add(1, Ordering::Relaxed);
            let current = thread::current();
            debug!(
                "Read region from Y: {} to Y: {} by {}",
                band.y_start,
                band.y_end,
                current.name().unwrap_or("unnamed")
            );
        }
        Err(e) => {
            error!(
                "Error reading region Y: {} to Y: {}: {}",
                band.y_start, band.y_end, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProfileError, Result};

    fn assert_partition(window: DataWindow, bands: &[RowBand]) {
        let mut next = window.y_min;
        for band in bands {
            assert_eq!(band.y_start, next, "bands must be contiguous");
            assert!(band.y_end >= band.y_start, "empty band {:?}", band);
            assert_eq!(band.width, window.width());
            next = band.y_end + 1;
        }
        assert_eq!(next, window.y_max + 1, "bands must end at y_max");
    }

    #[test]
    fn test_bands_cover_window_exactly_once() {
        for height in 1..=64 {
            for threads in 1..=12 {
                let window = DataWindow::from_position_size(0, -7, 16, height);
                let bands = compute_bands(window, threads);
                assert_eq!(bands.len(), threads.min(height));
                assert_partition(window, &bands);
            }
        }
    }

    #[test]
    fn test_last_band_absorbs_remainder() {
        let window = DataWindow::from_position_size(0, 0, 8, 10);
        let bands = compute_bands(window, 3);
        let rows: Vec<_> = bands.iter().map(RowBand::rows).collect();
        assert_eq!(rows, vec![3, 3, 4]);
        assert_eq!(bands[2].y_end, 9);
    }

    #[test]
    fn test_threads_clamped_to_height() {
        let window = DataWindow::from_position_size(0, 100, 4, 3);
        let bands = compute_bands(window, 8);
        assert_eq!(bands.len(), 3);
        assert!(bands.iter().all(|b| b.rows() == 1));
    }

    #[test]
    fn test_no_bands_for_empty_window_or_zero_threads() {
        let empty = DataWindow::from_position_size(0, 0, 4, 0);
        assert!(compute_bands(empty, 4).is_empty());

        let window = DataWindow::from_position_size(0, 0, 4, 4);
        assert!(compute_bands(window, 0).is_empty());
    }

    struct StubSource {
        fail: bool,
    }

    impl RegionSource for StubSource {
        fn data_window(&self) -> DataWindow {
            DataWindow::from_position_size(0, 0, 4, 8)
        }

        fn bytes_per_pixel(&self) -> usize {
            8
        }

        fn read_rows(&self, band: RowBand, buffer: &mut [u8]) -> Result<()> {
            assert_eq!(buffer.len(), band.rows() * band.width * 8);
            if self.fail {
                return Err(ProfileError::InvalidImage("corrupt chunk".to_string()));
            }
            buffer.fill(1);
            Ok(())
        }
    }

    #[test]
    fn test_read_region_counts_success_only() {
        let completed = AtomicUsize::new(0);
        let band = RowBand { y_start: 0, y_end: 3, width: 4 };

        read_region(&StubSource { fail: false }, band, &completed);
        assert_eq!(completed.load(Ordering::Relaxed), 1);

        read_region(&StubSource { fail: true }, band, &completed);
        assert_eq!(completed.load(Ordering::Relaxed), 1);
    }
}
