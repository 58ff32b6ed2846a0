//! Codec interface
//!
//! The benchmark core only talks to the image codec through these traits, so the
//! scheduling and aggregation code can be driven by the real OpenEXR codec or by a
//! test double.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::pixels::PixelBuffer;
use crate::region::RowBand;

/// Inclusive pixel bounds of an image's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataWindow {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl DataWindow {
    /// Window starting at `(x, y)` spanning `width` x `height` pixels.
    pub fn from_position_size(x: i32, y: i32, width: usize, height: usize) -> Self {
        Self {
            x_min: x,
            y_min: y,
            x_max: (i64::from(x) + width as i64 - 1) as i32,
            y_max: (i64::from(y) + height as i64 - 1) as i32,
        }
    }

    pub fn width(&self) -> usize {
        (i64::from(self.x_max) - i64::from(self.x_min) + 1).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (i64::from(self.y_max) - i64::from(self.y_min) + 1).max(0) as usize
    }
}

/// Compression methods of the OpenEXR format, in format id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    None,
    Rle,
    Zips,
    Zip,
    Piz,
    Pxr24,
    B44,
    B44a,
    Dwaa,
    Dwab,
}

impl CompressionMethod {
    pub const ALL: [CompressionMethod; 10] = [
        CompressionMethod::None,
        CompressionMethod::Rle,
        CompressionMethod::Zips,
        CompressionMethod::Zip,
        CompressionMethod::Piz,
        CompressionMethod::Pxr24,
        CompressionMethod::B44,
        CompressionMethod::B44a,
        CompressionMethod::Dwaa,
        CompressionMethod::Dwab,
    ];

    /// Short name, used as result label and file name component
    pub fn name(&self) -> &'static str {
        match self {
            CompressionMethod::None => "none",
            CompressionMethod::Rle => "rle",
            CompressionMethod::Zips => "zips",
            CompressionMethod::Zip => "zip",
            CompressionMethod::Piz => "piz",
            CompressionMethod::Pxr24 => "pxr24",
            CompressionMethod::B44 => "b44",
            CompressionMethod::B44a => "b44a",
            CompressionMethod::Dwaa => "dwaa",
            CompressionMethod::Dwab => "dwab",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CompressionMethod::None => "no compression",
            CompressionMethod::Rle => "run length encoding",
            CompressionMethod::Zips => "zlib compression, one scan line at a time",
            CompressionMethod::Zip => "zlib compression, in blocks of 16 scan lines",
            CompressionMethod::Piz => "piz-based wavelet compression, in blocks of 32 scan lines",
            CompressionMethod::Pxr24 => {
                "lossy 24-bit float compression, in blocks of 16 scan lines"
            }
            CompressionMethod::B44 => {
                "lossy 4-by-4 pixel block compression, fixed compression rate"
            }
            CompressionMethod::B44a => {
                "lossy 4-by-4 pixel block compression, flat fields are compressed more"
            }
            CompressionMethod::Dwaa => "lossy DCT based compression, in blocks of 32 scanlines",
            CompressionMethod::Dwab => "lossy DCT based compression, in blocks of 256 scanlines",
        }
    }
}

/// An opened image whose rows can be decoded band by band from several threads.
pub trait RegionSource: Send + Sync {
    fn data_window(&self) -> DataWindow;

    /// Size of one decoded pixel across all channels.
    fn bytes_per_pixel(&self) -> usize;

    /// Decode exactly the rows of `band` into `buffer`.
    ///
    /// `buffer` must be `band.rows() * band.width * bytes_per_pixel()` bytes long;
    /// row `band.y_start` lands at offset 0.
    fn read_rows(&self, band: RowBand, buffer: &mut [u8]) -> Result<()>;
}

/// Image codec used by the benchmarks.
///
/// `threads` is passed on every call instead of being configured process-wide, so
/// concurrent frame workers never reconfigure shared codec state.
pub trait Codec: Send + Sync {
    /// File extension of encoded files, without the dot
    fn extension(&self) -> &str;

    fn encode(
        &self,
        pixels: &PixelBuffer,
        path: &Path,
        method: CompressionMethod,
        threads: usize,
    ) -> Result<()>;

    /// Decode the whole image and discard the pixels.
    fn decode(&self, path: &Path, threads: usize) -> Result<()>;

    fn open(&self, path: &Path) -> Result<Arc<dyn RegionSource>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_data_window_dimensions() {
        let window = DataWindow::from_position_size(-4, 10, 32, 17);
        assert_eq!(window.x_max, 27);
        assert_eq!(window.y_max, 26);
        assert_eq!(window.width(), 32);
        assert_eq!(window.height(), 17);
    }

    #[test]
    fn test_empty_data_window() {
        let window = DataWindow::from_position_size(0, 0, 0, 0);
        assert_eq!(window.width(), 0);
        assert_eq!(window.height(), 0);
    }

    #[test]
    fn test_method_names_unique() {
        let names: HashSet<_> = CompressionMethod::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(names.len(), CompressionMethod::ALL.len());
        assert!(CompressionMethod::ALL.iter().all(|m| !m.description().is_empty()));
    }
}
