//! OpenEXR codec backed by the `exr` crate
//!
//! ## Region reads
//!
//! Every `read_rows` call opens its own file handle, so bands of one file can be
//! decoded by several threads at once. Only the chunks of the first layer's full
//! resolution level that intersect the band are decompressed, and only the band's
//! rows are copied out of them:
//!
//! ```text
//! chunk (16 lines, ZIP)      band rows 10..=21
//!  line  0 ── skipped
//!  ...
//!  line 10 ── copied to buffer row 0
//!  line 15 ── copied to buffer row 5
//! next chunk
//!  line 16 ── copied to buffer row 6
//!  line 21 ── copied to buffer row 11
//!  line 22 ── skipped
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use exr::block::reader::{ChunksReader, Reader};
use exr::block::UncompressedBlock;
use exr::image::pixel_vec::PixelVec;
use exr::meta::MetaData;
use exr::prelude::*;
use tracing::debug;

use crate::codec::{Codec, CompressionMethod, DataWindow, RegionSource};
use crate::error::{ProfileError, Result};
use crate::pixels::PixelBuffer;
use crate::region::RowBand;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExrCodec;

impl ExrCodec {
    pub fn new() -> Self {
        Self
    }
}

impl CompressionMethod {
    fn to_exr(self) -> Compression {
        match self {
            CompressionMethod::None => Compression::Uncompressed,
            CompressionMethod::Rle => Compression::RLE,
            CompressionMethod::Zips => Compression::ZIP1,
            CompressionMethod::Zip => Compression::ZIP16,
            CompressionMethod::Piz => Compression::PIZ,
            CompressionMethod::Pxr24 => Compression::PXR24,
            CompressionMethod::B44 => Compression::B44,
            CompressionMethod::B44a => Compression::B44A,
            CompressionMethod::Dwaa => Compression::DWAA(None),
            CompressionMethod::Dwab => Compression::DWAB(None),
        }
    }
}

impl Codec for ExrCodec {
    fn extension(&self) -> &str {
        "exr"
    }

    fn encode(
        &self,
        pixels: &PixelBuffer,
        path: &Path,
        method: CompressionMethod,
        threads: usize,
    ) -> Result<()> {
        let encoding = Encoding {
            compression: method.to_exr(),
            blocks: Blocks::ScanLines,
            line_order: LineOrder::Increasing,
        };

        let layer = Layer::new(
            (pixels.width(), pixels.height()),
            LayerAttributes::default(),
            encoding,
            SpecificChannels::rgba(|Vec2(x, y): Vec2<usize>| pixels.get(x, y)),
        );

        let image = Image::from_layer(layer);
        let writer = image.write();
        let writer = if threads <= 1 { writer.non_parallel() } else { writer };
        writer.to_file(path)?;

        debug!("Encoded {} with {}", path.display(), method.name());
        Ok(())
    }

    fn decode(&self, path: &Path, threads: usize) -> Result<()> {
        let reader = read()
            .no_deep_data()
            .largest_resolution_level()
            .rgba_channels(PixelVec::<(f32, f32, f32, f32)>::constructor, PixelVec::set_pixel)
            .first_valid_layer()
            .all_attributes();
        let reader = if threads <= 1 { reader.non_parallel() } else { reader };

        let image = reader.from_file(path)?;
        debug!(
            "Decoded {} ({}x{})",
            path.display(),
            image.layer_data.size.x(),
            image.layer_data.size.y()
        );
        Ok(())
    }

    fn open(&self, path: &Path) -> Result<Arc<dyn RegionSource>> {
        Ok(Arc::new(ExrRegionSource::open(path)?))
    }
}

/// Header information of an EXR file plus its path for per-band reopening.
#[derive(Debug)]
pub struct ExrRegionSource {
    path: PathBuf,
    window: DataWindow,
    bytes_per_pixel: usize,
}

impl ExrRegionSource {
    pub fn open(path: &Path) -> Result<Self> {
        let meta = MetaData::read_from_file(path, false)?;
        let header = meta
            .headers
            .first()
            .ok_or_else(|| {
                ProfileError::InvalidImage(format!("{} has no layers", path.display()))
            })?;

        let position = header.own_attributes.layer_position;
        let window = DataWindow::from_position_size(
            position.x(),
            position.y(),
            header.layer_size.x(),
            header.layer_size.y(),
        );

        Ok(Self {
            path: path.to_path_buf(),
            window,
            bytes_per_pixel: header.channels.bytes_per_pixel,
        })
    }
}

impl RegionSource for ExrRegionSource {
    fn data_window(&self) -> DataWindow {
        self.window
    }

    fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    fn read_rows(&self, band: RowBand, buffer: &mut [u8]) -> Result<()> {
        let target = BandTarget::new(self.window, band, self.bytes_per_pixel)?;
        if buffer.len() != target.buffer_len() {
            return Err(ProfileError::RegionBuffer(format!(
                "expected {} bytes for rows {}..={}, got {}",
                target.buffer_len(),
                band.y_start,
                band.y_end,
                buffer.len()
            )));
        }

        let file = BufReader::new(File::open(&self.path)?);
        let reader = Reader::read_from_buffered(file, false)?;

        let chunks = reader.filter_chunks(false, |_meta, _tile, block| {
            block.layer == 0
                && block.level == Vec2(0, 0)
                && target.intersects(block.pixel_position.y(), block.pixel_size.y())
        })?;

        let mut copy_error = None;
        chunks.decompress_sequential(false, |_meta, block: UncompressedBlock| {
            if copy_error.is_none() {
                if let Err(e) = target.copy_block(&block, buffer) {
                    copy_error = Some(e);
                }
            }
            Ok(())
        })?;

        match copy_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Band rows relative to the data window, for mapping chunk lines into a band buffer.
#[derive(Debug, Clone, Copy)]
struct BandTarget {
    first_row: usize,
    last_row: usize,
    width: usize,
    bytes_per_pixel: usize,
}

impl BandTarget {
    fn new(window: DataWindow, band: RowBand, bytes_per_pixel: usize) -> Result<Self> {
        if band.y_start < window.y_min || band.y_end > window.y_max || band.y_end < band.y_start {
            return Err(ProfileError::RegionBuffer(format!(
                "rows {}..={} outside data window {}..={}",
                band.y_start, band.y_end, window.y_min, window.y_max
            )));
        }

        Ok(Self {
            first_row: (i64::from(band.y_start) - i64::from(window.y_min)) as usize,
            last_row: (i64::from(band.y_end) - i64::from(window.y_min)) as usize,
            width: band.width,
            bytes_per_pixel,
        })
    }

    fn buffer_len(&self) -> usize {
        (self.last_row - self.first_row + 1) * self.width * self.bytes_per_pixel
    }

    fn intersects(&self, block_y: usize, block_rows: usize) -> bool {
        block_y <= self.last_row && block_y + block_rows > self.first_row
    }

    fn copy_block(&self, block: &UncompressedBlock, buffer: &mut [u8]) -> Result<()> {
        self.copy_lines(
            (block.index.pixel_position.x(), block.index.pixel_position.y()),
            (block.index.pixel_size.x(), block.index.pixel_size.y()),
            &block.data,
            buffer,
        )
    }

    /// Copy the lines of a decompressed chunk that fall inside the band.
    fn copy_lines(
        &self,
        (block_x, block_y): (usize, usize),
        (block_width, block_rows): (usize, usize),
        data: &[u8],
        buffer: &mut [u8],
    ) -> Result<()> {
        let line_bytes = block_width * self.bytes_per_pixel;

        for line in 0..block_rows {
            let row = block_y + line;
            if row < self.first_row || row > self.last_row {
                continue;
            }

            let source = data.get(line * line_bytes..(line + 1) * line_bytes);
            let offset = ((row - self.first_row) * self.width + block_x) * self.bytes_per_pixel;
            let destination = buffer.get_mut(offset..offset + line_bytes);

            match (source, destination) {
                (Some(source), Some(destination)) => destination.copy_from_slice(source),
                _ => {
                    return Err(ProfileError::RegionBuffer(format!(
                        "chunk line {} does not fit the band buffer",
                        row
                    )))
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> BandTarget {
        let window = DataWindow::from_position_size(0, 0, 2, 32);
        BandTarget::new(window, RowBand { y_start: 10, y_end: 21, width: 2 }, 1).unwrap()
    }

    #[test]
    fn test_intersects() {
        let target = target();
        assert!(!target.intersects(0, 10));
        assert!(target.intersects(0, 11));
        assert!(target.intersects(16, 16));
        assert!(!target.intersects(22, 10));
    }

    #[test]
    fn test_copy_lines_only_band_rows() {
        let target = target();
        let mut buffer = vec![0u8; target.buffer_len()];
        assert_eq!(buffer.len(), 24);

        // 16 line chunk, each line tagged with its row number
        let first: Vec<u8> = (0..16u8).flat_map(|row| [row, row]).collect();
        let second: Vec<u8> = (16..32u8).flat_map(|row| [row, row]).collect();
        target.copy_lines((0, 0), (2, 16), &first, &mut buffer).unwrap();
        target.copy_lines((0, 16), (2, 16), &second, &mut buffer).unwrap();

        let expected: Vec<u8> = (10..=21u8).flat_map(|row| [row, row]).collect();
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_copy_lines_short_chunk_rejected() {
        let target = target();
        let mut buffer = vec![0u8; target.buffer_len()];
        let short = vec![0u8; 4];
        assert!(target.copy_lines((0, 8), (2, 16), &short, &mut buffer).is_err());
    }

    #[test]
    fn test_band_outside_window_rejected() {
        let window = DataWindow::from_position_size(0, 0, 2, 8);
        let band = RowBand { y_start: 4, y_end: 9, width: 2 };
        assert!(BandTarget::new(window, band, 8).is_err());
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(CompressionMethod::Zip.to_exr(), Compression::ZIP16);
        assert_eq!(CompressionMethod::Zips.to_exr(), Compression::ZIP1);
        assert_eq!(CompressionMethod::None.to_exr(), Compression::Uncompressed);
    }
}
