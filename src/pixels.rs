//! Synthetic RGBA test images

use half::f16;
use rand::Rng;
use rayon::prelude::*;

pub type Rgba = (f16, f16, f16, f16);

/// Row-major half float RGBA pixels.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Horizontal ramp with per-channel noise and opaque alpha.
    ///
    /// Noise keeps the lossless codecs from collapsing the image into a few bytes.
    pub fn synthetic(width: usize, height: usize) -> Self {
        let total = (width * height).max(1) as f32;
        let mut pixels = vec![(f16::ZERO, f16::ZERO, f16::ZERO, f16::ONE); width * height];

        pixels
            .par_chunks_mut(width.max(1))
            .enumerate()
            .for_each_init(rand::thread_rng, |rng, (y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    let ramp = (y * width + x) as f32 / total;
                    let mut noisy = || {
                        (rng.gen_range(0.0f32..0.5) + rng.gen_range(-0.15f32..0.15)).clamp(0.0, 1.0)
                    };
                    let (r, g, b) = (noisy(), noisy(), noisy());

                    *pixel = (
                        f16::from_f32(ramp + r),
                        f16::from_f32((1.0 - ramp) + g),
                        f16::from_f32(b),
                        f16::ONE,
                    );
                }
            });

        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Pixel at column `x` of row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_dimensions() {
        let buffer = PixelBuffer::synthetic(64, 48);
        assert_eq!(buffer.width(), 64);
        assert_eq!(buffer.height(), 48);
        assert_eq!(buffer.pixels().len(), 64 * 48);
    }

    #[test]
    fn test_synthetic_alpha_opaque_and_channels_bounded() {
        let buffer = PixelBuffer::synthetic(32, 32);
        for &(r, g, b, a) in buffer.pixels() {
            assert_eq!(a, f16::ONE);
            assert!(r.to_f32() >= 0.0 && r.to_f32() <= 2.0);
            assert!(g.to_f32() >= 0.0 && g.to_f32() <= 2.0);
            assert!(b.to_f32() >= 0.0 && b.to_f32() <= 1.0);
        }
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = PixelBuffer::synthetic(0, 0);
        assert!(buffer.pixels().is_empty());
    }
}
