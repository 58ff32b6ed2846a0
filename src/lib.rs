//! exr_profile - OpenEXR compression and multithreaded read benchmarks
//!
//! Two benchmarks share one scheduling and aggregation core:
//! - **Codec sweep**: encode and decode a synthetic image with every compression method
//! - **Multithreaded read**: frame workers read files concurrently, each file split into
//!   row bands decoded on the worker's private task pool

pub mod chunked;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod exr_codec;
pub mod files;
pub mod pixels;
pub mod pool;
pub mod profile;
pub mod region;
pub mod report;
pub mod results;
pub mod stats;

pub use chunked::{chunked_read, ChunkedRead};
pub use codec::{Codec, CompressionMethod, DataWindow, RegionSource};
pub use config::{Args, Mode, ProfileConfig};
pub use dispatch::{DispatchOutcome, FileWorkerDispatcher};
pub use error::{ProfileError, Result};
pub use exr_codec::ExrCodec;
pub use pixels::PixelBuffer;
pub use pool::TaskPool;
pub use profile::{run_codec_sweep, run_read_benchmark, ReadBenchmark, SweepOptions};
pub use region::{compute_bands, read_region, RowBand};
pub use report::ReportPrinter;
pub use results::{ResultsStore, Sample, SampleField};
pub use stats::StatsSummary;
