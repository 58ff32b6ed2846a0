//! Command line options and the validated run configuration

use clap::Parser;
use std::path::PathBuf;

use crate::error::{ProfileError, Result};
use crate::files::{dedup_files, read_file_list};

/// Edge length of the synthetic sweep image per unit of scale
pub const BASE_SIZE: usize = 1024;
pub const MAX_SCALE: usize = 32;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "exr_profile",
    version,
    about = "EXR Profiler - codec sweep and multithreaded read benchmark"
)]
pub struct Args {
    /// Prefix of the EXR files written by the codec sweep
    #[arg(short, long, default_value = "./test_")]
    pub prefix: String,

    /// Number of threads per frame
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    /// Number of frame workers (each with its own threads)
    #[arg(short, long, default_value_t = 1)]
    pub workers: usize,

    /// Multiple of a 1Kx1K test image
    #[arg(short, long, default_value_t = 1)]
    pub scale: usize,

    /// Delete the sweep files afterwards
    #[arg(short, long)]
    pub clean: bool,

    /// Debug logging and summary statistics
    #[arg(short, long)]
    pub verbose: bool,

    /// Profile multithreaded reading instead of running the codec sweep
    #[arg(short, long)]
    pub read: bool,

    /// Files to use for multithreaded reading
    #[arg(short, long, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Text file listing files to read, one per line
    #[arg(short = 'l', long)]
    pub file_list: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    CodecSweep,
    /// Resolved, non-empty, duplicate free input files
    Read(Vec<PathBuf>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub prefix: String,
    pub threads: usize,
    pub workers: usize,
    pub scale: usize,
    pub cleanup: bool,
    pub verbose: bool,
    pub json: bool,
    pub mode: Mode,
}

impl ProfileConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.threads == 0 {
            return Err(ProfileError::InvalidConfig("--threads must be at least 1".to_string()));
        }
        if args.workers == 0 {
            return Err(ProfileError::InvalidConfig("--workers must be at least 1".to_string()));
        }

        let mode = if args.read {
            let mut files = args.files;
            if let Some(list) = &args.file_list {
                files.extend(read_file_list(list)?);
            }
            let files = dedup_files(files);
            if files.is_empty() {
                return Err(ProfileError::NoInputFiles);
            }
            Mode::Read(files)
        } else {
            Mode::CodecSweep
        };

        Ok(Self {
            prefix: args.prefix,
            threads: args.threads,
            workers: args.workers,
            scale: args.scale.clamp(1, MAX_SCALE),
            cleanup: args.clean,
            verbose: args.verbose,
            json: args.json,
            mode,
        })
    }

    /// Edge length of the square sweep image
    pub fn image_size(&self) -> usize {
        self.scale * BASE_SIZE
    }
}
