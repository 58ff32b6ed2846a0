// exr_profile - OpenEXR benchmark harness
// Codec sweep over every compression method, or multithreaded read of existing files

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

use exr_profile::{
    run_codec_sweep, run_read_benchmark, Args, ExrCodec, Mode, ProfileConfig, ReportPrinter,
    SweepOptions,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr, reports to stdout
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level))
        )
        .with_writer(io::stderr)
        .init();

    let config = ProfileConfig::from_args(args).context("Invalid arguments")?;
    let codec = ExrCodec::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &config.mode {
        Mode::Read(files) => {
            let bench = run_read_benchmark(&codec, files, config.workers, config.threads)
                .context("Multithreaded read failed")?;
            let printer = ReportPrinter::new(&bench.results);
            let stats = bench.read_stats(true);

            if config.json {
                printer.write_json(&mut out, Some(bench.outcome.elapsed), Some(&stats))?;
            } else {
                printer.write_read_report(&mut out, bench.outcome.elapsed)?;
                if config.verbose {
                    ReportPrinter::write_stats(&mut out, &stats)?;
                }
            }
        }
        Mode::CodecSweep => {
            let mut options =
                SweepOptions::new(config.prefix.clone(), config.image_size(), config.threads);
            options.cleanup = config.cleanup;

            let results = run_codec_sweep(&codec, &options).context("Codec sweep failed")?;
            let printer = ReportPrinter::new(&results);

            if config.json {
                printer.write_json(&mut out, None, None)?;
            } else {
                printer.write_sweep_report(&mut out)?;
            }
        }
    }

    out.flush()?;
    info!("Done");
    Ok(())
}
