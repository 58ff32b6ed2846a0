//! Human readable and JSON reports

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

use crate::results::{ResultsStore, Sample, SampleField};
use crate::stats::StatsSummary;

/// Renders a [`ResultsStore`] sorted by its sample fields.
///
/// Completion order of concurrent workers is arbitrary, so every table is sorted
/// before printing.
#[derive(Debug, Clone, Copy)]
pub struct ReportPrinter<'a> {
    store: &'a ResultsStore,
}

impl<'a> ReportPrinter<'a> {
    pub fn new(store: &'a ResultsStore) -> Self {
        Self { store }
    }

    /// Codec sweep tables: by compression time, decompression time and file size.
    pub fn write_sweep_report(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "\nSorted by Compression Time:")?;
        for (name, sample) in self.store.sorted_by(SampleField::Compression) {
            writeln!(
                out,
                "{:>25}: {} ms -> size: {:.2}MB",
                name,
                sample.compression_ms,
                sample.file_size_mb()
            )?;
        }

        writeln!(out, "\nSorted by Decompression Time:")?;
        self.write_decompression_table(out)?;

        writeln!(out, "\nSorted by File Size:")?;
        for (name, sample) in self.store.sorted_by(SampleField::FileSize) {
            writeln!(
                out,
                "{:>25}: {:.2}MB -> {} ms",
                name,
                sample.file_size_mb(),
                sample.decompression_ms
            )?;
        }

        Ok(())
    }

    /// Read benchmark summary line followed by files sorted by read time.
    pub fn write_read_report(&self, out: &mut impl Write, total: Duration) -> io::Result<()> {
        let total_ms = total.as_millis() as u64;
        let average_ms = match self.store.len() as u64 {
            0 => 0,
            files => total_ms / files,
        };

        writeln!(
            out,
            "Total time: {:.6} seconds (avg. {} ms per frame)",
            total.as_secs_f64(),
            average_ms
        )?;

        writeln!(out, "\nSorted by Reading Time:")?;
        self.write_decompression_table(out)
    }

    pub fn write_stats<T: Display>(
        out: &mut impl Write,
        summary: &StatsSummary<T>,
    ) -> io::Result<()> {
        writeln!(out, "\n{}", StatsSummary::<T>::header())?;
        writeln!(out, "{}", summary)
    }

    /// All samples as one JSON document, with read statistics when available.
    pub fn write_json(
        &self,
        out: &mut impl Write,
        total: Option<Duration>,
        stats: Option<&StatsSummary<u64>>,
    ) -> io::Result<()> {
        let report = JsonReport {
            samples: self.store.snapshot().into_iter().collect(),
            total_ms: total.map(|t| t.as_millis() as u64),
            stats,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)
    }

    fn write_decompression_table(&self, out: &mut impl Write) -> io::Result<()> {
        for (name, sample) in self.store.sorted_by(SampleField::Decompression) {
            writeln!(
                out,
                "{:>25}: {} ms -> size: {:.2}MB",
                name,
                sample.decompression_ms,
                sample.file_size_mb()
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    samples: BTreeMap<String, Sample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a StatsSummary<u64>>,
}
