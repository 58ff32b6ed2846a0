//! Benchmark results keyed by label
//!
//! A label is a file name (read benchmark) or a compression method name (codec
//! sweep). Labels are enrolled up front through `&mut self`; afterwards the store is
//! shared by reference and workers overwrite single fields. Each label must be
//! written by one worker only, which the dispatcher guarantees by handing every
//! file to exactly one frame worker.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ProfileError, Result};

/// Timing and size record of one file or compression method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub compression_ms: u64,
    pub decompression_ms: u64,
    pub file_size_bytes: u64,
}

impl Sample {
    pub fn new(compression_ms: u64, decompression_ms: u64, file_size_bytes: u64) -> Self {
        Self { compression_ms, decompression_ms, file_size_bytes }
    }

    pub fn field(&self, field: SampleField) -> u64 {
        match field {
            SampleField::Compression => self.compression_ms,
            SampleField::Decompression => self.decompression_ms,
            SampleField::FileSize => self.file_size_bytes,
        }
    }

    pub fn file_size_mb(&self) -> f64 {
        self.file_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleField {
    Compression,
    Decompression,
    FileSize,
}

#[derive(Debug, Default)]
struct SampleCell {
    compression_ms: AtomicU64,
    decompression_ms: AtomicU64,
    file_size_bytes: AtomicU64,
}

impl SampleCell {
    fn new(sample: Sample) -> Self {
        Self {
            compression_ms: AtomicU64::new(sample.compression_ms),
            decompression_ms: AtomicU64::new(sample.decompression_ms),
            file_size_bytes: AtomicU64::new(sample.file_size_bytes),
        }
    }

    fn slot(&self, field: SampleField) -> &AtomicU64 {
        match field {
            SampleField::Compression => &self.compression_ms,
            SampleField::Decompression => &self.decompression_ms,
            SampleField::FileSize => &self.file_size_bytes,
        }
    }

    fn load(&self) -> Sample {
        Sample {
            compression_ms: self.compression_ms.load(Ordering::Acquire),
            decompression_ms: self.decompression_ms.load(Ordering::Acquire),
            file_size_bytes: self.file_size_bytes.load(Ordering::Acquire),
        }
    }
}

#[derive(Debug, Default)]
pub struct ResultsStore {
    entries: BTreeMap<String, SampleCell>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `label`, replacing any earlier sample under the same label.
    pub fn enroll(&mut self, label: impl Into<String>, sample: Sample) {
        self.entries.insert(label.into(), SampleCell::new(sample));
    }

    /// Overwrite one field of an enrolled sample.
    pub fn update_field(&self, label: &str, field: SampleField, value: u64) -> Result<()> {
        let cell = self
            .entries
            .get(label)
            .ok_or_else(|| ProfileError::UnknownLabel(label.to_string()))?;
        cell.slot(field).store(value, Ordering::Release);
        Ok(())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<Sample> {
        self.entries.get(label).map(SampleCell::load)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All samples in label order.
    pub fn snapshot(&self) -> Vec<(String, Sample)> {
        self.entries
            .iter()
            .map(|(label, cell)| (label.clone(), cell.load()))
            .collect()
    }

    /// All samples ascending by `field`, ties broken by label.
    pub fn sorted_by(&self, field: SampleField) -> Vec<(String, Sample)> {
        let mut samples = self.snapshot();
        // Stable sort keeps the label order of the snapshot for equal values
        samples.sort_by_key(|(_, sample)| sample.field(field));
        samples
    }

    /// One field of every sample, in label order.
    pub fn values(&self, field: SampleField) -> Vec<u64> {
        self.entries.values().map(|cell| cell.load().field(field)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_enroll_then_update_single_field() {
        let mut store = ResultsStore::new();
        store.enroll("a.exr", Sample::new(0, 0, 2048));

        store.update_field("a.exr", SampleField::Decompression, 17).unwrap();

        assert_eq!(store.get("a.exr"), Some(Sample::new(0, 17, 2048)));
    }

    #[test]
    fn test_contains_only_enrolled_labels() {
        let mut store = ResultsStore::new();
        store.enroll("a.exr", Sample::default());
        assert!(store.contains("a.exr"));
        assert!(!store.contains("b.exr"));
    }

    #[test]
    fn test_update_unknown_label() {
        let store = ResultsStore::new();
        let err = store.update_field("missing.exr", SampleField::Compression, 1);
        assert!(matches!(err, Err(ProfileError::UnknownLabel(label)) if label == "missing.exr"));
    }

    #[test]
    fn test_sorted_by_each_field() {
        let mut store = ResultsStore::new();
        store.enroll("piz", Sample::new(30, 10, 500));
        store.enroll("none", Sample::new(10, 5, 900));
        store.enroll("zip", Sample::new(20, 10, 100));

        let labels = |field| {
            store
                .sorted_by(field)
                .into_iter()
                .map(|(label, _)| label)
                .collect::<Vec<_>>()
        };

        assert_eq!(labels(SampleField::Compression), ["none", "zip", "piz"]);
        // piz and zip tie on decompression, label order decides
        assert_eq!(labels(SampleField::Decompression), ["none", "piz", "zip"]);
        assert_eq!(labels(SampleField::FileSize), ["zip", "piz", "none"]);
    }

    #[test]
    fn test_concurrent_updates_of_disjoint_labels() {
        let mut store = ResultsStore::new();
        for i in 0..64 {
            store.enroll(format!("frame.{:04}.exr", i), Sample::new(0, 0, i * 100));
        }

        thread::scope(|scope| {
            for worker in 0..4u64 {
                let store = &store;
                scope.spawn(move || {
                    for i in (worker..64).step_by(4) {
                        let label = format!("frame.{:04}.exr", i);
                        store.update_field(&label, SampleField::Decompression, i + 1).unwrap();
                    }
                });
            }
        });

        for (i, (_, sample)) in store.snapshot().into_iter().enumerate() {
            let i = i as u64;
            assert_eq!(sample, Sample::new(0, i + 1, i * 100));
        }
    }

    #[test]
    fn test_file_size_mb() {
        assert_eq!(Sample::new(0, 0, 3 * 1024 * 1024).file_size_mb(), 3.0);
    }
}
