//! Summary statistics over benchmark samples

use num_traits::AsPrimitive;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Count, range, mean, population standard deviation and optional median.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSummary<T> {
    pub count: usize,
    pub min: T,
    pub max: T,
    pub mean: f64,
    pub stdev: f64,
    /// `None` unless requested from [`StatsSummary::compute`]
    pub median: Option<f64>,
}

impl<T> StatsSummary<T>
where
    T: Copy + Default + PartialOrd + AsPrimitive<f64>,
{
    /// Summarize `data`; an empty slice yields a zeroed summary with `count == 0`.
    pub fn compute(data: &[T], want_median: bool) -> Self {
        let Some(&first) = data.first() else {
            return Self {
                count: 0,
                min: T::default(),
                max: T::default(),
                mean: 0.0,
                stdev: 0.0,
                median: None,
            };
        };

        let count = data.len();
        let (min, max) = data.iter().fold((first, first), |(min, max), &x| {
            (if x < min { x } else { min }, if x > max { x } else { max })
        });

        let mean = data.iter().map(|x| x.as_()).sum::<f64>() / count as f64;
        let variance = data
            .iter()
            .map(|x| {
                let diff = x.as_() - mean;
                diff * diff
            })
            .sum::<f64>()
            / count as f64;

        let median = want_median.then(|| {
            let mut sorted = data.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            let mid = count / 2;
            if count % 2 == 0 {
                (sorted[mid - 1].as_() + sorted[mid].as_()) / 2.0
            } else {
                sorted[mid].as_()
            }
        });

        Self {
            count,
            min,
            max,
            mean,
            stdev: variance.sqrt(),
            median,
        }
    }
}

impl<T> StatsSummary<T> {
    pub fn header() -> &'static str {
        "Count (files) -- Min -- Max -- Mean -- Stdev -- Median"
    }
}

impl<T: fmt::Display> fmt::Display for StatsSummary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Files: {} | Min: {}ms | Max: {}ms | Mean: {:.4}ms | Stdev: {:.4}ms | Median: ",
            self.count, self.min, self.max, self.mean, self.stdev
        )?;
        match self.median {
            Some(median) => write!(f, "{}ms", median),
            None => write!(f, "n/a"),
        }
    }
}
