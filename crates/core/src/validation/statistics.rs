//! Order statistics shared by bake reports and validation.

use serde::{Deserialize, Serialize};

/// First quartile, median and third quartile of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f32,
    pub median: f32,
    pub q3: f32,
}

impl Quartiles {
    /// Interquartile range
    #[must_use]
    pub fn iqr(&self) -> f32 {
        self.q3 - self.q1
    }
}

fn median(sorted: &[f32]) -> f32 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Quartiles of an ascending slice.
///
/// Q1 and Q3 are the medians of the lower and upper halves, the middle value
/// excluded when the count is odd. A single value is its own quartiles.
/// Returns `None` for an empty slice.
#[must_use]
pub fn quartiles(sorted: &[f32]) -> Option<Quartiles> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = median(sorted);
    if n == 1 {
        return Some(Quartiles {
            q1: mid,
            median: mid,
            q3: mid,
        });
    }

    Some(Quartiles {
        q1: median(&sorted[..n / 2]),
        median: mid,
        q3: median(&sorted[(n + 1) / 2..]),
    })
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPlot {
    /// Smallest observed value
    pub min: f32,
    /// `Q1 − 1.5·IQR`, raised to `min` when below it
    pub lower_whisker: f32,
    pub q1: f32,
    pub median: f32,
    pub q3: f32,
    /// `Q3 + 1.5·IQR`, lowered to `max` when above it
    pub upper_whisker: f32,
    /// Largest observed value
    pub max: f32,
    /// Values outside the unclamped whisker fences
    pub outliers: usize,
    pub count: usize,
}

impl BoxPlot {
    /// Summarize `values`. Returns `None` when there are none.
    #[must_use]
    pub fn from_values(mut values: Vec<f32>) -> Option<Self> {
        values.sort_by(f32::total_cmp);
        let q = quartiles(&values)?;
        let min = values[0];
        let max = values[values.len() - 1];

        let lower_fence = q.q1 - 1.5 * q.iqr();
        let upper_fence = q.q3 + 1.5 * q.iqr();
        let outliers = values
            .iter()
            .filter(|&&v| v < lower_fence || v > upper_fence)
            .count();

        Some(Self {
            min,
            lower_whisker: lower_fence.max(min),
            q1: q.q1,
            median: q.median,
            q3: q.q3,
            upper_whisker: upper_fence.min(max),
            max,
            outliers,
            count: values.len(),
        })
    }

    #[must_use]
    pub fn iqr(&self) -> f32 {
        self.q3 - self.q1
    }
}
