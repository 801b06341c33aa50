//! Trailing-window mean over a date-ordered count series.
//!
//! The mean at position `i` covers `[max(0, i - (window - 1)), i]`: the current
//! value plus up to `window - 1` predecessors. Early positions average over the
//! history that exists, so the first value is always its own mean.
//!
//! `RollingMean` keeps a running sum over a fixed-size ring buffer, which makes
//! the pass linear and lets a caller feed values one at a time.

use std::collections::VecDeque;

/// Window length used for the infection trend's rolling average.
pub const ROLLING_WINDOW: usize = 30;

/// Incremental trailing mean over the last `window` values.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    values: VecDeque<u64>,
    // Wide enough for `window` values of `u64::MAX` at any realistic window.
    sum: u128,
}

impl RollingMean {
    /// `window` is clamped to at least 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: 0,
        }
    }

    /// Push the next value and return the unrounded mean of the current window.
    pub fn push(&mut self, value: u64) -> f64 {
        if self.values.len() == self.window {
            if let Some(oldest) = self.values.pop_front() {
                self.sum -= u128::from(oldest);
            }
        }
        self.values.push_back(value);
        self.sum += u128::from(value);
        self.sum as f64 / self.values.len() as f64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 30-value trailing means, rounded to two decimals.
pub fn rolling_average(values: &[u64]) -> Vec<f64> {
    rolling_average_with(values, ROLLING_WINDOW)
}

pub fn rolling_average_with(values: &[u64], window: usize) -> Vec<f64> {
    let mut mean = RollingMean::new(window);
    values.iter().map(|&v| round2(mean.push(v))).collect()
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
