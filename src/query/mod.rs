//! Date-indexed queries over a loaded `Series`.
//!
//! Every function here is a pure read of an immutable series. Indices are
//! signed so callers can pass slider positions straight through: anything
//! outside `[0, len)` yields "no data" (`None` or an empty result), never a
//! panic.
//!
//! An index only means something for the series it came from. To line up two
//! sources, resolve a date to an index with `resolve_date` or
//! `resolve_on_or_before` first.

pub mod category;

pub use category::*;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{CountRecord, DailyRecord, Series, SeriesKind};

/// Bounds-check a signed index against a series.
pub fn checked_index<R>(series: &Series<R>, index: isize) -> Option<usize> {
    let idx = usize::try_from(index).ok()?;
    (idx < series.len()).then_some(idx)
}

/// The record at `index`, if any.
pub fn point_lookup<R>(series: &Series<R>, index: isize) -> Option<&R> {
    checked_index(series, index).map(|idx| &series.records()[idx])
}

/// The last record, if any.
pub fn latest<R>(series: &Series<R>) -> Option<&R> {
    series.records().last()
}

/// Up to `window` records ending at (and including) `index`.
///
/// Length is `min(window, index + 1)`. Never looks past `index`.
pub fn range_ending_at<R>(series: &Series<R>, index: isize, window: usize) -> &[R] {
    let Some(idx) = checked_index(series, index) else {
        return &[];
    };
    let start = (idx + 1).saturating_sub(window);
    &series.records()[start..=idx]
}

/// Records `[0, index]`.
pub fn history_through<R>(series: &Series<R>, index: isize) -> &[R] {
    match checked_index(series, index) {
        Some(idx) => &series.records()[..=idx],
        None => &[],
    }
}

/// Cumulative total as of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CumulativeValue {
    pub date: NaiveDate,
    pub date_label: String,
    /// The record's own count (daily increment or stored running total).
    pub daily: u64,
    pub cumulative: u64,
    pub kind: SeriesKind,
}

/// Running total at `index`.
///
/// Delta series fold their counts over `[0, index]` (saturating at `u64::MAX`);
/// cumulative series return the stored value unchanged. The decision comes from the series' kind.
pub fn cumulative_at<R: CountRecord>(series: &Series<R>, index: isize) -> Option<CumulativeValue> {
    let record = point_lookup(series, index)?;
    let cumulative = match series.kind() {
        SeriesKind::Delta => history_through(series, index)
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.count())),
        SeriesKind::Cumulative => record.count(),
    };
    Some(CumulativeValue {
        date: record.date(),
        date_label: record.date_label().to_string(),
        daily: record.count(),
        cumulative,
        kind: series.kind(),
    })
}

/// Index of the record dated exactly `date`.
pub fn resolve_date<R: DailyRecord>(series: &Series<R>, date: NaiveDate) -> Option<usize> {
    series.records().binary_search_by_key(&date, |r| r.date()).ok()
}

/// Index of the last record dated on or before `date`.
pub fn resolve_on_or_before<R: DailyRecord>(series: &Series<R>, date: NaiveDate) -> Option<usize> {
    let after = series.records().partition_point(|r| r.date() <= date);
    after.checked_sub(1)
}

/// Source date labels in index order (e.g. slider ticks).
pub fn date_labels<R: DailyRecord>(series: &Series<R>) -> Vec<&str> {
    series.records().iter().map(|r| r.date_label()).collect()
}
