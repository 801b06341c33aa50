//! Shared domain types.
//!
//! Records are plain, serializable values. They are only ever handed out by
//! shared reference from a loaded `Series`, so nothing downstream can mutate
//! them after load.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::taxonomy::{AGE_BRACKETS, AGE_BRACKET_COUNT, PREFECTURES, TaxonomyTable};
use crate::math::rolling_average;

/// Whether a source reports per-day increments or running totals.
///
/// Resolved once per loaded series from its `SourceId`; queries never inspect
/// record fields to decide this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Delta,
    Cumulative,
}

/// One CSV extract the engine knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceId {
    /// Daily new cases, national plus per-prefecture columns.
    InfectionTrend,
    /// Daily deaths (per-day increments).
    Deaths,
    /// Deaths, already accumulated by the publisher.
    DeathsCumulative,
    /// Confirmed cases, already accumulated by the publisher.
    CumulativeCases,
    /// Daily new cases split into ten age brackets.
    AgeGroups,
}

impl SourceId {
    pub const ALL: [SourceId; 5] = [
        SourceId::InfectionTrend,
        SourceId::Deaths,
        SourceId::DeathsCumulative,
        SourceId::CumulativeCases,
        SourceId::AgeGroups,
    ];

    pub fn series_kind(self) -> SeriesKind {
        match self {
            SourceId::InfectionTrend | SourceId::Deaths | SourceId::AgeGroups => SeriesKind::Delta,
            SourceId::DeathsCumulative | SourceId::CumulativeCases => SeriesKind::Cumulative,
        }
    }

    /// Default file name under a data directory or base URL.
    pub fn file_name(self) -> &'static str {
        match self {
            SourceId::InfectionTrend => "newly_confirmed_cases_daily.csv",
            SourceId::Deaths => "deaths_daily.csv",
            SourceId::DeathsCumulative => "deaths_cumulative_daily.csv",
            SourceId::CumulativeCases => "confirmed_cases_cumulative_daily.csv",
            SourceId::AgeGroups => "newly_confirmed_cases_by_age.csv",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SourceId::InfectionTrend => "infection-trend",
            SourceId::Deaths => "deaths",
            SourceId::DeathsCumulative => "deaths-cumulative",
            SourceId::CumulativeCases => "cumulative-cases",
            SourceId::AgeGroups => "age-groups",
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Common accessors for every daily record.
pub trait DailyRecord {
    fn date(&self) -> NaiveDate;

    /// The date exactly as the source wrote it (e.g. `2020/1/16`).
    fn date_label(&self) -> &str;

    /// Fill derived fields over the full, sorted, de-duplicated sequence.
    ///
    /// Called exactly once per load, after sorting.
    fn derive(_records: &mut [Self])
    where
        Self: Sized,
    {
    }
}

/// A record with one national count, folded by `query::cumulative_at`.
pub trait CountRecord: DailyRecord {
    fn count(&self) -> u64;
}

/// A record whose fields are keyed by a taxonomy table.
pub trait CategoryRecord: DailyRecord {
    fn taxonomy() -> &'static TaxonomyTable;

    /// Value for `key`; `None` when the key is unknown or the source has no
    /// such breakdown.
    fn category_value(&self, key: &str) -> Option<u64>;
}

/// Per-prefecture counts, stored in `PREFECTURES` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefectureCounts(Vec<u64>);

impl PrefectureCounts {
    pub fn from_ordered(values: Vec<u64>) -> Self {
        Self(values)
    }

    pub fn get(&self, code: &str) -> Option<u64> {
        let idx = PREFECTURES.position(code)?;
        Some(self.0.get(idx).copied().unwrap_or(0))
    }

    pub fn values(&self) -> &[u64] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfectionRecord {
    pub date: NaiveDate,
    pub date_label: String,
    pub new_cases: u64,
    /// Weekly cases per 100k population; zero when the source does not report it.
    pub per_100k: f64,
    /// Trailing 30-record mean of `new_cases`, rounded to 2 decimals.
    pub rolling_average: f64,
    /// Present only when the source carries per-prefecture columns.
    pub prefecture_counts: Option<PrefectureCounts>,
}

impl InfectionRecord {
    pub fn new(date: NaiveDate, date_label: impl Into<String>, new_cases: u64) -> Self {
        Self {
            date,
            date_label: date_label.into(),
            new_cases,
            per_100k: 0.0,
            rolling_average: 0.0,
            prefecture_counts: None,
        }
    }
}

impl DailyRecord for InfectionRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn date_label(&self) -> &str {
        &self.date_label
    }

    fn derive(records: &mut [Self]) {
        let counts: Vec<u64> = records.iter().map(|r| r.new_cases).collect();
        for (record, avg) in records.iter_mut().zip(rolling_average(&counts)) {
            record.rolling_average = avg;
        }
    }
}

impl CountRecord for InfectionRecord {
    fn count(&self) -> u64 {
        self.new_cases
    }
}

impl CategoryRecord for InfectionRecord {
    fn taxonomy() -> &'static TaxonomyTable {
        &PREFECTURES
    }

    fn category_value(&self, key: &str) -> Option<u64> {
        self.prefecture_counts.as_ref()?.get(key)
    }
}

/// Deaths for one day. Whether `deaths` is a daily increment or a running total
/// is a property of the series (`SeriesKind`), not of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub date: NaiveDate,
    pub date_label: String,
    pub deaths: u64,
}

impl DailyRecord for DeathRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn date_label(&self) -> &str {
        &self.date_label
    }
}

impl CountRecord for DeathRecord {
    fn count(&self) -> u64 {
        self.deaths
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeCasesRecord {
    pub date: NaiveDate,
    pub date_label: String,
    pub cumulative_cases: u64,
}

impl DailyRecord for CumulativeCasesRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn date_label(&self) -> &str {
        &self.date_label
    }
}

impl CountRecord for CumulativeCasesRecord {
    fn count(&self) -> u64 {
        self.cumulative_cases
    }
}

/// New cases for one day, one value per `AGE_BRACKETS` entry (same order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroupRecord {
    pub date: NaiveDate,
    pub date_label: String,
    pub brackets: [u64; AGE_BRACKET_COUNT],
}

impl AgeGroupRecord {
    pub fn total(&self) -> u64 {
        self.brackets.iter().fold(0u64, |acc, &v| acc.saturating_add(v))
    }
}

impl DailyRecord for AgeGroupRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn date_label(&self) -> &str {
        &self.date_label
    }
}

impl CategoryRecord for AgeGroupRecord {
    fn taxonomy() -> &'static TaxonomyTable {
        &AGE_BRACKETS
    }

    fn category_value(&self, key: &str) -> Option<u64> {
        AGE_BRACKETS.position(key).map(|idx| self.brackets[idx])
    }
}

/// One `{key, label, total}` row of a category query. Built per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category_key: String,
    pub label: String,
    pub total: u64,
}

/// Row-level bookkeeping for one load. Purely diagnostic: none of these
/// counters affect whether the load succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDiagnostics {
    /// Data rows seen after the header.
    pub rows_read: usize,
    /// Rows dropped for an unparseable date (or an undecodable CSV row).
    pub rows_dropped: usize,
    /// Rows dropped because an earlier row already had the same date.
    pub duplicates_dropped: usize,
    /// Count cells that were present but empty, non-numeric, or negative.
    pub values_defaulted: usize,
}

/// How a dashboard view is assembled and printed.
///
/// Derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Selected date; `None` means the latest infection record.
    pub date: Option<NaiveDate>,
    /// Selected index into the infection series; ignored when `date` is set.
    pub index: Option<isize>,
    /// Records in the trend slice.
    pub trend_days: usize,
    /// Records summed for the monthly age breakdown.
    pub age_days: usize,
    /// Prefectures shown in the ranking.
    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_json: Option<PathBuf>,
    pub export_trend: Option<PathBuf>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            date: None,
            index: None,
            trend_days: 30,
            age_days: 30,
            top_n: 10,
            plot: true,
            plot_width: 90,
            plot_height: 18,
            export_json: None,
            export_trend: None,
        }
    }
}
