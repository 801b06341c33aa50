//! The immutable, date-ordered record sequence.

use crate::domain::types::{DailyRecord, LoadDiagnostics, SeriesKind, SourceId};

/// A loaded source: records strictly ascending by date, no duplicate dates,
/// derived fields already filled.
///
/// There is no way to mutate a `Series` once built. A new load builds a new one.
#[derive(Debug, Clone)]
pub struct Series<R> {
    source: SourceId,
    kind: SeriesKind,
    records: Vec<R>,
    diagnostics: LoadDiagnostics,
}

impl<R: DailyRecord> Series<R> {
    /// Build a series from records in any order.
    ///
    /// Records are stably sorted by date; for repeated dates the earliest input
    /// row wins. Derived fields are computed afterwards, once.
    pub fn from_records(source: SourceId, records: Vec<R>) -> Self {
        Self::from_parsed(source, records, LoadDiagnostics::default())
    }

    pub(crate) fn from_parsed(source: SourceId, mut records: Vec<R>, mut diagnostics: LoadDiagnostics) -> Self {
        records.sort_by_key(|r| r.date());
        let before = records.len();
        records.dedup_by_key(|r| r.date());
        diagnostics.duplicates_dropped += before - records.len();

        R::derive(&mut records);

        Self {
            source,
            kind: source.series_kind(),
            records,
            diagnostics,
        }
    }

    pub fn empty(source: SourceId) -> Self {
        Self::from_records(source, Vec::new())
    }
}

impl<R> Series<R> {
    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn diagnostics(&self) -> &LoadDiagnostics {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::types::{DeathRecord, InfectionRecord};

    fn death(date: &str, deaths: u64) -> DeathRecord {
        DeathRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            date_label: date.to_string(),
            deaths,
        }
    }

    #[test]
    fn sorts_and_keeps_first_duplicate() {
        let series = Series::from_records(
            SourceId::Deaths,
            vec![
                death("2020-03-02", 2),
                death("2020-03-01", 1),
                death("2020-03-02", 99),
            ],
        );
        let deaths: Vec<u64> = series.records().iter().map(|r| r.deaths).collect();
        assert_eq!(deaths, vec![1, 2]);
        assert_eq!(series.diagnostics().duplicates_dropped, 1);
        assert_eq!(series.kind(), SeriesKind::Delta);
    }

    #[test]
    fn resorting_sorted_series_is_a_no_op() {
        let series = Series::from_records(
            SourceId::DeathsCumulative,
            vec![death("2020-03-01", 1), death("2020-03-02", 3), death("2020-03-03", 6)],
        );
        let again = Series::from_records(SourceId::DeathsCumulative, series.records().to_vec());
        assert_eq!(series.records(), again.records());
    }

    #[test]
    fn derived_fields_are_filled_after_sort() {
        let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
        let series = Series::from_records(
            SourceId::InfectionTrend,
            vec![
                InfectionRecord::new(d(18), "2020/1/18", 5),
                InfectionRecord::new(d(16), "2020/1/16", 3),
                InfectionRecord::new(d(17), "2020/1/17", 0),
            ],
        );
        let avgs: Vec<f64> = series.records().iter().map(|r| r.rolling_average).collect();
        assert_eq!(avgs, vec![3.0, 1.5, 2.67]);
    }
}
