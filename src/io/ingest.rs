//! CSV ingest and normalization.
//!
//! Turns one source's raw CSV text into a `Series`:
//!
//! 1. strip a leading BOM, read the header row, resolve column aliases
//! 2. per row: parse the `Y/M/D` date (drop the row if that fails), coerce
//!    counts with default-to-zero
//! 3. sort ascending by date, drop duplicate dates, fill derived fields
//!
//! Row-level problems never fail a load. The only errors are structural: an
//! undecodable header or a missing date column.

use std::cell::Cell;
use std::collections::HashMap;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{
    AGE_BRACKET_COUNT, AGE_BRACKETS, AGE_HEADER_PREFIX, AgeGroupRecord, CumulativeCasesRecord, DailyRecord,
    DeathRecord, InfectionRecord, LoadDiagnostics, PREFECTURES, PrefectureCounts, Series, SourceId,
};
use crate::error::LoadError;

/// Header names accepted for the date column, in priority order.
pub const DATE_COLUMNS: [&str; 2] = ["Date", "記者発表日"];

const INFECTION_TOTAL_COLUMNS: [&str; 2] = ["ALL", "新規感染者数(A)+(B)+(C)+(D)"];
const INFECTION_PER_100K_COLUMNS: [&str; 1] = ["新規感染者数の推移（人口10万人当たり・週合計）"];
const DEATH_TOTAL_COLUMNS: [&str; 2] = ["ALL", "死亡者数"];
const CUMULATIVE_TOTAL_COLUMNS: [&str; 1] = ["ALL"];

/// A record type that can be built from one CSV row.
pub trait CsvRecord: DailyRecord + Sized {
    /// Build a record from a row whose date already parsed.
    fn from_row(date: NaiveDate, date_label: &str, row: &Row<'_>) -> Self;
}

/// One data row plus the resolved header map.
///
/// Counts every count cell that had to be defaulted so the load can report it.
pub struct Row<'a> {
    record: &'a StringRecord,
    headers: &'a HeaderMap,
    defaulted: &'a Cell<usize>,
}

impl Row<'_> {
    /// Trimmed raw value of the first alias present in the header.
    pub fn raw(&self, aliases: &[&str]) -> Option<&str> {
        let idx = self.headers.resolve(aliases)?;
        Some(self.record.get(idx).map(str::trim).unwrap_or(""))
    }

    pub fn has_column(&self, aliases: &[&str]) -> bool {
        self.headers.resolve(aliases).is_some()
    }

    /// Integer count; missing column → 0, bad cell → 0 (and counted).
    pub fn count(&self, aliases: &[&str]) -> u64 {
        match self.raw(aliases) {
            None => 0,
            Some(raw) => coerce_count(raw).unwrap_or_else(|| {
                self.defaulted.set(self.defaulted.get() + 1);
                0
            }),
        }
    }

    /// Non-negative rate; same default-to-zero policy as `count`.
    pub fn rate(&self, aliases: &[&str]) -> f64 {
        match self.raw(aliases) {
            None => 0.0,
            Some(raw) => coerce_rate(raw).unwrap_or_else(|| {
                self.defaulted.set(self.defaulted.get() + 1);
                0.0
            }),
        }
    }
}

impl CsvRecord for InfectionRecord {
    fn from_row(date: NaiveDate, date_label: &str, row: &Row<'_>) -> Self {
        let has_breakdown = PREFECTURES.codes().any(|code| row.has_column(&[code]));
        let prefecture_counts = has_breakdown.then(|| {
            PrefectureCounts::from_ordered(PREFECTURES.codes().map(|code| row.count(&[code])).collect())
        });

        InfectionRecord {
            date,
            date_label: date_label.to_string(),
            new_cases: row.count(&INFECTION_TOTAL_COLUMNS),
            per_100k: row.rate(&INFECTION_PER_100K_COLUMNS),
            rolling_average: 0.0,
            prefecture_counts,
        }
    }
}

impl CsvRecord for DeathRecord {
    fn from_row(date: NaiveDate, date_label: &str, row: &Row<'_>) -> Self {
        DeathRecord {
            date,
            date_label: date_label.to_string(),
            deaths: row.count(&DEATH_TOTAL_COLUMNS),
        }
    }
}

impl CsvRecord for CumulativeCasesRecord {
    fn from_row(date: NaiveDate, date_label: &str, row: &Row<'_>) -> Self {
        CumulativeCasesRecord {
            date,
            date_label: date_label.to_string(),
            cumulative_cases: row.count(&CUMULATIVE_TOTAL_COLUMNS),
        }
    }
}

impl CsvRecord for AgeGroupRecord {
    fn from_row(date: NaiveDate, date_label: &str, row: &Row<'_>) -> Self {
        let mut brackets = [0u64; AGE_BRACKET_COUNT];
        for (slot, &(code, label)) in brackets.iter_mut().zip(AGE_BRACKETS.entries()) {
            let long_name = format!("{AGE_HEADER_PREFIX}{label}");
            *slot = row.count(&[code, long_name.as_str()]);
        }
        AgeGroupRecord {
            date,
            date_label: date_label.to_string(),
            brackets,
        }
    }
}

/// Header name → column index, with names trimmed and BOM-stripped.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn from_record(headers: &StringRecord) -> Self {
        let mut columns = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            // First occurrence wins for repeated header names.
            columns.entry(normalize_header_name(name)).or_insert(idx);
        }
        Self { columns }
    }

    /// Index of the first alias present.
    pub fn resolve(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|name| self.columns.get(*name).copied())
    }
}

/// Parse one source's CSV text into a normalized series.
pub fn parse_series<R: CsvRecord>(source_id: SourceId, text: &str) -> Result<Series<R>, LoadError> {
    let text = strip_bom(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv {
            source_id,
            message: format!("failed to read header row: {e}"),
        })?
        .clone();

    let header_map = HeaderMap::from_record(&headers);
    let date_idx = header_map.resolve(&DATE_COLUMNS).ok_or_else(|| LoadError::MissingColumn {
        source_id,
        tried: DATE_COLUMNS.join(", "),
    })?;

    let defaulted = Cell::new(0usize);
    let mut diagnostics = LoadDiagnostics::default();
    let mut records = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        diagnostics.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                // +2: 1-based lines, plus the header row.
                debug!(source = %source_id, line = idx + 2, "undecodable CSV row: {e}");
                diagnostics.rows_dropped += 1;
                continue;
            }
        };

        let date_label = record.get(date_idx).unwrap_or("");
        let Some(date) = parse_slash_date(date_label) else {
            diagnostics.rows_dropped += 1;
            continue;
        };

        let row = Row {
            record: &record,
            headers: &header_map,
            defaulted: &defaulted,
        };
        records.push(R::from_row(date, date_label, &row));
    }

    diagnostics.values_defaulted = defaulted.get();
    let series = Series::from_parsed(source_id, records, diagnostics);

    let diag = series.diagnostics();
    debug!(
        source = %source_id,
        rows_read = diag.rows_read,
        records = series.len(),
        values_defaulted = diag.values_defaulted,
        "normalized source"
    );
    if diag.rows_dropped > 0 || diag.duplicates_dropped > 0 {
        warn!(
            source = %source_id,
            rows_dropped = diag.rows_dropped,
            duplicates_dropped = diag.duplicates_dropped,
            "dropped rows during normalization"
        );
    }

    Ok(series)
}

pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often put a BOM in front of the first header.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// Parse `YEAR/MONTH/DAY` with unpadded month and day (e.g. `2020/1/16`).
///
/// Month and day are zero-padded and reassembled as an ISO date before the
/// calendar check. Anything that does not split into exactly three numeric
/// parts on `/`, or is not a real calendar day, yields `None`.
pub fn parse_slash_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    let &[year, month, day] = parts.as_slice() else {
        return None;
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if year.len() != 4 || !all_digits(year) {
        return None;
    }
    if month.len() > 2 || day.len() > 2 || !all_digits(month) || !all_digits(day) {
        return None;
    }

    let iso = format!("{year}-{month:0>2}-{day:0>2}");
    NaiveDate::parse_from_str(&iso, "%Y-%m-%d").ok()
}

/// Integer count from a trimmed cell.
///
/// Accepts plain integers and plain decimals (`digits[.digits]`, truncated).
/// Empty, non-numeric, negative, exponent-form, or out-of-range (> `u64::MAX`)
/// input yields `None`; the caller defaults it to zero.
pub fn coerce_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }
    let (whole, fraction) = raw.split_once('.')?;
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits(whole) || !digits(fraction) {
        return None;
    }
    whole.parse::<u64>().ok()
}

/// Non-negative finite float from a trimmed cell.
pub fn coerce_rate(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 { Some(v) } else { None }
}
