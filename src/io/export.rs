//! Export a dashboard view to JSON and its trend slice to CSV.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::{DashboardView, TrendPoint};

/// Write the whole view as pretty JSON.
pub fn write_view_json(path: &Path, view: &DashboardView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create view JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, view).map_err(|e| AppError::new(4, format!("Failed to write view JSON: {e}")))?;
    Ok(())
}

/// Write the trend slice as CSV (`date,date_label,new_cases,rolling_average`).
pub fn write_trend_csv(path: &Path, trend: &[TrendPoint]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create trend CSV '{}': {e}", path.display())))?;
    write_trend(file, trend)
}

fn write_trend<W: Write>(writer: W, trend: &[TrendPoint]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in trend {
        wtr.serialize(point)
            .map_err(|e| AppError::new(4, format!("Failed to write trend CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush trend CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn trend_csv_has_header_and_rows() {
        let trend = vec![
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
                date_label: "2020/4/1".to_string(),
                new_cases: 10,
                rolling_average: 10.0,
            },
            TrendPoint {
                date: NaiveDate::from_ymd_opt(2020, 4, 2).unwrap(),
                date_label: "2020/4/2".to_string(),
                new_cases: 21,
                rolling_average: 15.5,
            },
        ];
        let mut buf = Vec::new();
        write_trend(&mut buf, &trend).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,date_label,new_cases,rolling_average");
        assert_eq!(lines[1], "2020-04-01,2020/4/1,10,10.0");
        assert_eq!(lines[2], "2020-04-02,2020/4/2,21,15.5");
    }

    #[test]
    fn unwritable_path_is_output_error() {
        let err = write_trend_csv(Path::new("/nonexistent-dir/trend.csv"), &[]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
