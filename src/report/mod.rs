//! Dashboard view assembly and terminal formatting.
//!
//! A `DashboardView` is everything the dashboard shows for one selected date,
//! computed through the query layer. Other sources are lined up with the
//! infection series by date, never by raw index.

pub mod format;

pub use format::*;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::Dataset;
use crate::domain::{AgeGroupRecord, CategoryAggregate, InfectionRecord, Series, ViewConfig};
use crate::error::AppError;
use crate::query::{
    Window, all_keys, category_snapshot, checked_index, cumulative_at, group_age_totals, point_lookup, range_ending_at,
    rank_categories, resolve_date, resolve_on_or_before, windowed_category_totals,
};

/// Headline numbers for the selected date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub new_cases: u64,
    pub rolling_average: f64,
    /// Fold of daily new cases up to the selected date.
    pub cumulative_cases: u64,
    /// Publisher-reported running total, when that source was loaded.
    pub reported_cumulative_cases: Option<u64>,
    pub cumulative_deaths: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub date_label: String,
    pub new_cases: u64,
    pub rolling_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Index into the infection series.
    pub index: usize,
    pub date: NaiveDate,
    pub date_label: String,
    /// First and last dates of the infection series (slider bounds).
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub kpis: Kpis,
    pub trend: Vec<TrendPoint>,
    /// Age display groups summed over the last `age_days` records.
    pub age_monthly: Vec<CategoryAggregate>,
    /// Per-bracket totals over the full history up to the selected date.
    pub age_totals: Vec<CategoryAggregate>,
    pub prefecture_ranking: Vec<CategoryAggregate>,
}

impl DashboardView {
    /// Build the view for the date/index selected by `config`.
    pub fn build(dataset: &Dataset, config: &ViewConfig) -> Result<Self, AppError> {
        let infection = dataset
            .infection()
            .ok_or_else(|| AppError::new(2, "The infection trend source is required for a dashboard view."))?;
        let (first, last) = match (infection.records().first(), infection.records().last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Err(AppError::new(3, "The infection trend source has no usable rows.")),
        };

        let index = select_index(infection, config)?;
        let record = point_lookup(infection, index)
            .ok_or_else(|| AppError::new(3, format!("No infection data at index {index}.")))?;
        let date = record.date;

        let cumulative_cases = cumulative_at(infection, index).map(|v| v.cumulative).unwrap_or(0);

        let reported_cumulative_cases = dataset.cumulative_cases().and_then(|series| {
            let idx = resolve_on_or_before(series, date)?;
            cumulative_at(series, idx as isize).map(|v| v.cumulative)
        });

        let cumulative_deaths = dataset.any_deaths().and_then(|series| {
            let idx = resolve_on_or_before(series, date)?;
            cumulative_at(series, idx as isize).map(|v| v.cumulative)
        });

        let trend = range_ending_at(infection, index, config.trend_days)
            .iter()
            .map(|r| TrendPoint {
                date: r.date,
                date_label: r.date_label.clone(),
                new_cases: r.new_cases,
                rolling_average: r.rolling_average,
            })
            .collect();

        let (age_monthly, age_totals) = match dataset.age_groups() {
            Some(series) => match resolve_on_or_before(series, date) {
                Some(idx) => {
                    let keys = all_keys::<AgeGroupRecord>();
                    let monthly = windowed_category_totals(series, idx as isize, Window::Last(config.age_days), &keys);
                    let totals = windowed_category_totals(series, idx as isize, Window::All, &keys);
                    (group_age_totals(&monthly), totals)
                }
                None => (Vec::new(), Vec::new()),
            },
            None => (Vec::new(), Vec::new()),
        };

        let prefecture_snapshot = category_snapshot(infection, index, &all_keys::<InfectionRecord>());
        let prefecture_ranking = rank_categories(&prefecture_snapshot, config.top_n);

        Ok(DashboardView {
            index: index as usize,
            date,
            date_label: record.date_label.clone(),
            first_date: first,
            last_date: last,
            kpis: Kpis {
                new_cases: record.new_cases,
                rolling_average: record.rolling_average,
                cumulative_cases,
                reported_cumulative_cases,
                cumulative_deaths,
            },
            trend,
            age_monthly,
            age_totals,
            prefecture_ranking,
        })
    }
}

/// Resolve the selected index: explicit date, else explicit index, else latest.
fn select_index(series: &Series<InfectionRecord>, config: &ViewConfig) -> Result<isize, AppError> {
    if let Some(date) = config.date {
        let idx = resolve_date(series, date).ok_or_else(|| AppError::new(3, format!("No infection data for {date}.")))?;
        return Ok(idx as isize);
    }
    if let Some(index) = config.index {
        if checked_index(series, index).is_none() {
            return Err(AppError::new(
                3,
                format!("Index {index} is outside the loaded range 0..{}.", series.len()),
            ));
        }
        return Ok(index);
    }
    Ok(series.len() as isize - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MemorySource, load_dataset};
    use crate::domain::SourceId;

    fn dataset() -> Dataset {
        let reader = MemorySource::new()
            .with(
                SourceId::InfectionTrend,
                "Date,ALL,Tokyo,Osaka\n2020/4/1,10,6,4\n2020/4/2,20,5,15\n2020/4/3,30,30,0\n",
            )
            .with(SourceId::DeathsCumulative, "Date,ALL\n2020/4/1,1\n2020/4/2,3\n")
            .with(SourceId::AgeGroups, "Date,under10,teens,eighties\n2020/4/1,1,1,1\n2020/4/3,2,2,2\n");
        load_dataset(
            &reader,
            &[SourceId::InfectionTrend, SourceId::DeathsCumulative, SourceId::AgeGroups],
        )
        .unwrap()
    }

    #[test]
    fn latest_view_lines_up_sources_by_date() {
        let view = DashboardView::build(&dataset(), &ViewConfig::default()).unwrap();
        assert_eq!(view.index, 2);
        assert_eq!(view.date_label, "2020/4/3");
        assert_eq!(view.kpis.new_cases, 30);
        assert_eq!(view.kpis.cumulative_cases, 60);
        assert_eq!(view.kpis.rolling_average, 20.0);
        // Deaths stop at 4/2; the latest value on or before 4/3 is used.
        assert_eq!(view.kpis.cumulative_deaths, Some(3));
        assert_eq!(view.kpis.reported_cumulative_cases, None);
        assert_eq!(view.trend.len(), 3);

        let ranking: Vec<&str> = view.prefecture_ranking.iter().map(|a| a.category_key.as_str()).collect();
        assert_eq!(ranking, vec!["Tokyo"]);

        assert_eq!(view.age_monthly[0].total, 6);
        assert_eq!(view.age_monthly[6].total, 3);
        assert_eq!(view.age_totals.len(), 10);
    }

    #[test]
    fn explicit_date_selects_earlier_index() {
        let config = ViewConfig {
            date: NaiveDate::from_ymd_opt(2020, 4, 2),
            trend_days: 1,
            ..ViewConfig::default()
        };
        let view = DashboardView::build(&dataset(), &config).unwrap();
        assert_eq!(view.index, 1);
        assert_eq!(view.kpis.cumulative_cases, 30);
        assert_eq!(view.trend.len(), 1);
        assert_eq!(view.prefecture_ranking[0].category_key, "Osaka");
        // Age data has no 4/2 row; 4/1 is the latest on or before.
        assert_eq!(view.age_monthly[0].total, 2);
    }

    #[test]
    fn out_of_range_selection_is_no_data() {
        let config = ViewConfig {
            index: Some(7),
            ..ViewConfig::default()
        };
        let err = DashboardView::build(&dataset(), &config).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let config = ViewConfig {
            date: NaiveDate::from_ymd_opt(2019, 1, 1),
            ..ViewConfig::default()
        };
        assert_eq!(DashboardView::build(&dataset(), &config).unwrap_err().exit_code(), 3);
    }

    #[test]
    fn infection_is_required() {
        let reader = MemorySource::new().with(SourceId::Deaths, "Date,ALL\n2020/4/1,1\n");
        let dataset = load_dataset(&reader, &[SourceId::Deaths]).unwrap();
        let err = DashboardView::build(&dataset, &ViewConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
