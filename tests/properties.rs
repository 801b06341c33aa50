use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use covid_dash::domain::{DeathRecord, InfectionRecord, Series, SourceId};
use covid_dash::io::parse_series;
use covid_dash::math::round2;
use covid_dash::query::{cumulative_at, point_lookup, range_ending_at};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 16).unwrap()
}

/// `(day offset, count)` rows rendered as an infection CSV in the given order.
fn infection_csv(rows: &[(u16, u64)]) -> String {
    let mut text = String::from("Date,ALL\n");
    for &(offset, count) in rows {
        let date = start() + Duration::days(offset as i64);
        text.push_str(&format!("{},{count}\n", date.format("%Y/%-m/%-d")));
    }
    text
}

fn load(rows: &[(u16, u64)]) -> Series<InfectionRecord> {
    parse_series(SourceId::InfectionTrend, &infection_csv(rows)).unwrap()
}

fn rows_strategy() -> impl Strategy<Value = Vec<(u16, u64)>> {
    prop::collection::vec((0u16..120, 0u64..50_000), 0..80)
}

proptest! {
    #[test]
    fn loaded_dates_are_strictly_ascending(rows in rows_strategy()) {
        let series = load(&rows);
        for pair in series.records().windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        let mut unique: Vec<u16> = rows.iter().map(|r| r.0).collect();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(series.len(), unique.len());
    }

    #[test]
    fn first_row_for_a_date_wins(rows in rows_strategy()) {
        let series = load(&rows);
        let mut first: HashMap<NaiveDate, u64> = HashMap::new();
        for &(offset, count) in &rows {
            first.entry(start() + Duration::days(offset as i64)).or_insert(count);
        }
        for record in series.records() {
            prop_assert_eq!(Some(&record.new_cases), first.get(&record.date));
        }
    }

    #[test]
    fn lookups_outside_bounds_are_empty(rows in rows_strategy(), index in -5isize..100) {
        let series = load(&rows);
        let in_range = index >= 0 && (index as usize) < series.len();
        prop_assert_eq!(point_lookup(&series, index).is_some(), in_range);
    }

    #[test]
    fn rolling_average_is_trailing_thirty_mean(rows in rows_strategy()) {
        let series = load(&rows);
        let counts: Vec<u64> = series.records().iter().map(|r| r.new_cases).collect();
        for (i, record) in series.records().iter().enumerate() {
            let lo = i.saturating_sub(29);
            let window = &counts[lo..=i];
            let mean = window.iter().sum::<u64>() as f64 / window.len() as f64;
            prop_assert!((record.rolling_average - round2(mean)).abs() < 1e-9);
        }
    }

    #[test]
    fn range_has_capped_length_and_ends_at_index(rows in rows_strategy(), window in 0usize..60) {
        let series = load(&rows);
        for i in 0..series.len() {
            let slice = range_ending_at(&series, i as isize, window);
            prop_assert_eq!(slice.len(), window.min(i + 1));
            if let Some(last) = slice.last() {
                prop_assert_eq!(Some(last), point_lookup(&series, i as isize));
            }
        }
    }

    #[test]
    fn delta_cumulative_never_decreases(deaths in prop::collection::vec(0u64..1_000, 1..60)) {
        let records: Vec<DeathRecord> = deaths
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let date = start() + Duration::days(i as i64);
                DeathRecord { date, date_label: date.format("%Y/%-m/%-d").to_string(), deaths: d }
            })
            .collect();
        let series = Series::from_records(SourceId::Deaths, records);
        let mut prev = 0;
        for i in 0..series.len() {
            let total = cumulative_at(&series, i as isize).unwrap().cumulative;
            prop_assert!(total >= prev);
            prev = total;
        }
        prop_assert_eq!(prev, deaths.iter().sum::<u64>());
    }

    #[test]
    fn rebuilding_a_sorted_series_is_a_no_op(rows in rows_strategy()) {
        let series = load(&rows);
        let again = Series::from_records(SourceId::InfectionTrend, series.records().to_vec());
        prop_assert_eq!(again.records(), series.records());
    }
}

#[test]
fn shuffled_input_loads_identically() {
    let rows: Vec<(u16, u64)> = (0..200).map(|i| (i, (i as u64 * 37) % 1_000)).collect();
    let reference = load(&rows);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let mut shuffled = rows.clone();
        shuffled.shuffle(&mut rng);
        let series = load(&shuffled);
        assert_eq!(series.records(), reference.records());
    }
}
