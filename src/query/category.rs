//! Per-category queries: windowed totals, single-day snapshots, rankings.

use crate::domain::{AGE_DISPLAY_GROUPS, CategoryAggregate, CategoryRecord, Series};
use crate::query::{history_through, point_lookup, range_ending_at};

/// How far back a windowed total reaches from the queried index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Every record up to and including the index.
    All,
    /// At most this many records ending at the index.
    Last(usize),
}

/// Sum each category over the window ending at `index`.
///
/// Output follows `keys` exactly (no re-sorting). Unknown keys total zero and
/// use the key itself as label. An out-of-range index yields an empty list.
pub fn windowed_category_totals<R: CategoryRecord>(
    series: &Series<R>,
    index: isize,
    window: Window,
    keys: &[&str],
) -> Vec<CategoryAggregate> {
    let records = match window {
        Window::All => history_through(series, index),
        Window::Last(n) => range_ending_at(series, index, n),
    };
    if records.is_empty() {
        return Vec::new();
    }

    keys.iter()
        .map(|&key| {
            let total = records
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.category_value(key).unwrap_or(0)));
            aggregate::<R>(key, total)
        })
        .collect()
}

/// Each category's value on the single day at `index`.
pub fn category_snapshot<R: CategoryRecord>(series: &Series<R>, index: isize, keys: &[&str]) -> Vec<CategoryAggregate> {
    let Some(record) = point_lookup(series, index) else {
        return Vec::new();
    };
    keys.iter()
        .map(|&key| aggregate::<R>(key, record.category_value(key).unwrap_or(0)))
        .collect()
}

/// All codes of a record type's taxonomy, in table order.
pub fn all_keys<R: CategoryRecord>() -> Vec<&'static str> {
    R::taxonomy().codes().collect()
}

/// Top `top_n` non-zero aggregates by total, largest first.
///
/// The sort is stable, so ties keep their input (taxonomy) order.
pub fn rank_categories(aggregates: &[CategoryAggregate], top_n: usize) -> Vec<CategoryAggregate> {
    let mut ranked: Vec<CategoryAggregate> = aggregates.iter().filter(|a| a.total > 0).cloned().collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    ranked.truncate(top_n);
    ranked
}

/// Fold per-bracket age aggregates into the coarser display groups.
///
/// Brackets missing from `aggregates` count as zero.
pub fn group_age_totals(aggregates: &[CategoryAggregate]) -> Vec<CategoryAggregate> {
    AGE_DISPLAY_GROUPS
        .iter()
        .map(|(label, members)| {
            let total = aggregates
                .iter()
                .filter(|a| members.contains(&a.category_key.as_str()))
                .fold(0u64, |acc, a| acc.saturating_add(a.total));
            CategoryAggregate {
                category_key: members.join("+"),
                label: (*label).to_string(),
                total,
            }
        })
        .collect()
}

fn aggregate<R: CategoryRecord>(key: &str, total: u64) -> CategoryAggregate {
    CategoryAggregate {
        category_key: key.to_string(),
        label: R::taxonomy().label_or_code(key).to_string(),
        total,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{AgeGroupRecord, InfectionRecord, PrefectureCounts, SourceId};

    fn age_series(days: &[[u64; 10]]) -> Series<AgeGroupRecord> {
        let start = NaiveDate::from_ymd_opt(2021, 8, 1).unwrap();
        let records = days
            .iter()
            .enumerate()
            .map(|(i, brackets)| {
                let date = start + chrono::Duration::days(i as i64);
                AgeGroupRecord {
                    date,
                    date_label: date.format("%Y/%-m/%-d").to_string(),
                    brackets: *brackets,
                }
            })
            .collect();
        Series::from_records(SourceId::AgeGroups, records)
    }

    fn teens_twenties(teens: u64, twenties: u64) -> [u64; 10] {
        [0, teens, twenties, 0, 0, 0, 0, 0, 0, 0]
    }

    #[test]
    fn windowed_totals_keep_key_order() {
        let s = age_series(&[teens_twenties(1, 4), teens_twenties(2, 5), teens_twenties(3, 6)]);
        let totals = windowed_category_totals(&s, 2, Window::Last(3), &["teens", "twenties"]);
        let got: Vec<(&str, u64)> = totals.iter().map(|a| (a.category_key.as_str(), a.total)).collect();
        assert_eq!(got, vec![("teens", 6), ("twenties", 15)]);
        assert_eq!(totals[0].label, "10代");

        let reversed = windowed_category_totals(&s, 2, Window::Last(3), &["twenties", "teens"]);
        assert_eq!(reversed[0].category_key, "twenties");
    }

    #[test]
    fn window_is_capped_and_bounded() {
        let s = age_series(&[teens_twenties(1, 4), teens_twenties(2, 5), teens_twenties(3, 6)]);
        let last_two = windowed_category_totals(&s, 2, Window::Last(2), &["teens"]);
        assert_eq!(last_two[0].total, 5);

        let through_first = windowed_category_totals(&s, 0, Window::All, &["teens"]);
        assert_eq!(through_first[0].total, 1);

        assert!(windowed_category_totals(&s, 3, Window::All, &["teens"]).is_empty());
        assert!(windowed_category_totals(&s, -1, Window::Last(30), &["teens"]).is_empty());
    }

    #[test]
    fn unknown_key_totals_zero_with_code_label() {
        let s = age_series(&[teens_twenties(1, 4)]);
        let totals = windowed_category_totals(&s, 0, Window::All, &["centenarians"]);
        assert_eq!(totals[0].total, 0);
        assert_eq!(totals[0].label, "centenarians");
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let s = age_series(&[teens_twenties(u64::MAX, 1), teens_twenties(1, 1)]);
        let totals = windowed_category_totals(&s, 1, Window::All, &["teens", "twenties"]);
        assert_eq!(totals[0].total, u64::MAX);
        assert_eq!(totals[1].total, 2);

        let groups = group_age_totals(&windowed_category_totals(&s, 1, Window::All, &["under10", "teens"]));
        assert_eq!(groups[0].total, u64::MAX);
    }

    #[test]
    fn snapshot_reads_one_day() {
        let s = age_series(&[teens_twenties(1, 4), teens_twenties(2, 5)]);
        let snap = category_snapshot(&s, 1, &["twenties", "teens"]);
        assert_eq!(snap.iter().map(|a| a.total).collect::<Vec<_>>(), vec![5, 2]);
        assert!(category_snapshot(&s, 2, &["teens"]).is_empty());
    }

    #[test]
    fn prefecture_snapshot_and_ranking() {
        let mut values = vec![0; 47];
        values[0] = 30; // Hokkaido
        values[12] = 500; // Tokyo
        values[26] = 30; // Osaka
        let mut rec = InfectionRecord::new(NaiveDate::from_ymd_opt(2021, 8, 1).unwrap(), "2021/8/1", 560);
        rec.prefecture_counts = Some(PrefectureCounts::from_ordered(values));
        let s = Series::from_records(SourceId::InfectionTrend, vec![rec]);

        let keys = all_keys::<InfectionRecord>();
        assert_eq!(keys.len(), 47);
        let snap = category_snapshot(&s, 0, &keys);
        assert_eq!(snap[12].label, "東京都");

        let ranked = rank_categories(&snap, 10);
        let order: Vec<&str> = ranked.iter().map(|a| a.category_key.as_str()).collect();
        assert_eq!(order, vec!["Tokyo", "Hokkaido", "Osaka"]);
        assert_eq!(rank_categories(&snap, 1).len(), 1);
    }

    #[test]
    fn age_groups_merge_brackets() {
        let s = age_series(&[[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]]);
        let totals = windowed_category_totals(&s, 0, Window::Last(30), &all_keys::<AgeGroupRecord>());
        let groups = group_age_totals(&totals);
        let got: Vec<(&str, u64)> = groups.iter().map(|g| (g.label.as_str(), g.total)).collect();
        assert_eq!(
            got,
            vec![
                ("10代以下", 3),
                ("20代", 3),
                ("30代", 4),
                ("40代", 5),
                ("50代", 6),
                ("60代", 7),
                ("70代以上", 27),
            ]
        );
    }
}
