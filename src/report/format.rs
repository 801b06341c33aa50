//! Formatted terminal output for a dashboard view.

use crate::data::Dataset;
use crate::domain::CategoryAggregate;
use crate::report::DashboardView;

/// Format the full dashboard: header, KPIs, age breakdowns, ranking.
pub fn format_view(view: &DashboardView) -> String {
    let mut out = String::new();

    out.push_str("=== covid - daily dashboard ===\n");
    out.push_str(&format!(
        "Date: {} ({}) | index={} | range=[{}, {}]\n",
        view.date_label, view.date, view.index, view.first_date, view.last_date
    ));

    let k = &view.kpis;
    out.push_str("\nKey figures:\n");
    out.push_str(&format!("- new cases       : {}\n", fmt_count(k.new_cases)));
    out.push_str(&format!("- 30-day average  : {:.2}\n", k.rolling_average));
    out.push_str(&format!("- cumulative cases: {}\n", fmt_count(k.cumulative_cases)));
    if let Some(reported) = k.reported_cumulative_cases {
        out.push_str(&format!("- reported total  : {}\n", fmt_count(reported)));
    }
    out.push_str(&format!(
        "- cumulative deaths: {}\n",
        k.cumulative_deaths.map(fmt_count).unwrap_or_else(|| "n/a".to_string())
    ));

    if !view.age_monthly.is_empty() {
        out.push_str("\nNew cases by age (recent window):\n");
        out.push_str(&format_aggregates(&view.age_monthly));
    }
    if !view.age_totals.is_empty() {
        out.push_str("\nNew cases by age (all time):\n");
        out.push_str(&format_aggregates(&view.age_totals));
    }

    out.push_str("\nTop prefectures (selected day):\n");
    if view.prefecture_ranking.is_empty() {
        out.push_str("(no per-prefecture data)\n");
    } else {
        out.push_str(&format_ranking(&view.prefecture_ranking));
    }

    out
}

/// One line per loaded source with its row bookkeeping.
pub fn format_sources(dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<18} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "source", "records", "read", "dropped", "dupes", "default"
        )
        .trim_end(),
    );
    out.push('\n');
    for (source, records, diag) in dataset.summary() {
        out.push_str(&format!(
            "{:<18} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
            source.key(),
            records,
            diag.rows_read,
            diag.rows_dropped,
            diag.duplicates_dropped,
            diag.values_defaulted
        ));
    }
    out
}

fn format_aggregates(rows: &[CategoryAggregate]) -> String {
    let max = rows.iter().map(|a| a.total).max().unwrap_or(0);
    let mut out = String::new();
    for a in rows {
        out.push_str(
            format!("{:<10} {:>10} {}", truncate(&a.label, 10), fmt_count(a.total), bar(a.total, max, 30)).trim_end(),
        );
        out.push('\n');
    }
    out
}

fn format_ranking(rows: &[CategoryAggregate]) -> String {
    let mut out = String::new();
    for (rank, a) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {:<12} {:<10} {:>10}\n",
            rank + 1,
            a.category_key,
            truncate(&a.label, 10),
            fmt_count(a.total)
        ));
    }
    out
}

fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let n = ((value as f64 / max as f64) * width as f64).round() as usize;
    "#".repeat(n)
}

/// Thousands-separated count, e.g. `12,345`.
fn fmt_count(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
