//! ASCII plotting for terminal output.
//!
//! Fixed-size grid, deterministic output.
//!
//! Plot elements:
//! - daily new cases: `o`
//! - rolling average: `-` line

use crate::report::TrendPoint;

/// Render the trend slice of a dashboard view.
///
/// The x axis is the position within the slice (oldest on the left); the y
/// axis is case counts.
pub fn render_trend_plot(trend: &[TrendPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    let (Some(first), Some(last)) = (trend.first(), trend.last()) else {
        out.push_str("Plot: no data\n");
        return out;
    };

    let x_max = (trend.len() - 1) as f64;
    let (y_min, y_max) = y_range(trend);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Average line first so the daily points overlay it.
    let average: Vec<(f64, f64)> = trend
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.rolling_average))
        .collect();
    draw_curve(&mut grid, &average, x_max, y_min, y_max);

    for (i, p) in trend.iter().enumerate() {
        let x = map_x(i as f64, x_max, width);
        let y = map_y(p.new_cases as f64, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    out.push_str(&format!(
        "Plot: {} .. {} | cases=[{y_min:.1}, {y_max:.1}]\n",
        first.date_label, last.date_label
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(trend: &[TrendPoint]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in trend {
        for y in [p.new_cases as f64, p.rolling_average] {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        (min_y, max_y)
    } else if min_y.is_finite() {
        (min_y - 1.0, min_y + 1.0)
    } else {
        (0.0, 1.0)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    if x_max <= 0.0 {
        return 0;
    }
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // max is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let xx = map_x(x, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, xx, yy, '-');
        } else {
            grid[yy][xx] = '-';
        }
        prev = Some((xx, yy));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
