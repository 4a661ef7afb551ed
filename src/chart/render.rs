//! Draws numeric series as a line chart with box-drawing characters
//!
//! ```text
//!       3.00 ┤  ╭
//!       2.00 ┤ ╭╯
//!       1.00 ┼─╯
//!             2021-01-01 2021-03-01
//! ```

use super::{
    color::Color,
    select::{Selection, Series},
};

/// Width of the y-axis labels
const LABEL_WIDTH: usize = 11;
/// Cells before the first data column: label, space, axis
const OFFSET: usize = 3;

/// Converts a value to its row level, counted from the bottom of the chart
struct Scale {
    ratio: f64,
    min: i64,
}

impl Scale {
    fn level(&self, value: f64) -> usize {
        ((value * self.ratio).round() as i64 - self.min).max(0) as usize
    }
}

/// Plots every series on a shared y-axis scaled to roughly `height` rows.
///
/// Series take colors from `colors` in turn. Returns an empty string if there is nothing to plot.
pub fn plot(series: &[Series], height: usize, colors: &[Color]) -> String {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return String::new();
    }

    let range = max - min;
    let ratio = if range > 0.0 { height as f64 / range } else { 1.0 };
    let min_level = (min * ratio).round() as i64;
    let max_level = (max * ratio).round() as i64;
    let rows = (max_level - min_level) as usize;
    let width = series.iter().map(|s| s.values.len()).max().unwrap_or(0) + OFFSET;
    let scale = Scale {
        ratio,
        min: min_level,
    };

    let mut grid = vec![vec![" ".to_string(); width]; rows + 1];
    for (r, row) in grid.iter_mut().enumerate() {
        let label = if rows > 0 {
            max - r as f64 * range / rows as f64
        } else {
            max
        };
        row[0] = format!("{label:>LABEL_WIDTH$.2}");
        let axis = if max_level - r as i64 == 0 { "┼" } else { "┤" };
        row[OFFSET - 1] = axis.to_string();
    }

    for (i, s) in series.iter().enumerate() {
        let color = (!colors.is_empty()).then(|| colors[i % colors.len()]);
        let paint = |glyph: &str| match color {
            Some(color) => color.paint(glyph),
            None => glyph.to_string(),
        };
        if let Some(&first) = s.values.first() {
            grid[rows - scale.level(first)][OFFSET - 1] = paint("┼");
        }
        for (x, pair) in s.values.windows(2).enumerate() {
            let (y0, y1) = (scale.level(pair[0]), scale.level(pair[1]));
            let col = x + OFFSET;
            if y0 == y1 {
                grid[rows - y0][col] = paint("─");
                continue;
            }
            let (turn_to, turn_from) = if y0 > y1 { ("╰", "╮") } else { ("╭", "╯") };
            grid[rows - y1][col] = paint(turn_to);
            grid[rows - y0][col] = paint(turn_from);
            for y in y0.min(y1) + 1..y0.max(y1) {
                grid[rows - y][col] = paint("│");
            }
        }
    }

    grid.iter()
        .map(|row| row.concat().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Line under the plot with the first x label at the left edge and the last at the right
fn x_axis_line(first: &str, last: &str, points: usize) -> String {
    let indent = " ".repeat(LABEL_WIDTH + OFFSET - 1);
    let gap = points
        .saturating_sub(first.chars().count())
        .max(last.chars().count() + 1);
    format!("{indent}{first}{last:>gap$}")
}

fn legend(series: &[Series], colors: &[Color]) -> String {
    series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let marker = match colors.get(i % colors.len().max(1)) {
                Some(color) => color.paint("■"),
                None => "■".to_string(),
            };
            format!("{marker} {}", s.name)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Renders the plot, the x-axis labels (if any) and a legend
pub fn render_chart(selection: &Selection, height: usize, colors: &[Color]) -> String {
    let mut chart = plot(&selection.series, height, colors);
    if chart.is_empty() {
        return chart;
    }
    if let Some((first, last)) = &selection.x_labels {
        let points = selection
            .series
            .iter()
            .map(|s| s.values.len())
            .max()
            .unwrap_or(0);
        chart.push('\n');
        chart.push_str(&x_axis_line(first, last, points));
    }
    chart.push('\n');
    chart.push_str(&legend(&selection.series, colors));
    chart
}
