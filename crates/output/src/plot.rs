// Copyright 2025-2026 CEMAXECUTER LLC

use std::fmt::Write;

/// Layout of a text plot.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Plot columns, excluding the axis label column
    pub width: usize,
    pub height: usize,
    pub title: String,
    /// Fixed y range; autoscaled from the data when `None`
    pub y_range: Option<(f32, f32)>,
    /// Divisor applied to x values in the footer, e.g. 1e6 for MHz
    pub x_scale: f64,
    pub x_unit: String,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 80,
            height: 20,
            title: String::new(),
            y_range: None,
            x_scale: 1e6,
            x_unit: "MHz".to_string(),
        }
    }
}

/// Render `ys` against `xs` as a column plot.
///
/// Each column shows the maximum of the points that fall in it, so narrow
/// peaks survive decimation. Non-finite values are ignored.
pub fn render(xs: &[f64], ys: &[f32], opts: &PlotOptions) -> String {
    let width = opts.width.max(1);
    let height = opts.height.max(2);
    let n = xs.len().min(ys.len());

    let mut columns = vec![f32::NEG_INFINITY; width];
    for (i, &y) in ys[..n].iter().enumerate() {
        if y.is_finite() {
            let col = i * width / n;
            columns[col] = columns[col].max(y);
        }
    }

    let (lo, hi) = opts.y_range.unwrap_or_else(|| {
        let finite = columns.iter().copied().filter(|v| v.is_finite());
        let lo = finite.clone().fold(f32::INFINITY, f32::min);
        let hi = finite.fold(f32::NEG_INFINITY, f32::max);
        if lo.is_finite() {
            (lo, hi)
        } else {
            (0.0, 1.0)
        }
    });
    let span = if hi > lo { hi - lo } else { 1.0 };

    let mut out = String::new();
    if !opts.title.is_empty() {
        let _ = writeln!(out, "{}", opts.title);
    }
    for row in 0..height {
        // Level at the bottom edge of this row
        let level = hi - span * (row + 1) as f32 / height as f32;
        let label = if row == 0 || row == height - 1 || row == height / 2 {
            format!("{:>8.1} |", hi - span * row as f32 / (height - 1) as f32)
        } else {
            format!("{:>8} |", "")
        };
        out.push_str(&label);
        for &v in &columns {
            out.push(if v.is_finite() && v >= level { '#' } else { ' ' });
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{:>8} +{}", "", "-".repeat(width));
    if n > 0 {
        let left = format!("{:.3}", xs[0] / opts.x_scale);
        let right = format!("{:.3} {}", xs[n - 1] / opts.x_scale, opts.x_unit);
        let gap = (width + 1).saturating_sub(left.len() + right.len()).max(1);
        let _ = writeln!(out, "{:>9}{}{}{}", "", left, " ".repeat(gap), right);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_column_is_tallest() {
        let xs: Vec<f64> = (0..100).map(|i| 100e6 + i as f64 * 1e3).collect();
        let mut ys = vec![-80.0f32; 100];
        ys[50] = -10.0;
        let opts = PlotOptions { width: 10, height: 5, ..Default::default() };
        let text = render(&xs, &ys, &opts);
        let lines: Vec<&str> = text.lines().collect();
        // 5 rows, axis, footer
        assert_eq!(lines.len(), 7);
        // Top row holds only the peak column
        let top = &lines[0][10..];
        assert_eq!(top, "     #    ");
        // Bottom row is filled across
        assert_eq!(&lines[4][10..], "##########");
        assert!(lines[6].contains("100.000"));
        assert!(lines[6].ends_with("MHz"));
    }

    #[test]
    fn test_labels_and_title() {
        let opts = PlotOptions {
            width: 4,
            height: 3,
            title: "sweep".to_string(),
            y_range: Some((-20.0, 0.0)),
            ..Default::default()
        };
        let text = render(&[1.0, 2.0], &[0.0, f32::NAN], &opts);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "sweep");
        assert!(lines[1].starts_with("     0.0 |"));
        assert!(lines[3].starts_with("   -20.0 |"));
    }

    #[test]
    fn test_empty_input() {
        let text = render(&[], &[], &PlotOptions { width: 3, height: 2, ..Default::default() });
        assert_eq!(text.lines().count(), 3);
    }
}
