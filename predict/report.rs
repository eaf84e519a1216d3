//! Text rendering for the terminal: currency, the contribution table and the
//! charge histogram.

use crate::contributions::Contribution;
use crate::dataset::Histogram;
use std::fmt::Write as FmtWrite;

const HISTOGRAM_WIDTH: usize = 50;

/// Formats a dollar amount with thousands separators and two decimals, e.g.
/// `$12,345.67`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn render_estimate(charges: f64) -> String {
    format!(
        "Estimated annual medical charges: {}",
        format_currency(charges)
    )
}

pub fn render_contributions(contributions: &[Contribution]) -> String {
    let name_width = contributions
        .iter()
        .map(|c| c.feature.len())
        .chain(std::iter::once("feature".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    writeln!(out, "Feature contributions (coefficients * input values):").ok();
    writeln!(out, "{:<name_width$}  {:>14}", "feature", "contribution").ok();
    writeln!(out, "{}", "-".repeat(name_width + 16)).ok();
    for c in contributions {
        writeln!(out, "{:<name_width$}  {:>14.4}", c.feature, c.value).ok();
    }
    out
}

/// Draws one row per bin: the range, the count, a bar of `#` proportional to the
/// count, and a `*` marking the scaled kernel density when one is available.
pub fn render_histogram(histogram: &Histogram) -> String {
    let max_count = histogram.max_count().max(1) as f64;
    let max_density = histogram
        .bins
        .iter()
        .filter_map(|b| b.density)
        .fold(0.0_f64, f64::max);
    let scale = HISTOGRAM_WIDTH as f64 / max_count.max(max_density);

    let labels: Vec<String> = histogram
        .bins
        .iter()
        .map(|b| format!("[{}, {})", format_currency(b.lower), format_currency(b.upper)))
        .collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    writeln!(
        out,
        "Dataset charge distribution ({} records, {} bins):",
        histogram.total,
        histogram.bins.len()
    )
    .ok();
    for (bin, label) in histogram.bins.iter().zip(&labels) {
        let bar_len = (bin.count as f64 * scale).round() as usize;
        let mut bar: Vec<char> = vec!['#'; bar_len];
        if let Some(density) = bin.density {
            let pos = (density * scale).round() as usize;
            if pos >= bar.len() {
                bar.resize(pos + 1, ' ');
            }
            bar[pos] = '*';
        }
        let bar: String = bar.into_iter().collect();
        writeln!(
            out,
            "{label:<label_width$}  {:>6}  {}",
            bin.count,
            bar.trim_end()
        )
        .ok();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{BinRule, HistogramBin};

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(5.5), "$5.50");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(12345.678), "$12,345.68");
        assert_eq!(format_currency(1234567.0), "$1,234,567.00");
        assert_eq!(format_currency(-42.1), "-$42.10");
    }

    #[test]
    fn test_render_estimate() {
        assert_eq!(
            render_estimate(31925.3),
            "Estimated annual medical charges: $31,925.30"
        );
    }

    #[test]
    fn test_render_contributions_lists_rows_in_order() {
        let rows = vec![
            Contribution {
                feature: "smoker_yes".to_string(),
                value: 23848.53,
            },
            Contribution {
                feature: "age".to_string(),
                value: 7705.8,
            },
        ];
        let text = render_contributions(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("smoker_yes"));
        assert!(lines[3].ends_with("23848.5300"));
        assert!(lines[4].starts_with("age"));
    }

    #[test]
    fn test_render_histogram_scales_longest_bar() {
        let hist = Histogram {
            bins: vec![
                HistogramBin {
                    lower: 0.0,
                    upper: 10.0,
                    count: 10,
                    density: None,
                },
                HistogramBin {
                    lower: 10.0,
                    upper: 20.0,
                    count: 5,
                    density: None,
                },
            ],
            total: 15,
        };
        let text = render_histogram(&hist);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].matches('#').count(), HISTOGRAM_WIDTH);
        assert_eq!(lines[2].matches('#').count(), HISTOGRAM_WIDTH / 2);
    }

    #[test]
    fn test_render_histogram_marks_density_past_the_bar() {
        let hist = Histogram {
            bins: vec![
                HistogramBin {
                    lower: 0.0,
                    upper: 10.0,
                    count: 4,
                    density: Some(1.0),
                },
                HistogramBin {
                    lower: 10.0,
                    upper: 20.0,
                    count: 0,
                    density: Some(2.0),
                },
            ],
            total: 4,
        };
        let text = render_histogram(&hist);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with('#'));
        assert_eq!(lines[1].matches('#').count(), HISTOGRAM_WIDTH - 1);
        assert!(lines[2].ends_with('*'));
        assert_eq!(lines[2].matches('#').count(), 0);
    }

    #[test]
    fn test_render_histogram_marks_density() {
        let values: Vec<f64> = (0..300).map(|i| 1000.0 + (i % 37) as f64 * 50.0).collect();
        let hist = Histogram::from_values(&values, BinRule::Fixed(6)).unwrap();
        let text = render_histogram(&hist);
        assert_eq!(text.lines().count(), 7);
        assert!(text.lines().skip(1).all(|line| line.contains('*')));
    }
}
