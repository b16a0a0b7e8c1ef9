//! # Column Widths
//!
//! Proportional column widths for tabular reports. Widths are derived from
//! the header labels and a sample of the first rows, never from the whole
//! row set, and always fit the usable page width.

use serde::Serialize;

use crate::style::TextAlign;
use crate::text::Measure;

/// A visible table column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    /// Row key the column reads.
    pub key: String,
    /// Header text.
    pub label: String,
    /// Width in millimetres.
    pub width: f64,
    pub align: TextAlign,
}

/// Knobs for [`allocate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnPolicy {
    /// Narrowest column the allocator hands out, when the budget allows.
    pub min_width: f64,
    /// Horizontal padding added to the measured content of each cell.
    pub cell_padding: f64,
    /// How many leading rows are measured.
    pub sample_size: usize,
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        Self {
            min_width: 18.0,
            cell_padding: 4.0,
            sample_size: 10,
        }
    }
}

/// Compute one width per header.
///
/// `samples` holds the display values of the first rows, one `Vec` per row
/// aligned with `headers`; only the first `policy.sample_size` rows are
/// read. A column's desired width is the larger of its label width and the
/// average sampled value width, plus padding, and at least the minimum.
/// With no samples the budget is split by label length.
///
/// The result never sums to more than `total_width`: after a uniform
/// shrink only columns above the minimum give up more space, and when even
/// the minimums don't fit every column gets an equal share.
pub fn allocate<M: Measure + ?Sized>(
    headers: &[&str],
    total_width: f64,
    samples: &[Vec<String>],
    measure: &M,
    policy: ColumnPolicy,
) -> Vec<f64> {
    allocate_with(headers, total_width, samples, measure, measure, policy)
}

/// [`allocate`] with header labels measured in their own face, for
/// headers drawn bold over regular cells.
pub fn allocate_with<L: Measure + ?Sized, M: Measure + ?Sized>(
    headers: &[&str],
    total_width: f64,
    samples: &[Vec<String>],
    label_measure: &L,
    measure: &M,
    policy: ColumnPolicy,
) -> Vec<f64> {
    let n = headers.len();
    if n == 0 {
        return Vec::new();
    }
    let total_width = if total_width.is_finite() {
        total_width.max(0.0)
    } else {
        0.0
    };

    let sampled = &samples[..samples.len().min(policy.sample_size)];
    let desired: Vec<f64> = if sampled.is_empty() {
        proportional_by_label(headers, total_width)
    } else {
        headers
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let label_w = label_measure.width(label);
                let values: Vec<f64> = sampled
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|v| measure.width(v))
                    .collect();
                let avg = if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                };
                label_w.max(avg) + policy.cell_padding
            })
            .collect()
    };

    let widths = fit_to_budget(desired, total_width, policy.min_width);
    log::debug!(
        "allocated {} columns in {:.1}mm: {:?}",
        n,
        total_width,
        widths.iter().map(|w| (w * 10.0).round() / 10.0).collect::<Vec<_>>()
    );
    widths
}

fn proportional_by_label(headers: &[&str], total_width: f64) -> Vec<f64> {
    let lens: Vec<f64> = headers
        .iter()
        .map(|h| h.chars().count().max(1) as f64)
        .collect();
    let sum: f64 = lens.iter().sum();
    lens.iter().map(|l| total_width * l / sum).collect()
}

/// Clamp to `min_width`, then shrink until the sum fits `total_width`.
fn fit_to_budget(mut widths: Vec<f64>, total_width: f64, min_width: f64) -> Vec<f64> {
    let n = widths.len() as f64;
    if n * min_width > total_width {
        log::warn!(
            "{} columns at {:.1}mm minimum exceed {:.1}mm; splitting evenly",
            widths.len(),
            min_width,
            total_width
        );
        return vec![total_width / n; widths.len()];
    }

    for w in widths.iter_mut() {
        *w = w.max(min_width);
    }

    let sum: f64 = widths.iter().sum();
    if sum <= total_width {
        return widths;
    }

    let scale = total_width / sum;
    for w in widths.iter_mut() {
        *w = (*w * scale).max(min_width);
    }

    // Re-clamping can push the sum back over; take the excess from the
    // columns that are still above the minimum.
    let sum: f64 = widths.iter().sum();
    let excess = sum - total_width;
    if excess > 0.0 {
        let flexible: f64 = widths
            .iter()
            .filter(|w| **w > min_width)
            .map(|w| w - min_width)
            .sum();
        if flexible > 0.0 {
            let ratio = (excess / flexible).min(1.0);
            for w in widths.iter_mut() {
                if *w > min_width {
                    *w -= (*w - min_width) * ratio;
                }
            }
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(s: &str) -> f64 {
        s.chars().count() as f64
    }

    fn policy() -> ColumnPolicy {
        ColumnPolicy {
            min_width: 5.0,
            cell_padding: 2.0,
            sample_size: 10,
        }
    }

    fn sum(ws: &[f64]) -> f64 {
        ws.iter().sum()
    }

    #[test]
    fn desired_widths_when_budget_allows() {
        let samples = vec![vec!["NC-001".to_string(), "Short".to_string()]];
        let ws = allocate(&["Code", "Title"], 100.0, &samples, &mono, policy());
        assert_eq!(ws, vec![8.0, 7.0]);
    }

    #[test]
    fn average_of_samples_is_used() {
        let samples = vec![
            vec!["aaaaaaaaaa".to_string()],
            vec!["aaaaaaaaaaaaaaaaaaaa".to_string()],
        ];
        let ws = allocate(&["T"], 100.0, &samples, &mono, policy());
        assert_eq!(ws, vec![17.0]);
    }

    #[test]
    fn only_first_rows_are_sampled() {
        let mut samples: Vec<Vec<String>> = (0..10).map(|_| vec!["ab".to_string()]).collect();
        samples.push(vec!["x".repeat(500)]);
        let ws = allocate(&["A"], 100.0, &samples, &mono, policy());
        assert_eq!(ws, vec![5.0]);
    }

    #[test]
    fn shrinks_to_fit_budget() {
        let long = "x".repeat(80);
        let samples = vec![vec![long.clone(), long.clone(), "ok".to_string()]];
        let ws = allocate(&["A", "B", "C"], 60.0, &samples, &mono, policy());
        assert!(sum(&ws) <= 60.0 * 1.0001, "{ws:?}");
        assert!(ws.iter().all(|w| *w >= 5.0 - 1e-9));
    }

    #[test]
    fn minimums_that_cannot_fit_split_evenly() {
        let headers = ["a", "b", "c", "d", "e"];
        let ws = allocate(&headers, 20.0, &[], &mono, policy());
        assert_eq!(ws, vec![4.0; 5]);
    }

    #[test]
    fn no_samples_split_by_label_length() {
        let ws = allocate(&["Code", "Description"], 150.0, &[], &mono, policy());
        assert!((sum(&ws) - 150.0).abs() < 1e-9);
        assert!(ws[1] > ws[0]);
    }

    #[test]
    fn budget_holds_for_many_shapes() {
        let labels: Vec<String> = (0..12).map(|i| "label".repeat(i % 4 + 1)).collect();
        let headers: Vec<&str> = labels.iter().map(String::as_str).collect();
        for total in [0.0, 1.0, 30.0, 59.9, 60.0, 61.0, 180.0, 267.0, 1000.0] {
            for k in 0..headers.len() {
                let samples = vec![labels[..k].iter().map(|l| l.repeat(3)).collect::<Vec<_>>()];
                let ws = allocate(&headers[..k], total, &samples, &mono, policy());
                assert_eq!(ws.len(), k);
                assert!(sum(&ws) <= total * 1.0001 + 1e-9, "total {total} k {k}: {ws:?}");
            }
        }
    }

    #[test]
    fn labels_use_their_own_measure() {
        let bold = |s: &str| 2.0 * s.chars().count() as f64;
        let samples = vec![vec!["NC-1".to_string(), "x".to_string()]];
        let ws = allocate_with(&["Code", "Status"], 100.0, &samples, &bold, &mono, policy());
        assert_eq!(ws, vec![10.0, 14.0]);
    }

    #[test]
    fn empty_headers() {
        assert!(allocate(&[], 100.0, &[], &mono, policy()).is_empty());
    }
}
