//! Element-wise comparison of result tables from independent runs.
//!
//! Two tables of identical shape are reduced to the flattened relative
//! differences `(reference - candidate) / reference`. Divisions by zero or
//! near-zero produce non-finite or enormous ratios; the outlier filter
//! drops those before any aggregation. That filter is a lossy presentation
//! policy (it keeps divide-by-near-zero artifacts from drowning the
//! histogram), not a correctness statement about the dropped elements.

use orbit_export::ResultTable;
use thiserror::Error;

/// Default outlier threshold: relative differences at or beyond 5000% are
/// treated as divide-by-near-zero artifacts.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 50.0;

/// Two tables whose shapes cannot be compared element-wise.
#[derive(Debug, Error)]
#[error(
    "tables are incompatible: reference is {reference_rows}x{reference_columns}, candidate is {candidate_rows}x{candidate_columns}"
)]
pub struct ShapeMismatchError {
    pub reference_rows: usize,
    pub reference_columns: usize,
    pub candidate_rows: usize,
    pub candidate_columns: usize,
}

/// Flattened element-wise relative differences between two same-shape
/// tables, time column included. Ratios may be non-finite where the
/// reference value is zero; callers filter before aggregating.
pub fn relative_difference(
    reference: &ResultTable,
    candidate: &ResultTable,
) -> Result<Vec<f64>, ShapeMismatchError> {
    if reference.row_count() != candidate.row_count()
        || reference.column_count() != candidate.column_count()
    {
        return Err(ShapeMismatchError {
            reference_rows: reference.row_count(),
            reference_columns: reference.column_count(),
            candidate_rows: candidate.row_count(),
            candidate_columns: candidate.column_count(),
        });
    }

    let mut differences =
        Vec::with_capacity(reference.row_count() * (reference.column_count() + 1));
    for i in 0..reference.row_count() {
        let t_ref = reference.times()[i];
        let t_cand = candidate.times()[i];
        differences.push((t_ref - t_cand) / t_ref);
        for (a, b) in reference.rows()[i].iter().zip(&candidate.rows()[i]) {
            differences.push((a - b) / a);
        }
    }
    Ok(differences)
}

/// Keep only finite differences strictly below the threshold in magnitude.
/// The boundary itself is excluded.
pub fn filter_outliers(differences: &[f64], threshold: f64) -> Vec<f64> {
    differences
        .iter()
        .copied()
        .filter(|d| d.is_finite() && d.abs() < threshold)
        .collect()
}

/// Descriptive statistics over one filtered difference set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceSummary {
    /// Differences before filtering.
    pub total: usize,
    /// Differences surviving the outlier filter.
    pub kept: usize,
    pub max_abs: f64,
    pub mean_abs: f64,
}

/// Summarize a difference set after applying the outlier filter.
pub fn summarize(differences: &[f64], threshold: f64) -> DifferenceSummary {
    let kept = filter_outliers(differences, threshold);
    let max_abs = kept.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
    let mean_abs = if kept.is_empty() {
        0.0
    } else {
        kept.iter().map(|d| d.abs()).sum::<f64>() / kept.len() as f64
    };
    DifferenceSummary {
        total: differences.len(),
        kept: kept.len(),
        max_abs,
        mean_abs,
    }
}
