//! Regression metrics.
//!
//! Every per-nutrient model is scored on the held-out partition with all
//! three metrics; the trio lands in the training report unchanged.

// =============================================================================
// MetricFn Trait
// =============================================================================

/// A regression metric over parallel prediction/target slices.
///
/// Implementations accumulate in `f64` to keep long sums stable even though
/// model outputs are `f32`. All metrics return `0.0` for empty inputs so a
/// degenerate evaluation partition never poisons a report with NaN.
pub trait MetricFn {
    /// Compute the metric. `predictions` and `targets` must be equal length.
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64;

    /// Whether larger values indicate a better fit.
    fn higher_is_better(&self) -> bool;

    /// Short lowercase metric name, as used in reports.
    fn name(&self) -> &'static str;
}

// =============================================================================
// MAE (Mean Absolute Error)
// =============================================================================

/// Mean Absolute Error: mean(|pred - target|)
///
/// Lower is better. More robust to outliers than MSE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        let n_rows = predictions.len();
        if n_rows == 0 {
            return 0.0;
        }

        let sum_ae = predictions
            .iter()
            .zip(targets.iter())
            .fold(0.0f64, |acc, (&p, &t)| {
                acc + ((p as f64) - (t as f64)).abs()
            });

        sum_ae / n_rows as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

// =============================================================================
// MSE (Mean Squared Error)
// =============================================================================

/// Mean Squared Error: mean((pred - target)²)
///
/// Lower is better. Penalizes large errors quadratically.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mse;

impl MetricFn for Mse {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        let n_rows = predictions.len();
        if n_rows == 0 {
            return 0.0;
        }

        let sum_sq = predictions
            .iter()
            .zip(targets.iter())
            .fold(0.0f64, |acc, (&p, &t)| {
                let diff = (p as f64) - (t as f64);
                acc + diff * diff
            });

        sum_sq / n_rows as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mse"
    }
}

// =============================================================================
// R² (Coefficient of Determination)
// =============================================================================

/// Coefficient of determination: 1 - SS_res / SS_tot
///
/// Higher is better; `1.0` is a perfect fit and values can go negative for
/// fits worse than predicting the target mean. Constant targets make
/// `SS_tot` zero, which reports as `0.0` rather than dividing by zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct RSquared;

impl MetricFn for RSquared {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        let n_rows = targets.len();
        if n_rows == 0 {
            return 0.0;
        }

        let mean = targets.iter().map(|&t| t as f64).sum::<f64>() / n_rows as f64;

        let ss_res = predictions
            .iter()
            .zip(targets.iter())
            .fold(0.0f64, |acc, (&p, &t)| {
                let diff = (t as f64) - (p as f64);
                acc + diff * diff
            });
        let ss_tot = targets.iter().fold(0.0f64, |acc, &t| {
            let diff = (t as f64) - mean;
            acc + diff * diff
        });

        if ss_tot == 0.0 {
            return 0.0;
        }

        1.0 - ss_res / ss_tot
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "r2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DEFAULT_TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_mae_basic() {
        let preds = [1.0, 2.0, 3.0];
        let targets = [2.0, 2.0, 5.0];
        // |1-2| + |2-2| + |3-5| = 3, mean = 1
        assert_abs_diff_eq!(
            Mae.compute(&preds, &targets),
            1.0,
            epsilon = DEFAULT_TOLERANCE
        );
        assert!(!Mae.higher_is_better());
    }

    #[test]
    fn test_mse_basic() {
        let preds = [1.0, 2.0, 3.0];
        let targets = [2.0, 2.0, 5.0];
        // 1 + 0 + 4 = 5, mean = 5/3
        assert_abs_diff_eq!(
            Mse.compute(&preds, &targets),
            5.0 / 3.0,
            epsilon = DEFAULT_TOLERANCE
        );
    }

    #[test]
    fn test_r_squared_perfect_fit() {
        let targets = [1.0, 2.0, 3.0, 4.0];
        assert_abs_diff_eq!(
            RSquared.compute(&targets, &targets),
            1.0,
            epsilon = DEFAULT_TOLERANCE
        );
        assert!(RSquared.higher_is_better());
    }

    #[test]
    fn test_r_squared_mean_prediction_is_zero() {
        let targets = [1.0, 2.0, 3.0];
        let preds = [2.0, 2.0, 2.0];
        assert_abs_diff_eq!(
            RSquared.compute(&preds, &targets),
            0.0,
            epsilon = DEFAULT_TOLERANCE
        );
    }

    #[test]
    fn test_r_squared_worse_than_mean_is_negative() {
        let targets = [1.0, 2.0, 3.0];
        let preds = [3.0, 2.0, 1.0];
        assert!(RSquared.compute(&preds, &targets) < 0.0);
    }

    #[test]
    fn test_r_squared_constant_targets() {
        let targets = [4.0, 4.0, 4.0];
        let preds = [4.0, 4.0, 4.0];
        assert_abs_diff_eq!(
            RSquared.compute(&preds, &targets),
            0.0,
            epsilon = DEFAULT_TOLERANCE
        );
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        assert_eq!(Mae.compute(&[], &[]), 0.0);
        assert_eq!(Mse.compute(&[], &[]), 0.0);
        assert_eq!(RSquared.compute(&[], &[]), 0.0);
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(Mae.name(), "mae");
        assert_eq!(Mse.name(), "mse");
        assert_eq!(RSquared.name(), "r2");
    }
}
