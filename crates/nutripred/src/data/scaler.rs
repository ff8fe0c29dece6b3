//! Feature standardization.
//!
//! One [`StandardScaler`] is fitted on the training partition and shared by
//! every per-nutrient model in a generation. Prediction must go through the
//! same scaler, so its parameters are persisted alongside the models.

use ndarray::{Array2, ArrayView2};

/// Scaler rebuild errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScalerError {
    #[error("means/stds length mismatch: {means} vs {stds}")]
    LengthMismatch { means: usize, stds: usize },

    #[error("non-positive std {value} for feature {index}")]
    InvalidStd { index: usize, value: f32 },
}

/// Per-column standardization to zero mean and unit variance.
///
/// Columns with zero variance keep a divisor of `1`, so constant features
/// transform to zero instead of NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f32>,
    stds: Vec<f32>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    ///
    /// An empty matrix fits to identity parameters (mean `0`, std `1`).
    pub fn fit(features: ArrayView2<'_, f32>) -> Self {
        let n_rows = features.nrows();
        let n_cols = features.ncols();
        let mut means = vec![0.0f32; n_cols];
        let mut stds = vec![1.0f32; n_cols];

        if n_rows > 0 {
            for (col, column) in features.columns().into_iter().enumerate() {
                let mean = column.iter().map(|&v| v as f64).sum::<f64>() / n_rows as f64;
                let var = column
                    .iter()
                    .map(|&v| {
                        let d = v as f64 - mean;
                        d * d
                    })
                    .sum::<f64>()
                    / n_rows as f64;
                let std = var.sqrt() as f32;

                means[col] = mean as f32;
                stds[col] = if std.is_finite() && std > 0.0 { std } else { 1.0 };
            }
        }

        StandardScaler { means, stds }
    }

    /// Rebuild a scaler from persisted parameters.
    pub fn from_parts(means: Vec<f32>, stds: Vec<f32>) -> Result<Self, ScalerError> {
        if means.len() != stds.len() {
            return Err(ScalerError::LengthMismatch {
                means: means.len(),
                stds: stds.len(),
            });
        }
        for (index, &value) in stds.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScalerError::InvalidStd { index, value });
            }
        }
        Ok(StandardScaler { means, stds })
    }

    /// Standardize a full matrix (rows = samples, columns = features).
    pub fn transform(&self, features: ArrayView2<'_, f32>) -> Array2<f32> {
        debug_assert_eq!(features.ncols(), self.n_features());
        let mut out = features.to_owned();
        for (col, mut column) in out.columns_mut().into_iter().enumerate() {
            let mean = self.means[col];
            let inv = 1.0 / self.stds[col];
            column.mapv_inplace(|v| (v - mean) * inv);
        }
        out
    }

    /// Standardize a single feature row.
    pub fn transform_row(&self, row: &[f32]) -> Vec<f32> {
        debug_assert_eq!(row.len(), self.n_features());
        row.iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(&v, (&mean, &std))| (v - mean) / std)
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f32] {
        &self.means
    }

    pub fn stds(&self) -> &[f32] {
        &self.stds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn test_fit_computes_column_stats() {
        let features = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(features.view());

        assert_abs_diff_eq!(scaler.means()[0], 2.0, epsilon = TOLERANCE);
        // population std of [1, 2, 3]
        assert_abs_diff_eq!(scaler.stds()[0], (2.0f32 / 3.0).sqrt(), epsilon = TOLERANCE);
        // constant column keeps a unit divisor
        assert_abs_diff_eq!(scaler.means()[1], 10.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(scaler.stds()[1], 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn test_transform_standardizes_columns() {
        let features = array![[1.0], [2.0], [3.0], [4.0]];
        let scaler = StandardScaler::fit(features.view());
        let out = scaler.transform(features.view());

        let mean: f32 = out.column(0).iter().sum::<f32>() / 4.0;
        let var: f32 = out.column(0).iter().map(|v| v * v).sum::<f32>() / 4.0;
        assert_abs_diff_eq!(mean, 0.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(var, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn test_constant_column_transforms_to_zero() {
        let features = array![[5.0], [5.0], [5.0]];
        let scaler = StandardScaler::fit(features.view());
        let out = scaler.transform(features.view());
        for &v in out.iter() {
            assert_abs_diff_eq!(v, 0.0, epsilon = TOLERANCE);
        }
    }

    #[test]
    fn test_transform_row_matches_matrix_transform() {
        let features = array![[1.0, 100.0], [2.0, 250.0], [4.0, 400.0]];
        let scaler = StandardScaler::fit(features.view());
        let matrix = scaler.transform(features.view());
        let row = scaler.transform_row(&[2.0, 250.0]);

        assert_abs_diff_eq!(row[0], matrix[(1, 0)], epsilon = TOLERANCE);
        assert_abs_diff_eq!(row[1], matrix[(1, 1)], epsilon = TOLERANCE);
    }

    #[test]
    fn test_empty_matrix_fits_identity() {
        let features = Array2::<f32>::zeros((0, 2));
        let scaler = StandardScaler::fit(features.view());
        assert_eq!(scaler.transform_row(&[3.0, -1.0]), vec![3.0, -1.0]);
    }

    #[test]
    fn test_from_parts_round_trip() {
        let fitted = StandardScaler::fit(array![[1.0], [3.0]].view());
        let rebuilt =
            StandardScaler::from_parts(fitted.means().to_vec(), fitted.stds().to_vec()).unwrap();
        assert_eq!(rebuilt, fitted);
    }

    #[test]
    fn test_from_parts_rejects_bad_parameters() {
        assert!(matches!(
            StandardScaler::from_parts(vec![0.0, 0.0], vec![1.0]),
            Err(ScalerError::LengthMismatch { .. })
        ));
        assert!(matches!(
            StandardScaler::from_parts(vec![0.0], vec![0.0]),
            Err(ScalerError::InvalidStd { index: 0, .. })
        ));
        assert!(matches!(
            StandardScaler::from_parts(vec![0.0], vec![f32::NAN]),
            Err(ScalerError::InvalidStd { .. })
        ));
    }
}
