//! Per-column standardization of feature matrices.
//!
//! The RBF similarity has a fixed bandwidth, so features on very different
//! scales can be standardized before the model is configured.

use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-6;
}

/// Fit a `Scaler` where rows are samples and columns are features.
///
/// An empty matrix yields zero means and unit stds.
pub fn fit_scaler(x: ArrayView2<f64>) -> Scaler {
    let ncols = x.ncols();
    if x.nrows() == 0 {
        return Scaler {
            mean: Array1::zeros(ncols),
            std: Array1::ones(ncols),
        };
    }

    let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(ncols));
    let std = x
        .std_axis(Axis(0), 0.0)
        .mapv(|s| s.max(Scaler::MIN_STD));

    Scaler { mean, std }
}

/// Transform all rows using the provided `Scaler`.
pub fn transform_all(x: ArrayView2<f64>, sc: &Scaler) -> Array2<f64> {
    (&x - &sc.mean) / &sc.std
}

/// Fit a scaler and return the transformed matrix in one call.
pub fn fit_transform(x: ArrayView2<f64>) -> Array2<f64> {
    let sc = fit_scaler(x);
    transform_all(x, &sc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardizes_each_column() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let z = fit_transform(x.view());
        let mean = z.mean_axis(Axis(0)).unwrap();
        assert!(mean.iter().all(|m| m.abs() < 1e-12));
        let std = z.std_axis(Axis(0), 0.0);
        assert!((std[0] - 1.0).abs() < 1e-12);
        // constant column stays finite
        assert!(z.column(1).iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn empty_matrix_is_a_no_op() {
        let x = Array2::<f64>::zeros((0, 3));
        let sc = fit_scaler(x.view());
        assert_eq!(sc.mean.len(), 3);
        assert_eq!(transform_all(x.view(), &sc).shape(), &[0, 3]);
    }
}
