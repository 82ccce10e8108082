use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Bilinear form `lhs · tensor · rhs`.
    pub fn bilinear(lhs: ArrayView1<f64>, tensor: ArrayView2<f64>, rhs: ArrayView1<f64>) -> f64 {
        lhs.dot(&tensor.dot(&rhs))
    }

    /// Differential-arm response tensor `(x xᵀ - y yᵀ) / 2`.
    pub fn arm_response(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Array2<f64> {
        Array2::from_shape_fn((3, 3), |(i, j)| 0.5 * (x[i] * x[j] - y[i] * y[j]))
    }

    pub fn vector(components: [f64; 3]) -> Array1<f64> {
        Array1::from(components.to_vec())
    }
}
