pub mod interp;
pub mod matrix;
pub mod quadrature;
pub mod stats;

pub use interp::InterpHelper;
pub use matrix::MatrixHelper;
pub use quadrature::QuadratureHelper;
pub use stats::StatsHelper;
