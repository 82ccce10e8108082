//! Detection-probability core for simulated compact-binary populations.
//!
//! A binary's intrinsic parameters are held fixed while its unobserved
//! extrinsic parameters are drawn many times; each realization is scored by
//! network SNR against detector sensitivity curves, and the fraction clearing
//! the detection threshold is the detection probability.

pub mod cosmology;
pub mod detector;
pub mod estimator;
pub mod evaluator;
pub mod math;
pub mod network;
pub mod prelude;
pub mod sampler;
pub mod system;
pub mod telemetry;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod waveform;

pub use prelude::{PdetError, PdetResult};
