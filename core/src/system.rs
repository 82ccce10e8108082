use serde::{Deserialize, Serialize};

/// Intrinsic parameters of one simulated binary, masses in source-frame solar masses.
///
/// `redshift` is `None` when the population does not fix it; estimation then
/// samples it per trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinarySystem {
    pub m1: f64,
    pub m2: f64,
    pub redshift: Option<f64>,
    pub spin1: [f64; 3],
    pub spin2: [f64; 3],
}

impl BinarySystem {
    pub fn new(m1: f64, m2: f64, redshift: Option<f64>, spin1: [f64; 3], spin2: [f64; 3]) -> Self {
        Self {
            m1,
            m2,
            redshift,
            spin1,
            spin2,
        }
    }

    /// Non-spinning binary.
    pub fn non_spinning(m1: f64, m2: f64, redshift: Option<f64>) -> Self {
        Self::new(m1, m2, redshift, [0.0; 3], [0.0; 3])
    }

    /// The same binary with its components relabeled.
    pub fn swapped(&self) -> Self {
        Self::new(self.m2, self.m1, self.redshift, self.spin2, self.spin1)
    }

    pub fn total_mass(&self) -> f64 {
        self.m1 + self.m2
    }

    pub fn chirp_mass(&self) -> f64 {
        chirp_mass(self.m1, self.m2)
    }
}

pub fn chirp_mass(m1: f64, m2: f64) -> f64 {
    (m1 * m2).powf(0.6) / (m1 + m2).powf(0.2)
}
