//! Redshift–distance mapping under a flat ΛCDM cosmology.
//!
//! Distances are in Mpc. The forward direction (`distance_of`) is a direct
//! quadrature of the inverse Hubble function; the inverse direction
//! (`redshift_of`) has no closed form and is solved by bisection. Both are
//! pure functions of an immutable parameter set, so a single `Cosmology` can
//! be shared across worker threads.

use crate::math::QuadratureHelper;
use crate::prelude::{PdetError, PdetResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Redshifts beyond this are rejected when inverting a distance.
const MAX_REDSHIFT: f64 = 1.0e4;
const MAX_BISECTION_STEPS: usize = 200;
const RELATIVE_TOLERANCE: f64 = 1.0e-12;
/// Simpson intervals per unit redshift.
const INTERVALS_PER_UNIT_Z: f64 = 128.0;
const MIN_INTERVALS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cosmology {
    /// Hubble constant in km/s/Mpc.
    pub hubble_constant: f64,
    /// Present-day matter density; dark energy makes up the rest.
    pub omega_matter: f64,
}

impl Default for Cosmology {
    fn default() -> Self {
        Self::planck15()
    }
}

impl Cosmology {
    /// Planck 2015 (TT,TE,EE+lowP+lensing+ext) background values.
    pub fn planck15() -> Self {
        Self {
            hubble_constant: 67.74,
            omega_matter: 0.3075,
        }
    }

    pub fn new(hubble_constant: f64, omega_matter: f64) -> PdetResult<Self> {
        let cosmology = Self {
            hubble_constant,
            omega_matter,
        };
        cosmology.validate()?;
        Ok(cosmology)
    }

    pub fn validate(&self) -> PdetResult<()> {
        if !(self.hubble_constant.is_finite() && self.hubble_constant > 0.0) {
            return Err(PdetError::InvalidCosmology(format!(
                "hubble constant must be positive, got {}",
                self.hubble_constant
            )));
        }
        if !(0.0..=1.0).contains(&self.omega_matter) {
            return Err(PdetError::InvalidCosmology(format!(
                "matter density must lie in [0, 1], got {}",
                self.omega_matter
            )));
        }
        Ok(())
    }

    pub fn omega_lambda(&self) -> f64 {
        1.0 - self.omega_matter
    }

    /// c / H0 in Mpc.
    pub fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT_KM_S / self.hubble_constant
    }

    fn inverse_efunc(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        1.0 / (self.omega_matter * zp1 * zp1 * zp1 + self.omega_lambda()).sqrt()
    }

    pub fn comoving_distance(&self, z: f64) -> PdetResult<f64> {
        check_redshift(z)?;
        let intervals = ((z * INTERVALS_PER_UNIT_Z).ceil() as usize).max(MIN_INTERVALS);
        let integral = QuadratureHelper::simpson(|zz| self.inverse_efunc(zz), 0.0, z, intervals);
        Ok(self.hubble_distance() * integral)
    }

    /// Luminosity distance in Mpc at redshift `z`.
    pub fn distance_of(&self, z: f64) -> PdetResult<f64> {
        Ok((1.0 + z) * self.comoving_distance(z)?)
    }

    /// Redshift at which the luminosity distance equals `distance` Mpc.
    pub fn redshift_of(&self, distance: f64) -> PdetResult<f64> {
        check_distance(distance)?;
        self.invert(distance, |z| self.distance_of(z))
    }

    /// Redshift at which the comoving distance equals `distance` Mpc.
    pub fn redshift_at_comoving_distance(&self, distance: f64) -> PdetResult<f64> {
        check_distance(distance)?;
        self.invert(distance, |z| self.comoving_distance(z))
    }

    /// Comoving volume enclosed by redshift `z`, in Mpc³.
    pub fn comoving_volume(&self, z: f64) -> PdetResult<f64> {
        let distance = self.comoving_distance(z)?;
        Ok(4.0 / 3.0 * PI * distance.powi(3))
    }

    fn invert<F>(&self, target: f64, distance: F) -> PdetResult<f64>
    where
        F: Fn(f64) -> PdetResult<f64>,
    {
        if target == 0.0 {
            return Ok(0.0);
        }

        let mut lo = 0.0;
        let mut hi = 1.0;
        while distance(hi)? < target {
            lo = hi;
            hi *= 2.0;
            if hi > MAX_REDSHIFT {
                return Err(PdetError::InvalidDistance(target));
            }
        }

        for _ in 0..MAX_BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if distance(mid)? < target {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= RELATIVE_TOLERANCE * hi {
                break;
            }
        }
        Ok(0.5 * (lo + hi))
    }
}

fn check_redshift(z: f64) -> PdetResult<()> {
    if z.is_finite() && z >= 0.0 {
        Ok(())
    } else {
        Err(PdetError::InvalidRedshift(z))
    }
}

fn check_distance(distance: f64) -> PdetResult<()> {
    if distance.is_finite() && distance >= 0.0 {
        Ok(())
    } else {
        Err(PdetError::InvalidDistance(distance))
    }
}
