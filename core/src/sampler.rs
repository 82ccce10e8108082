use crate::cosmology::Cosmology;
use crate::detector::SkyLocation;
use crate::prelude::{PdetError, PdetResult};
use crate::system::BinarySystem;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// One Monte Carlo realization of the extrinsic parameters (radians, Mpc).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrinsicDraw {
    pub ra: f64,
    pub dec: f64,
    pub inclination: f64,
    pub polarization: f64,
    pub coalescence_phase: f64,
    pub luminosity_distance: f64,
    /// Redshift the distance was computed from, when the sampler knows it.
    #[serde(default)]
    pub redshift: Option<f64>,
}

impl ExtrinsicDraw {
    pub fn sky(&self) -> SkyLocation {
        SkyLocation {
            ra: self.ra,
            dec: self.dec,
        }
    }
}

/// Draws isotropic sky positions and orientations, and distances uniform in
/// comoving volume out to the redshift horizon.
///
/// Random numbers are consumed in a fixed order: ra, dec, inclination,
/// polarization, coalescence phase, then distance (only when the system's
/// redshift is unset). A given RNG state therefore always yields the same draw.
#[derive(Debug, Clone)]
pub struct ExtrinsicSampler {
    cosmology: Cosmology,
    z_max: f64,
    horizon_comoving_distance: f64,
}

impl ExtrinsicSampler {
    pub fn new(cosmology: Cosmology, z_max: f64) -> PdetResult<Self> {
        if !(z_max.is_finite() && z_max > 0.0) {
            return Err(PdetError::InvalidHorizon(z_max));
        }
        cosmology.validate()?;
        let horizon_comoving_distance = cosmology.comoving_distance(z_max)?;
        Ok(Self {
            cosmology,
            z_max,
            horizon_comoving_distance,
        })
    }

    pub fn z_max(&self) -> f64 {
        self.z_max
    }

    pub fn cosmology(&self) -> &Cosmology {
        &self.cosmology
    }

    pub fn draw<R: Rng + ?Sized>(
        &self,
        system: &BinarySystem,
        rng: &mut R,
    ) -> PdetResult<ExtrinsicDraw> {
        let ra = rng.gen_range(0.0..TAU);
        let dec = rng.gen_range(-1.0f64..1.0).asin();
        let inclination = rng.gen_range(-1.0f64..1.0).acos();
        let polarization = rng.gen_range(0.0..TAU);
        let coalescence_phase = rng.gen_range(0.0..TAU);

        let redshift = match system.redshift {
            Some(z) => z,
            None => self.sample_redshift(rng)?,
        };
        let luminosity_distance = self.cosmology.distance_of(redshift)?;

        Ok(ExtrinsicDraw {
            ra,
            dec,
            inclination,
            polarization,
            coalescence_phase,
            luminosity_distance,
            redshift: Some(redshift),
        })
    }

    /// Redshift drawn uniformly in comoving volume on `[0, z_max]`.
    pub fn sample_redshift<R: Rng + ?Sized>(&self, rng: &mut R) -> PdetResult<f64> {
        let u: f64 = rng.gen();
        let comoving = u.cbrt() * self.horizon_comoving_distance;
        let z = self.cosmology.redshift_at_comoving_distance(comoving)?;
        Ok(z.min(self.z_max))
    }
}
