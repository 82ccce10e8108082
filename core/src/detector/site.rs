use crate::math::MatrixHelper;
use crate::prelude::{PdetError, PdetResult};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interferometer sites with built-in geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DetectorId {
    H1,
    L1,
    V1,
    K1,
}

impl DetectorId {
    pub const ALL: [DetectorId; 4] = [DetectorId::H1, DetectorId::L1, DetectorId::V1, DetectorId::K1];

    pub fn code(&self) -> &'static str {
        match self {
            DetectorId::H1 => "H1",
            DetectorId::L1 => "L1",
            DetectorId::V1 => "V1",
            DetectorId::K1 => "K1",
        }
    }

    /// Vertex latitude, longitude, x-arm azimuth and y-arm azimuth in radians.
    /// Azimuths are measured clockwise from local north.
    fn geometry(&self) -> [f64; 4] {
        match self {
            DetectorId::H1 => [0.81079526383, -2.08405676917, 5.65487724844, 4.08408092164],
            DetectorId::L1 => [0.53342313506, -1.58430937078, 4.40317772346, 2.83238139666],
            DetectorId::V1 => [0.76151183984, 0.18333805213, 0.33916285222, 5.05155183261],
            DetectorId::K1 => [0.6355068497, 2.396441015, 1.054113, -0.5166798],
        }
    }
}

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DetectorId {
    type Err = PdetError;

    fn from_str(code: &str) -> PdetResult<Self> {
        DetectorId::ALL
            .iter()
            .copied()
            .find(|id| id.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| PdetError::UnknownDetector(code.to_string()))
    }
}

/// Equatorial sky position in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyLocation {
    pub ra: f64,
    pub dec: f64,
}

/// Plus/cross antenna pattern factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntennaResponse {
    pub f_plus: f64,
    pub f_cross: f64,
}

/// Site geometry reduced to its long-wavelength response tensor.
#[derive(Debug, Clone)]
pub struct DetectorSite {
    id: DetectorId,
    response: Array2<f64>,
}

impl DetectorSite {
    pub fn new(id: DetectorId) -> Self {
        let [latitude, longitude, x_azimuth, y_azimuth] = id.geometry();
        let x_arm = arm_direction(latitude, longitude, x_azimuth);
        let y_arm = arm_direction(latitude, longitude, y_azimuth);
        Self {
            id,
            response: MatrixHelper::arm_response(x_arm.view(), y_arm.view()),
        }
    }

    pub fn from_code(code: &str) -> PdetResult<Self> {
        Ok(Self::new(code.parse()?))
    }

    pub fn id(&self) -> DetectorId {
        self.id
    }

    pub fn response_tensor(&self) -> ArrayView2<'_, f64> {
        self.response.view()
    }

    /// Antenna pattern for a source at `sky` with polarization angle `psi`,
    /// evaluated at Greenwich mean sidereal time `gmst` (all radians).
    pub fn antenna_pattern(&self, sky: SkyLocation, psi: f64, gmst: f64) -> AntennaResponse {
        let gha = gmst - sky.ra;
        let (sin_gha, cos_gha) = gha.sin_cos();
        let (sin_dec, cos_dec) = sky.dec.sin_cos();
        let (sin_psi, cos_psi) = psi.sin_cos();

        let x = MatrixHelper::vector([
            -cos_psi * sin_gha - sin_psi * cos_gha * sin_dec,
            -cos_psi * cos_gha + sin_psi * sin_gha * sin_dec,
            sin_psi * cos_dec,
        ]);
        let y = MatrixHelper::vector([
            sin_psi * sin_gha - cos_psi * cos_gha * sin_dec,
            sin_psi * cos_gha + cos_psi * sin_gha * sin_dec,
            cos_psi * cos_dec,
        ]);

        let d = self.response.view();
        let xdx = MatrixHelper::bilinear(x.view(), d, x.view());
        let ydy = MatrixHelper::bilinear(y.view(), d, y.view());
        let xdy = MatrixHelper::bilinear(x.view(), d, y.view());
        AntennaResponse {
            f_plus: xdx - ydy,
            f_cross: 2.0 * xdy,
        }
    }
}

/// Earth-fixed unit vector along an arm lying in the local horizontal plane.
fn arm_direction(latitude: f64, longitude: f64, azimuth: f64) -> Array1<f64> {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();
    let (sin_az, cos_az) = azimuth.sin_cos();
    let north = [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat];
    let east = [-sin_lon, cos_lon, 0.0];
    MatrixHelper::vector([
        cos_az * north[0] + sin_az * east[0],
        cos_az * north[1] + sin_az * east[1],
        cos_az * north[2] + sin_az * east[2],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::PI;

    #[test]
    fn detector_codes_parse_case_insensitively() {
        assert_eq!("h1".parse::<DetectorId>().unwrap(), DetectorId::H1);
        assert_eq!(" V1 ".parse::<DetectorId>().unwrap(), DetectorId::V1);
        assert!(matches!(
            "X9".parse::<DetectorId>(),
            Err(PdetError::UnknownDetector(_))
        ));
    }

    #[test]
    fn response_tensor_is_traceless() {
        for id in DetectorId::ALL {
            let site = DetectorSite::new(id);
            assert!(site.response_tensor().diag().sum().abs() < 1e-12, "{}", id);
        }
    }

    #[test]
    fn overhead_source_sees_full_response() {
        let site = DetectorSite::new(DetectorId::H1);
        let [latitude, longitude, _, _] = DetectorId::H1.geometry();
        let gmst = 0.3;
        let sky = SkyLocation {
            ra: gmst + longitude,
            dec: latitude,
        };
        for &psi in &[0.0, 0.4, 1.3] {
            let response = site.antenna_pattern(sky, psi, gmst);
            let power = response.f_plus.powi(2) + response.f_cross.powi(2);
            assert!((power - 1.0).abs() < 1e-9, "psi {} power {}", psi, power);
        }
    }

    #[test]
    fn antenna_factors_are_bounded() {
        let site = DetectorSite::new(DetectorId::L1);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let sky = SkyLocation {
                ra: rng.gen_range(0.0..2.0 * PI),
                dec: rng.gen_range(-1.0f64..1.0).asin(),
            };
            let response = site.antenna_pattern(sky, rng.gen_range(0.0..PI), 0.0);
            let power = response.f_plus.powi(2) + response.f_cross.powi(2);
            assert!(power <= 1.0 + 1e-9);
        }
    }
}
