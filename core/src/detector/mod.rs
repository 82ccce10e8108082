pub mod sensitivity;
pub mod site;

pub use sensitivity::{
    CurveKind, CurveOptions, FileSensitivityProvider, SensitivityCurve, SensitivityProvider,
};
pub use site::{AntennaResponse, DetectorId, DetectorSite, SkyLocation};
