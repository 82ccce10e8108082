use crate::detector::{DetectorSite, SensitivityCurve, SensitivityProvider};
use crate::prelude::PdetResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Named detector network: detector code → sensitivity scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    pub name: String,
    pub detectors: BTreeMap<String, String>,
}

impl NetworkConfiguration {
    pub fn new<I, D, S>(name: impl Into<String>, detectors: I) -> Self
    where
        I: IntoIterator<Item = (D, S)>,
        D: Into<String>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            detectors: detectors
                .into_iter()
                .map(|(d, s)| (d.into(), s.into()))
                .collect(),
        }
    }

    /// Loads every member's site geometry and sensitivity curve.
    pub fn resolve(&self, provider: &dyn SensitivityProvider) -> PdetResult<ResolvedNetwork> {
        let members = self
            .detectors
            .iter()
            .map(|(detector, scenario)| {
                Ok(NetworkMember {
                    site: DetectorSite::from_code(detector)?,
                    scenario: scenario.clone(),
                    curve: provider.get_psd(detector, scenario)?,
                })
            })
            .collect::<PdetResult<Vec<_>>>()?;
        Ok(ResolvedNetwork {
            name: self.name.clone(),
            members,
        })
    }
}

#[derive(Debug)]
pub struct NetworkMember {
    pub site: DetectorSite,
    pub scenario: String,
    pub curve: Arc<SensitivityCurve>,
}

/// A network whose curves are loaded and shared read-only across trials.
#[derive(Debug)]
pub struct ResolvedNetwork {
    pub name: String,
    pub members: Vec<NetworkMember>,
}

impl ResolvedNetwork {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
