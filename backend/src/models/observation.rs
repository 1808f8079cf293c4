//! Observation requests handed to the document builder.

use serde::{Deserialize, Serialize};

use super::instrument::InstrumentConfiguration;
use super::target::Target;
use super::time::TimeWindow;
use crate::error::{RtmlError, RtmlResult};

crate::define_name_type!(ProposalId);

/// Photometric requirement, written into `<ExtinctionConstraint><Clouds>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Photometric {
    /// Photometric conditions required
    Clear,
    /// Any sky is acceptable
    #[default]
    #[serde(alias = "light")]
    Any,
}

impl Photometric {
    /// Value of the `<Clouds>` element.
    pub fn clouds(&self) -> &'static str {
        match self {
            Photometric::Clear => "clear",
            Photometric::Any => "light",
        }
    }
}

/// Observing-condition ceilings shared by every schedule of a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservingConstraints {
    /// Maximum airmass (1–3)
    pub max_airmass: f64,
    /// Maximum seeing in arcseconds
    pub max_seeing: f64,
    /// Maximum sky brightness in magnitudes per square arcsecond
    pub max_sky_brightness: f64,
    pub photometric: Photometric,
}

impl Default for ObservingConstraints {
    fn default() -> Self {
        Self {
            max_airmass: 2.0,
            max_seeing: 1.2,
            max_sky_brightness: 1.0,
            photometric: Photometric::Any,
        }
    }
}

/// A fully validated observation request.
///
/// Built once per user action and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRequest {
    pub proposal: ProposalId,
    /// 1 (highest) to 3
    pub priority: u8,
    pub window: TimeWindow,
    pub constraints: ObservingConstraints,
    pub instrument: InstrumentConfiguration,
    pub target: Target,
}

impl ObservationRequest {
    /// Check the structural invariants the document builder relies on.
    ///
    /// Range checks on individual form fields belong to the form layer; this
    /// only rejects requests that cannot produce a sensible document.
    pub fn validate(&self) -> RtmlResult<()> {
        if self.proposal.as_str().trim().is_empty() {
            return Err(RtmlError::InvalidRequest("proposal id is empty".to_string()));
        }
        if !(1..=3).contains(&self.priority) {
            return Err(RtmlError::InvalidRequest(format!(
                "priority must be between 1 and 3, got {}",
                self.priority
            )));
        }
        self.instrument.validate()?;
        if self.instrument.active_channels() == 0 {
            return Err(RtmlError::EmptyConfiguration);
        }
        Ok(())
    }
}
