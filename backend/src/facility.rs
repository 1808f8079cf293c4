//! Liverpool Telescope facility.
//!
//! Glue between the form layer and the core: resolves targets, builds the
//! RTML document, hands it to the submission client, and exposes the
//! metadata an observation manager asks every facility for.

use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::TargetCatalog;
use crate::config::FacilityConfig;
use crate::error::{RtmlError, RtmlResult};
use crate::form::ObservationForm;
use crate::models::{Instrument, ObservationRequest};
use crate::rtml::{DocumentAssembler, RtmlDocument, SubmissionResult};
use crate::submission::SubmissionClient;

pub const FACILITY_NAME: &str = "LT";

/// States after which an observation is no longer polled.
pub const TERMINAL_STATES: [&str; 2] = ["IN_PROGRESS", "COMPLETED"];

/// A selectable observation type: wire code and display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationType {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservingSite {
    pub name: &'static str,
    pub sitecode: &'static str,
    pub latitude: qtty::Degrees,
    pub longitude: qtty::Degrees,
    pub elevation: qtty::Meters,
}

/// Observatorio del Roque de los Muchachos.
pub fn la_palma() -> ObservingSite {
    ObservingSite {
        name: "La Palma",
        sitecode: "orm",
        latitude: qtty::Degrees::new(28.762),
        longitude: qtty::Degrees::new(-17.872),
        elevation: qtty::Meters::new(2363.0),
    }
}

pub struct LtFacility {
    config: FacilityConfig,
    assembler: DocumentAssembler,
    client: SubmissionClient,
    catalog: Arc<dyn TargetCatalog>,
}

impl LtFacility {
    pub fn new(config: FacilityConfig, catalog: Arc<dyn TargetCatalog>) -> RtmlResult<Self> {
        let client = SubmissionClient::from_config(&config)?;
        Ok(Self::with_parts(
            DocumentAssembler::new(config.username.clone()),
            client,
            config,
            catalog,
        ))
    }

    /// Assemble from explicit parts; used to pin uids or swap the transport.
    pub fn with_parts(
        assembler: DocumentAssembler,
        client: SubmissionClient,
        config: FacilityConfig,
        catalog: Arc<dyn TargetCatalog>,
    ) -> Self {
        Self {
            config,
            assembler,
            client,
            catalog,
        }
    }

    pub fn name(&self) -> &'static str {
        FACILITY_NAME
    }

    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    pub fn observation_types() -> Vec<ObservationType> {
        Instrument::ALL
            .iter()
            .map(|i| ObservationType {
                code: i.code(),
                label: i.label(),
            })
            .collect()
    }

    pub fn observing_sites() -> Vec<ObservingSite> {
        vec![la_palma()]
    }

    pub fn terminal_observing_states() -> &'static [&'static str] {
        &TERMINAL_STATES
    }

    /// No public page exists for individual observations.
    pub fn observation_url(&self, _observation_id: &str) -> String {
        String::new()
    }

    /// The node agent offers no status query.
    pub fn observation_status(&self, _observation_id: &str) -> Option<String> {
        None
    }

    pub fn data_products(&self, _observation_id: &str) -> Vec<String> {
        Vec::new()
    }

    /// Resolve the form's target and build a validated request.
    ///
    /// The proposal must be one of the configured proposals when any are
    /// configured.
    pub async fn build_request(&self, form: ObservationForm) -> RtmlResult<ObservationRequest> {
        if !self.config.proposals.is_empty()
            && self.config.proposal(form.project.as_str()).is_none()
        {
            return Err(RtmlError::InvalidRequest(format!(
                "proposal {} is not configured for user {}",
                form.project, self.config.username
            )));
        }
        let target = self.catalog.resolve_target(form.target_id).await?;
        form.into_request(target)
    }

    /// Everything wrong with a form, without submitting it. Empty means the
    /// form would produce a document.
    pub async fn validate_observation(&self, form: &ObservationForm) -> Vec<String> {
        let mut errors = form.field_errors();
        if !errors.is_empty() {
            return errors;
        }
        match self.build_request(form.clone()).await {
            Ok(request) => {
                if let Err(e) = self.assembler.build_request(&request) {
                    errors.push(e.to_string());
                }
            }
            Err(e) => errors.push(e.to_string()),
        }
        errors
    }

    /// The document that `submit_observation` would send.
    pub async fn observation_payload(&self, form: ObservationForm) -> RtmlResult<RtmlDocument> {
        let request = self.build_request(form).await?;
        self.assembler.build_request(&request)
    }

    pub async fn submit_observation(&self, form: ObservationForm) -> RtmlResult<SubmissionResult> {
        let document = self.observation_payload(form).await?;
        let result = self
            .client
            .submit(
                &document,
                &self.config.credentials(),
                &self.config.endpoint_url(),
            )
            .await;
        if let Ok(submitted) = &result {
            info!(
                "{} observation submitted: {}",
                FACILITY_NAME,
                submitted.observation_id.as_deref().unwrap_or_default()
            );
        }
        result
    }

    /// The node agent has no cancel operation.
    pub fn cancel_observation(&self, observation_id: &str) -> RtmlResult<()> {
        warn!("Cancel requested for {} observation {}", FACILITY_NAME, observation_id);
        Err(RtmlError::Unsupported(format!(
            "cancelling {} observation {} is not supported",
            FACILITY_NAME, observation_id
        )))
    }
}

impl std::fmt::Debug for LtFacility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LtFacility")
            .field("config", &self.config)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}
