//! Submission of assembled documents.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::checksum::calculate_checksum;
use crate::config::{Credentials, FacilityConfig};
use crate::error::{RtmlError, RtmlResult, TransportFailure};
use crate::rtml::{parse_response, RtmlDocument, SubmissionResult};

use super::soap::{self, SoapReply};
use super::transport::{SoapTransport, Transport};

/// Observation id reported for documents diverted to the debug sink.
pub const DEBUG_OBSERVATION_ID: &str = "0";

/// Where documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionMode {
    /// Send to the node agent
    Live,
    /// Write the document to `sink` and report success without any network
    Debug { sink: PathBuf },
}

impl SubmissionMode {
    pub fn from_config(config: &FacilityConfig) -> Self {
        if config.debug {
            SubmissionMode::Debug {
                sink: config.debug_output.clone(),
            }
        } else {
            SubmissionMode::Live
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, SubmissionMode::Debug { .. })
    }
}

/// Sends RTML documents to the node agent and classifies the outcome.
///
/// One call is one attempt: nothing here retries, since a request that
/// timed out may still have been queued remotely.
#[derive(Clone)]
pub struct SubmissionClient {
    mode: SubmissionMode,
    timeout: Duration,
    transport: Arc<dyn Transport>,
}

impl SubmissionClient {
    pub fn new(mode: SubmissionMode, timeout: Duration) -> RtmlResult<Self> {
        let transport = SoapTransport::new(timeout)?;
        Ok(Self::with_transport(mode, timeout, Arc::new(transport)))
    }

    pub fn with_transport(
        mode: SubmissionMode,
        timeout: Duration,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            mode,
            timeout,
            transport,
        }
    }

    pub fn from_config(config: &FacilityConfig) -> RtmlResult<Self> {
        Self::new(SubmissionMode::from_config(config), config.timeout())
    }

    pub fn mode(&self) -> &SubmissionMode {
        &self.mode
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit one document.
    ///
    /// Success carries the remote observation id. A well-formed refusal is
    /// [`RtmlError::RemoteRejection`]; network trouble, including the timeout,
    /// is [`RtmlError::TransmissionError`].
    pub async fn submit(
        &self,
        document: &RtmlDocument,
        credentials: &Credentials,
        endpoint: &str,
    ) -> RtmlResult<SubmissionResult> {
        match &self.mode {
            SubmissionMode::Debug { sink } => self.write_debug(document, sink).await,
            SubmissionMode::Live => self.send(document, credentials, endpoint).await,
        }
    }

    async fn write_debug(
        &self,
        document: &RtmlDocument,
        sink: &Path,
    ) -> RtmlResult<SubmissionResult> {
        let xml = document.to_pretty_xml()?;
        tokio::fs::write(sink, &xml).await?;
        info!(
            "Debug mode: wrote RTML uid={} to {} sha256={}",
            document.uid().unwrap_or_default(),
            sink.display(),
            calculate_checksum(&xml)
        );
        Ok(SubmissionResult::accepted(DEBUG_OBSERVATION_ID, None))
    }

    async fn send(
        &self,
        document: &RtmlDocument,
        credentials: &Credentials,
        endpoint: &str,
    ) -> RtmlResult<SubmissionResult> {
        let xml = document.to_xml()?;
        let uid = document.uid().unwrap_or_default();
        info!(
            "Submitting RTML uid={} to {} as {} sha256={}",
            uid,
            endpoint,
            credentials.username,
            calculate_checksum(&xml)
        );

        let envelope = soap::build_envelope(&xml)?;
        let response = tokio::time::timeout(
            self.timeout,
            self.transport.post(endpoint, credentials, envelope),
        )
        .await
        .map_err(|_| {
            RtmlError::transmission(
                TransportFailure::Timeout,
                format!("no reply from {} within {:?}", endpoint, self.timeout),
            )
        })??;
        debug!(
            "Node agent replied with HTTP {} ({} bytes)",
            response.status,
            response.body.len()
        );

        let rtml = match soap::parse_envelope(&response.body) {
            Ok(SoapReply::Fault { code, reason }) => {
                warn!("Node agent fault for uid={}: {} {}", uid, code, reason);
                return Err(RtmlError::RemoteRejection {
                    reason: if reason.is_empty() { code } else { reason },
                    raw_response: response.body,
                });
            }
            _ if !response.is_success() => {
                return Err(RtmlError::transmission(
                    TransportFailure::Http {
                        status: response.status,
                    },
                    format!("node agent answered HTTP {}", response.status),
                ));
            }
            Ok(SoapReply::Return(rtml)) => rtml,
            Err(message) => {
                return Err(RtmlError::transmission(TransportFailure::Envelope, message));
            }
        };

        let result = parse_response(&rtml)?;
        if !result.success {
            let reason = result
                .message
                .unwrap_or_else(|| "request rejected".to_string());
            warn!("RTML uid={} rejected: {}", uid, reason);
            return Err(RtmlError::RemoteRejection {
                reason,
                raw_response: rtml,
            });
        }

        info!(
            "RTML uid={} accepted as observation {}",
            uid,
            result.observation_id.as_deref().unwrap_or_default()
        );
        Ok(result)
    }
}

impl std::fmt::Debug for SubmissionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionClient")
            .field("mode", &self.mode)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
