//! HTTP transport to the node agent.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Credentials;
use crate::error::{RtmlError, RtmlResult, TransportFailure};

use super::soap::SOAP_METHOD;

/// Raw HTTP reply, before any SOAP interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers one SOAP envelope and returns the reply unparsed.
///
/// Implementations report network-level problems as
/// [`RtmlError::TransmissionError`]; an HTTP error status is not an error at
/// this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        endpoint: &str,
        credentials: &Credentials,
        envelope: String,
    ) -> RtmlResult<TransportResponse>;
}

/// `reqwest` based transport with `Username`/`Password` headers.
#[derive(Debug, Clone)]
pub struct SoapTransport {
    client: reqwest::Client,
}

impl SoapTransport {
    pub fn new(timeout: Duration) -> RtmlResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                RtmlError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for SoapTransport {
    async fn post(
        &self,
        endpoint: &str,
        credentials: &Credentials,
        envelope: String,
    ) -> RtmlResult<TransportResponse> {
        let response = self
            .client
            .post(endpoint)
            .header("Username", credentials.username.as_str())
            .header("Password", credentials.password.as_str())
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}\"", SOAP_METHOD))
            .body(envelope)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(TransportResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> RtmlError {
    let kind = if err.is_timeout() {
        TransportFailure::Timeout
    } else if err.is_connect() {
        TransportFailure::Connection
    } else {
        TransportFailure::Envelope
    };
    RtmlError::transmission(kind, err.to_string())
}
