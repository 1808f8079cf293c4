//! Network exchange with the Liverpool Telescope node agent.

pub mod client;
pub mod soap;
pub mod transport;

pub use client::{SubmissionClient, SubmissionMode, DEBUG_OBSERVATION_ID};
pub use transport::{SoapTransport, Transport, TransportResponse};
