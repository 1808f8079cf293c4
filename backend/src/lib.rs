//! # LT RTML
//!
//! Observation request submission for the Liverpool Telescope.
//!
//! The crate turns a validated observation request (target, observing
//! constraints and one instrument configuration) into an RTML 3.1a request
//! document, sends it to the telescope's node agent over SOAP, and classifies
//! the reply.
//!
//! ## Architecture
//!
//! - [`models`]: request types ([`ObservationRequest`], [`InstrumentConfiguration`], [`Target`])
//! - [`rtml`]: document construction and reply parsing
//! - [`submission`]: SOAP transport and [`SubmissionClient`], including the debug sink
//! - [`catalog`]: target resolution
//! - [`config`]: credentials, endpoint and debug settings
//! - [`form`] and [`facility`]: form input and the facility surface built on the core
//!
//! ```text
//! ObservationRequest
//!   -> rtml::build_schedules (coordinates + constraints)
//!   -> DocumentAssembler
//!   -> SubmissionClient
//!   -> rtml::parse_response
//!   -> SubmissionResult
//! ```

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod error;
pub mod facility;
pub mod form;
pub mod models;
pub mod rtml;
pub mod submission;

pub use config::{Credentials, FacilityConfig};
pub use error::{RtmlError, RtmlResult, TransportFailure};
pub use facility::LtFacility;
pub use form::ObservationForm;
pub use models::{InstrumentConfiguration, ObservationRequest, Target};
pub use rtml::{DocumentAssembler, RtmlDocument, SubmissionResult};
pub use submission::{SubmissionClient, SubmissionMode};
