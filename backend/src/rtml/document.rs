//! Request document assembly.
//!
//! A document is the `<RTML>` prolog element with the `<Project>` block and
//! every `<Schedule>` appended as direct children, in that order. Nothing is
//! mutated after [`assemble`]; the document is serialized once and dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;

use crate::checksum::calculate_checksum;
use crate::error::{RtmlError, RtmlResult};
use crate::models::{ObservationRequest, ProposalId};

use super::constraints::build_constraints;
use super::element::Element;
use super::schedule::build_schedules;

pub const RTML_NAMESPACE: &str = "http://www.rtml.org/v3.1a";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str =
    "http://www.rtml.org/v3.1a http://telescope.livjm.ac.uk/rtml/RTML-nightly.xsd";
pub const RTML_VERSION: &str = "3.1a";
pub const REQUEST_MODE: &str = "request";

/// Source of request correlation ids. Ids must be unique per request; they
/// need not be ordered or unpredictable.
pub trait UidSource: Send + Sync {
    fn next_uid(&self) -> String;
}

/// Wall-clock milliseconds plus a process-wide sequence number.
#[derive(Debug, Clone)]
pub struct TimestampUid {
    prefix: String,
}

static UID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl TimestampUid {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for TimestampUid {
    fn default() -> Self {
        Self::new("TOM")
    }
}

impl UidSource for TimestampUid {
    fn next_uid(&self) -> String {
        let seq = UID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}-{}-{}",
            self.prefix,
            chrono::Utc::now().timestamp_millis(),
            seq
        )
    }
}

/// Always hands out the same uid. Used to pin output in tests and renders.
#[derive(Debug, Clone)]
pub struct FixedUid(pub String);

impl UidSource for FixedUid {
    fn next_uid(&self) -> String {
        self.0.clone()
    }
}

/// A complete RTML request document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtmlDocument {
    root: Element,
}

impl RtmlDocument {
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn uid(&self) -> Option<&str> {
        self.root.attribute("uid")
    }

    pub fn schedules(&self) -> impl Iterator<Item = &Element> {
        self.root
            .children()
            .iter()
            .filter(|c| c.name() == "Schedule")
    }

    /// Wire form.
    pub fn to_xml(&self) -> RtmlResult<String> {
        self.root.to_xml()
    }

    /// Indented form for the diagnostic sink.
    pub fn to_pretty_xml(&self) -> RtmlResult<String> {
        self.root.to_pretty_xml()
    }
}

/// Root `<RTML>` element carrying namespaces, schema location, mode and uid.
pub fn build_prolog(uid: &str) -> Element {
    Element::new("RTML")
        .with_attr("xmlns", RTML_NAMESPACE)
        .with_attr("xmlns:xsi", XSI_NAMESPACE)
        .with_attr("xsi:schemaLocation", SCHEMA_LOCATION)
        .with_attr("mode", REQUEST_MODE)
        .with_attr("uid", uid)
        .with_attr("version", RTML_VERSION)
}

/// `<Project ProjectID=..><Contact><Username/><Name/></Contact></Project>`
pub fn build_project(proposal: &ProposalId, username: &str) -> Element {
    Element::new("Project")
        .with_attr("ProjectID", proposal.as_str())
        .with_child(
            Element::new("Contact")
                .with_child(Element::leaf("Username", username))
                .with_child(Element::leaf("Name", "")),
        )
}

/// Compose prolog, project and schedules into one document.
pub fn assemble(prolog: Element, project: Element, schedules: Vec<Element>) -> RtmlDocument {
    RtmlDocument {
        root: prolog.with_child(project).with_children(schedules),
    }
}

/// Turns observation requests into RTML documents for one contact user.
#[derive(Clone)]
pub struct DocumentAssembler {
    username: String,
    uid_source: Arc<dyn UidSource>,
}

impl DocumentAssembler {
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_uid_source(username, Arc::new(TimestampUid::default()))
    }

    pub fn with_uid_source(username: impl Into<String>, uid_source: Arc<dyn UidSource>) -> Self {
        Self {
            username: username.into(),
            uid_source,
        }
    }

    /// Build the full request document.
    ///
    /// Fails with [`RtmlError::EmptyConfiguration`] when no channel has a
    /// non-zero count, before anything is sent anywhere.
    pub fn build_request(&self, request: &ObservationRequest) -> RtmlResult<RtmlDocument> {
        request.validate()?;

        let constraints = build_constraints(&request.window, &request.constraints);
        let schedules = build_schedules(&request.instrument, &request.target, &constraints)?;
        if schedules.is_empty() {
            return Err(RtmlError::EmptyConfiguration);
        }

        let uid = self.uid_source.next_uid();
        let document = assemble(
            build_prolog(&uid),
            build_project(&request.proposal, &self.username),
            schedules,
        );

        if log::log_enabled!(log::Level::Debug) {
            let xml = document.to_xml()?;
            debug!(
                "Assembled RTML uid={} instrument={} schedules={} sha256={}",
                uid,
                request.instrument.instrument(),
                document.schedules().count(),
                calculate_checksum(&xml)
            );
        }

        Ok(document)
    }
}

impl std::fmt::Debug for DocumentAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentAssembler")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
