//! RTML 3.1a document construction and reply parsing.
//!
//! Request flow: [`schedule::build_schedules`] (using [`coordinates`] and
//! [`constraints`]) produces the schedule fragments, [`DocumentAssembler`]
//! wraps them in the prolog and project block, and [`parse_response`] reads
//! the node agent's answer.

pub mod constraints;
pub mod coordinates;
pub mod document;
pub mod element;
pub mod response;
pub mod schedule;

pub use constraints::build_constraints;
pub use coordinates::{build_target, to_sexagesimal, DecSign, Sexagesimal};
pub use document::{
    assemble, build_project, build_prolog, DocumentAssembler, FixedUid, RtmlDocument,
    TimestampUid, UidSource,
};
pub use element::Element;
pub use response::{parse_response, SubmissionResult};
pub use schedule::build_schedules;
