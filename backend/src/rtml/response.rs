//! Interpretation of node agent replies.

use serde::Serialize;

use crate::error::{RtmlError, RtmlResult};

use super::element::Element;

/// Reply mode the node agent uses to accept a request.
pub const CONFIRM_MODE: &str = "confirm";

/// Separator between the segments of a reply uid. The last segment is the
/// remote observation id.
pub const UID_SEPARATOR: char = '-';

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub success: bool,
    /// Remote-assigned id; only set on success
    pub observation_id: Option<String>,
    /// Rejection reason reported by the remote side
    pub message: Option<String>,
    /// Reply document as received, kept for diagnostics
    pub raw_response: Option<String>,
}

impl SubmissionResult {
    pub fn accepted(observation_id: impl Into<String>, raw_response: Option<String>) -> Self {
        Self {
            success: true,
            observation_id: Some(observation_id.into()),
            message: None,
            raw_response,
        }
    }

    pub fn rejected(message: impl Into<String>, raw_response: Option<String>) -> Self {
        Self {
            success: false,
            observation_id: None,
            message: Some(message.into()),
            raw_response,
        }
    }
}

/// Parse an RTML reply.
///
/// Only a reply in `confirm` mode without an `<Error>` element is a success;
/// it must carry a `uid` whose last `-`-separated segment becomes the
/// observation id. Any other mode (`reject`, `fail`, `abort`, an echoed
/// `request`, or none at all) yields an unsuccessful result.
pub fn parse_response(raw: &str) -> RtmlResult<SubmissionResult> {
    let root = Element::parse(raw).map_err(RtmlError::MalformedResponse)?;
    if root.local_name() != "RTML" {
        return Err(RtmlError::MalformedResponse(format!(
            "expected RTML root element, found <{}>",
            root.name()
        )));
    }

    if let Some(reason) = rejection_reason(&root) {
        return Ok(SubmissionResult::rejected(reason, Some(raw.to_string())));
    }

    let uid = root
        .attribute("uid")
        .ok_or_else(|| RtmlError::MalformedResponse("reply has no uid attribute".to_string()))?;
    let observation_id = uid
        .rsplit(UID_SEPARATOR)
        .next()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            RtmlError::MalformedResponse(format!("uid '{}' has no trailing id segment", uid))
        })?;

    Ok(SubmissionResult::accepted(
        observation_id,
        Some(raw.to_string()),
    ))
}

fn rejection_reason(root: &Element) -> Option<String> {
    let error_text = root
        .descendant("Error")
        .and_then(|e| e.text())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match root.attribute("mode") {
        Some(mode) if mode.eq_ignore_ascii_case(CONFIRM_MODE) => root
            .descendant("Error")
            .map(|_| error_text.unwrap_or("request rejected").to_string()),
        Some(mode) if mode.eq_ignore_ascii_case("reject") => {
            Some(error_text.unwrap_or("request rejected").to_string())
        }
        Some(mode) => Some(
            error_text
                .map(str::to_string)
                .unwrap_or_else(|| format!("reply in '{}' mode", mode)),
        ),
        None => Some(
            error_text
                .unwrap_or("reply carries no mode")
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_id_is_last_uid_segment() {
        let raw = r#"<RTML xmlns="http://www.rtml.org/v3.1a" mode="confirm" uid="IO:O-abc-20230501-42" version="3.1a"/>"#;
        let result = parse_response(raw).unwrap();
        assert!(result.success);
        assert_eq!(result.observation_id.as_deref(), Some("42"));
        assert_eq!(result.raw_response.as_deref(), Some(raw));
    }

    #[test]
    fn test_uid_without_separator_is_whole_id() {
        let result = parse_response(r#"<RTML mode="confirm" uid="1234"/>"#).unwrap();
        assert_eq!(result.observation_id.as_deref(), Some("1234"));
    }

    #[test]
    fn test_missing_uid_is_malformed() {
        assert!(matches!(
            parse_response(r#"<RTML mode="confirm"/>"#),
            Err(RtmlError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_trailing_separator_is_malformed() {
        assert!(matches!(
            parse_response(r#"<RTML mode="confirm" uid="TOM-1-"/>"#),
            Err(RtmlError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_unparsable_reply_is_malformed() {
        assert!(matches!(
            parse_response("Internal Server Error"),
            Err(RtmlError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response(r#"<html uid="x-1"/>"#),
            Err(RtmlError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_reject_mode_carries_error_text() {
        let raw = r#"<RTML mode="reject" uid="TOM-1"><Error>Proposal has no time left</Error></RTML>"#;
        let result = parse_response(raw).unwrap();
        assert!(!result.success);
        assert_eq!(result.observation_id, None);
        assert_eq!(result.message.as_deref(), Some("Proposal has no time left"));
    }

    #[test]
    fn test_reject_mode_without_error_text() {
        let result = parse_response(r#"<RTML mode="reject" uid="TOM-1"/>"#).unwrap();
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("request rejected"));
    }

    #[test]
    fn test_non_confirm_modes_are_unsuccessful() {
        for mode in ["fail", "abort", "request"] {
            let raw = format!(r#"<RTML mode="{}" uid="TOM-1-5"/>"#, mode);
            let result = parse_response(&raw).unwrap();
            assert!(!result.success, "mode {} counted as success", mode);
            assert_eq!(result.observation_id, None);
            assert_eq!(
                result.message.as_deref(),
                Some(format!("reply in '{}' mode", mode).as_str())
            );
        }
    }

    #[test]
    fn test_missing_mode_is_unsuccessful() {
        let result = parse_response(r#"<RTML uid="TOM-1-5"/>"#).unwrap();
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("reply carries no mode"));
    }

    #[test]
    fn test_fail_mode_reports_error_text() {
        let raw = r#"<RTML mode="fail" uid="TOM-1-5"><Error>Instrument offline</Error></RTML>"#;
        let result = parse_response(raw).unwrap();
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("Instrument offline"));
    }

    #[test]
    fn test_confirm_mode_is_case_insensitive() {
        let result = parse_response(r#"<RTML mode="CONFIRM" uid="TOM-1-5"/>"#).unwrap();
        assert!(result.success);
        assert_eq!(result.observation_id.as_deref(), Some("5"));
    }
}
