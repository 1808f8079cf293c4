//! Observation form input.
//!
//! [`ObservationForm`] is what a user fills in: plain dates and times, a
//! target id, a proposal and the instrument block. It is checked field by
//! field, then turned into an [`ObservationRequest`] once the target has been
//! resolved.

use serde::{Deserialize, Serialize};

use crate::error::{RtmlError, RtmlResult};
use crate::models::{
    InstrumentConfiguration, ObservationRequest, ObservingConstraints, ProposalId, Target,
    TargetId, TimeWindow,
};

pub const DEFAULT_PRIORITY: u8 = 1;
pub const DEFAULT_TIME_OF_DAY: &str = "12:00";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationForm {
    pub target_id: TargetId,
    /// Proposal the time is charged to
    pub project: ProposalId,
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `HH:MM`, UTC
    #[serde(default = "default_time_of_day")]
    pub start_time: String,
    pub end_date: String,
    #[serde(default = "default_time_of_day")]
    pub end_time: String,
    #[serde(default)]
    pub constraints: ObservingConstraints,
    pub instrument: InstrumentConfiguration,
}

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

fn default_time_of_day() -> String {
    DEFAULT_TIME_OF_DAY.to_string()
}

impl ObservationForm {
    pub fn from_json(content: &str) -> RtmlResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| RtmlError::InvalidRequest(format!("Invalid observation form: {}", e)))
    }

    /// Range checks on individual fields. Empty means every field is usable.
    pub fn field_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let c = &self.constraints;

        if !(1..=3).contains(&self.priority) {
            errors.push(format!("priority: must be between 1 and 3, got {}", self.priority));
        }
        check_range(&mut errors, "max_airmass", c.max_airmass, 1.0, 3.0);
        check_range(&mut errors, "max_seeing", c.max_seeing, 1.0, 5.0);
        check_range(&mut errors, "max_sky_brightness", c.max_sky_brightness, 0.0, 10.0);
        if let Err(e) = self.window() {
            errors.push(format!("window: {}", e));
        }
        if let Err(e) = self.instrument.validate() {
            errors.push(format!("instrument: {}", e));
        }
        errors
    }

    pub fn window(&self) -> RtmlResult<TimeWindow> {
        TimeWindow::from_form_fields(
            &self.start_date,
            &self.start_time,
            &self.end_date,
            &self.end_time,
        )
    }

    /// Combine the form with its resolved target.
    pub fn into_request(self, target: Target) -> RtmlResult<ObservationRequest> {
        let errors = self.field_errors();
        if !errors.is_empty() {
            return Err(RtmlError::InvalidRequest(errors.join("; ")));
        }

        let window = self.window()?;
        let request = ObservationRequest {
            proposal: self.project,
            priority: self.priority,
            window,
            constraints: self.constraints,
            instrument: self.instrument,
            target,
        };
        request.validate()?;
        Ok(request)
    }
}

fn check_range(errors: &mut Vec<String>, field: &str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(format!(
            "{}: must be between {} and {}, got {}",
            field, min, max, value
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Instrument, Photometric};

    const IOO_FORM: &str = r#"{
        "target_id": 3,
        "project": "PL23A01",
        "start_date": "2023-05-01",
        "end_date": "2023-05-03",
        "end_time": "06:30",
        "instrument": {
            "type": "IOO",
            "exposures": {"R": {"count": 2}, "V": {"duration": 60.0, "count": 0}}
        }
    }"#;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let form = ObservationForm::from_json(IOO_FORM).unwrap();
        assert_eq!(form.priority, 1);
        assert_eq!(form.start_time, "12:00");
        assert_eq!(form.end_time, "06:30");
        assert_eq!(form.constraints, ObservingConstraints::default());
        assert_eq!(form.instrument.instrument(), Instrument::Ioo);
        assert!(form.field_errors().is_empty());
    }

    #[test]
    fn test_partial_constraints_keep_other_defaults() {
        let json = IOO_FORM.replace(
            "\"instrument\"",
            "\"constraints\": {\"max_airmass\": 1.5, \"photometric\": \"clear\"}, \"instrument\"",
        );
        let form = ObservationForm::from_json(&json).unwrap();
        assert_eq!(form.constraints.max_airmass, 1.5);
        assert_eq!(form.constraints.max_seeing, 1.2);
        assert_eq!(form.constraints.photometric, Photometric::Clear);
    }

    #[test]
    fn test_field_errors_report_each_problem() {
        let mut form = ObservationForm::from_json(IOO_FORM).unwrap();
        form.priority = 5;
        form.constraints.max_airmass = 4.0;
        form.end_date = "2023-04-30".to_string();
        let errors = form.field_errors();
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors[0].starts_with("priority"));
        assert!(errors[1].starts_with("max_airmass"));
        assert!(errors[2].starts_with("window"));
    }

    #[test]
    fn test_into_request() {
        let form = ObservationForm::from_json(IOO_FORM).unwrap();
        let request = form
            .into_request(Target::new("M31", 10.6847, 41.2687, "J2000"))
            .unwrap();
        assert_eq!(request.proposal.as_str(), "PL23A01");
        assert_eq!(request.window.duration(), chrono::Duration::minutes(42 * 60 + 30));
        assert_eq!(request.instrument.active_channels(), 1);
    }

    #[test]
    fn test_into_request_rejects_invalid_fields() {
        let mut form = ObservationForm::from_json(IOO_FORM).unwrap();
        form.start_date = "May 1st".to_string();
        let result = form.into_request(Target::new("M31", 10.6847, 41.2687, "J2000"));
        assert!(matches!(result, Err(RtmlError::InvalidRequest(_))));
    }

    #[test]
    fn test_into_request_rejects_all_zero_counts() {
        let json = IOO_FORM.replace("{\"count\": 2}", "{\"count\": 0}");
        let form = ObservationForm::from_json(&json).unwrap();
        let result = form.into_request(Target::new("M31", 10.6847, 41.2687, "J2000"));
        assert!(matches!(result, Err(RtmlError::EmptyConfiguration)));
    }
}
