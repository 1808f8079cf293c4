use chrono::{TimeZone, Utc};

use super::*;
use crate::error::RtmlError;

#[test]
fn test_window_new_accepts_ordered_bounds() {
    let start = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2023, 5, 2, 12, 0, 0).unwrap();
    let window = TimeWindow::new(start, end).unwrap();
    assert_eq!(window.start(), start);
    assert_eq!(window.end(), end);
    assert_eq!(window.duration(), chrono::Duration::days(1));
}

#[test]
fn test_window_rejects_equal_bounds() {
    let t = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
    let result = TimeWindow::new(t, t);
    assert!(matches!(result, Err(RtmlError::InvalidRequest(_))));
}

#[test]
fn test_window_rejects_reversed_bounds() {
    let start = Utc.with_ymd_and_hms(2023, 5, 2, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
    let err = TimeWindow::new(start, end).unwrap_err();
    assert!(err.to_string().contains("not after start"));
}

#[test]
fn test_window_from_form_fields() {
    let window = TimeWindow::from_form_fields("2023-05-01", "12:00", "2023-05-03", "06:30").unwrap();
    assert_eq!(
        format_rtml_timestamp(&window.start()),
        "2023-05-01T12:00:00+00:00"
    );
    assert_eq!(
        format_rtml_timestamp(&window.end()),
        "2023-05-03T06:30:00+00:00"
    );
}

#[test]
fn test_window_from_form_fields_accepts_seconds() {
    let window = TimeWindow::from_form_fields("2023-05-01", "12:00:15", "2023-05-01", "13:00").unwrap();
    assert_eq!(
        format_rtml_timestamp(&window.start()),
        "2023-05-01T12:00:15+00:00"
    );
}

#[test]
fn test_window_from_form_fields_bad_date() {
    let result = TimeWindow::from_form_fields("2023-13-01", "12:00", "2023-05-03", "12:00");
    assert!(matches!(result, Err(RtmlError::InvalidRequest(_))));
}

#[test]
fn test_window_from_form_fields_bad_time() {
    let result = TimeWindow::from_form_fields("2023-05-01", "noon", "2023-05-03", "12:00");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("invalid time 'noon'"));
}

#[test]
fn test_format_rtml_timestamp_drops_subseconds() {
    let dt = Utc.with_ymd_and_hms(2024, 1, 9, 3, 4, 5).unwrap() + chrono::Duration::milliseconds(750);
    assert_eq!(format_rtml_timestamp(&dt), "2024-01-09T03:04:05+00:00");
}
