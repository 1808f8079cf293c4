//! Observing-condition constraints attached to every schedule.

use crate::models::{format_rtml_timestamp, ObservingConstraints, TimeWindow};

use super::coordinates::format_decimal;
use super::element::Element;

pub const SKY_BRIGHTNESS_UNITS: &str = "magnitudes/square-arcsecond";

/// Build the constraint list in the order the remote schema requires:
/// airmass, sky brightness, seeing, extinction, date/time window.
pub fn build_constraints(window: &TimeWindow, constraints: &ObservingConstraints) -> Vec<Element> {
    let airmass = Element::new("AirmassConstraint")
        .with_attr("maximum", format_decimal(constraints.max_airmass));

    let sky = Element::new("SkyConstraint")
        .with_child(Element::leaf(
            "Flux",
            format_decimal(constraints.max_sky_brightness),
        ))
        .with_child(Element::leaf("Units", SKY_BRIGHTNESS_UNITS));

    let seeing = Element::new("SeeingConstraint")
        .with_attr("maximum", format_decimal(constraints.max_seeing));

    let extinction = Element::new("ExtinctionConstraint")
        .with_child(Element::leaf("Clouds", constraints.photometric.clouds()));

    let date_time = Element::new("DateTimeConstraint")
        .with_attr("type", "include")
        .with_child(
            Element::new("DateTimeStart")
                .with_attr("system", "UT")
                .with_attr("value", format_rtml_timestamp(&window.start())),
        )
        .with_child(
            Element::new("DateTimeEnd")
                .with_attr("system", "UT")
                .with_attr("value", format_rtml_timestamp(&window.end())),
        );

    vec![airmass, sky, seeing, extinction, date_time]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Photometric;
    use chrono::{TimeZone, Utc};

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 5, 8, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_constraint_order() {
        let names: Vec<String> = build_constraints(&window(), &ObservingConstraints::default())
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "AirmassConstraint",
                "SkyConstraint",
                "SeeingConstraint",
                "ExtinctionConstraint",
                "DateTimeConstraint"
            ]
        );
    }

    #[test]
    fn test_constraint_values() {
        let constraints = ObservingConstraints {
            max_airmass: 1.5,
            max_seeing: 2.0,
            max_sky_brightness: 0.5,
            photometric: Photometric::Clear,
        };
        let built = build_constraints(&window(), &constraints);

        assert_eq!(built[0].attribute("maximum"), Some("1.5"));
        assert_eq!(built[1].child("Flux").and_then(|e| e.text()), Some("0.5"));
        assert_eq!(
            built[1].child("Units").and_then(|e| e.text()),
            Some(SKY_BRIGHTNESS_UNITS)
        );
        assert_eq!(built[2].attribute("maximum"), Some("2.0"));
        assert_eq!(built[3].child("Clouds").and_then(|e| e.text()), Some("clear"));
    }

    #[test]
    fn test_date_time_constraint_xml() {
        let built = build_constraints(&window(), &ObservingConstraints::default());
        assert_eq!(
            built[4].to_xml().unwrap(),
            "<DateTimeConstraint type=\"include\">\
             <DateTimeStart system=\"UT\" value=\"2023-05-01T12:00:00+00:00\"/>\
             <DateTimeEnd system=\"UT\" value=\"2023-05-08T12:00:00+00:00\"/>\
             </DateTimeConstraint>"
        );
    }

    #[test]
    fn test_default_photometric_writes_light() {
        let built = build_constraints(&window(), &ObservingConstraints::default());
        assert_eq!(built[3].child("Clouds").and_then(|e| e.text()), Some("light"));
    }
}
