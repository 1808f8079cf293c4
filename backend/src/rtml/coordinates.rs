//! Decimal-degree to sexagesimal conversion and the `<Target>` block.

use crate::error::{RtmlError, RtmlResult};
use crate::models::Target;

use super::element::Element;

/// Sign of a declination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecSign {
    Plus,
    Minus,
}

impl DecSign {
    pub fn as_char(&self) -> char {
        match self {
            DecSign::Plus => '+',
            DecSign::Minus => '-',
        }
    }

    fn factor(&self) -> f64 {
        match self {
            DecSign::Plus => 1.0,
            DecSign::Minus => -1.0,
        }
    }
}

/// RA as h/m/s and Dec as sign/d/m/s. Seconds keep their full precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sexagesimal {
    pub ra_hours: u32,
    pub ra_minutes: u32,
    pub ra_seconds: f64,
    pub dec_sign: DecSign,
    pub dec_degrees: u32,
    pub dec_arcminutes: u32,
    pub dec_arcseconds: f64,
}

impl Sexagesimal {
    /// Back to decimal degrees `(ra, dec)`.
    pub fn to_degrees(&self) -> (f64, f64) {
        let ra_hours = self.ra_hours as f64
            + self.ra_minutes as f64 / 60.0
            + self.ra_seconds / 3600.0;
        let dec = self.dec_degrees as f64
            + self.dec_arcminutes as f64 / 60.0
            + self.dec_arcseconds / 3600.0;
        (ra_hours * 15.0, self.dec_sign.factor() * dec)
    }
}

/// Split a non-negative value into whole units, whole sixtieths and the
/// real-valued remainder in 3600ths.
fn decompose(value: f64) -> (u32, u32, f64) {
    let whole = value.floor();
    let minutes_total = (value - whole) * 60.0;
    let minutes = minutes_total.floor().min(59.0);
    let seconds = (minutes_total - minutes) * 60.0;
    (whole as u32, minutes as u32, seconds)
}

/// Convert decimal RA/Dec in degrees to sexagesimal.
///
/// `ra_deg` must lie in `[0, 360)` and `dec_deg` in `[-90, 90]`.
pub fn to_sexagesimal(ra_deg: f64, dec_deg: f64) -> RtmlResult<Sexagesimal> {
    if !(0.0..360.0).contains(&ra_deg) {
        return Err(RtmlError::InvalidCoordinate(format!(
            "right ascension {} outside [0, 360)",
            ra_deg
        )));
    }
    if !(-90.0..=90.0).contains(&dec_deg) {
        return Err(RtmlError::InvalidCoordinate(format!(
            "declination {} outside [-90, 90]",
            dec_deg
        )));
    }

    let (ra_hours, ra_minutes, ra_seconds) = decompose(ra_deg / 15.0);
    let dec_sign = if dec_deg >= 0.0 {
        DecSign::Plus
    } else {
        DecSign::Minus
    };
    let (dec_degrees, dec_arcminutes, dec_arcseconds) = decompose(dec_deg.abs());

    Ok(Sexagesimal {
        ra_hours,
        ra_minutes,
        ra_seconds,
        dec_sign,
        dec_degrees,
        dec_arcminutes,
        dec_arcseconds,
    })
}

/// Decimal text for a real value: shortest round-tripping digits in fixed
/// notation, always with a fractional part (`120` is written `120.0`).
pub fn format_decimal(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// `<Target name=..><Coordinates>..</Coordinates></Target>`
pub fn build_target(target: &Target) -> RtmlResult<Element> {
    let s = to_sexagesimal(target.ra_deg(), target.dec_deg())?;

    let right_ascension = Element::new("RightAscension")
        .with_child(Element::leaf("Hours", s.ra_hours.to_string()))
        .with_child(Element::leaf("Minutes", s.ra_minutes.to_string()))
        .with_child(Element::leaf("Seconds", format_decimal(s.ra_seconds)));

    let declination = Element::new("Declination")
        .with_child(Element::leaf(
            "Degrees",
            format!("{}{}", s.dec_sign.as_char(), s.dec_degrees),
        ))
        .with_child(Element::leaf("Arcminutes", s.dec_arcminutes.to_string()))
        .with_child(Element::leaf("Arcseconds", format_decimal(s.dec_arcseconds)));

    let coordinates = Element::new("Coordinates")
        .with_child(right_ascension)
        .with_child(declination)
        .with_child(Element::leaf("Equinox", target.epoch.as_str()));

    Ok(Element::new("Target")
        .with_attr("name", target.name.as_str())
        .with_child(coordinates))
}
