//! Resolved observation targets.

use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, TargetId);

/// A sidereal target as resolved by the catalog.
///
/// The request engine only reads targets; they are owned by whichever
/// catalog produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Display name, emitted as the `name` attribute of `<Target>`
    pub name: String,
    /// Right ascension in decimal degrees
    pub ra: qtty::Degrees,
    /// Declination in decimal degrees
    pub dec: qtty::Degrees,
    /// Equinox / epoch label, e.g. `J2000`
    #[serde(default = "default_epoch")]
    pub epoch: String,
}

fn default_epoch() -> String {
    "J2000".to_string()
}

impl Target {
    pub fn new(name: impl Into<String>, ra_deg: f64, dec_deg: f64, epoch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ra: qtty::Degrees::new(ra_deg),
            dec: qtty::Degrees::new(dec_deg),
            epoch: epoch.into(),
        }
    }

    pub fn ra_deg(&self) -> f64 {
        self.ra.value()
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_accessors() {
        let target = Target::new("M31", 10.6847, 41.2687, "J2000");
        assert_eq!(target.name, "M31");
        assert_eq!(target.ra_deg(), 10.6847);
        assert_eq!(target.dec_deg(), 41.2687);
    }

    #[test]
    fn test_target_epoch_defaults_when_missing() {
        let json = r#"{"name": "Vega", "ra": 279.2347, "dec": 38.7837}"#;
        let target: Target = serde_json::from_str(json).unwrap();
        assert_eq!(target.epoch, "J2000");
        assert_eq!(target.dec_deg(), 38.7837);
    }

    #[test]
    fn test_target_id_display() {
        let id = TargetId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i64::from(id), 42);
    }
}
