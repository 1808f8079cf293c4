//! Instrument configurations for the Liverpool Telescope.
//!
//! Each supported instrument is one case of [`InstrumentConfiguration`]. The
//! schedule builder matches on it exhaustively, so adding an instrument means
//! adding a case here (plus its canonical filter order, if it has filters) and
//! one arm in `rtml::schedule`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RtmlError, RtmlResult};

/// Instruments the facility can build requests for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    /// IO:O optical imager
    #[serde(rename = "IOO")]
    Ioo,
    /// IO:I infrared imager
    #[serde(rename = "IOI")]
    Ioi,
    /// SPRAT low-resolution spectrograph
    #[serde(rename = "SPRAT")]
    Sprat,
    /// FRODOSpec dual-arm spectrograph
    #[serde(rename = "FRODO")]
    Frodo,
}

impl Instrument {
    pub const ALL: [Instrument; 4] = [
        Instrument::Ioo,
        Instrument::Ioi,
        Instrument::Sprat,
        Instrument::Frodo,
    ];

    /// Observation type code used by callers to pick an instrument.
    pub fn code(&self) -> &'static str {
        match self {
            Instrument::Ioo => "IOO",
            Instrument::Ioi => "IOI",
            Instrument::Sprat => "SPRAT",
            Instrument::Frodo => "FRODO",
        }
    }

    /// Human readable instrument name.
    pub fn label(&self) -> &'static str {
        match self {
            Instrument::Ioo => "IO:O",
            Instrument::Ioi => "IO:I",
            Instrument::Sprat => "Sprat",
            Instrument::Frodo => "Frodo",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Instrument {
    type Err = String;

    /// Parse an observation type code or instrument label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ioo" | "io:o" => Ok(Self::Ioo),
            "ioi" | "io:i" => Ok(Self::Ioi),
            "sprat" => Ok(Self::Sprat),
            "frodo" | "frodospec" => Ok(Self::Frodo),
            _ => Err(format!("Unknown instrument: {}", s)),
        }
    }
}

/// One exposure sequence: `count` integrations of `duration` each.
///
/// A count of zero marks the channel as unused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    #[serde(default = "default_exposure_time")]
    pub duration: qtty::Seconds,
    pub count: u32,
}

/// Exposure time a form starts from.
pub const DEFAULT_EXPOSURE_SECS: f64 = 120.0;

fn default_exposure_time() -> qtty::Seconds {
    qtty::Seconds::new(DEFAULT_EXPOSURE_SECS)
}

impl Exposure {
    pub fn new(duration_secs: f64, count: u32) -> Self {
        Self {
            duration: qtty::Seconds::new(duration_secs),
            count,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.value()
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }

    fn validate(&self, channel: &str) -> RtmlResult<()> {
        let secs = self.duration_secs();
        if self.is_active() && !(secs.is_finite() && secs > 0.0) {
            return Err(RtmlError::InvalidRequest(format!(
                "exposure time for {} must be positive, got {}",
                channel, secs
            )));
        }
        Ok(())
    }
}

/// Detector binning, written on forms as `"NxM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binning {
    pub x: u32,
    pub y: u32,
}

impl Binning {
    pub const ONE_BY_ONE: Binning = Binning { x: 1, y: 1 };
    pub const TWO_BY_TWO: Binning = Binning { x: 2, y: 2 };
}

impl Default for Binning {
    fn default() -> Self {
        Binning::TWO_BY_TWO
    }
}

impl fmt::Display for Binning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

impl FromStr for Binning {
    type Err = RtmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RtmlError::InvalidRequest(format!("invalid binning selector '{}'", s));
        let (x, y) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let x: u32 = x.trim().parse().map_err(|_| invalid())?;
        let y: u32 = y.trim().parse().map_err(|_| invalid())?;
        if x == 0 || y == 0 {
            return Err(invalid());
        }
        Ok(Binning { x, y })
    }
}

impl Serialize for Binning {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Binning {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// IO:O filters. Declaration order is the instrument's canonical order, and
/// schedules are always emitted in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IooFilter {
    U,
    R,
    G,
    I,
    Z,
    B,
    V,
    Halpha6566,
    Halpha6634,
    Halpha6705,
    Halpha6755,
    Halpha6822,
}

impl IooFilter {
    pub const ALL: [IooFilter; 12] = [
        IooFilter::U,
        IooFilter::R,
        IooFilter::G,
        IooFilter::I,
        IooFilter::Z,
        IooFilter::B,
        IooFilter::V,
        IooFilter::Halpha6566,
        IooFilter::Halpha6634,
        IooFilter::Halpha6705,
        IooFilter::Halpha6755,
        IooFilter::Halpha6822,
    ];

    /// Filter name as written in `<Filter type="..."/>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            IooFilter::U => "U",
            IooFilter::R => "R",
            IooFilter::G => "G",
            IooFilter::I => "I",
            IooFilter::Z => "Z",
            IooFilter::B => "B",
            IooFilter::V => "V",
            IooFilter::Halpha6566 => "Halpha6566",
            IooFilter::Halpha6634 => "Halpha6634",
            IooFilter::Halpha6705 => "Halpha6705",
            IooFilter::Halpha6755 => "Halpha6755",
            IooFilter::Halpha6822 => "Halpha6822",
        }
    }
}

impl FromStr for IooFilter {
    type Err = RtmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IooFilter::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RtmlError::InvalidRequest(format!("unknown IO:O filter '{}'", s)))
    }
}

/// SPRAT grating selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grating {
    #[default]
    Red,
    Blue,
}

impl Grating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grating::Red => "red",
            Grating::Blue => "blue",
        }
    }
}

/// FRODOSpec resolution mode, shared by both arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrodoResolution {
    High,
    #[default]
    Low,
}

impl FrodoResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrodoResolution::High => "high",
            FrodoResolution::Low => "low",
        }
    }
}

/// The two FRODOSpec arms, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrodoArm {
    Blue,
    Red,
}

impl FrodoArm {
    pub const ALL: [FrodoArm; 2] = [FrodoArm::Blue, FrodoArm::Red];

    pub fn device_name(&self) -> &'static str {
        match self {
            FrodoArm::Blue => "FrodoSpec-Blue",
            FrodoArm::Red => "FrodoSpec-Red",
        }
    }
}

/// Instrument-specific exposure configuration of one observation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstrumentConfiguration {
    /// IO:O: any subset of filters, each with its own exposure.
    #[serde(rename = "IOO")]
    Ioo {
        exposures: BTreeMap<IooFilter, Exposure>,
        #[serde(default)]
        binning: Binning,
    },
    /// IO:I: H band only, binning fixed at 1x1.
    #[serde(rename = "IOI")]
    Ioi { exposure: Exposure },
    /// SPRAT: one exposure through the chosen grating.
    #[serde(rename = "SPRAT")]
    Sprat {
        #[serde(default)]
        grating: Grating,
        exposure: Exposure,
    },
    /// FRODOSpec: one exposure, fanned out to both arms.
    #[serde(rename = "FRODO")]
    Frodo {
        #[serde(default)]
        resolution: FrodoResolution,
        exposure: Exposure,
    },
}

impl InstrumentConfiguration {
    pub fn instrument(&self) -> Instrument {
        match self {
            InstrumentConfiguration::Ioo { .. } => Instrument::Ioo,
            InstrumentConfiguration::Ioi { .. } => Instrument::Ioi,
            InstrumentConfiguration::Sprat { .. } => Instrument::Sprat,
            InstrumentConfiguration::Frodo { .. } => Instrument::Frodo,
        }
    }

    /// Number of exposure channels with a non-zero count.
    pub fn active_channels(&self) -> usize {
        match self {
            InstrumentConfiguration::Ioo { exposures, .. } => {
                exposures.values().filter(|e| e.is_active()).count()
            }
            InstrumentConfiguration::Ioi { exposure }
            | InstrumentConfiguration::Sprat { exposure, .. }
            | InstrumentConfiguration::Frodo { exposure, .. } => usize::from(exposure.is_active()),
        }
    }

    /// Check exposure durations of every active channel.
    pub fn validate(&self) -> RtmlResult<()> {
        match self {
            InstrumentConfiguration::Ioo { exposures, .. } => {
                for (filter, exposure) in exposures {
                    exposure.validate(filter.as_str())?;
                }
                Ok(())
            }
            InstrumentConfiguration::Ioi { exposure } => exposure.validate("H"),
            InstrumentConfiguration::Sprat { grating, exposure } => {
                exposure.validate(grating.as_str())
            }
            InstrumentConfiguration::Frodo {
                resolution,
                exposure,
            } => exposure.validate(resolution.as_str()),
        }
    }
}
