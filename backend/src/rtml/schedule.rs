//! Per-instrument `<Schedule>` construction.
//!
//! Every schedule has the same shape:
//!
//! ```text
//! Schedule
//! ├── Device(name, type)
//! │   ├── SpectralRegion
//! │   └── Setup
//! │       ├── Filter(type)
//! │       └── Detector/Binning/{X,Y}
//! ├── Exposure(count)/Value(units="seconds")
//! ├── Target
//! └── constraints...
//! ```
//!
//! Instruments differ only in device identity, which selector lands in
//! `<Filter type>`, binning, and how many schedules one configuration fans
//! out to.

use crate::error::RtmlResult;
use crate::models::{Binning, Exposure, FrodoArm, InstrumentConfiguration, Target};

use super::coordinates::{build_target, format_decimal};
use super::element::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Camera,
    Spectrograph,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Camera => "camera",
            DeviceType::Spectrograph => "spectrograph",
        }
    }
}

/// Fixed identity of a device as written in `<Device>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSpec {
    pub name: &'static str,
    pub device_type: DeviceType,
    pub spectral_region: &'static str,
}

pub const IOO: DeviceSpec = DeviceSpec {
    name: "IO:O",
    device_type: DeviceType::Camera,
    spectral_region: "optical",
};

pub const IOI: DeviceSpec = DeviceSpec {
    name: "IO:I",
    device_type: DeviceType::Camera,
    spectral_region: "optical",
};

pub const SPRAT: DeviceSpec = DeviceSpec {
    name: "Sprat",
    device_type: DeviceType::Spectrograph,
    spectral_region: "optical",
};

/// IO:I only has the H filter.
pub const IOI_FILTER: &str = "H";

fn frodo_arm(arm: FrodoArm) -> DeviceSpec {
    DeviceSpec {
        name: arm.device_name(),
        device_type: DeviceType::Spectrograph,
        spectral_region: "optical",
    }
}

/// Build the schedules for one instrument configuration.
///
/// Channels with a zero repeat count are skipped, so the result may be empty;
/// rejecting an empty result is the assembler's job.
pub fn build_schedules(
    config: &InstrumentConfiguration,
    target: &Target,
    constraints: &[Element],
) -> RtmlResult<Vec<Element>> {
    let target = build_target(target)?;
    let schedule = |device: DeviceSpec, selector: &str, binning: Binning, exposure: &Exposure| {
        build_schedule(device, selector, binning, exposure, &target, constraints)
    };

    let schedules: Vec<Element> = match config {
        // BTreeMap iteration follows IooFilter's canonical order.
        InstrumentConfiguration::Ioo { exposures, binning } => exposures
            .iter()
            .filter(|(_, exposure)| exposure.is_active())
            .map(|(filter, exposure)| schedule(IOO, filter.as_str(), *binning, exposure))
            .collect(),
        InstrumentConfiguration::Ioi { exposure } => active(exposure)
            .map(|e| schedule(IOI, IOI_FILTER, Binning::ONE_BY_ONE, e))
            .into_iter()
            .collect(),
        InstrumentConfiguration::Sprat { grating, exposure } => active(exposure)
            .map(|e| schedule(SPRAT, grating.as_str(), Binning::ONE_BY_ONE, e))
            .into_iter()
            .collect(),
        InstrumentConfiguration::Frodo {
            resolution,
            exposure,
        } => match active(exposure) {
            Some(e) => FrodoArm::ALL
                .iter()
                .map(|arm| schedule(frodo_arm(*arm), resolution.as_str(), Binning::ONE_BY_ONE, e))
                .collect(),
            None => Vec::new(),
        },
    };

    Ok(schedules)
}

fn active(exposure: &Exposure) -> Option<&Exposure> {
    exposure.is_active().then_some(exposure)
}

fn build_schedule(
    device: DeviceSpec,
    selector: &str,
    binning: Binning,
    exposure: &Exposure,
    target: &Element,
    constraints: &[Element],
) -> Element {
    let detector = Element::new("Detector").with_child(
        Element::new("Binning")
            .with_child(Element::leaf("X", binning.x.to_string()).with_attr("units", "pixels"))
            .with_child(Element::leaf("Y", binning.y.to_string()).with_attr("units", "pixels")),
    );

    let setup = Element::new("Setup")
        .with_child(Element::new("Filter").with_attr("type", selector))
        .with_child(detector);

    let device = Element::new("Device")
        .with_attr("name", device.name)
        .with_attr("type", device.device_type.as_str())
        .with_child(Element::leaf("SpectralRegion", device.spectral_region))
        .with_child(setup);

    let exposure = Element::new("Exposure")
        .with_attr("count", exposure.count.to_string())
        .with_child(
            Element::leaf("Value", format_decimal(exposure.duration_secs()))
                .with_attr("units", "seconds"),
        );

    Element::new("Schedule")
        .with_child(device)
        .with_child(exposure)
        .with_child(target.clone())
        .with_children(constraints.iter().cloned())
}
