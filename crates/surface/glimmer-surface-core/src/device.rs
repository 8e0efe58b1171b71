//! Device topology: devices, their light elements and where colours go.

use std::fmt;

use glimmer_api_core::{Rect, Rgba};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        DeviceId(id.into())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single light element, positioned in surface space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Led {
    pub id: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    pub leds: Vec<Led>,
}

fn enabled_default() -> bool {
    true
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: DeviceId::new(id),
            name: name.into(),
            enabled: true,
            leds: Vec::new(),
        }
    }

    pub fn with_led(mut self, id: impl Into<String>, rect: Rect) -> Self {
        self.leds.push(Led { id: id.into(), rect });
        self
    }

    /// Bounding box of the device's leds.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.leds.iter().map(|l| &l.rect))
    }
}

/// Bounding box of every enabled device; empty at the origin when there are none.
pub fn surface_bounds(devices: &[Device]) -> Rect {
    Rect::bounding(
        devices
            .iter()
            .filter(|d| d.enabled)
            .flat_map(|d| d.leds.iter().map(|l| &l.rect)),
    )
    .unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq)]
pub struct LedColor {
    pub device: DeviceId,
    pub led: String,
    pub color: Rgba,
}

/// Receives the sampled colours after every frame.
pub trait DeviceOutput: Send {
    fn update(&mut self, colors: &[LedColor]) -> anyhow::Result<()>;
}

/// Output that discards colours; the default until a host installs one.
#[derive(Debug, Default)]
pub struct NullOutput;

impl DeviceOutput for NullOutput {
    fn update(&mut self, _colors: &[LedColor]) -> anyhow::Result<()> {
        Ok(())
    }
}
