// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device categories reported by a device source.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a device as announced by its source.
///
/// The category decides which requests a device can answer: relay
/// commands only ever match [`DeviceType::Relay`], consumption reads
/// only match [`DeviceType::PowerMeter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceType {
    /// Switchable relay output.
    Relay,
    /// Power metering channel.
    PowerMeter,
    /// Dimmable or color-capable light.
    Light,
    /// Roller shutter / cover motor.
    Roller,
    /// Standalone sensor (temperature, humidity, ...).
    Sensor,
}

/// Error returned when parsing an unrecognized device type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown device type: {0}")]
pub struct DeviceTypeParseError(String);

impl DeviceType {
    /// Uppercase form used by sources when announcing devices.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Relay => "RELAY",
            Self::PowerMeter => "POWERMETER",
            Self::Light => "LIGHT",
            Self::Roller => "ROLLER",
            Self::Sensor => "SENSOR",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = DeviceTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RELAY" => Ok(Self::Relay),
            "POWERMETER" => Ok(Self::PowerMeter),
            "LIGHT" => Ok(Self::Light),
            "ROLLER" => Ok(Self::Roller),
            "SENSOR" => Ok(Self::Sensor),
            other => Err(DeviceTypeParseError(other.to_string())),
        }
    }
}
