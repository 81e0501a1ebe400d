// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor readings attached to device updates.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known sensor reading kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKey {
    /// Instantaneous power draw in watts.
    Consumption,
    /// Accumulated energy in watt-hours.
    TotalConsumption,
    /// Supply voltage in volts.
    Voltage,
    /// Current in amperes.
    Current,
    /// Internal device temperature in degrees Celsius.
    DeviceTemperature,
    /// Wi-Fi signal strength in dBm.
    Rssi,
}

impl SensorKey {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Consumption => "consumption",
            Self::TotalConsumption => "total_consumption",
            Self::Voltage => "voltage",
            Self::Current => "current",
            Self::DeviceTemperature => "device_temperature",
            Self::Rssi => "rssi",
        }
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Latest sensor readings of a device, keyed by [`SensorKey`].
///
/// A missing key means the device has not reported that reading yet,
/// not that the reading is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorValues(HashMap<SensorKey, f64>);

impl SensorValues {
    /// Creates an empty reading set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, useful when composing updates.
    #[must_use]
    pub fn with(mut self, key: SensorKey, value: f64) -> Self {
        self.0.insert(key, value);
        self
    }

    /// Stores a reading, replacing any previous value for the key.
    pub fn insert(&mut self, key: SensorKey, value: f64) {
        self.0.insert(key, value);
    }

    /// Looks up a reading by key.
    #[must_use]
    pub fn get(&self, key: SensorKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    /// Instantaneous power draw, if the device has reported one.
    #[must_use]
    pub fn consumption(&self) -> Option<f64> {
        self.get(SensorKey::Consumption)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all readings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (SensorKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(SensorKey, f64)> for SensorValues {
    fn from_iter<I: IntoIterator<Item = (SensorKey, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
