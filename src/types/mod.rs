// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the crate.
//!
//! # Types
//!
//! - [`DeviceType`] - Category a source assigns to each device
//! - [`SensorKey`] / [`SensorValues`] - Sensor readings on device updates

mod device_type;
mod sensor;

pub use device_type::{DeviceType, DeviceTypeParseError};
pub use sensor::{SensorKey, SensorValues};
