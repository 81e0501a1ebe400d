// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device source abstraction.
//!
//! A *source* is the discovery/control backend a communicator sits on
//! top of: it knows how to find devices, read their state and drive
//! their relays. This crate never talks to a network itself; it only
//! consumes the callback surface defined here.
//!
//! # Overview
//!
//! - [`DeviceSource`] - The injectable backend contract
//! - [`SourceDevice`] - One device as exposed by a source
//! - [`DeviceKey`] - `(category, id)` identity used for deduplication
//! - [`DeviceUpdate`] - Plain-data snapshot of one state report
//! - [`SimulatedSource`] / [`SimulatedDevice`] - Scriptable in-memory
//!   implementation for tests and examples

mod device;
mod device_source;
mod simulated;
mod update;

pub use device::{DeviceKey, SourceDevice};
pub use device_source::{DeviceAddedHandler, DeviceSource, DeviceUpdatedHandler};
pub use simulated::{RelayCommand, SimulatedDevice, SimulatedSource};
pub use update::DeviceUpdate;
