// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ShellyR` Lib - A Rust library to drive Shelly relays and power meters.
//!
//! This library is a callback-driven façade over a pluggable discovery
//! backend: operations register pending requests, and a request
//! completes when the backend reports a device matching it. There is
//! no network code in here; anything implementing [`DeviceSource`]
//! (mDNS, CoIoT, MQTT, or the bundled [`SimulatedSource`]) plugs in.
//!
//! # Supported Features
//!
//! - **Relay control**: Turn relays on/off, with optional completion callbacks
//! - **State queries**: Read a relay's output state
//! - **Energy monitoring**: Read a power meter's consumption
//! - **Completion tracking**: Await the moment no request is pending
//!
//! # Addressing
//!
//! Devices are selected by id *suffix*: a request targeting `"B4E842"`
//! matches the device id `"shelly1-B4E842"`. Full ids work too; an
//! empty suffix matches nothing.
//!
//! # Quick Start
//!
//! ```
//! use shellyr_lib::{Communicator, DeviceUpdate, SimulatedSource};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> shellyr_lib::Result<()> {
//!     // Any DeviceSource fits here; the simulated one is scripted by
//!     // hand instead of discovering real hardware.
//!     let source = SimulatedSource::new();
//!     let communicator = Communicator::new(source.clone(), "192.168.1.40")?;
//!     let mut done = communicator.completion();
//!
//!     communicator.turn_on_with("B4E842", || println!("switched on"))?;
//!
//!     // A real backend would discover and report the device itself.
//!     source.push(DeviceUpdate::relay("shelly1-B4E842", false));
//!
//!     done.wait().await;
//!     Ok(())
//! }
//! ```
//!
//! # Choosing a Communicator
//!
//! [`Communicator`] keeps a single pending request and silently
//! replaces it on every new operation; that suits one-shot tools that
//! fire a command and wait. [`QueuedCommunicator`] keeps any number of
//! requests pending and completes each on its own matching report:
//!
//! ```
//! use shellyr_lib::{DeviceUpdate, QueuedCommunicator, SimulatedSource};
//!
//! # fn main() -> shellyr_lib::Result<()> {
//! let source = SimulatedSource::new();
//! let communicator = QueuedCommunicator::new(source.clone(), "192.168.1.40")?;
//!
//! communicator.turn_on("B4E842")?;
//! communicator.power_consumption("7C10", |watts| {
//!     println!("plug draws {watts} W");
//! })?;
//!
//! source.push(DeviceUpdate::relay("shelly1-B4E842", false));
//! source.push(DeviceUpdate::power_meter("shellyplug-7C10", 42.0));
//! assert_eq!(communicator.pending_requests(), 0);
//! # Ok(())
//! # }
//! ```

pub mod communicator;
pub mod error;
mod request;
pub mod source;
pub mod types;

pub use communicator::{Communicator, CompletionHandle, QueuedCommunicator};
pub use error::{Error, Result};
pub use source::{
    DeviceAddedHandler, DeviceKey, DeviceSource, DeviceUpdate, DeviceUpdatedHandler, RelayCommand,
    SimulatedDevice, SimulatedSource, SourceDevice,
};
pub use types::{DeviceType, DeviceTypeParseError, SensorKey, SensorValues};
