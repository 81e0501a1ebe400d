// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ShellyR` library.
//!
//! The façade itself has no failure modes of its own: dispatch either
//! matches a pending request or silently ignores the update. The only
//! fallible surface is the device source a communicator wraps, so the
//! error type mirrors that boundary.

use thiserror::Error;

/// The main error type for this library.
///
/// All variants originate in the [`DeviceSource`](crate::DeviceSource)
/// implementation a communicator wraps.
#[derive(Debug, Error)]
pub enum Error {
    /// The device address was rejected by the source.
    #[error("invalid device address: {0}")]
    InvalidAddress(String),

    /// The source's event loop failed to start.
    #[error("source failed to start: {0}")]
    StartFailed(String),

    /// The source rejected a device or handler registration.
    #[error("registration failed: {0}")]
    Registration(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
