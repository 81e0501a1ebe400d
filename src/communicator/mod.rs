// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback-driven façades over a device source.
//!
//! A communicator turns imperative calls (`turn_on`, `relay_state`,
//! ...) into pending requests and completes them when the wrapped
//! [`DeviceSource`](crate::DeviceSource) reports a matching device.
//! Devices are selected by id suffix, so callers can address
//! `"shelly1-B4E842"` as just `"B4E842"`.
//!
//! Two dispatch disciplines:
//!
//! - [`Communicator`] - One pending request, last registration wins
//! - [`QueuedCommunicator`] - Any number pending, matched one by one
//!
//! Completion is observable through [`CompletionHandle`], which
//! resolves once no request is pending.

mod completion;
mod queued;
mod single;

pub use completion::CompletionHandle;
pub use queued::QueuedCommunicator;
pub use single::Communicator;
