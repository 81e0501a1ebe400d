// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pending-request bookkeeping.
//!
//! Every communicator operation becomes a [`PendingRequest`]: a target
//! id suffix plus a one-shot action. Requests wait in a store until a
//! device report matches them, then run against the device exactly
//! once.
//!
//! Two stores implement the two dispatch disciplines:
//!
//! - [`RequestSlot`] - Single register, last registration wins
//! - [`RequestQueue`] - Ordered store, each request matched on its own

mod method;
mod pending;
mod queue;
mod slot;

pub(crate) use method::Method;
pub(crate) use pending::{PendingRequest, RequestAction};
pub(crate) use queue::RequestQueue;
pub(crate) use slot::RequestSlot;
