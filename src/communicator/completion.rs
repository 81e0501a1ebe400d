// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Idle/busy tracking for pending requests.

use tokio::sync::watch;

/// Sender side of the idle flag, owned by a communicator.
///
/// The flag is `true` while no request is pending. Transitions are
/// edge-triggered so waiters only wake on actual changes.
#[derive(Debug)]
pub(crate) struct CompletionFlag {
    idle: watch::Sender<bool>,
}

impl CompletionFlag {
    pub(crate) fn new() -> Self {
        let (idle, _) = watch::channel(true);
        Self { idle }
    }

    pub(crate) fn mark_busy(&self) {
        self.idle.send_if_modified(|idle| {
            let changed = *idle;
            *idle = false;
            changed
        });
    }

    pub(crate) fn mark_idle(&self) {
        self.idle.send_if_modified(|idle| {
            let changed = !*idle;
            *idle = true;
            changed
        });
    }

    pub(crate) fn handle(&self) -> CompletionHandle {
        CompletionHandle {
            idle: self.idle.subscribe(),
        }
    }
}

/// Waitable view of a communicator's outstanding work.
///
/// Replaces process-exit-on-completion semantics: instead of the
/// communicator terminating anything, callers hold a handle and decide
/// themselves what to do once all requests have completed.
///
/// Handles are cheap to clone; each clone observes flag changes
/// independently.
///
/// # Examples
///
/// ```
/// use shellyr_lib::{Communicator, DeviceUpdate, SimulatedSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> shellyr_lib::Result<()> {
/// let source = SimulatedSource::new();
/// let communicator = Communicator::new(source.clone(), "192.168.1.40")?;
/// let mut completion = communicator.completion();
///
/// communicator.turn_on("B4E842")?;
/// assert!(!completion.is_idle());
///
/// source.push(DeviceUpdate::relay("shelly1-B4E842", false));
/// assert!(completion.wait().await);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CompletionHandle {
    idle: watch::Receiver<bool>,
}

impl CompletionHandle {
    /// Whether no request is currently pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self.idle.borrow()
    }

    /// Waits until no request is pending.
    ///
    /// Returns `true` once idle was observed, `false` if the
    /// communicator was dropped while requests were still pending.
    pub async fn wait(&mut self) -> bool {
        loop {
            if *self.idle.borrow_and_update() {
                return true;
            }
            if self.idle.changed().await.is_err() {
                return *self.idle.borrow();
            }
        }
    }
}
