// SPDX-License-Identifier: MPL-2.0

//! Test program: queue a relay command and a consumption read, then
//! wait for both to complete.
//!
//! The simulated source stands in for a discovery backend and reports
//! the devices with a small delay, like hardware answering on its own
//! schedule.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example roundtrip
//! ```

use std::time::Duration;

use shellyr_lib::{DeviceUpdate, QueuedCommunicator, SimulatedSource};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = SimulatedSource::new();
    let communicator = QueuedCommunicator::new(source.clone(), "192.168.1.40")?;
    let mut done = communicator.completion();

    communicator.turn_on_with("B4E842", || println!("relay confirmed on"))?;
    communicator.power_consumption("7C10", |watts| {
        println!("plug draws {watts} W");
    })?;
    println!("{} requests pending", communicator.pending_requests());

    // Play the backend: report the devices after a moment.
    tokio::spawn(async move {
        sleep(Duration::from_millis(200)).await;
        source.push(DeviceUpdate::relay("shelly1-B4E842", false));
        sleep(Duration::from_millis(200)).await;
        source.push(DeviceUpdate::power_meter("shellyplug-7C10", 48.5));
    });

    done.wait().await;
    println!("all requests completed");
    Ok(())
}
