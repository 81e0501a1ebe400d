// SPDX-License-Identifier: MPL-2.0

//! Test program: show the single-request communicator keeping only
//! the most recent request.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example single_slot
//! ```

use shellyr_lib::{Communicator, DeviceUpdate, SimulatedSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = SimulatedSource::new();
    let communicator = Communicator::new(source.clone(), "192.168.1.40")?;

    communicator.turn_on_with("B4E842", || {
        println!("turn_on confirmed (this line never prints)");
    })?;

    // Registering again displaces the turn_on, callback included.
    communicator.relay_state("B4E842", |state| {
        println!("relay reports {}", if state { "on" } else { "off" });
    })?;

    let device = source.push(DeviceUpdate::relay("shelly1-B4E842", true));
    println!("commands the device saw: {:?}", device.commands());
    println!("still pending: {}", communicator.has_pending());
    Ok(())
}
