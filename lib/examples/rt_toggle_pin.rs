// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Example of toggling a pin from a real-time thread, stopping after ten seconds.

use gpiommio::am62::{BANK23, GPIO0_42};
use gpiommio::{rt, Mapping, MonotonicClock, OutputPin, StopToken, Toggler};
use std::result::Result;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    rt::lock_memory()?;

    let pin = OutputPin::new(Mapping::new()?, BANK23, GPIO0_42);
    let stop = StopToken::new();
    let mut toggler =
        Toggler::new(pin, MonotonicClock, Duration::from_millis(1))?.with_stop_token(stop.clone());

    let worker = rt::spawn(&rt::RtConfig::default(), move || toggler.run())?;

    thread::sleep(Duration::from_secs(10));
    stop.stop();
    worker.join()??;
    Ok(())
}
