// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

// Basic example of toggling the SODIMM_222 pin of a Verdin AM62.

use gpiommio::am62::{BANK23, GPIO0_42};
use gpiommio::{Mapping, MonotonicClock, OutputPin, Toggler, DEFAULT_HALF_PERIOD};
use std::result::Result;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pin = OutputPin::new(Mapping::new()?, BANK23, GPIO0_42);

    let mut toggler = Toggler::new(pin, MonotonicClock, DEFAULT_HALF_PERIOD)?
        .on_transition(|t| println!("{}", t.level));

    toggler.run()?;
    Ok(())
}
