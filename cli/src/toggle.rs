// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::common::{self, EmitOpts};
use anyhow::{Context, Result};
use clap::Parser;
use gpiommio::am62::{BANK23, GPIO0_42};
use gpiommio::rt::{self, RtConfig};
use gpiommio::sim::SimulatedBank;
use gpiommio::{Mapping, MonotonicClock, OutputPin, RegisterBlock, StopToken, Toggler};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "gpiotoggle",
    version,
    about = "Toggle GPIO0_42 (SODIMM_222) of a Verdin AM62 via the GPIO controller registers."
)]
pub struct Opts {
    /// The time the line is held at each level.
    ///
    /// The period is taken as milliseconds unless otherwise specified.
    #[arg(
        short = 'p',
        long,
        name = "period",
        default_value = "500ms",
        env = "GPIOTOGGLE_PERIOD",
        value_parser = common::parse_period
    )]
    pub period: Duration,

    /// Exit after the line has been toggled through this many full cycles.
    ///
    /// If not specified then toggle until interrupted.
    #[arg(short = 'n', long, name = "cycles")]
    pub cycles: Option<u64>,

    /// Toggle from a real-time thread with the process memory locked.
    #[arg(long)]
    pub rt: bool,

    /// The SCHED_FIFO priority of the real-time thread.
    #[arg(
        long,
        name = "priority",
        default_value_t = rt::DEFAULT_PRIORITY,
        value_parser = clap::value_parser!(i32).range(1..=99),
        requires = "rt"
    )]
    pub priority: i32,

    /// Toggle a simulated register block rather than the hardware.
    #[arg(long)]
    pub simulate: bool,

    #[command(flatten)]
    pub emit: EmitOpts,
}

pub fn cmd(opts: &Opts) -> ExitCode {
    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            common::emit_error(&opts.emit, &e);
            ExitCode::from(common::exit_status(&e))
        }
    }
}

fn run(opts: &Opts) -> Result<()> {
    let stop = StopToken::new();
    let trip = stop.clone();
    ctrlc::set_handler(move || trip.stop()).context("unable to install signal handler")?;

    if opts.rt {
        rt::lock_memory()?;
    }
    if opts.simulate {
        let regs = Arc::new(SimulatedBank::new());
        toggle(opts, regs.clone(), stop)?;
        log::debug!("simulated {} register writes", regs.changes());
        return Ok(());
    }
    let regs = Mapping::new().context("unable to access the GPIO controller")?;
    toggle(opts, regs, stop)
}

fn toggle<R>(opts: &Opts, regs: R, stop: StopToken) -> Result<()>
where
    R: RegisterBlock + Send + 'static,
{
    let pin = OutputPin::new(regs, BANK23, GPIO0_42);
    let mut toggler = Toggler::new(pin, MonotonicClock, opts.period)?.with_stop_token(stop);
    let cycles = opts.cycles;

    if opts.rt {
        let config = RtConfig::default().with_priority(opts.priority);
        let worker = rt::spawn(&config, move || match cycles {
            Some(n) => toggler.run_cycles(n),
            None => toggler.run(),
        })?;
        return Ok(worker.join()??);
    }

    if !opts.emit.quiet {
        let timefmt = opts.emit.timefmt();
        let clock = common::WallClock::now()?;
        toggler = toggler.on_transition(move |t| {
            println!("{} {}", common::format_time(&t.at, &timefmt, &clock), t.level)
        });
    }
    match cycles {
        Some(n) => toggler.run_cycles(n)?,
        None => toggler.run()?,
    }
    Ok(())
}
