// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A command line tool for toggling a GPIO line via the GPIO controller registers.

use clap::Parser;
use std::process::ExitCode;

mod common;
mod toggle;

fn main() -> ExitCode {
    match toggle::Opts::try_parse() {
        Ok(opts) => {
            init_logging(opts.emit.verbose);
            toggle::cmd(&opts)
        }
        Err(e) => {
            _ = e.print();
            if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("gpiommio", level)
        .filter_module("gpiotoggle", level)
        .parse_default_env()
        .init();
}
