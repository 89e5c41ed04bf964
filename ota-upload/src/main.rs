// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware upload tool for HTTP OTA update endpoints.
//!
//! Usage:
//!   ota-upload upload firmware.bin --url http://192.168.1.123/update
//!   ota-upload upload littlefs.bin --target filesystem --env esp32dev
//!   ota-upload md5 firmware.bin

mod cli;
mod commands;
mod transport;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging(args.verbose);
    cli::run(args)
}
