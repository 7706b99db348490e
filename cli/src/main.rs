// Copyright (c) 2026 Harbor Labs. MIT License.
// See LICENSE for details.

//! # HARBOR CLI
//!
//! Entry point for the `harbor` binary. Parses CLI arguments, initializes
//! logging, and dispatches to the scripted vault lifecycle demo.

mod cli;
mod demo;
mod logging;

use anyhow::Result;
use clap::Parser;

use cli::{Commands, HarborCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = HarborCli::parse();

    match cli.command {
        Commands::Demo(args) => {
            logging::init_logging(&args.log_level, LogFormat::from_str_lossy(&args.log_format));
            demo::run(&args)
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Prints build version information.
fn print_version() {
    println!("harbor {}", env!("CARGO_PKG_VERSION"));
    println!("core  {}", harbor_vault::config::VAULT_VERSION);
}
