//! # CLI Interface
//!
//! Defines the command-line argument structure for the `harbor` binary
//! using `clap` derive. Two subcommands: `demo` and `version`.

use clap::{Parser, Subcommand};

/// HARBOR pooled-capital vault.
///
/// Drives the vault core against in-memory collaborators: scripted
/// deposit / deploy / profit / withdraw lifecycles with full state
/// printed at every step.
#[derive(Parser, Debug)]
#[command(
    name = "harbor",
    about = "HARBOR pooled-capital vault simulator",
    version,
    propagate_version = true
)]
pub struct HarborCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the HARBOR binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scripted vault lifecycle demo.
    Demo(DemoArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `demo` subcommand.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Number of depositors to simulate.
    #[arg(long, env = "HARBOR_DEPOSITORS", default_value_t = 3)]
    pub depositors: u32,

    /// Base-asset amount each depositor contributes.
    #[arg(long, env = "HARBOR_DEPOSIT", default_value_t = 1000)]
    pub deposit: u64,

    /// Fraction of idle capital the operator deploys, in basis points.
    #[arg(long, env = "HARBOR_DEPLOY_BPS", default_value_t = 8000)]
    pub deploy_bps: u64,

    /// Profit the facility credits, as basis points of deployed capital.
    #[arg(long, env = "HARBOR_PROFIT_BPS", default_value_t = 1000)]
    pub profit_bps: u64,

    /// Default log level when RUST_LOG is not set.
    #[arg(long, env = "HARBOR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "HARBOR_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Print the final vault snapshot as JSON on stdout.
    #[arg(long, default_value_t = false)]
    pub json_snapshot: bool,
}
