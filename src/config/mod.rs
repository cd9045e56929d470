pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::packager::PackagingMode;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "inxpress-rates")]
#[command(about = "Live InXpress shipping rates for international orders")]
pub struct CliConfig {
    #[arg(long, short, default_value = "inxpress.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Quote an order read from a JSON file
    Quote {
        #[arg(long)]
        order: PathBuf,

        /// Overrides packaging.mode from the config file
        #[arg(long, value_enum)]
        packaging: Option<PackagingMode>,
    },
    /// Check the configured account id against the carrier
    Verify {
        #[arg(long)]
        postcode: Option<String>,

        #[arg(long)]
        country: Option<String>,
    },
}
