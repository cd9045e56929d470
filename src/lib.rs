pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};

pub use crate::adapters::{
    http::HttpTransport,
    packager::{ItemPackager, PackagingMode},
    reporter::{MemoryReporter, TracingReporter},
};
pub use crate::config::toml_config::TomlConfig;
pub use crate::core::quoter::{RateQuoter, SERVICE_SLUG};
pub use crate::domain::model::{
    Order, Package, RateQuoteResult, ShippingDestination, ShippingOptions,
};
pub use crate::utils::error::{QuoteError, Result};
