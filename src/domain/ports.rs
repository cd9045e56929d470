use crate::domain::model::{ErrorReport, Package};
use crate::domain::units::UnitOfMeasure;
use crate::utils::error::Result;
use async_trait::async_trait;
use url::Url;

/// Source of packages for one quote. Packages are handed out once.
pub trait Packager: Send {
    fn has_packages(&self) -> bool;
    fn take_package(&mut self) -> Option<Package>;
}

/// Fetches a carrier response body.
#[async_trait]
pub trait RateTransport: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

pub trait UnitConverter: Send + Sync {
    /// Converts `value`, expressed in the store's base unit of the same
    /// kind as `target`, into `target`.
    fn convert(&self, value: f64, target: UnitOfMeasure) -> f64;
}

pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: ErrorReport);
}
