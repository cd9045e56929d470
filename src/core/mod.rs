pub mod dimensions;
pub mod quoter;
pub mod request;
pub mod response;

pub use crate::domain::model::{Package, RateQuoteResult, ShippingDestination, ShippingOptions};
pub use crate::domain::ports::{ErrorReporter, Packager, RateTransport, UnitConverter};
pub use crate::utils::error::Result;
