use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One shippable parcel, measured in the store's base units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub width: f64,
    pub height: f64,
    pub length: f64,
    pub weight: f64,
}

impl Package {
    pub fn new(width: f64, height: f64, length: f64, weight: f64) -> Self {
        Self {
            width,
            height,
            length,
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDestination {
    #[serde(default)]
    pub postcode: String,
    pub country: String,
}

impl ShippingDestination {
    pub fn new(postcode: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            postcode: postcode.into(),
            country: country.into(),
        }
    }

    /// Postcode with every space character removed.
    pub fn normalized_postcode(&self) -> String {
        self.postcode.chars().filter(|c| *c != ' ').collect()
    }

    /// Country prefix used for the domestic check; only the first two
    /// characters identify the country.
    pub fn country_code(&self) -> String {
        self.country.chars().take(2).collect::<String>().to_ascii_uppercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub weight: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub free_shipping: bool,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub destination: ShippingDestination,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuoteResult {
    pub service_slug: String,
    pub display_name: String,
    pub amount: Decimal,
}

/// The host checkout's rate options, keyed by service slug.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ShippingOptions {
    options: BTreeMap<String, RateQuoteResult>,
}

impl ShippingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rate: RateQuoteResult) {
        self.options.insert(rate.service_slug.clone(), rate);
    }

    pub fn get(&self, slug: &str) -> Option<&RateQuoteResult> {
        self.options.get(slug)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateQuoteResult> {
        self.options.values()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportSeverity {
    /// Failure while pricing a checkout.
    Transaction,
    /// Failure in the integration's own setup, such as bad credentials.
    Addon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub code: String,
    pub severity: ReportSeverity,
}
