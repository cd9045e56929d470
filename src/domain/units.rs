use crate::domain::ports::UnitConverter;
use crate::utils::error::QuoteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Length,
    Mass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    #[serde(rename = "in")]
    Inch,
    #[serde(rename = "ft")]
    Foot,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "oz")]
    Ounce,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
}

impl UnitOfMeasure {
    pub fn kind(self) -> UnitKind {
        match self {
            Self::Inch | Self::Foot | Self::Centimeter | Self::Millimeter | Self::Meter => {
                UnitKind::Length
            }
            Self::Pound | Self::Ounce | Self::Kilogram | Self::Gram => UnitKind::Mass,
        }
    }

    /// Size of one unit in millimetres (length) or grams (mass).
    fn factor(self) -> f64 {
        match self {
            Self::Inch => 25.4,
            Self::Foot => 304.8,
            Self::Centimeter => 10.0,
            Self::Millimeter => 1.0,
            Self::Meter => 1000.0,
            Self::Pound => 453.592_37,
            Self::Ounce => 28.349_523_125,
            Self::Kilogram => 1000.0,
            Self::Gram => 1.0,
        }
    }

    /// Finer units per whole unit when a measurement is split, e.g. ounces per pound.
    pub fn sub_units_per_unit(self) -> u32 {
        match self {
            Self::Pound => 16,
            Self::Kilogram => 1000,
            _ => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Inch => "in",
            Self::Foot => "ft",
            Self::Centimeter => "cm",
            Self::Millimeter => "mm",
            Self::Meter => "m",
            Self::Pound => "lb",
            Self::Ounce => "oz",
            Self::Kilogram => "kg",
            Self::Gram => "g",
        }
    }

    /// Converted values are rounded to six decimal places so that exact
    /// metric equivalents (30.48 cm) land on whole units before ceiling.
    pub fn convert(self, value: f64, target: UnitOfMeasure) -> f64 {
        if self == target || self.kind() != target.kind() {
            return value;
        }
        round_conversion(value * self.factor() / target.factor())
    }
}

const CONVERSION_SCALE: f64 = 1e6;

fn round_conversion(value: f64) -> f64 {
    (value * CONVERSION_SCALE).round() / CONVERSION_SCALE
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for UnitOfMeasure {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Self::Inch),
            "ft" => Ok(Self::Foot),
            "cm" => Ok(Self::Centimeter),
            "mm" => Ok(Self::Millimeter),
            "m" => Ok(Self::Meter),
            "lb" | "lbs" => Ok(Self::Pound),
            "oz" => Ok(Self::Ounce),
            "kg" => Ok(Self::Kilogram),
            "g" => Ok(Self::Gram),
            _ => Err(QuoteError::UnknownUnit {
                unit: s.to_string(),
            }),
        }
    }
}

/// The store's base units; packages arrive measured in these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreUnits {
    pub weight_unit: UnitOfMeasure,
    pub dimension_unit: UnitOfMeasure,
}

impl Default for StoreUnits {
    fn default() -> Self {
        Self {
            weight_unit: UnitOfMeasure::Pound,
            dimension_unit: UnitOfMeasure::Inch,
        }
    }
}

impl UnitConverter for StoreUnits {
    fn convert(&self, value: f64, target: UnitOfMeasure) -> f64 {
        let source = match target.kind() {
            UnitKind::Mass => self.weight_unit,
            UnitKind::Length => self.dimension_unit,
        };
        source.convert(value, target)
    }
}
