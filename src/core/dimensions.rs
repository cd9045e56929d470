//! Converts package measurements into the whole units the carrier accepts.
//!
//! Each dimension key has a [`SizeLimit`] giving the carrier's unit and the
//! smallest value it will quote. Values below the minimum are raised to it and
//! then rounded up. Weight is split into whole units plus a rounded-up
//! remainder in sub-units (pounds and ounces for an imperial limit).

use crate::domain::model::Package;
use crate::domain::ports::UnitConverter;
use crate::domain::units::UnitOfMeasure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const LENGTH: &str = "length";
pub const WEIGHT: &str = "weight";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeLimit {
    pub minimum: f64,
    pub unit: UnitOfMeasure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_units_per_unit: Option<u32>,
}

impl SizeLimit {
    pub fn new(minimum: f64, unit: UnitOfMeasure) -> Self {
        Self {
            minimum,
            unit,
            sub_units_per_unit: None,
        }
    }

    pub fn with_sub_units(mut self, sub_units_per_unit: u32) -> Self {
        self.sub_units_per_unit = Some(sub_units_per_unit);
        self
    }

    pub fn sub_units(&self) -> u32 {
        self.sub_units_per_unit
            .unwrap_or_else(|| self.unit.sub_units_per_unit())
    }

    fn clamp(&self, value: f64) -> f64 {
        if value < self.minimum {
            self.minimum
        } else {
            value
        }
    }
}

/// A measurement after carrier sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// No limit configured for the key; value is untouched.
    Raw(f64),
    Whole(u64),
    Split { whole: u64, sub_units: u64 },
}

impl Measurement {
    /// Whole carrier units; raw values are truncated toward zero.
    pub fn whole(self) -> u64 {
        match self {
            Self::Raw(value) => to_whole(value.trunc()),
            Self::Whole(whole) | Self::Split { whole, .. } => whole,
        }
    }

    pub fn sub_units(self) -> u64 {
        match self {
            Self::Split { sub_units, .. } => sub_units,
            _ => 0,
        }
    }
}

fn to_whole(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

type SizeFn = fn(f64, &SizeLimit) -> Measurement;

/// Keys with their own sizing rule; every other key uses [`clamp_ceil`].
const SIZE_TRANSFORMS: &[(&str, SizeFn)] = &[(WEIGHT, split_sub_units)];

fn transform_for(key: &str) -> SizeFn {
    SIZE_TRANSFORMS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, transform)| *transform)
        .unwrap_or(clamp_ceil)
}

pub fn clamp_ceil(value: f64, limit: &SizeLimit) -> Measurement {
    Measurement::Whole(to_whole(limit.clamp(value).ceil()))
}

pub fn split_sub_units(value: f64, limit: &SizeLimit) -> Measurement {
    let value = limit.clamp(value);
    let whole = value.trunc();
    let sub_units = ((value - whole) * f64::from(limit.sub_units())).ceil();
    Measurement::Split {
        whole: to_whole(whole),
        sub_units: to_whole(sub_units),
    }
}

/// Per-key carrier limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeLimits(BTreeMap<String, SizeLimit>);

impl Default for SizeLimits {
    fn default() -> Self {
        let mut limits = BTreeMap::new();
        for key in [WIDTH, HEIGHT, LENGTH] {
            limits.insert(key.to_string(), SizeLimit::new(1.0, UnitOfMeasure::Inch));
        }
        limits.insert(
            WEIGHT.to_string(),
            SizeLimit::new(1.0, UnitOfMeasure::Pound),
        );
        Self(limits)
    }
}

impl SizeLimits {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, limit: SizeLimit) {
        self.0.insert(key.into(), limit);
    }

    pub fn get(&self, key: &str) -> Option<&SizeLimit> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SizeLimit)> {
        self.0.iter()
    }

    /// Sizes a raw store-unit value for `key`.
    pub fn size(&self, converter: &dyn UnitConverter, value: f64, key: &str) -> Measurement {
        let Some(limit) = self.get(key) else {
            return Measurement::Raw(value);
        };
        let converted = converter.convert(value, limit.unit);
        transform_for(key)(converted, limit)
    }

    pub fn measure(&self, converter: &dyn UnitConverter, package: &Package) -> CarrierDimensions {
        let weight = self.size(converter, package.weight, WEIGHT);
        CarrierDimensions {
            width: self.size(converter, package.width, WIDTH).whole(),
            height: self.size(converter, package.height, HEIGHT).whole(),
            length: self.size(converter, package.length, LENGTH).whole(),
            weight: weight.whole(),
            weight_sub_units: weight.sub_units(),
        }
    }
}

/// Package dimensions in the carrier's whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierDimensions {
    pub width: u64,
    pub height: u64,
    pub length: u64,
    pub weight: u64,
    pub weight_sub_units: u64,
}

impl CarrierDimensions {
    pub fn uniform(size: u64) -> Self {
        Self {
            width: size,
            height: size,
            length: size,
            weight: size,
            weight_sub_units: 0,
        }
    }
}
