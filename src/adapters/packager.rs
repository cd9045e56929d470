use crate::domain::model::{Order, OrderItem, Package};
use crate::domain::ports::Packager;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PackagingMode {
    /// One package per unit ordered.
    #[default]
    Piece,
    /// Everything in a single package.
    Mass,
}

/// Packs order items for rating.
#[derive(Debug, Default)]
pub struct ItemPackager {
    mode: PackagingMode,
    pieces: VecDeque<Package>,
    combined: Option<Package>,
}

impl ItemPackager {
    pub fn new(mode: PackagingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn from_order(order: &Order, mode: PackagingMode) -> Self {
        let mut packager = Self::new(mode);
        for item in &order.items {
            packager.add_item(item);
        }
        packager
    }

    /// Ready-made packages, handed out in order.
    pub fn from_packages(packages: impl IntoIterator<Item = Package>) -> Self {
        Self {
            mode: PackagingMode::Piece,
            pieces: packages.into_iter().collect(),
            combined: None,
        }
    }

    pub fn add_item(&mut self, item: &OrderItem) {
        if item.free_shipping || item.quantity == 0 {
            tracing::debug!("Skipping '{}' for rating", item.name);
            return;
        }

        let unit = Package::new(item.width, item.height, item.length, item.weight);
        match self.mode {
            PackagingMode::Piece => {
                for _ in 0..item.quantity {
                    self.pieces.push_back(unit);
                }
            }
            PackagingMode::Mass => {
                let quantity = f64::from(item.quantity);
                let combined = self
                    .combined
                    .get_or_insert_with(|| Package::new(0.0, 0.0, 0.0, 0.0));
                combined.weight += unit.weight * quantity;
                combined.height += unit.height * quantity;
                combined.width = combined.width.max(unit.width);
                combined.length = combined.length.max(unit.length);
            }
        }
    }

    pub fn remaining(&self) -> usize {
        self.pieces.len() + usize::from(self.combined.is_some())
    }
}

impl Packager for ItemPackager {
    fn has_packages(&self) -> bool {
        self.remaining() > 0
    }

    fn take_package(&mut self) -> Option<Package> {
        self.pieces.pop_front().or_else(|| self.combined.take())
    }
}
