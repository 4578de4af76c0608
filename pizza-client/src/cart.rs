//! Cart aggregation
//!
//! Quantities per catalog item plus the derived total and order lines.
//! All arithmetic is exact (`Decimal`); rounding happens only in
//! [`format_money`].

use std::collections::BTreeMap;

use rust_decimal::prelude::*;
use shared::{CatalogItem, OrderLineRequest};

use crate::error::ValidationError;

/// Display precision for money
const DECIMAL_PLACES: u32 = 2;

/// Requested quantity per catalog item id
///
/// Zero entries are kept (the item was touched) but count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    quantities: BTreeMap<i64, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `delta`, clamping at zero. No upper bound and no stock check.
    ///
    /// Returns the new quantity.
    pub fn update_quantity(&mut self, item_id: i64, delta: i32) -> u32 {
        let current = i64::from(self.quantity(item_id));
        let next = (current + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
        self.quantities.insert(item_id, next);
        next
    }

    pub fn quantity(&self, item_id: i64) -> u32 {
        self.quantities.get(&item_id).copied().unwrap_or(0)
    }

    /// Entries with a positive quantity, ascending by item id
    pub fn selected(&self) -> impl Iterator<Item = (i64, u32)> + '_ {
        self.quantities
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .map(|(id, qty)| (*id, *qty))
    }

    /// Number of distinct items with a positive quantity
    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    pub fn has_items(&self) -> bool {
        self.selected().next().is_some()
    }

    /// Σ price × quantity over the catalog; ids missing from the catalog add nothing
    pub fn total(&self, catalog: &[CatalogItem]) -> Decimal {
        catalog
            .iter()
            .map(|item| item.price * Decimal::from(self.quantity(item.id)))
            .sum()
    }

    /// Order lines for submission
    ///
    /// A blank address is reported before an empty cart.
    pub fn build_submission(
        &self,
        address: &str,
    ) -> Result<Vec<OrderLineRequest>, ValidationError> {
        if address.trim().is_empty() {
            return Err(ValidationError::EmptyAddress);
        }

        let items: Vec<OrderLineRequest> = self
            .selected()
            .map(|(product_id, quantity)| OrderLineRequest {
                product_id,
                quantity,
            })
            .collect();

        if items.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        Ok(items)
    }

    pub fn clear(&mut self) {
        self.quantities.clear();
    }
}

/// `$x.xx`, rounded half away from zero
pub fn format_money(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}
