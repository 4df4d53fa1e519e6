//! Cart state and its pure transitions.
//!
//! [`CartState::apply`] computes a new state from the old one; the store
//! replaces its state with the result and then persists it. Nothing here
//! performs I/O.

use std::str::FromStr;

use rust_decimal::Decimal;
use tey_core::ProductId;

use crate::item::LineItem;

/// How `add` treats the stock ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StockPolicy {
    /// `add` sums quantities without a ceiling; only `update_quantity`
    /// clamps to the stock limit.
    #[default]
    Lenient,
    /// Both `add` and `update_quantity` clamp to the stock limit.
    Clamp,
}

impl StockPolicy {
    /// Configuration name of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Clamp => "clamp",
        }
    }
}

impl FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "clamp" => Ok(Self::Clamp),
            other => Err(format!(
                "unknown stock policy {other:?} (expected lenient or clamp)"
            )),
        }
    }
}

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add `item.quantity` units, merging with an existing line. Nothing
    /// changes when the capped quantity would be zero.
    Add(LineItem),
    /// Drop the line for a product.
    Remove(ProductId),
    /// Set a line's quantity, capped at its stock limit. A line whose
    /// stock limit is zero keeps its quantity.
    UpdateQuantity {
        product_id: ProductId,
        quantity: u32,
    },
    /// Drop every line.
    Clear,
}

/// Line items in the order they were first added, unique by product ID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    items: Vec<LineItem>,
}

impl CartState {
    /// Create an empty cart state.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Compute the state that results from `action`.
    #[must_use]
    pub fn apply(&self, action: &CartAction, policy: StockPolicy) -> Self {
        match action {
            CartAction::Add(incoming) => self.with_added(incoming, policy),
            CartAction::Remove(product_id) => Self {
                items: self
                    .items
                    .iter()
                    .filter(|item| item.product_id != *product_id)
                    .cloned()
                    .collect(),
            },
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => Self {
                items: self
                    .items
                    .iter()
                    .map(|item| {
                        let capped = (*quantity).min(item.stock_limit);
                        if item.product_id == *product_id && capped > 0 {
                            LineItem {
                                quantity: capped,
                                ..item.clone()
                            }
                        } else {
                            item.clone()
                        }
                    })
                    .collect(),
            },
            CartAction::Clear => Self::new(),
        }
    }

    fn with_added(&self, incoming: &LineItem, policy: StockPolicy) -> Self {
        let cap = |quantity: u32, stock_limit: u32| match policy {
            StockPolicy::Lenient => quantity,
            StockPolicy::Clamp => quantity.min(stock_limit),
        };

        let mut items = self.items.clone();
        if let Some(existing) = items
            .iter_mut()
            .find(|item| item.product_id == incoming.product_id)
        {
            let summed = cap(
                existing.quantity.saturating_add(incoming.quantity),
                existing.stock_limit,
            );
            if summed > 0 {
                existing.quantity = summed;
            }
        } else {
            let quantity = cap(incoming.quantity, incoming.stock_limit);
            if quantity > 0 {
                items.push(LineItem {
                    quantity,
                    ..incoming.clone()
                });
            }
        }
        Self { items }
    }

    /// Read-only view for display.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from(self)
    }
}

/// Read-only view of the cart handed to views and listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    /// Sum of quantities, shown on the cart badge.
    pub item_count: u32,
    /// Sum of line totals, saturating at the bounds of [`Decimal`].
    pub subtotal: Decimal,
}

impl CartSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn distinct_items(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }
}

impl From<&CartState> for CartSnapshot {
    fn from(state: &CartState) -> Self {
        Self {
            items: state.items.clone(),
            item_count: state
                .items
                .iter()
                .fold(0_u32, |count, item| count.saturating_add(item.quantity)),
            subtotal: state
                .items
                .iter()
                .map(LineItem::line_total)
                .fold(Decimal::ZERO, Decimal::saturating_add),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::item::CatalogProduct;

    fn item(id: i32, stock_limit: u32, quantity: u32) -> LineItem {
        let product = CatalogProduct::new(
            ProductId::new(id),
            format!("Product {id}"),
            Decimal::new(1000, 0),
            stock_limit,
        );
        LineItem::new(&product, quantity)
    }

    #[test]
    fn test_add_sums_quantities_for_same_product() {
        let state = CartState::new()
            .apply(&CartAction::Add(item(1, 5, 1)), StockPolicy::Lenient)
            .apply(&CartAction::Add(item(1, 5, 2)), StockPolicy::Lenient);
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.get(ProductId::new(1)).unwrap().quantity, 3);
    }

    #[test]
    fn test_lenient_add_ignores_stock_limit() {
        let state = CartState::new()
            .apply(&CartAction::Add(item(1, 2, 2)), StockPolicy::Lenient)
            .apply(&CartAction::Add(item(1, 2, 2)), StockPolicy::Lenient);
        assert_eq!(state.get(ProductId::new(1)).unwrap().quantity, 4);
    }

    #[test]
    fn test_clamp_add_caps_at_stock_limit() {
        let state = CartState::new()
            .apply(&CartAction::Add(item(1, 2, 5)), StockPolicy::Clamp);
        assert_eq!(state.get(ProductId::new(1)).unwrap().quantity, 2);

        let state = state.apply(&CartAction::Add(item(1, 2, 1)), StockPolicy::Clamp);
        assert_eq!(state.get(ProductId::new(1)).unwrap().quantity, 2);
    }

    #[test]
    fn test_update_quantity_clamps_to_stock_limit() {
        let state = CartState::new()
            .apply(&CartAction::Add(item(1, 5, 1)), StockPolicy::Lenient)
            .apply(
                &CartAction::UpdateQuantity {
                    product_id: ProductId::new(1),
                    quantity: 8,
                },
                StockPolicy::Lenient,
            );
        assert_eq!(state.get(ProductId::new(1)).unwrap().quantity, 5);
    }

    #[test]
    fn test_update_quantity_on_missing_product_is_noop() {
        let state = CartState::new().apply(&CartAction::Add(item(1, 5, 1)), StockPolicy::Lenient);
        let updated = state.apply(
            &CartAction::UpdateQuantity {
                product_id: ProductId::new(9),
                quantity: 2,
            },
            StockPolicy::Lenient,
        );
        assert_eq!(updated, state);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let state = CartState::new()
            .apply(&CartAction::Add(item(1, 5, 1)), StockPolicy::Lenient)
            .apply(&CartAction::Add(item(2, 5, 1)), StockPolicy::Lenient);
        let once = state.apply(&CartAction::Remove(ProductId::new(1)), StockPolicy::Lenient);
        let twice = once.apply(&CartAction::Remove(ProductId::new(1)), StockPolicy::Lenient);
        assert_eq!(once, twice);
        assert_eq!(once.items().len(), 1);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let state = [3, 1, 2]
            .into_iter()
            .fold(CartState::new(), |state, id| {
                state.apply(&CartAction::Add(item(id, 5, 1)), StockPolicy::Lenient)
            })
            .apply(&CartAction::Add(item(3, 5, 1)), StockPolicy::Lenient);
        let ids: Vec<i32> = state.items().iter().map(|i| i.product_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_snapshot_totals() {
        let state = CartState::new()
            .apply(&CartAction::Add(item(1, 5, 2)), StockPolicy::Lenient)
            .apply(&CartAction::Add(item(2, 5, 3)), StockPolicy::Lenient);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.item_count, 5);
        assert_eq!(snapshot.distinct_items(), 2);
        assert_eq!(snapshot.subtotal, Decimal::new(5000, 0));
    }

    #[test]
    fn test_clear_empties_state() {
        let state = CartState::new()
            .apply(&CartAction::Add(item(1, 5, 2)), StockPolicy::Lenient)
            .apply(&CartAction::Clear, StockPolicy::Lenient);
        let snapshot = state.snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.item_count, 0);
        assert_eq!(snapshot.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_sold_out_product_never_holds_zero_quantity() {
        let sold_out = item(1, 0, 1);

        let clamped =
            CartState::new().apply(&CartAction::Add(sold_out.clone()), StockPolicy::Clamp);
        assert!(clamped.is_empty());

        let lenient = CartState::new().apply(&CartAction::Add(sold_out), StockPolicy::Lenient);
        assert_eq!(lenient.get(ProductId::new(1)).unwrap().quantity, 1);

        let updated = lenient.apply(
            &CartAction::UpdateQuantity {
                product_id: ProductId::new(1),
                quantity: 1,
            },
            StockPolicy::Lenient,
        );
        assert_eq!(updated, lenient);
    }

    #[test]
    fn test_subtotal_saturates_instead_of_overflowing() {
        let mut huge = item(1, 20, 10);
        huge.unit_price = Decimal::from_f64_retain(1e28).unwrap();
        let state = CartState::new()
            .apply(&CartAction::Add(huge), StockPolicy::Lenient)
            .apply(&CartAction::Add(item(2, 5, 1)), StockPolicy::Lenient);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.subtotal, Decimal::MAX);
        assert_eq!(snapshot.item_count, 11);
    }

    #[test]
    fn test_stock_policy_from_str() {
        assert_eq!("Clamp".parse::<StockPolicy>().unwrap(), StockPolicy::Clamp);
        assert_eq!(" lenient ".parse::<StockPolicy>().unwrap(), StockPolicy::Lenient);
        assert!("strict".parse::<StockPolicy>().is_err());
    }
}
