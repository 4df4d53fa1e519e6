//! Quantity checks performed by views before calling the store.
//!
//! The store clamps `update_quantity` at the stock limit but never decides
//! that a line should go away. Views run [`check_quantity`] first: zero means
//! the customer wants the line removed, and anything above the stock limit is
//! refused with a warning instead of being silently clamped.

use crate::item::LineItem;

/// Outcome of checking a requested quantity against a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityCheck {
    /// Pass the quantity to `update_quantity`.
    Apply(u32),
    /// The customer asked for zero; remove the line instead.
    Remove,
    /// Request exceeds stock; warn and leave the cart unchanged.
    ExceedsStock { available: u32 },
}

impl QuantityCheck {
    /// Message to show the customer, if the change was refused.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::ExceedsStock { available } => Some(format!(
                "Cannot exceed the available stock of {available}."
            )),
            Self::Apply(_) | Self::Remove => None,
        }
    }
}

/// Check `requested` against `item`'s stock limit.
#[must_use]
pub const fn check_quantity(item: &LineItem, requested: u32) -> QuantityCheck {
    if requested == 0 {
        QuantityCheck::Remove
    } else if requested > item.stock_limit {
        QuantityCheck::ExceedsStock {
            available: item.stock_limit,
        }
    } else {
        QuantityCheck::Apply(requested)
    }
}
