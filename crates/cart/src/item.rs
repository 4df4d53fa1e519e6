//! Catalog products and cart line items.
//!
//! A [`LineItem`] is a [`CatalogProduct`] plus the quantity the customer wants
//! to buy. Line items are persisted as camelCase JSON objects; rehydration
//! also accepts the field names written by the earlier storefront (`ID`,
//! `price`, `stock_qty`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tey_core::ProductId;

use crate::error::EntryError;

/// Field names a persisted entry may carry its product ID under.
const PRODUCT_ID_FIELDS: &[&str] = &["productId", "ID", "id"];

/// Optional display fields supplied by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
}

/// A product as read from the catalog at the time it is added to the cart.
///
/// The store trusts `unit_price` and `stock_limit`; it never re-validates them
/// against a live source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Decimal,
    /// Maximum purchasable quantity.
    pub stock_limit: u32,
    pub details: ProductDetails,
}

impl CatalogProduct {
    /// Create a catalog product without display details.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        title: impl Into<String>,
        unit_price: Decimal,
        stock_limit: u32,
    ) -> Self {
        Self {
            product_id,
            title: title.into(),
            unit_price,
            stock_limit,
            details: ProductDetails::default(),
        }
    }

    /// Attach display details.
    #[must_use]
    pub fn with_details(mut self, details: ProductDetails) -> Self {
        self.details = details;
        self
    }
}

/// One product selected for purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(alias = "ID", alias = "id")]
    pub product_id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(alias = "stock_qty")]
    pub stock_limit: u32,
    pub quantity: u32,
    #[serde(flatten)]
    pub details: ProductDetails,
    /// Unrecognized display fields, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineItem {
    /// Create a line item for `product` with the given quantity.
    #[must_use]
    pub fn new(product: &CatalogProduct, quantity: u32) -> Self {
        Self {
            product_id: product.product_id,
            title: product.title.clone(),
            unit_price: product.unit_price,
            stock_limit: product.stock_limit,
            quantity,
            details: product.details.clone(),
            extra: Map::new(),
        }
    }

    /// `unit_price × quantity`, saturating at the bounds of [`Decimal`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    /// Whether the "+" control should be enabled.
    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity < self.stock_limit
    }

    /// Whether the "−" control should be enabled.
    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.quantity > 1
    }

    /// Parse one entry of a persisted cart record.
    ///
    /// # Errors
    ///
    /// Returns an [`EntryError`] when the entry is not an object, lacks a
    /// product ID, carries an unassigned ID or zero quantity, or has fields
    /// of the wrong type.
    pub fn from_persisted(entry: Value) -> Result<Self, EntryError> {
        let Value::Object(fields) = &entry else {
            return Err(EntryError::NotAnObject);
        };

        let has_id = PRODUCT_ID_FIELDS
            .iter()
            .any(|name| fields.get(*name).is_some_and(|v| !v.is_null()));
        if !has_id {
            return Err(EntryError::MissingProductId);
        }

        let item: Self = serde_json::from_value(entry)?;
        if !item.product_id.is_assigned() {
            return Err(EntryError::UnassignedProductId(item.product_id));
        }
        if item.quantity == 0 {
            return Err(EntryError::ZeroQuantity(item.product_id));
        }

        Ok(item)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn shirt() -> CatalogProduct {
        CatalogProduct::new(ProductId::new(7), "Shirt", Decimal::new(50_000, 0), 3)
    }

    #[test]
    fn test_serializes_camel_case_with_numeric_price() {
        let item = LineItem::new(&shirt(), 2);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({
                "productId": 7,
                "title": "Shirt",
                "unitPrice": 50000.0,
                "stockLimit": 3,
                "quantity": 2
            })
        );
    }

    #[test]
    fn test_details_are_flattened() {
        let product = shirt().with_details(ProductDetails {
            category: Some("Apparel".to_owned()),
            seller: Some("toko-kita".to_owned()),
            ..ProductDetails::default()
        });
        let value = serde_json::to_value(LineItem::new(&product, 1)).unwrap();
        assert_eq!(value["category"], "Apparel");
        assert_eq!(value["seller"], "toko-kita");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_from_persisted_accepts_legacy_field_names() {
        let entry = json!({
            "ID": 12,
            "title": "Batik Scarf",
            "price": 125_000,
            "stock_qty": 4,
            "quantity": 1,
            "image": "scarf.png"
        });
        let item = LineItem::from_persisted(entry).unwrap();
        assert_eq!(item.product_id, ProductId::new(12));
        assert_eq!(item.unit_price, Decimal::new(125_000, 0));
        assert_eq!(item.stock_limit, 4);
        assert_eq!(item.details.image.as_deref(), Some("scarf.png"));
    }

    #[test]
    fn test_from_persisted_keeps_unknown_fields() {
        let entry = json!({
            "productId": 3,
            "unitPrice": 10.5,
            "stockLimit": 9,
            "quantity": 2,
            "badge": "new"
        });
        let item = LineItem::from_persisted(entry).unwrap();
        assert_eq!(item.extra.get("badge"), Some(&json!("new")));

        let written = serde_json::to_value(&item).unwrap();
        assert_eq!(written["badge"], "new");
        assert_eq!(written["title"], "");
    }

    #[test]
    fn test_from_persisted_rejects_missing_id() {
        let entry = json!({"title": "Ghost", "unitPrice": 1, "stockLimit": 1, "quantity": 1});
        assert!(matches!(
            LineItem::from_persisted(entry),
            Err(EntryError::MissingProductId)
        ));

        let null_id = json!({"productId": null, "unitPrice": 1, "stockLimit": 1, "quantity": 1});
        assert!(matches!(
            LineItem::from_persisted(null_id),
            Err(EntryError::MissingProductId)
        ));
    }

    #[test]
    fn test_from_persisted_rejects_unassigned_id_and_zero_quantity() {
        let zero_id = json!({"productId": 0, "unitPrice": 1, "stockLimit": 1, "quantity": 1});
        assert!(matches!(
            LineItem::from_persisted(zero_id),
            Err(EntryError::UnassignedProductId(_))
        ));

        let zero_qty = json!({"productId": 4, "unitPrice": 1, "stockLimit": 1, "quantity": 0});
        assert!(matches!(
            LineItem::from_persisted(zero_qty),
            Err(EntryError::ZeroQuantity(id)) if id == ProductId::new(4)
        ));
    }

    #[test]
    fn test_from_persisted_rejects_wrong_types() {
        assert!(matches!(
            LineItem::from_persisted(json!("not an object")),
            Err(EntryError::NotAnObject)
        ));

        let bad_price = json!({"productId": 4, "unitPrice": "cheap", "stockLimit": 1, "quantity": 1});
        assert!(matches!(
            LineItem::from_persisted(bad_price),
            Err(EntryError::Malformed(_))
        ));
    }

    #[test]
    fn test_line_total_and_controls() {
        let mut item = LineItem::new(&shirt(), 1);
        assert_eq!(item.line_total(), Decimal::new(50_000, 0));
        assert!(item.can_increment());
        assert!(!item.can_decrement());

        item.quantity = 3;
        assert_eq!(item.line_total(), Decimal::new(150_000, 0));
        assert!(!item.can_increment());
        assert!(item.can_decrement());
    }
}
