//! Integration tests for the Tey storefront cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tey-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_sessions` - Cart persisted to disk and reopened across sessions
//! - `cart_properties` - Property tests over sequences of cart operations
//! - `checkout_flow` - Staging and completing a checkout from the cart
//!
//! This library holds the catalog fixtures shared by those tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;
use tey_cart::{CatalogProduct, ProductDetails};
use tey_core::ProductId;

/// Shirt, 50.000 IDR, 3 in stock.
#[must_use]
pub fn shirt() -> CatalogProduct {
    CatalogProduct::new(ProductId::new(7), "Shirt", Decimal::new(50_000, 0), 3).with_details(
        ProductDetails {
            description: Some("Cotton shirt".to_owned()),
            category: Some("Apparel".to_owned()),
            image: Some("https://cdn.example/shirt.png".to_owned()),
            seller: Some("toko-kita".to_owned()),
        },
    )
}

/// Cap, 35.000 IDR, 10 in stock.
#[must_use]
pub fn cap() -> CatalogProduct {
    CatalogProduct::new(ProductId::new(9), "Cap", Decimal::new(35_000, 0), 10)
}

/// Coffee beans, 120.500 IDR, 1 in stock.
#[must_use]
pub fn coffee() -> CatalogProduct {
    CatalogProduct::new(ProductId::new(21), "Coffee Beans", Decimal::new(1_205_000, 1), 1)
}

/// Generic product with the given ID and stock.
#[must_use]
pub fn product(id: i32, stock_limit: u32) -> CatalogProduct {
    CatalogProduct::new(
        ProductId::new(id),
        format!("Product {id}"),
        Decimal::new(i64::from(id) * 1_000, 0),
        stock_limit,
    )
}
