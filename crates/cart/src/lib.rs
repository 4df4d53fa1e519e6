//! Tey Cart - Shopping cart store for the Tey storefront.
//!
//! The cart is an in-memory collection of line items kept in sync with a
//! durable key-value store. Views never mutate line items directly: they hold
//! a [`CartStore`], call its operations, and read [`CartSnapshot`]s.
//!
//! # Persistence
//!
//! Every mutation re-serializes the whole cart as a JSON array under a single
//! key (`cartItems` by default). On startup the store rehydrates from that
//! record, dropping malformed entries and falling back to an empty cart when
//! the record cannot be parsed. Write failures are logged and never
//! propagated; the in-memory cart stays authoritative for the session.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use tey_cart::{CartStore, CatalogProduct, MemoryStore};
//! use tey_core::ProductId;
//!
//! let storage = MemoryStore::new();
//! let mut cart = CartStore::open(storage.clone());
//!
//! let shirt = CatalogProduct::new(ProductId::new(7), "Shirt", Decimal::new(50_000, 0), 3);
//! cart.add(&shirt, 1).unwrap();
//! cart.update_quantity(ProductId::new(7), 2).unwrap();
//!
//! let snapshot = cart.snapshot();
//! assert_eq!(snapshot.item_count, 2);
//! assert!(storage.contains("cartItems"));
//! ```
//!
//! # Modules
//!
//! - [`item`] - Catalog products and cart line items
//! - [`state`] - Cart state, the pure reducer, and snapshots
//! - [`store`] - The stateful cart store with change notifications
//! - [`persistence`] - Key-value persistence port and adapters
//! - [`quantity`] - Quantity checks performed before calling the store
//! - [`checkout`] - Checkout drafts and transaction requests

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod error;
pub mod item;
pub mod persistence;
pub mod quantity;
pub mod state;
pub mod store;

pub use checkout::{CheckoutDraft, CheckoutLine, TransactionProduct, TransactionRequest};
pub use error::{CartError, CheckoutError, EntryError, PersistenceError};
pub use item::{CatalogProduct, LineItem, ProductDetails};
pub use persistence::{FileStore, KeyValueStore, MemoryStore};
pub use quantity::{QuantityCheck, check_quantity};
pub use state::{CartAction, CartSnapshot, CartState, StockPolicy};
pub use store::{CartOptions, CartStore, SubscriptionId};
