//! Error types for the cart store.

use std::io;

use thiserror::Error;
use tey_core::ProductId;

/// Errors raised by a [`KeyValueStore`](crate::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem operation failed.
    #[error("I/O error on key {key}: {source}")]
    Io {
        /// Key being read or written.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Value could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key is empty or contains characters the backend cannot store.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend is unusable (e.g. a poisoned lock).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    pub(crate) fn io(key: &str, source: io::Error) -> Self {
        Self::Io {
            key: key.to_owned(),
            source,
        }
    }
}

/// Errors returned by cart operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// A quantity of zero was requested.
    ///
    /// Dropping below one is removal intent and must go through `remove`.
    #[error("Invalid quantity {quantity} for product {product_id}: must be at least 1")]
    InvalidQuantity {
        /// Product the request targeted.
        product_id: ProductId,
        /// Requested quantity.
        quantity: u32,
    },

    /// The product has no stock, so no quantity of it can be held.
    #[error("Product {product_id} is out of stock")]
    OutOfStock {
        /// Product the request targeted.
        product_id: ProductId,
    },
}

/// Reasons a persisted cart entry is dropped during rehydration.
#[derive(Debug, Error)]
pub enum EntryError {
    /// Entry is not a JSON object.
    #[error("entry is not an object")]
    NotAnObject,

    /// Entry has no product ID field.
    #[error("entry has no product ID")]
    MissingProductId,

    /// Product ID is zero or negative.
    #[error("entry has unassigned product ID {0}")]
    UnassignedProductId(ProductId),

    /// Quantity is zero.
    #[error("entry for product {0} has zero quantity")]
    ZeroQuantity(ProductId),

    /// Entry fields have the wrong shape.
    #[error("entry is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors returned while staging or completing a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No selected product is in the cart.
    #[error("Please select at least one item to check out")]
    NothingSelected,

    /// Transaction requires a payment method.
    #[error("Please select a payment method")]
    MissingPaymentMethod,

    /// Draft could not be written to storage.
    #[error("Failed to save checkout draft: {0}")]
    Persistence(#[from] PersistenceError),
}
