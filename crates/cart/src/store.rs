//! The stateful cart store.
//!
//! [`CartStore`] exclusively owns the cart state. Every mutation follows the
//! same steps: compute the next state with [`CartState::apply`], replace the
//! current state, persist the full cart under one key, then notify
//! subscribers. Persistence failures are logged and remembered, never
//! returned; the in-memory cart remains the source of truth for the session.

use chrono::Utc;
use serde_json::Value;
use tey_core::ProductId;
use tracing::instrument;

use crate::checkout::CheckoutDraft;
use crate::error::{CartError, CheckoutError, PersistenceError};
use crate::item::{CatalogProduct, LineItem};
use crate::persistence::{CART_KEY, CHECKOUT_KEY, KeyValueStore};
use crate::state::{CartAction, CartSnapshot, CartState, StockPolicy};

/// Store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartOptions {
    /// Key the cart is persisted under.
    pub cart_key: String,
    /// Key the staged checkout draft is persisted under.
    pub checkout_key: String,
    pub stock_policy: StockPolicy,
}

impl Default for CartOptions {
    fn default() -> Self {
        Self {
            cart_key: CART_KEY.to_owned(),
            checkout_key: CHECKOUT_KEY.to_owned(),
            stock_policy: StockPolicy::default(),
        }
    }
}

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&CartSnapshot) + Send>;

/// Cart state container synchronized to a [`KeyValueStore`].
pub struct CartStore<S: KeyValueStore> {
    state: CartState,
    storage: S,
    options: CartOptions,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    last_persist_error: Option<PersistenceError>,
}

impl<S: KeyValueStore> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("listeners", &self.listeners.len())
            .field("last_persist_error", &self.last_persist_error)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open a store with default options and rehydrate it from `storage`.
    #[must_use]
    pub fn open(storage: S) -> Self {
        Self::open_with(storage, CartOptions::default())
    }

    /// Open a store and rehydrate it from `storage`.
    ///
    /// Rehydration never fails: an unreadable or unparsable record yields an
    /// empty cart, and individual malformed entries are dropped.
    #[must_use]
    #[instrument(skip_all, fields(key = %options.cart_key))]
    pub fn open_with(storage: S, options: CartOptions) -> Self {
        let mut store = Self {
            state: CartState::new(),
            storage,
            options,
            listeners: Vec::new(),
            next_subscription: 0,
            last_persist_error: None,
        };
        store.rehydrate();
        store
    }

    fn rehydrate(&mut self) {
        let key = self.options.cart_key.as_str();
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "No persisted cart, starting empty");
                return;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read persisted cart, starting empty");
                return;
            }
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!(key, "Persisted cart is not an array, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Persisted cart is not valid JSON, starting empty");
                Vec::new()
            }
        };

        let total = entries.len();
        let mut dropped = 0_usize;
        for (index, entry) in entries.into_iter().enumerate() {
            match LineItem::from_persisted(entry) {
                Ok(item)
                    if self.options.stock_policy == StockPolicy::Clamp
                        && item.stock_limit == 0
                        && self.state.get(item.product_id).is_none() =>
                {
                    dropped += 1;
                    tracing::warn!(
                        key,
                        index,
                        product_id = %item.product_id,
                        "Dropping sold-out cart entry"
                    );
                }
                Ok(item) => {
                    self.state = self
                        .state
                        .apply(&CartAction::Add(item), self.options.stock_policy);
                }
                Err(reason) => {
                    dropped += 1;
                    tracing::warn!(key, index, %reason, "Dropping malformed cart entry");
                }
            }
        }

        tracing::info!(
            key,
            entries = total,
            dropped,
            items = self.state.items().len(),
            "Rehydrated cart"
        );

        // Write back the normalized record so dropped and merged entries do not
        // resurface in the next session.
        self.persist();
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line's quantity is increased by `quantity`; otherwise a new
    /// line is inserted. Under [`StockPolicy::Lenient`] the result may exceed
    /// the stock limit; views are expected to check before calling.
    ///
    /// Returns the line's resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero, or
    /// [`CartError::OutOfStock`] under [`StockPolicy::Clamp`] when the
    /// product's stock limit is zero.
    #[instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub fn add(&mut self, product: &CatalogProduct, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity {
                product_id: product.product_id,
                quantity,
            });
        }
        if self.options.stock_policy == StockPolicy::Clamp && product.stock_limit == 0 {
            return Err(CartError::OutOfStock {
                product_id: product.product_id,
            });
        }

        self.dispatch(&CartAction::Add(LineItem::new(product, quantity)));
        Ok(self
            .state
            .get(product.product_id)
            .map_or(quantity, |item| item.quantity))
    }

    /// Remove the line for `product_id`.
    ///
    /// Removing a product that is not in the cart is a no-op. Returns the
    /// removed line, if there was one.
    #[instrument(skip(self))]
    pub fn remove(&mut self, product_id: ProductId) -> Option<LineItem> {
        let Some(removed) = self.state.get(product_id).cloned() else {
            tracing::debug!("Product not in cart, nothing to remove");
            return None;
        };
        self.dispatch(&CartAction::Remove(product_id));
        Some(removed)
    }

    /// Set the quantity of an existing line, capped at its stock limit.
    ///
    /// Returns the applied quantity, or `None` when the product is not in the
    /// cart (a no-op).
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero, or
    /// [`CartError::OutOfStock`] if the line's stock limit is zero; the cart
    /// is left unchanged either way. Use [`remove`](Self::remove) to drop a
    /// line.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Option<u32>, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity {
                product_id,
                quantity,
            });
        }
        match self.state.get(product_id) {
            None => {
                tracing::debug!("Product not in cart, ignoring quantity update");
                return Ok(None);
            }
            Some(item) if item.stock_limit == 0 => {
                return Err(CartError::OutOfStock { product_id });
            }
            Some(_) => {}
        }

        self.dispatch(&CartAction::UpdateQuantity {
            product_id,
            quantity,
        });
        Ok(self.state.get(product_id).map(|item| item.quantity))
    }

    /// Empty the cart and delete the persisted record.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.dispatch(&CartAction::Clear);
    }

    /// Current cart contents and totals.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.snapshot()
    }

    /// Look up a single line.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.state.get(product_id)
    }

    #[must_use]
    pub const fn options(&self) -> &CartOptions {
        &self.options
    }

    /// The injected storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Most recent persistence failure, cleared by the next successful write.
    ///
    /// Views use this to show that changes are not being saved.
    #[must_use]
    pub const fn last_persist_error(&self) -> Option<&PersistenceError> {
        self.last_persist_error.as_ref()
    }

    /// Register a listener called with a snapshot after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&CartSnapshot) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Build a checkout draft from the selected lines without saving it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NothingSelected`] when no selected product is
    /// in the cart.
    pub fn draft_checkout(&self, selected: &[ProductId]) -> Result<CheckoutDraft, CheckoutError> {
        CheckoutDraft::from_selection(self.state.items(), selected, Utc::now())
    }

    /// Persist `draft` as the staged checkout, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Persistence`] when the draft cannot be saved
    /// (the checkout view could not read it back).
    #[instrument(skip_all, fields(lines = draft.items.len()))]
    pub fn save_checkout(&self, draft: &CheckoutDraft) -> Result<(), CheckoutError> {
        let json = serde_json::to_string(draft).map_err(PersistenceError::from)?;
        self.storage.set(&self.options.checkout_key, &json)?;

        tracing::info!(total = %draft.total_amount, "Staged checkout");
        Ok(())
    }

    /// Stage the selected lines for checkout and persist the draft.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NothingSelected`] when no selected product is
    /// in the cart, or [`CheckoutError::Persistence`] when the draft cannot be
    /// saved.
    pub fn stage_checkout(&self, selected: &[ProductId]) -> Result<CheckoutDraft, CheckoutError> {
        let draft = self.draft_checkout(selected)?;
        self.save_checkout(&draft)?;
        Ok(draft)
    }

    /// The staged checkout draft, if one exists and can be read.
    #[must_use]
    pub fn pending_checkout(&self) -> Option<CheckoutDraft> {
        let key = self.options.checkout_key.as_str();
        match self.storage.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw)
                .inspect_err(|e| {
                    tracing::warn!(key, error = %e, "Ignoring unreadable checkout draft");
                })
                .ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read checkout draft");
                None
            }
        }
    }

    /// Finish a successful checkout.
    ///
    /// Removes the purchased lines from the cart and deletes the draft. When
    /// nothing is left the cart record is deleted as well. Returns the
    /// completed draft, or `None` if no draft was staged.
    #[instrument(skip(self))]
    pub fn complete_checkout(&mut self) -> Option<CheckoutDraft> {
        let draft = self.pending_checkout()?;

        let mut next = self.state.clone();
        for line in &draft.items {
            next = next.apply(
                &CartAction::Remove(line.product_id),
                self.options.stock_policy,
            );
        }
        self.replace(next);

        if let Err(e) = self.storage.remove(&self.options.checkout_key) {
            tracing::warn!(error = %e, "Failed to delete checkout draft");
        }

        tracing::info!(
            lines = draft.items.len(),
            remaining = self.state.items().len(),
            "Completed checkout"
        );
        Some(draft)
    }

    fn dispatch(&mut self, action: &CartAction) {
        let next = self.state.apply(action, self.options.stock_policy);
        self.replace(next);
    }

    fn replace(&mut self, next: CartState) {
        self.state = next;
        self.persist();
        self.notify();
    }

    fn persist(&mut self) {
        let key = self.options.cart_key.as_str();
        let result = if self.state.is_empty() {
            self.storage.remove(key)
        } else {
            serde_json::to_string(self.state.items())
                .map_err(PersistenceError::from)
                .and_then(|json| self.storage.set(key, &json))
        };

        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to persist cart, keeping in-memory state");
                self.last_persist_error = Some(e);
            }
        }
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.state.snapshot();
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }
}
