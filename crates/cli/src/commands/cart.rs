//! Cart commands.
//!
//! Each command opens the cart from the configured directory, performs one
//! operation and exits. Quantity changes go through the same checks the cart
//! view performs: zero removes the line, and anything above stock is refused.
//!
//! # Usage
//!
//! ```bash
//! tey-cli cart add --id 7 --title Shirt --price 50000 --stock 3 --quantity 1
//! tey-cli cart update --id 7 --quantity 2
//! tey-cli cart show --json
//! ```

use rust_decimal::Decimal;
use tey_cart::{
    CartError, CartSnapshot, CartStore, CatalogProduct, CheckoutDraft, CheckoutError, FileStore,
    PersistenceError, QuantityCheck, TransactionRequest, check_quantity,
};
use tey_core::{CurrencyCode, PaymentMethodId, Price, ProductId};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::CliConfig;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Storage directory could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] PersistenceError),

    /// Cart rejected the operation.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// Checkout could not be staged.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Quantity change refused before reaching the cart.
    #[error("{0}")]
    Rejected(String),

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Output could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, CartCommandError>;

/// Open the cart store configured for this invocation.
///
/// # Errors
///
/// Returns an error if the storage directory cannot be created.
pub fn open_store(config: &CliConfig) -> Result<CartStore<FileStore>> {
    let storage = FileStore::open(&config.cart_dir)?;
    Ok(CartStore::open_with(storage, config.cart_options()))
}

/// Add a product.
///
/// # Errors
///
/// Returns an error if the quantity is zero or storage cannot be opened.
pub fn add(
    config: &CliConfig,
    id: i32,
    title: &str,
    price: Decimal,
    stock: u32,
    quantity: u32,
) -> Result<()> {
    let mut store = open_store(config)?;
    let product = CatalogProduct::new(ProductId::new(id), title, price, stock);

    let total = store.add(&product, quantity)?;
    if total > stock {
        warn!(
            product_id = id,
            quantity = total,
            stock, "Cart quantity exceeds available stock"
        );
    }
    info!(product_id = id, quantity = total, "Added to cart");
    report_unsaved(&store);
    Ok(())
}

/// Remove a product.
///
/// # Errors
///
/// Returns an error if storage cannot be opened.
pub fn remove(config: &CliConfig, id: i32) -> Result<()> {
    let mut store = open_store(config)?;
    match store.remove(ProductId::new(id)) {
        Some(item) => info!(product_id = id, title = %item.title, "Removed from cart"),
        None => info!(product_id = id, "Product was not in the cart"),
    }
    report_unsaved(&store);
    Ok(())
}

/// Change a product's quantity.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the quantity exceeds
/// the available stock.
pub fn update(config: &CliConfig, id: i32, quantity: u32) -> Result<()> {
    let mut store = open_store(config)?;
    let product_id = ProductId::new(id);
    let item = store
        .get(product_id)
        .ok_or(CartCommandError::NotInCart(product_id))?;

    let check = check_quantity(item, quantity);
    match check {
        QuantityCheck::Apply(quantity) => {
            if let Some(applied) = store.update_quantity(product_id, quantity)? {
                info!(product_id = id, quantity = applied, "Updated quantity");
            }
        }
        QuantityCheck::Remove => {
            store.remove(product_id);
            info!(product_id = id, "Removed from cart");
        }
        QuantityCheck::ExceedsStock { .. } => {
            return Err(CartCommandError::Rejected(
                check.warning().unwrap_or_default(),
            ));
        }
    }
    report_unsaved(&store);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if storage cannot be opened.
pub fn clear(config: &CliConfig) -> Result<()> {
    let mut store = open_store(config)?;
    store.clear();
    info!("Cart cleared");
    report_unsaved(&store);
    Ok(())
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or JSON encoding fails.
pub fn show(config: &CliConfig, json: bool) -> Result<()> {
    let store = open_store(config)?;
    let snapshot = store.snapshot();

    if json {
        emit(&serde_json::to_string_pretty(&snapshot.items)?);
    } else {
        emit(&render_cart(&snapshot, config.currency));
    }
    Ok(())
}

/// Stage a checkout, printing the transaction body when a payment method is given.
///
/// # Errors
///
/// Returns an error if nothing selected is in the cart, a discount code is
/// given without a payment method, or the draft cannot be saved. Nothing is
/// staged when the command fails.
pub fn checkout(
    config: &CliConfig,
    select: &[i32],
    payment_method: Option<i32>,
    discount: Option<&str>,
) -> Result<()> {
    let store = open_store(config)?;
    let selected: Vec<ProductId> = select.iter().copied().map(ProductId::new).collect();

    let draft = store.draft_checkout(&selected)?;
    let request = if payment_method.is_some() || discount.is_some() {
        Some(TransactionRequest::new(
            &draft,
            payment_method.map(PaymentMethodId::new),
            discount,
        )?)
    } else {
        None
    };

    store.save_checkout(&draft)?;
    emit(&render_draft(&draft, config.currency));
    if let Some(request) = request {
        emit(&serde_json::to_string_pretty(&request)?);
    }
    Ok(())
}

/// Record a successful checkout.
///
/// # Errors
///
/// Returns an error if storage cannot be opened.
pub fn complete(config: &CliConfig) -> Result<()> {
    let mut store = open_store(config)?;
    match store.complete_checkout() {
        Some(draft) => info!(
            lines = draft.items.len(),
            remaining = store.snapshot().distinct_items(),
            "Checkout completed"
        ),
        None => warn!("No checkout staged"),
    }
    report_unsaved(&store);
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

fn price(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

/// Render the cart as a plain-text table.
fn render_cart(snapshot: &CartSnapshot, currency: CurrencyCode) -> String {
    if snapshot.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut out = String::new();
    for item in &snapshot.items {
        let stock_note = if item.quantity > item.stock_limit {
            format!("  (only {} in stock)", item.stock_limit)
        } else {
            String::new()
        };
        out.push_str(&format!(
            "{:>6}  {:<28} {:>3} x {:>16} = {:>16}{stock_note}\n",
            item.product_id,
            item.title,
            item.quantity,
            price(item.unit_price, currency),
            price(item.line_total(), currency),
        ));
    }
    out.push_str(&format!(
        "Items: {}  Subtotal: {}",
        snapshot.item_count,
        price(snapshot.subtotal, currency)
    ));
    out
}

/// Render a staged checkout summary.
fn render_draft(draft: &CheckoutDraft, currency: CurrencyCode) -> String {
    let mut out = String::from("Checkout summary\n");
    for line in &draft.items {
        out.push_str(&format!(
            "  {}  Quantity: {} x {}\n",
            line.title,
            line.quantity,
            price(line.unit_price, currency)
        ));
    }
    out.push_str(&format!("Total: {}", price(draft.total_amount, currency)));
    out
}

#[allow(clippy::print_stdout)]
fn emit(text: &str) {
    println!("{text}");
}

fn report_unsaved(store: &CartStore<FileStore>) {
    if let Some(e) = store.last_persist_error() {
        warn!(error = %e, "Cart changes were not saved");
    }
}
