//! Integration tests for moving from the cart to a completed checkout.
//!
//! The cart view stages a draft, the checkout view reads it back in a fresh
//! store (as after a page navigation), and a successful submission completes
//! it.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use serde_json::json;
use tey_cart::{CartStore, CheckoutError, FileStore, TransactionRequest};
use tey_core::{PaymentMethodId, ProductId};
use tey_integration_tests::{cap, coffee, shirt};

#[test]
fn test_stage_read_back_and_complete() {
    let dir = tempfile::tempdir().unwrap();

    // Cart view: select two of three lines
    let staged = {
        let mut cart = CartStore::open(FileStore::open(dir.path()).unwrap());
        cart.add(&shirt(), 2).unwrap();
        cart.add(&cap(), 1).unwrap();
        cart.add(&coffee(), 1).unwrap();
        cart.stage_checkout(&[ProductId::new(7), ProductId::new(21)])
            .unwrap()
    };
    assert_eq!(staged.total_amount, Decimal::new(220_500, 0));

    // Checkout view: read the draft and build the request body
    let mut cart = CartStore::open(FileStore::open(dir.path()).unwrap());
    let draft = cart.pending_checkout().unwrap();
    assert_eq!(draft, staged);

    let request =
        TransactionRequest::new(&draft, Some(PaymentMethodId::new(3)), Some("")).unwrap();
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "payment_method_id": 3,
            "discount_code": "",
            "products": [
                {"product_id": 7, "quantity": 2},
                {"product_id": 21, "quantity": 1}
            ]
        })
    );

    // Submission succeeded
    cart.complete_checkout().unwrap();
    let snapshot = cart.snapshot();
    assert_eq!(snapshot.distinct_items(), 1);
    assert_eq!(snapshot.get(ProductId::new(9)).unwrap().quantity, 1);
    assert!(cart.pending_checkout().is_none());
    assert!(!dir.path().join("coItems.json").exists());
}

#[test]
fn test_restaging_replaces_previous_draft() {
    let dir = tempfile::tempdir().unwrap();
    let mut cart = CartStore::open(FileStore::open(dir.path()).unwrap());
    cart.add(&shirt(), 1).unwrap();
    cart.add(&cap(), 1).unwrap();

    cart.stage_checkout(&[ProductId::new(7)]).unwrap();
    cart.stage_checkout(&[ProductId::new(9)]).unwrap();

    let draft = cart.pending_checkout().unwrap();
    assert!(draft.contains(ProductId::new(9)));
    assert!(!draft.contains(ProductId::new(7)));
}

#[test]
fn test_nothing_selected_leaves_no_draft() {
    let dir = tempfile::tempdir().unwrap();
    let cart = CartStore::open(FileStore::open(dir.path()).unwrap());

    assert!(matches!(
        cart.stage_checkout(&[ProductId::new(7)]),
        Err(CheckoutError::NothingSelected)
    ));
    assert!(cart.pending_checkout().is_none());
}

#[test]
fn test_draft_write_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut cart = CartStore::open(FileStore::open(dir.path()).unwrap());
    cart.add(&shirt(), 1).unwrap();

    std::fs::remove_dir_all(dir.path()).unwrap();
    std::fs::write(dir.path(), "not a directory").unwrap();

    assert!(matches!(
        cart.stage_checkout(&[ProductId::new(7)]),
        Err(CheckoutError::Persistence(_))
    ));

    std::fs::remove_file(dir.path()).unwrap();
}
