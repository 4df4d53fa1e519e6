//! Checkout drafts and transaction requests.
//!
//! Checking out is a two-step handoff. The cart view stages a
//! [`CheckoutDraft`] from the lines the customer ticked; the checkout view
//! reads that draft back, collects a payment method and optional discount
//! code, and builds the [`TransactionRequest`] body the backend expects.
//! Submitting the request belongs to the caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tey_core::{PaymentMethodId, ProductId};

use crate::error::CheckoutError;
use crate::item::LineItem;

/// One staged line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CheckoutLine {
    /// `unit_price × quantity`, saturating at the bounds of [`Decimal`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

impl From<&LineItem> for CheckoutLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            title: item.title.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// Lines selected for purchase, persisted between the cart and checkout views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    pub items: Vec<CheckoutLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub staged_at: DateTime<Utc>,
}

impl CheckoutDraft {
    /// Build a draft from the cart lines whose product is in `selected`.
    ///
    /// Lines keep cart order. Selected IDs that are not in the cart are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NothingSelected`] if no cart line is selected.
    pub fn from_selection(
        items: &[LineItem],
        selected: &[ProductId],
        staged_at: DateTime<Utc>,
    ) -> Result<Self, CheckoutError> {
        let lines: Vec<CheckoutLine> = items
            .iter()
            .filter(|item| selected.contains(&item.product_id))
            .map(CheckoutLine::from)
            .collect();

        if lines.is_empty() {
            return Err(CheckoutError::NothingSelected);
        }

        let total_amount = lines
            .iter()
            .map(CheckoutLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        Ok(Self {
            items: lines,
            total_amount,
            staged_at,
        })
    }

    /// Whether the draft includes `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|line| line.product_id == product_id)
    }
}

/// Product entry of a transaction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProduct {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of the backend's transaction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub payment_method_id: PaymentMethodId,
    /// Empty when no code was entered.
    pub discount_code: String,
    pub products: Vec<TransactionProduct>,
}

impl TransactionRequest {
    /// Build the request for a staged draft.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingPaymentMethod`] when no payment method
    /// was chosen.
    pub fn new(
        draft: &CheckoutDraft,
        payment_method_id: Option<PaymentMethodId>,
        discount_code: Option<&str>,
    ) -> Result<Self, CheckoutError> {
        let payment_method_id = payment_method_id.ok_or(CheckoutError::MissingPaymentMethod)?;

        Ok(Self {
            payment_method_id,
            discount_code: discount_code.map(str::trim).unwrap_or_default().to_owned(),
            products: draft
                .items
                .iter()
                .map(|line| TransactionProduct {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        })
    }
}
