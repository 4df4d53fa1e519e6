//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupiah, dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display using the currency's symbol and separators.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use tey_core::{CurrencyCode, Price};
    ///
    /// let shirt = Price::new(Decimal::new(50_000, 0), CurrencyCode::IDR);
    /// assert_eq!(shirt.display(), "Rp 50.000,00");
    ///
    /// let mug = Price::new(Decimal::new(1999, 2), CurrencyCode::USD);
    /// assert_eq!(mug.display(), "$19.99");
    /// ```
    #[must_use]
    pub fn display(&self) -> String {
        let (group, fraction) = self.currency_code.separators();
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        // `{:.2}` always yields "<digits>.<2 digits>" for a non-negative decimal
        let plain = format!("{:.2}", rounded.abs());
        let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        format!(
            "{}{sign}{}{fraction}{cents}",
            self.currency_code.symbol(),
            group_thousands(whole, group),
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `separator` between every group of three digits.
fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Error returned when parsing an unknown currency code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyCodeError(pub String);

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    IDR,
    USD,
    EUR,
    GBP,
    SGD,
}

impl CurrencyCode {
    /// Display prefix for amounts in this currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::IDR => "Rp ",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::SGD => "S$",
        }
    }

    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::IDR => "IDR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::SGD => "SGD",
        }
    }

    /// Thousands and decimal separators, in that order.
    const fn separators(self) -> (char, char) {
        match self {
            Self::IDR | Self::EUR => ('.', ','),
            Self::USD | Self::GBP | Self::SGD => (',', '.'),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IDR" => Ok(Self::IDR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "SGD" => Ok(Self::SGD),
            _ => Err(CurrencyCodeError(s.to_owned())),
        }
    }
}
