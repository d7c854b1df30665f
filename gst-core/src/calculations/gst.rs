//! Tax on a single taxable amount.
//!
//! The regime depends only on whether the seller's jurisdiction and the
//! place of supply are the same:
//!
//! | Seller vs place of supply | Split                       |
//! |---------------------------|-----------------------------|
//! | same code                 | CGST = SGST = tax / 2       |
//! | different codes           | IGST = tax                  |
//!
//! In both cases `tax = amount * rate / 100` and `total = amount + tax`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use gst_core::{JurisdictionRegistry, compute_tax};
//!
//! let registry = JurisdictionRegistry::india();
//! let karnataka = registry.lookup(29).unwrap();
//! let maharashtra = registry.lookup(27).unwrap();
//!
//! let local = compute_tax(dec!(1000), dec!(18), karnataka, karnataka).unwrap();
//! assert_eq!(local.cgst(), Some(dec!(90)));
//! assert_eq!(local.sgst(), Some(dec!(90)));
//!
//! let interstate = compute_tax(dec!(1000), dec!(18), karnataka, maharashtra).unwrap();
//! assert_eq!(interstate.igst(), Some(dec!(180)));
//! assert_eq!(interstate.total(), dec!(1180));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use super::common::percent_of;
use crate::jurisdictions::Jurisdiction;
use crate::models::{TaxBreakdown, TaxSplit};

/// Errors that can occur when computing tax on an amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxCalculationError {
    /// Taxable amounts cannot be negative.
    #[error("taxable amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    /// Rates are percentages in `[0, 100]`.
    #[error("tax rate must be between 0 and 100 percent, got {0}")]
    RateOutOfRange(Decimal),

    /// The tax or the total does not fit in a [`Decimal`].
    #[error("taxable amount {0} is too large to tax")]
    Overflow(Decimal),
}

/// Whether a supply stays inside one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyKind {
    IntraState,
    InterState,
}

impl SupplyKind {
    /// Compares by code only.
    pub fn between(
        seller: &Jurisdiction,
        place_of_supply: &Jurisdiction,
    ) -> Self {
        if seller == place_of_supply {
            Self::IntraState
        } else {
            Self::InterState
        }
    }

    /// Divides `tax` according to this regime.
    pub fn split(
        self,
        tax: Decimal,
    ) -> TaxSplit {
        match self {
            Self::IntraState => TaxSplit::intra_state(tax),
            Self::InterState => TaxSplit::inter_state(tax),
        }
    }
}

/// Computes the GST on `taxable_amount` at `rate_percent`.
///
/// The result is full precision; round with
/// [`round_half_up`](super::common::round_half_up) or
/// [`TaxBreakdown::rounded`] when presenting it.
///
/// # Errors
///
/// Returns [`TaxCalculationError`] if the amount is negative, the rate is
/// outside `[0, 100]` or the total would not fit in a [`Decimal`]. Inputs are
/// never clamped.
pub fn compute_tax(
    taxable_amount: Decimal,
    rate_percent: Decimal,
    seller: &Jurisdiction,
    place_of_supply: &Jurisdiction,
) -> Result<TaxBreakdown, TaxCalculationError> {
    if taxable_amount < Decimal::ZERO {
        return Err(TaxCalculationError::NegativeAmount(taxable_amount));
    }
    if rate_percent < Decimal::ZERO || rate_percent > Decimal::ONE_HUNDRED {
        return Err(TaxCalculationError::RateOutOfRange(rate_percent));
    }

    let kind = SupplyKind::between(seller, place_of_supply);
    let overflow = || TaxCalculationError::Overflow(taxable_amount);
    let tax = percent_of(taxable_amount, rate_percent).ok_or_else(overflow)?;
    trace!(
        %taxable_amount,
        %rate_percent,
        seller = seller.code(),
        place_of_supply = place_of_supply.code(),
        ?kind,
        %tax,
        "computed tax"
    );

    TaxBreakdown::new(taxable_amount, kind.split(tax)).ok_or_else(overflow)
}
