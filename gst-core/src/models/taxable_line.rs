use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::percent_of;

/// Errors raised while constructing a [`TaxableLine`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineValidationError {
    #[error("quantity must not be negative, got {0}")]
    NegativeQuantity(Decimal),

    #[error("unit price must not be negative, got {0}")]
    NegativeUnitPrice(Decimal),

    #[error("tax rate must be between 0 and 100 percent, got {0}")]
    RateOutOfRange(Decimal),

    #[error("line description must not be empty")]
    EmptyDescription,

    #[error("{quantity} x {unit_price} is too large to invoice")]
    Overflow { quantity: Decimal, unit_price: Decimal },
}

/// One billable line on an invoice.
///
/// Lines are immutable once built; editing a draft replaces the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTaxableLine")]
pub struct TaxableLine {
    description: String,
    sac_code: Option<String>,
    quantity: Decimal,
    unit_price: Decimal,
    tax_rate: Decimal,
}

#[derive(Deserialize)]
struct RawTaxableLine {
    description: String,
    sac_code: Option<String>,
    quantity: Decimal,
    unit_price: Decimal,
    tax_rate: Decimal,
}

impl TryFrom<RawTaxableLine> for TaxableLine {
    type Error = LineValidationError;

    fn try_from(raw: RawTaxableLine) -> Result<Self, Self::Error> {
        Self::new(raw.description, raw.quantity, raw.unit_price, raw.tax_rate)
            .map(|line| line.with_sac_code(raw.sac_code))
    }
}

impl TaxableLine {
    /// Builds a validated line. `tax_rate` is a percentage, e.g. `18` for 18%.
    ///
    /// # Errors
    ///
    /// Returns [`LineValidationError`] if the description is blank, the
    /// quantity or unit price is negative, the rate is outside `[0, 100]`, or
    /// the line amount plus its tax does not fit in a [`Decimal`].
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        tax_rate: Decimal,
    ) -> Result<Self, LineValidationError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(LineValidationError::EmptyDescription);
        }
        if quantity < Decimal::ZERO {
            return Err(LineValidationError::NegativeQuantity(quantity));
        }
        if unit_price < Decimal::ZERO {
            return Err(LineValidationError::NegativeUnitPrice(unit_price));
        }
        if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE_HUNDRED {
            return Err(LineValidationError::RateOutOfRange(tax_rate));
        }
        quantity
            .checked_mul(unit_price)
            .and_then(|taxable| taxable.checked_add(percent_of(taxable, tax_rate)?))
            .ok_or(LineValidationError::Overflow {
                quantity,
                unit_price,
            })?;

        Ok(Self {
            description: description.trim().to_string(),
            sac_code: None,
            quantity,
            unit_price,
            tax_rate,
        })
    }

    /// Attaches a SAC/HSN classification code. Blank codes are dropped.
    pub fn with_sac_code(
        mut self,
        sac_code: Option<String>,
    ) -> Self {
        self.sac_code = sac_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn sac_code(&self) -> Option<&str> {
        self.sac_code.as_deref()
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Quantity times unit price, unrounded.
    pub fn taxable_amount(&self) -> Decimal {
        // Bounded by the check in `new`.
        self.quantity * self.unit_price
    }

    /// Tax on this line at its own rate, unrounded.
    pub fn tax_amount(&self) -> Decimal {
        self.taxable_amount() * self.tax_rate / Decimal::ONE_HUNDRED
    }
}
