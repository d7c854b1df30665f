use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::round_half_up;

/// Why a deserialized [`TaxSplit`] or [`TaxBreakdown`] was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreakdownError {
    #[error("CGST {cgst} and SGST {sgst} must be equal halves of the tax")]
    UnevenHalves { cgst: Decimal, sgst: Decimal },

    #[error("amounts must not be negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("total {stated} does not equal taxable amount plus tax ({derived})")]
    TotalMismatch { stated: Decimal, derived: Decimal },

    #[error("amount is too large to represent")]
    Overflow,
}

/// How the tax on a supply is divided between levies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", try_from = "RawTaxSplit")]
pub enum TaxSplit {
    /// Seller and place of supply share a jurisdiction: CGST + SGST halves.
    IntraState { cgst: Decimal, sgst: Decimal },
    /// Cross-jurisdiction supply: the whole tax is IGST.
    InterState { igst: Decimal },
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawTaxSplit {
    IntraState { cgst: Decimal, sgst: Decimal },
    InterState { igst: Decimal },
}

impl TryFrom<RawTaxSplit> for TaxSplit {
    type Error = BreakdownError;

    fn try_from(raw: RawTaxSplit) -> Result<Self, Self::Error> {
        match raw {
            RawTaxSplit::IntraState { cgst, sgst } => {
                if cgst != sgst {
                    return Err(BreakdownError::UnevenHalves { cgst, sgst });
                }
                if cgst < Decimal::ZERO {
                    return Err(BreakdownError::NegativeAmount(cgst));
                }
                cgst.checked_add(sgst).ok_or(BreakdownError::Overflow)?;
                Ok(Self::IntraState { cgst, sgst })
            }
            RawTaxSplit::InterState { igst } if igst < Decimal::ZERO => {
                Err(BreakdownError::NegativeAmount(igst))
            }
            RawTaxSplit::InterState { igst } => Ok(Self::InterState { igst }),
        }
    }
}

impl TaxSplit {
    /// Halves `tax` into equal CGST and SGST components.
    pub fn intra_state(tax: Decimal) -> Self {
        let half = tax / Decimal::TWO;
        Self::IntraState {
            cgst: half,
            sgst: half,
        }
    }

    pub fn inter_state(tax: Decimal) -> Self {
        Self::InterState { igst: tax }
    }

    /// Total tax regardless of how it is split.
    pub fn tax(&self) -> Decimal {
        match *self {
            Self::IntraState { cgst, sgst } => cgst + sgst,
            Self::InterState { igst } => igst,
        }
    }

    pub fn cgst(&self) -> Option<Decimal> {
        match *self {
            Self::IntraState { cgst, .. } => Some(cgst),
            Self::InterState { .. } => None,
        }
    }

    pub fn sgst(&self) -> Option<Decimal> {
        match *self {
            Self::IntraState { sgst, .. } => Some(sgst),
            Self::InterState { .. } => None,
        }
    }

    pub fn igst(&self) -> Option<Decimal> {
        match *self {
            Self::InterState { igst } => Some(igst),
            Self::IntraState { .. } => None,
        }
    }

    pub fn is_inter_state(&self) -> bool {
        matches!(self, Self::InterState { .. })
    }

    /// Each component rounded to two places for display.
    pub fn rounded(&self) -> Self {
        match *self {
            Self::IntraState { cgst, sgst } => Self::IntraState {
                cgst: round_half_up(cgst),
                sgst: round_half_up(sgst),
            },
            Self::InterState { igst } => Self::InterState {
                igst: round_half_up(igst),
            },
        }
    }
}

/// Tax applied to one taxable amount under a jurisdiction pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTaxBreakdown")]
pub struct TaxBreakdown {
    taxable_amount: Decimal,
    split: TaxSplit,
    total: Decimal,
}

#[derive(Deserialize)]
struct RawTaxBreakdown {
    taxable_amount: Decimal,
    split: TaxSplit,
    total: Decimal,
}

impl TryFrom<RawTaxBreakdown> for TaxBreakdown {
    type Error = BreakdownError;

    fn try_from(raw: RawTaxBreakdown) -> Result<Self, Self::Error> {
        if raw.taxable_amount < Decimal::ZERO {
            return Err(BreakdownError::NegativeAmount(raw.taxable_amount));
        }
        let breakdown = Self::new(raw.taxable_amount, raw.split).ok_or(BreakdownError::Overflow)?;
        if breakdown.total != raw.total {
            return Err(BreakdownError::TotalMismatch {
                stated: raw.total,
                derived: breakdown.total,
            });
        }
        Ok(breakdown)
    }
}

impl TaxBreakdown {
    /// The total is always derived as taxable amount plus split tax. `None`
    /// when that sum does not fit in a [`Decimal`].
    pub fn new(
        taxable_amount: Decimal,
        split: TaxSplit,
    ) -> Option<Self> {
        Some(Self {
            taxable_amount,
            split,
            total: taxable_amount.checked_add(split.tax())?,
        })
    }

    pub fn taxable_amount(&self) -> Decimal {
        self.taxable_amount
    }

    pub fn split(&self) -> &TaxSplit {
        &self.split
    }

    pub fn tax(&self) -> Decimal {
        self.split.tax()
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn cgst(&self) -> Option<Decimal> {
        self.split.cgst()
    }

    pub fn sgst(&self) -> Option<Decimal> {
        self.split.sgst()
    }

    pub fn igst(&self) -> Option<Decimal> {
        self.split.igst()
    }

    /// Display copy: components rounded, tax and total re-derived from the
    /// rounded components so the printed figures add up.
    pub fn rounded(&self) -> Self {
        let taxable_amount = round_half_up(self.taxable_amount);
        let split = self.split.rounded();
        // Rounding moves each part by under a paisa; only saturates at Decimal::MAX.
        Self {
            taxable_amount,
            split,
            total: taxable_amount.saturating_add(split.tax()),
        }
    }
}
