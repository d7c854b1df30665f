use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{TaxBreakdown, TaxSplit, TaxableLine};
use crate::calculations::{InvoiceError, InvoiceTotals, RateSummaryRow, SupplyKind, rate_summary};

/// A finalized invoice as persisted.
///
/// Amounts are the engine's full-precision figures, stored as computed.
/// Anything that displays or prints an invoice reads them from here and
/// rounds for presentation; nothing recomputes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub seller_state_code: u8,
    pub place_of_supply_code: u8,
    pub lines: Vec<TaxableLine>,
    pub totals: InvoiceTotals,
    pub tax_split: TaxSplit,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// For creating new invoices (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub seller_state_code: u8,
    pub place_of_supply_code: u8,
    pub lines: Vec<TaxableLine>,
    pub totals: InvoiceTotals,
    pub tax_split: TaxSplit,
    pub notes: Option<String>,
}

impl Invoice {
    /// Invoice-level breakdown rebuilt from the stored subtotal and split.
    pub fn tax_breakdown(&self) -> Result<TaxBreakdown, InvoiceError> {
        TaxBreakdown::new(self.totals.subtotal, self.tax_split).ok_or(InvoiceError::Overflow)
    }

    pub fn is_inter_state(&self) -> bool {
        self.tax_split.is_inter_state()
    }

    pub fn supply_kind(&self) -> SupplyKind {
        if self.is_inter_state() {
            SupplyKind::InterState
        } else {
            SupplyKind::IntraState
        }
    }

    /// Rate-wise summary of the stored lines under the stored regime.
    pub fn rate_summary(&self) -> Result<Vec<RateSummaryRow>, InvoiceError> {
        rate_summary(&self.lines, self.supply_kind())
    }
}

/// Next number in a `PREFIX-0001` sequence.
///
/// Continues from `last` when it carries the same prefix and a numeric
/// suffix; anything else starts the sequence at 1.
///
/// # Errors
///
/// [`InvoiceError::NumberingExhausted`] when `last` already holds the
/// largest sequence number.
pub fn next_invoice_number(
    prefix: &str,
    last: Option<&str>,
) -> Result<String, InvoiceError> {
    let last_seq = last
        .and_then(|last| last.strip_prefix(prefix))
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|seq| seq.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|seq| seq.parse::<u64>().ok());
    let next = match last_seq {
        Some(seq) => seq
            .checked_add(1)
            .ok_or_else(|| InvoiceError::NumberingExhausted(format!("{prefix}-{seq}")))?,
        None => 1,
    };

    Ok(format!("{prefix}-{next:04}"))
}
