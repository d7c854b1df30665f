//! Invoice roll-up.
//!
//! Every line is taxed at its own rate. The seller's jurisdiction and the
//! place of supply are fixed for the whole invoice, so one [`SupplyKind`]
//! governs the split of every line. Splitting each line and summing gives
//! the same figures as splitting the summed tax once, which is what
//! [`InvoiceAggregate::tax_breakdown`] reports.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::common::{percent_of, round_half_up};
use super::gst::SupplyKind;
use crate::jurisdictions::Jurisdiction;
use crate::models::{NewInvoice, TaxBreakdown, TaxableLine};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("an invoice needs at least one line")]
    NoLines,

    #[error("no line at position {index} (invoice has {len})")]
    LineIndexOutOfRange { index: usize, len: usize },

    #[error("invoice totals are too large to represent")]
    Overflow,

    #[error("no invoice number follows {0}")]
    NumberingExhausted(String),
}

/// Subtotal, tax and grand total of a set of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}

impl InvoiceTotals {
    /// Display copy. The grand total is re-derived from the rounded parts.
    pub fn rounded(&self) -> Self {
        let subtotal = round_half_up(self.subtotal);
        let total_tax = round_half_up(self.total_tax);
        Self {
            subtotal,
            total_tax,
            grand_total: subtotal + total_tax,
        }
    }
}

/// Sums lines in the order given. An empty slice yields all zeros.
///
/// # Errors
///
/// [`InvoiceError::Overflow`] if a sum does not fit in a [`Decimal`].
pub fn aggregate(lines: &[TaxableLine]) -> Result<InvoiceTotals, InvoiceError> {
    let (subtotal, total_tax) = lines
        .iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(subtotal, tax), line| {
            Some((
                subtotal.checked_add(line.taxable_amount())?,
                tax.checked_add(line.tax_amount())?,
            ))
        })
        .ok_or(InvoiceError::Overflow)?;

    Ok(InvoiceTotals {
        subtotal,
        total_tax,
        grand_total: subtotal.checked_add(total_tax).ok_or(InvoiceError::Overflow)?,
    })
}

/// Lines sharing one GST rate, as listed in an invoice's tax summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSummaryRow {
    pub rate: Decimal,
    pub breakdown: TaxBreakdown,
}

/// Groups `lines` by GST rate, lowest rate first, splitting each group's
/// tax according to `kind`.
///
/// # Errors
///
/// [`InvoiceError::Overflow`] if a group's amounts do not fit in a
/// [`Decimal`].
pub fn rate_summary(
    lines: &[TaxableLine],
    kind: SupplyKind,
) -> Result<Vec<RateSummaryRow>, InvoiceError> {
    let mut taxable_by_rate: BTreeMap<Decimal, Decimal> = BTreeMap::new();
    for line in lines {
        let taxable = taxable_by_rate.entry(line.tax_rate()).or_default();
        *taxable = taxable
            .checked_add(line.taxable_amount())
            .ok_or(InvoiceError::Overflow)?;
    }

    taxable_by_rate
        .into_iter()
        .map(|(rate, taxable)| {
            let breakdown = percent_of(taxable, rate)
                .and_then(|tax| TaxBreakdown::new(taxable, kind.split(tax)))
                .ok_or(InvoiceError::Overflow)?;
            Ok(RateSummaryRow {
                rate: rate.normalize(),
                breakdown,
            })
        })
        .collect()
}

/// An invoice being drafted: ordered lines plus the jurisdiction pair that
/// decides the tax split for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAggregate {
    seller: Jurisdiction,
    place_of_supply: Jurisdiction,
    lines: Vec<TaxableLine>,
}

impl InvoiceAggregate {
    pub fn new(
        seller: Jurisdiction,
        place_of_supply: Jurisdiction,
    ) -> Self {
        Self {
            seller,
            place_of_supply,
            lines: Vec::new(),
        }
    }

    pub fn with_lines(
        seller: Jurisdiction,
        place_of_supply: Jurisdiction,
        lines: Vec<TaxableLine>,
    ) -> Self {
        Self {
            seller,
            place_of_supply,
            lines,
        }
    }

    pub fn seller(&self) -> &Jurisdiction {
        &self.seller
    }

    pub fn place_of_supply(&self) -> &Jurisdiction {
        &self.place_of_supply
    }

    pub fn lines(&self) -> &[TaxableLine] {
        &self.lines
    }

    pub fn supply_kind(&self) -> SupplyKind {
        SupplyKind::between(&self.seller, &self.place_of_supply)
    }

    pub fn push_line(
        &mut self,
        line: TaxableLine,
    ) {
        self.lines.push(line);
    }

    /// Swaps the line at `index` for `line`, returning the old one.
    pub fn replace_line(
        &mut self,
        index: usize,
        line: TaxableLine,
    ) -> Result<TaxableLine, InvoiceError> {
        let len = self.lines.len();
        let slot = self
            .lines
            .get_mut(index)
            .ok_or(InvoiceError::LineIndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, line))
    }

    pub fn remove_line(
        &mut self,
        index: usize,
    ) -> Result<TaxableLine, InvoiceError> {
        if index >= self.lines.len() {
            return Err(InvoiceError::LineIndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    pub fn totals(&self) -> Result<InvoiceTotals, InvoiceError> {
        aggregate(&self.lines)
    }

    /// One breakdown per line, in line order.
    pub fn line_breakdowns(&self) -> Vec<TaxBreakdown> {
        let kind = self.supply_kind();
        // Each line's amount plus tax fits; `TaxableLine::new` checks it.
        self.lines
            .iter()
            .filter_map(|line| TaxBreakdown::new(line.taxable_amount(), kind.split(line.tax_amount())))
            .collect()
    }

    /// Invoice-level breakdown over the subtotal. Its tax always equals
    /// [`totals`](Self::totals)`().total_tax`.
    pub fn tax_breakdown(&self) -> Result<TaxBreakdown, InvoiceError> {
        let totals = self.totals()?;
        TaxBreakdown::new(totals.subtotal, self.supply_kind().split(totals.total_tax))
            .ok_or(InvoiceError::Overflow)
    }

    /// Lines grouped by rate, lowest rate first.
    pub fn rate_summary(&self) -> Result<Vec<RateSummaryRow>, InvoiceError> {
        rate_summary(&self.lines, self.supply_kind())
    }

    /// Freezes the draft into a record ready to persist, carrying the
    /// totals and split computed here.
    ///
    /// # Errors
    ///
    /// [`InvoiceError::NoLines`] if the draft is empty,
    /// [`InvoiceError::Overflow`] if its totals do not fit in a [`Decimal`].
    pub fn finalize(
        &self,
        invoice_number: impl Into<String>,
        client_id: i64,
        issue_date: NaiveDate,
        due_date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> Result<NewInvoice, InvoiceError> {
        if self.lines.is_empty() {
            return Err(InvoiceError::NoLines);
        }

        let totals = self.totals()?;
        let breakdown = self.tax_breakdown()?;
        let invoice_number = invoice_number.into();
        debug!(
            %invoice_number,
            lines = self.lines.len(),
            subtotal = %totals.subtotal,
            total_tax = %totals.total_tax,
            "finalizing invoice"
        );

        Ok(NewInvoice {
            invoice_number,
            client_id,
            issue_date,
            due_date,
            seller_state_code: self.seller.code(),
            place_of_supply_code: self.place_of_supply.code(),
            lines: self.lines.clone(),
            totals,
            tax_split: *breakdown.split(),
            notes,
        })
    }
}
