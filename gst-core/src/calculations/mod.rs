//! GST computation.
//!
//! [`gst`] applies a rate to one taxable amount under a jurisdiction pair;
//! [`invoice`] rolls lines up into invoice totals and the invoice-level
//! breakdown. Both are pure and work at full decimal precision; rounding
//! lives in [`common`] and is applied only when presenting figures.

pub mod common;
pub mod gst;
pub mod invoice;

pub use gst::{SupplyKind, TaxCalculationError, compute_tax};
pub use invoice::{
    InvoiceAggregate, InvoiceError, InvoiceTotals, RateSummaryRow, aggregate, rate_summary,
};
