pub mod calculations;
pub mod db;
pub mod jurisdictions;
pub mod models;

pub use calculations::{
    InvoiceAggregate, InvoiceError, InvoiceTotals, RateSummaryRow, SupplyKind,
    TaxCalculationError, aggregate, compute_tax,
};
pub use db::repository::{InvoiceRepository, RepositoryError};
pub use jurisdictions::{Jurisdiction, JurisdictionRegistry, RegistryError};
pub use models::*;
