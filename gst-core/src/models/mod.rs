mod business_profile;
mod client;
mod gstin;
mod invoice;
mod party;
mod service_item;
mod tax_breakdown;
mod taxable_line;

pub use business_profile::{BankDetails, BusinessProfile};
pub use client::{Client, NewClient};
pub use gstin::{Gstin, GstinError};
pub use invoice::{Invoice, NewInvoice, next_invoice_number};
pub use party::PartyError;
pub use service_item::{NewServiceItem, ServiceItem};
pub use tax_breakdown::{BreakdownError, TaxBreakdown, TaxSplit};
pub use taxable_line::{LineValidationError, TaxableLine};
