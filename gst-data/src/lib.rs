//! CSV import of the service catalogue and client list.

mod loader;

pub use loader::{
    ClientLoader, ClientRecord, ImportError, ImportSummary, ServiceItemLoader, ServiceItemRecord,
};
