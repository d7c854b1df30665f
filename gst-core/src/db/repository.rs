use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    BusinessProfile, Client, Invoice, NewClient, NewInvoice, NewServiceItem, ServiceItem,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for everything the invoicing flow persists.
///
/// Finalized invoices are written and read back as-is; implementations
/// store the amounts they are given and never recompute them.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    // Business profile (single row)
    async fn get_business_profile(&self) -> Result<BusinessProfile, RepositoryError>;
    async fn save_business_profile(
        &self,
        profile: &BusinessProfile,
    ) -> Result<(), RepositoryError>;

    // Clients
    async fn create_client(
        &self,
        client: NewClient,
    ) -> Result<Client, RepositoryError>;
    async fn get_client(
        &self,
        id: i64,
    ) -> Result<Client, RepositoryError>;
    async fn update_client(
        &self,
        client: &Client,
    ) -> Result<(), RepositoryError>;
    async fn delete_client(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;
    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError>;

    // Service items
    async fn create_service_item(
        &self,
        item: NewServiceItem,
    ) -> Result<ServiceItem, RepositoryError>;
    async fn get_service_item(
        &self,
        id: i64,
    ) -> Result<ServiceItem, RepositoryError>;
    async fn update_service_item(
        &self,
        item: &ServiceItem,
    ) -> Result<(), RepositoryError>;
    async fn delete_service_item(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;
    async fn list_service_items(&self) -> Result<Vec<ServiceItem>, RepositoryError>;

    // Invoices
    async fn create_invoice(
        &self,
        invoice: NewInvoice,
    ) -> Result<Invoice, RepositoryError>;
    async fn get_invoice(
        &self,
        id: i64,
    ) -> Result<Invoice, RepositoryError>;
    async fn get_invoice_by_number(
        &self,
        invoice_number: &str,
    ) -> Result<Invoice, RepositoryError>;
    async fn delete_invoice(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;
    async fn list_invoices(
        &self,
        client_id: Option<i64>,
    ) -> Result<Vec<Invoice>, RepositoryError>;
    /// Highest-numbered invoice in the `PREFIX-<digits>` series, if any.
    /// Numbers under other prefixes or with non-numeric suffixes are ignored.
    async fn latest_invoice_number(
        &self,
        prefix: &str,
    ) -> Result<Option<String>, RepositoryError>;
}
