//! Choosing a storage backend at runtime.
//!
//! Backend crates each provide a [`RepositoryFactory`]. The binary registers
//! the ones it links against, and [`RepositoryRegistry::create`] opens
//! whichever one the settings name.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{InvoiceRepository, RepositoryError};

/// Where invoices are stored.
///
/// `connection_string` is handed to the backend as is. For `sqlite` it is a
/// database file path such as `invoices.db`, or `:memory:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    /// Throwaway in-memory SQLite.
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens repositories for one backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Name that [`DbConfig::backend`] selects this factory by.
    fn backend_name(&self) -> &'static str;

    /// Returns a repository with its schema ready for use.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InvoiceRepository>, RepositoryError>;
}

/// Backends known to this build, by name.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory`, replacing any earlier one with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Opens a repository on the backend `config` names.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] for an unregistered backend;
    /// otherwise whatever the backend's factory reports.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InvoiceRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "no '{}' storage backend in this build (have: {})",
                config.backend,
                self.available_backends().join(", ")
            )));
        };

        debug!(backend = %config.backend, "opening invoice store");
        factory.create(config).await
    }
}
