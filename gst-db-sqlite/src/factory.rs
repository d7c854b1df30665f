use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use gst_core::db::{DbConfig, InvoiceRepository, RepositoryError, RepositoryFactory};

use crate::repository::SqliteRepository;

/// Environment variable that overrides where seed SQL is read from.
pub const SEEDS_DIR_ENV: &str = "GST_DB_SQLITE_SEEDS_DIR";

/// Resolve the seeds directory at runtime so it works in both development and
/// packaged distribution.
///
/// Resolution order:
/// 1. **`GST_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if the directory exists in the current working directory.
/// 3. **`$CARGO_MANIFEST_DIR/seeds`** when run from the build tree.
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(SEEDS_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`gst_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use gst_core::db::RepositoryRegistry;
/// use gst_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string`, bring the
    /// schema up to date and load the starter catalogue.
    ///
    /// Accepted connection-string values:
    /// * A bare file path, e.g. `"invoices.db"`. Created if missing.
    /// * `":memory:"` for an ephemeral database.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn InvoiceRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        repo.run_seeds(&seeds)
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(
            connection = %config.connection_string,
            seeds = %seeds.display(),
            "sqlite repository ready"
        );
        Ok(Box::new(repo))
    }
}
