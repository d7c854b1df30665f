//! Settings file for the `gst-invoice` binary.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "invoices.db"
//!
//! [invoice]
//! prefix = "INV"
//! payment_terms_days = 15
//!
//! [logging]
//! level = "info"
//! file = "gst-invoice.log"   # optional
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use std::path::{Path, PathBuf};

use gst_core::db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "gst-invoice.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_connection_string")]
    pub connection_string: String,
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_connection_string() -> String {
    "invoices.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            connection_string: default_connection_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceConfig {
    /// Invoice numbers are `{prefix}-0001`, `{prefix}-0002`, ...
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Due date offset from the issue date. `0` leaves the due date unset.
    #[serde(default = "default_payment_terms_days")]
    pub payment_terms_days: u32,
}

fn default_prefix() -> String {
    "INV".to_string()
}

fn default_payment_terms_days() -> u32 {
    15
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            payment_terms_days: default_payment_terms_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// A bare level or any `EnvFilter` directive. `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub invoice: InvoiceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads `path`. When `required` is false a missing file yields defaults;
    /// an explicitly requested file must exist.
    pub fn load(
        path: &Path,
        required: bool,
    ) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.invoice.prefix;
        if prefix.is_empty() || prefix.chars().any(|c| c.is_whitespace()) {
            return Err(ConfigError::Invalid(format!(
                "invoice prefix must be non-empty without spaces, got '{}'",
                prefix
            )));
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.clone(),
            connection_string: self.database.connection_string.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config: AppConfig = toml::from_str("").expect("empty toml parses");

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.connection_string, "invoices.db");
        assert_eq!(config.invoice.prefix, "INV");
        assert_eq!(config.invoice.payment_terms_days, 15);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [invoice]
            prefix = "ARD"

            [logging]
            file = "gst.log"
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.invoice.prefix, "ARD");
        assert_eq!(config.invoice.payment_terms_days, 15);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, Some(PathBuf::from("gst.log")));
        assert_eq!(config.database, DatabaseConfig::default());
    }

    #[test]
    fn db_config_carries_database_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [database]
            connection_string = ":memory:"
            "#,
        )
        .expect("valid toml");

        assert_eq!(
            config.db_config(),
            DbConfig {
                backend: "sqlite".to_string(),
                connection_string: ":memory:".to_string(),
            }
        );
    }

    #[test]
    fn missing_optional_file_yields_defaults() {
        let config = AppConfig::load(Path::new("./does-not-exist.toml"), false)
            .expect("defaults when absent");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let err = AppConfig::load(Path::new("./does-not-exist.toml"), true)
            .expect_err("explicit file must exist");

        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn prefix_with_spaces_is_rejected() {
        let mut config = AppConfig::default();
        config.invoice.prefix = "IN V".to_string();

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
