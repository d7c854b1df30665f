use std::collections::HashMap;
use std::io::Read;

use gst_core::{
    Client, Gstin, GstinError, InvoiceRepository, JurisdictionRegistry, LineValidationError,
    NewClient, NewServiceItem, PartyError, RepositoryError,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when importing catalogue or client data.
///
/// `line` is the line number in the CSV file, counting the header as 1.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("line {line}: invalid service item: {source}")]
    InvalidServiceItem {
        line: usize,
        #[source]
        source: LineValidationError,
    },

    #[error("line {line}: {source}")]
    InvalidGstin {
        line: usize,
        #[source]
        source: GstinError,
    },

    #[error("line {line}: invalid client: {source}")]
    InvalidClient {
        line: usize,
        #[source]
        source: PartyError,
    },

    #[error("line {line}: '{name}' already appears on line {first_line}")]
    DuplicateRow {
        line: usize,
        first_line: usize,
        name: String,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParse(err.to_string())
    }
}

/// How many rows an import inserted and how many replaced existing data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Amounts are parsed from their text so no digit goes through a float.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.trim().parse::<Decimal>().map_err(|e| {
        serde::de::Error::custom(format!("invalid decimal '{}': {}", s.trim(), e))
    })
}

fn trimmed_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Catches the same key twice in one file before anything is written.
fn check_unique<'a>(
    keys: impl Iterator<Item = (usize, &'a str)>,
) -> Result<(), ImportError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (line, key) in keys {
        if let Some(&first_line) = seen.get(key) {
            return Err(ImportError::DuplicateRow {
                line,
                first_line,
                name: key.to_string(),
            });
        }
        seen.insert(key, line);
    }
    Ok(())
}

/// A single row of `service_items.csv`.
///
/// - `name`: catalogue name, unique
/// - `sac_code`: Services Accounting Code (empty for none)
/// - `unit_price`: default price per unit in rupees
/// - `tax_rate`: GST rate as a percentage (e.g. `18`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServiceItemRecord {
    pub name: String,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub sac_code: Option<String>,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub unit_price: Decimal,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub tax_rate: Decimal,
}

impl ServiceItemRecord {
    fn to_new_item(&self) -> NewServiceItem {
        NewServiceItem {
            name: self.name.clone(),
            sac_code: self.sac_code.clone(),
            unit_price: self.unit_price,
            tax_rate: self.tax_rate,
        }
    }
}

/// Loader for the service item catalogue.
///
/// Items are matched to existing rows by name, so re-importing a file
/// updates prices and rates rather than adding duplicates.
pub struct ServiceItemLoader;

impl ServiceItemLoader {
    /// Parse service item records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ServiceItemRecord>, ImportError> {
        let mut csv_reader = trimmed_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ServiceItemRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate every record, then upsert them by name.
    ///
    /// Nothing is written if any record is invalid.
    pub async fn load<R: InvoiceRepository + ?Sized>(
        repo: &R,
        records: &[ServiceItemRecord],
    ) -> Result<ImportSummary, ImportError> {
        let mut items = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let item = record.to_new_item();
            item.validate()
                .map_err(|source| ImportError::InvalidServiceItem {
                    line: index + 2,
                    source,
                })?;
            items.push(item);
        }
        check_unique(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| (index + 2, item.name.as_str())),
        )?;

        let existing: HashMap<String, _> = repo
            .list_service_items()
            .await?
            .into_iter()
            .map(|item| (item.name.clone(), item))
            .collect();

        let mut summary = ImportSummary::default();
        for item in items {
            match existing.get(&item.name) {
                Some(current) => {
                    let mut updated = current.clone();
                    updated.sac_code = item.sac_code;
                    updated.unit_price = item.unit_price;
                    updated.tax_rate = item.tax_rate;
                    repo.update_service_item(&updated).await?;
                    debug!(name = %updated.name, "updated service item");
                    summary.updated += 1;
                }
                None => {
                    let created = repo.create_service_item(item).await?;
                    debug!(id = created.id, name = %created.name, "created service item");
                    summary.created += 1;
                }
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            "imported service items"
        );
        Ok(summary)
    }
}

/// A single row of `clients.csv`.
///
/// - `name`: client name
/// - `gstin`: GST identification number (empty for unregistered clients)
/// - `state_code`: GST state code of the place of supply
/// - `address`, `email`, `phone`: optional contact details
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientRecord {
    pub name: String,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub gstin: Option<String>,
    pub state_code: u8,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub address: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub phone: Option<String>,
}

impl ClientRecord {
    fn to_new_client(
        &self,
        line: usize,
        registry: &JurisdictionRegistry,
    ) -> Result<NewClient, ImportError> {
        let gstin = self
            .gstin
            .as_deref()
            .map(Gstin::parse)
            .transpose()
            .map_err(|source| ImportError::InvalidGstin { line, source })?;

        let client = NewClient {
            name: self.name.clone(),
            gstin,
            state_code: self.state_code,
            address: self.address.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        };
        client
            .validate(registry)
            .map_err(|source| ImportError::InvalidClient { line, source })?;
        Ok(client)
    }
}

/// The key a client row is matched on: its GSTIN when it has one, otherwise
/// its name.
fn client_key(
    gstin: Option<&Gstin>,
    name: &str,
) -> String {
    match gstin {
        Some(gstin) => format!("gstin:{}", gstin.as_str()),
        None => format!("name:{}", name),
    }
}

/// Loader for the client list.
pub struct ClientLoader;

impl ClientLoader {
    /// Parse client records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ClientRecord>, ImportError> {
        let mut csv_reader = trimmed_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ClientRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate every record against `registry`, then upsert them.
    ///
    /// Registered clients are matched on GSTIN, unregistered ones on name.
    /// Nothing is written if any record is invalid.
    pub async fn load<R: InvoiceRepository + ?Sized>(
        repo: &R,
        registry: &JurisdictionRegistry,
        records: &[ClientRecord],
    ) -> Result<ImportSummary, ImportError> {
        let mut clients = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            clients.push(record.to_new_client(index + 2, registry)?);
        }
        let keys: Vec<String> = clients
            .iter()
            .map(|client| client_key(client.gstin.as_ref(), &client.name))
            .collect();
        check_unique(
            keys.iter()
                .enumerate()
                .map(|(index, key)| (index + 2, key.as_str())),
        )?;

        let existing: HashMap<String, Client> = repo
            .list_clients()
            .await?
            .into_iter()
            .map(|client| (client_key(client.gstin.as_ref(), &client.name), client))
            .collect();

        let mut summary = ImportSummary::default();
        for (key, client) in keys.into_iter().zip(clients) {
            match existing.get(&key) {
                Some(current) => {
                    let updated = Client {
                        id: current.id,
                        name: client.name,
                        gstin: client.gstin,
                        state_code: client.state_code,
                        address: client.address,
                        email: client.email,
                        phone: client.phone,
                        created_at: current.created_at,
                    };
                    repo.update_client(&updated).await?;
                    debug!(id = updated.id, name = %updated.name, "updated client");
                    summary.updated += 1;
                }
                None => {
                    let created = repo.create_client(client).await?;
                    debug!(id = created.id, name = %created.name, "created client");
                    summary.created += 1;
                }
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            "imported clients"
        );
        Ok(summary)
    }
}
