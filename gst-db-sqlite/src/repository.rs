use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gst_core::{
    BankDetails, BusinessProfile, Client, Gstin, Invoice, InvoiceRepository, InvoiceTotals,
    NewClient, NewInvoice, NewServiceItem, RepositoryError, ServiceItem, TaxSplit, TaxableLine,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Accepts a bare path (`invoices.db`), a sqlx url (`sqlite://invoices.db`)
    /// or `:memory:`. Missing database files are created.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {}", database_url))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            info!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_lines(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<TaxableLine>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT description, sac_code, quantity, unit_price, tax_rate
             FROM invoice_lines WHERE invoice_id = ? ORDER BY position",
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_line).collect()
    }

    async fn load_invoice(
        &self,
        row: &SqliteRow,
    ) -> Result<Invoice, RepositoryError> {
        let id: i64 = row.try_get("id").map_err(db_error)?;
        let lines = self.fetch_lines(id).await?;
        row_to_invoice(row, lines)
    }
}

const INVOICE_COLUMNS: &str = "id, invoice_number, client_id, issue_date, due_date,
    seller_state_code, place_of_supply_code, subtotal, total_tax, grand_total,
    cgst, sgst, igst, notes, created_at";

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get_state_code(
    row: &SqliteRow,
    column: &str,
) -> Result<u8, RepositoryError> {
    let code: i64 = row.try_get(column).map_err(db_error)?;
    u8::try_from(code).map_err(|_| {
        RepositoryError::Database(format!("Invalid state code {} in '{}'", code, column))
    })
}

fn get_optional_gstin(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Gstin>, RepositoryError> {
    let raw: Option<String> = row.try_get(column).map_err(db_error)?;
    raw.map(|value| {
        Gstin::parse(&value)
            .map_err(|e| RepositoryError::Database(format!("Invalid GSTIN '{}': {}", value, e)))
    })
    .transpose()
}

fn row_to_client(row: &SqliteRow) -> Result<Client, RepositoryError> {
    Ok(Client {
        id: row.try_get("id").map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        gstin: get_optional_gstin(row, "gstin")?,
        state_code: get_state_code(row, "state_code")?,
        address: row.try_get("address").map_err(db_error)?,
        email: row.try_get("email").map_err(db_error)?,
        phone: row.try_get("phone").map_err(db_error)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

fn row_to_service_item(row: &SqliteRow) -> Result<ServiceItem, RepositoryError> {
    Ok(ServiceItem {
        id: row.try_get("id").map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        sac_code: row.try_get("sac_code").map_err(db_error)?,
        unit_price: get_decimal(row, "unit_price")?,
        tax_rate: get_decimal(row, "tax_rate")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

fn row_to_line(row: &SqliteRow) -> Result<TaxableLine, RepositoryError> {
    let description: String = row.try_get("description").map_err(db_error)?;
    let sac_code: Option<String> = row.try_get("sac_code").map_err(db_error)?;
    let line = TaxableLine::new(
        &description,
        get_decimal(row, "quantity")?,
        get_decimal(row, "unit_price")?,
        get_decimal(row, "tax_rate")?,
    )
    .map_err(|e| RepositoryError::Database(format!("Invalid stored line '{}': {}", description, e)))?;
    Ok(line.with_sac_code(sac_code))
}

fn row_to_invoice(
    row: &SqliteRow,
    lines: Vec<TaxableLine>,
) -> Result<Invoice, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(db_error)?;
    let tax_split = match (
        get_optional_decimal(row, "cgst")?,
        get_optional_decimal(row, "sgst")?,
        get_optional_decimal(row, "igst")?,
    ) {
        (Some(cgst), Some(sgst), None) if cgst == sgst => TaxSplit::IntraState { cgst, sgst },
        (None, None, Some(igst)) => TaxSplit::InterState { igst },
        _ => {
            return Err(RepositoryError::Database(format!(
                "Invoice {} has an inconsistent tax split",
                id
            )));
        }
    };

    Ok(Invoice {
        id,
        invoice_number: row.try_get("invoice_number").map_err(db_error)?,
        client_id: row.try_get("client_id").map_err(db_error)?,
        issue_date: row
            .try_get::<NaiveDate, _>("issue_date")
            .map_err(|e| RepositoryError::Database(format!("Failed to get issue_date: {}", e)))?,
        due_date: row
            .try_get::<Option<NaiveDate>, _>("due_date")
            .map_err(|e| RepositoryError::Database(format!("Failed to get due_date: {}", e)))?,
        seller_state_code: get_state_code(row, "seller_state_code")?,
        place_of_supply_code: get_state_code(row, "place_of_supply_code")?,
        lines,
        totals: InvoiceTotals {
            subtotal: get_decimal(row, "subtotal")?,
            total_tax: get_decimal(row, "total_tax")?,
            grand_total: get_decimal(row, "grand_total")?,
        },
        tax_split,
        notes: row.try_get("notes").map_err(db_error)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

async fn insert_lines(
    tx: &mut Transaction<'_, Sqlite>,
    invoice_id: i64,
    lines: &[TaxableLine],
) -> Result<(), RepositoryError> {
    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO invoice_lines (
                invoice_id, position, description, sac_code, quantity, unit_price, tax_rate
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(invoice_id)
        .bind(position as i64)
        .bind(line.description())
        .bind(line.sac_code())
        .bind(decimal_to_text(line.quantity()))
        .bind(decimal_to_text(line.unit_price()))
        .bind(decimal_to_text(line.tax_rate()))
        .execute(&mut **tx)
        .await
        .map_err(db_error)?;
    }
    Ok(())
}

#[async_trait]
impl InvoiceRepository for SqliteRepository {
    async fn get_business_profile(&self) -> Result<BusinessProfile, RepositoryError> {
        let row = sqlx::query(
            "SELECT business_name, gstin, state_code, address, email, phone,
                    bank_account_name, bank_account_number, bank_ifsc, upi_id
             FROM business_profile WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        let bank = match (
            row.try_get::<Option<String>, _>("bank_account_name").map_err(db_error)?,
            row.try_get::<Option<String>, _>("bank_account_number").map_err(db_error)?,
            row.try_get::<Option<String>, _>("bank_ifsc").map_err(db_error)?,
        ) {
            (Some(account_name), Some(account_number), Some(ifsc)) => Some(BankDetails {
                account_name,
                account_number,
                ifsc,
            }),
            _ => None,
        };

        Ok(BusinessProfile {
            business_name: row.try_get("business_name").map_err(db_error)?,
            gstin: get_optional_gstin(&row, "gstin")?,
            state_code: get_state_code(&row, "state_code")?,
            address: row.try_get("address").map_err(db_error)?,
            email: row.try_get("email").map_err(db_error)?,
            phone: row.try_get("phone").map_err(db_error)?,
            bank,
            upi_id: row.try_get("upi_id").map_err(db_error)?,
        })
    }

    async fn save_business_profile(
        &self,
        profile: &BusinessProfile,
    ) -> Result<(), RepositoryError> {
        let bank = profile.bank.as_ref();

        sqlx::query(
            "INSERT INTO business_profile (
                id, business_name, gstin, state_code, address, email, phone,
                bank_account_name, bank_account_number, bank_ifsc, upi_id, updated_at
            ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                business_name = excluded.business_name,
                gstin = excluded.gstin,
                state_code = excluded.state_code,
                address = excluded.address,
                email = excluded.email,
                phone = excluded.phone,
                bank_account_name = excluded.bank_account_name,
                bank_account_number = excluded.bank_account_number,
                bank_ifsc = excluded.bank_ifsc,
                upi_id = excluded.upi_id,
                updated_at = excluded.updated_at",
        )
        .bind(&profile.business_name)
        .bind(profile.gstin.as_ref().map(Gstin::as_str))
        .bind(i64::from(profile.state_code))
        .bind(&profile.address)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(bank.map(|b| b.account_name.as_str()))
        .bind(bank.map(|b| b.account_number.as_str()))
        .bind(bank.map(|b| b.ifsc.as_str()))
        .bind(&profile.upi_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        debug!(business_name = %profile.business_name, "saved business profile");
        Ok(())
    }

    async fn create_client(
        &self,
        client: NewClient,
    ) -> Result<Client, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO clients (name, gstin, state_code, address, email, phone, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&client.name)
        .bind(client.gstin.as_ref().map(Gstin::as_str))
        .bind(i64::from(client.state_code))
        .bind(&client.address)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_rowid();
        self.get_client(id).await
    }

    async fn get_client(
        &self,
        id: i64,
    ) -> Result<Client, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, gstin, state_code, address, email, phone, created_at
             FROM clients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_client(&row)
    }

    async fn update_client(
        &self,
        client: &Client,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE clients SET
                name = ?, gstin = ?, state_code = ?, address = ?, email = ?, phone = ?
             WHERE id = ?",
        )
        .bind(&client.name)
        .bind(client.gstin.as_ref().map(Gstin::as_str))
        .bind(i64::from(client.state_code))
        .bind(&client.address)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_client(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, gstin, state_code, address, email, phone, created_at
             FROM clients ORDER BY name COLLATE NOCASE, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_client).collect()
    }

    async fn create_service_item(
        &self,
        item: NewServiceItem,
    ) -> Result<ServiceItem, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO service_items (name, sac_code, unit_price, tax_rate, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&item.name)
        .bind(&item.sac_code)
        .bind(decimal_to_text(item.unit_price))
        .bind(decimal_to_text(item.tax_rate))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_rowid();
        self.get_service_item(id).await
    }

    async fn get_service_item(
        &self,
        id: i64,
    ) -> Result<ServiceItem, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, sac_code, unit_price, tax_rate, created_at
             FROM service_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_service_item(&row)
    }

    async fn update_service_item(
        &self,
        item: &ServiceItem,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE service_items SET name = ?, sac_code = ?, unit_price = ?, tax_rate = ?
             WHERE id = ?",
        )
        .bind(&item.name)
        .bind(&item.sac_code)
        .bind(decimal_to_text(item.unit_price))
        .bind(decimal_to_text(item.tax_rate))
        .bind(item.id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_service_item(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM service_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_service_items(&self) -> Result<Vec<ServiceItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, sac_code, unit_price, tax_rate, created_at
             FROM service_items ORDER BY name COLLATE NOCASE, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(row_to_service_item).collect()
    }

    async fn create_invoice(
        &self,
        invoice: NewInvoice,
    ) -> Result<Invoice, RepositoryError> {
        let split = invoice.tax_split;
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let result = sqlx::query(
            "INSERT INTO invoices (
                invoice_number, client_id, issue_date, due_date,
                seller_state_code, place_of_supply_code,
                subtotal, total_tax, grand_total, cgst, sgst, igst,
                notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&invoice.invoice_number)
        .bind(invoice.client_id)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(i64::from(invoice.seller_state_code))
        .bind(i64::from(invoice.place_of_supply_code))
        .bind(decimal_to_text(invoice.totals.subtotal))
        .bind(decimal_to_text(invoice.totals.total_tax))
        .bind(decimal_to_text(invoice.totals.grand_total))
        .bind(split.cgst().map(decimal_to_text))
        .bind(split.sgst().map(decimal_to_text))
        .bind(split.igst().map(decimal_to_text))
        .bind(&invoice.notes)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        let id = result.last_insert_rowid();
        insert_lines(&mut tx, id, &invoice.lines).await?;
        tx.commit().await.map_err(db_error)?;

        debug!(
            id,
            invoice_number = %invoice.invoice_number,
            lines = invoice.lines.len(),
            "stored invoice"
        );
        self.get_invoice(id).await
    }

    async fn get_invoice(
        &self,
        id: i64,
    ) -> Result<Invoice, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM invoices WHERE id = ?", INVOICE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(RepositoryError::NotFound)?;

        self.load_invoice(&row).await
    }

    async fn get_invoice_by_number(
        &self,
        invoice_number: &str,
    ) -> Result<Invoice, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invoices WHERE invoice_number = ?",
            INVOICE_COLUMNS
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(RepositoryError::NotFound)?;

        self.load_invoice(&row).await
    }

    async fn delete_invoice(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("DELETE FROM invoice_lines WHERE invoice_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn list_invoices(
        &self,
        client_id: Option<i64>,
    ) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = match client_id {
            Some(client_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM invoices WHERE client_id = ? ORDER BY issue_date DESC, id DESC",
                    INVOICE_COLUMNS
                ))
                .bind(client_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM invoices ORDER BY issue_date DESC, id DESC",
                    INVOICE_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_error)?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in &rows {
            invoices.push(self.load_invoice(row).await?);
        }
        Ok(invoices)
    }

    async fn latest_invoice_number(
        &self,
        prefix: &str,
    ) -> Result<Option<String>, RepositoryError> {
        // Compares suffixes numerically: leading zeros stripped, then by length.
        let row = sqlx::query(
            "SELECT invoice_number FROM (
                SELECT invoice_number,
                       ltrim(substr(invoice_number, length(?1) + 2), '0') AS seq
                FROM invoices
                WHERE substr(invoice_number, 1, length(?1) + 1) = ?1 || '-'
                  AND length(invoice_number) > length(?1) + 1
                  AND substr(invoice_number, length(?1) + 2) NOT GLOB '*[^0-9]*'
            )
            ORDER BY length(seq) DESC, seq DESC
            LIMIT 1",
        )
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(|row| row.try_get("invoice_number").map_err(db_error))
            .transpose()
    }
}
