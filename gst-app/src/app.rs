//! Operations behind each `gst-invoice` subcommand.
//!
//! Everything here works against `&dyn InvoiceRepository` so the binary and
//! the tests share one code path. Listing and display functions return the
//! text to print; the caller owns stdout.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate};
use gst_core::db::RepositoryRegistry;
use gst_core::{
    BusinessProfile, Client, Invoice, InvoiceAggregate, InvoiceRepository, JurisdictionRegistry,
    NewClient, NewServiceItem, RepositoryError, ServiceItem, TaxableLine, compute_tax,
    next_invoice_number,
};
use gst_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::InvoiceConfig;
use crate::render::render_invoice;
use crate::utils::{format_inr, format_rate, is_valid_ifsc, parse_decimal};

/// Registry with every backend this binary ships with.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// One row per jurisdiction: `07  Delhi`.
pub fn list_states(registry: &JurisdictionRegistry) -> String {
    registry
        .iter()
        .map(|j| format!("{}  {}\n", j.padded_code(), j.name()))
        .collect()
}

/// Tax on a single amount, without touching the database.
pub fn quote(
    registry: &JurisdictionRegistry,
    amount: Decimal,
    rate: Decimal,
    seller_code: u8,
    place_of_supply_code: u8,
) -> Result<String> {
    let seller = registry.require(seller_code)?;
    let place_of_supply = registry.require(place_of_supply_code)?;
    let breakdown = compute_tax(amount, rate, seller, place_of_supply)?.rounded();

    let mut out = vec![
        format!("Seller:          {seller}"),
        format!("Place of supply: {place_of_supply}"),
        format!("{:<16} {:>16}", "Taxable amount", format_inr(breakdown.taxable_amount())),
    ];
    let half_rate = format_rate(rate / Decimal::TWO);
    if let (Some(cgst), Some(sgst)) = (breakdown.cgst(), breakdown.sgst()) {
        out.push(format!("{:<16} {:>16}", format!("CGST @ {half_rate}"), format_inr(cgst)));
        out.push(format!("{:<16} {:>16}", format!("SGST @ {half_rate}"), format_inr(sgst)));
    }
    if let Some(igst) = breakdown.igst() {
        out.push(format!(
            "{:<16} {:>16}",
            format!("IGST @ {}", format_rate(rate)),
            format_inr(igst)
        ));
    }
    out.push(format!("{:<16} {:>16}", "Total", format_inr(breakdown.total())));
    Ok(out.join("\n") + "\n")
}

async fn require_profile(repo: &dyn InvoiceRepository) -> Result<BusinessProfile> {
    match repo.get_business_profile().await {
        Ok(profile) => Ok(profile),
        Err(RepositoryError::NotFound) => {
            bail!("no business profile saved yet; run `gst-invoice profile set` first")
        }
        Err(e) => Err(e).context("Failed to load business profile"),
    }
}

pub async fn show_profile(
    repo: &dyn InvoiceRepository,
    registry: &JurisdictionRegistry,
) -> Result<String> {
    let profile = require_profile(repo).await?;

    let mut out = vec![format!("Business: {}", profile.business_name)];
    out.push(format!(
        "GSTIN:    {}",
        profile
            .gstin
            .as_ref()
            .map_or_else(|| "Unregistered".to_string(), ToString::to_string)
    ));
    out.push(format!(
        "State:    {}",
        registry
            .lookup(profile.state_code)
            .map_or_else(|| format!("{:02}", profile.state_code), ToString::to_string)
    ));
    for (label, value) in [
        ("Address", &profile.address),
        ("Email", &profile.email),
        ("Phone", &profile.phone),
        ("UPI", &profile.upi_id),
    ] {
        if let Some(value) = value {
            out.push(format!("{:<9} {value}", format!("{label}:")));
        }
    }
    if let Some(bank) = &profile.bank {
        out.push(format!(
            "Bank:     {} / {} / {}",
            bank.account_name, bank.account_number, bank.ifsc
        ));
    }
    Ok(out.join("\n") + "\n")
}

pub async fn save_profile(
    repo: &dyn InvoiceRepository,
    registry: &JurisdictionRegistry,
    profile: &BusinessProfile,
) -> Result<()> {
    profile.validate(registry).context("Invalid business profile")?;
    if let Some(bank) = &profile.bank {
        if !is_valid_ifsc(&bank.ifsc) {
            bail!("invalid IFSC '{}'", bank.ifsc);
        }
    }
    repo.save_business_profile(profile)
        .await
        .context("Failed to save business profile")?;
    info!(business_name = %profile.business_name, "business profile saved");
    Ok(())
}

pub async fn add_client(
    repo: &dyn InvoiceRepository,
    registry: &JurisdictionRegistry,
    client: NewClient,
) -> Result<Client> {
    client.validate(registry).context("Invalid client")?;
    let client = repo
        .create_client(client)
        .await
        .context("Failed to save client")?;
    info!(id = client.id, name = %client.name, "client added");
    Ok(client)
}

pub async fn list_clients(repo: &dyn InvoiceRepository) -> Result<String> {
    let clients = repo.list_clients().await.context("Failed to list clients")?;
    Ok(clients
        .iter()
        .map(|c| {
            format!(
                "{:>4}  {:<30} {:<15}  {:02}\n",
                c.id,
                c.name,
                c.gstin.as_ref().map_or("-", |g| g.as_str()),
                c.state_code
            )
        })
        .collect())
}

pub async fn add_item(
    repo: &dyn InvoiceRepository,
    item: NewServiceItem,
) -> Result<ServiceItem> {
    item.validate().context("Invalid service item")?;
    let item = repo
        .create_service_item(item)
        .await
        .context("Failed to save service item")?;
    info!(id = item.id, name = %item.name, "service item added");
    Ok(item)
}

pub async fn list_items(repo: &dyn InvoiceRepository) -> Result<String> {
    let items = repo
        .list_service_items()
        .await
        .context("Failed to list service items")?;
    Ok(items
        .iter()
        .map(|item| {
            format!(
                "{:>4}  {:<32} {:<8} {:>14} {:>6}\n",
                item.id,
                item.name,
                item.sac_code.as_deref().unwrap_or("-"),
                format_inr(item.unit_price),
                format_rate(item.tax_rate)
            )
        })
        .collect())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineSpecError {
    #[error("line spec '{0}' must be ITEM_ID[:QTY] or DESCRIPTION:QTY:PRICE:RATE")]
    Shape(String),

    #[error("line spec '{spec}': invalid {field} '{value}'")]
    Number {
        spec: String,
        field: &'static str,
        value: String,
    },
}

/// One `--line` argument of `invoice create`.
///
/// * `3` or `3:2.5`: catalogue item 3, quantity 1 or 2.5.
/// * `Site audit:1:25000:18`: a one-off line. The description may itself
///   contain colons; the last three fields are split off the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSpec {
    Catalogue {
        item_id: i64,
        quantity: Decimal,
    },
    Custom {
        description: String,
        quantity: Decimal,
        unit_price: Decimal,
        tax_rate: Decimal,
    },
}

fn spec_number(
    spec: &str,
    field: &'static str,
    value: &str,
) -> Result<Decimal, LineSpecError> {
    let error = || LineSpecError::Number {
        spec: spec.to_string(),
        field,
        value: value.to_string(),
    };
    if value.trim().is_empty() {
        return Err(error());
    }
    parse_decimal(value).map_err(|_| error())
}

impl FromStr for LineSpec {
    type Err = LineSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, quantity) = match s.split_once(':') {
            Some((head, rest)) => (head, Some(rest)),
            None => (s, None),
        };
        if let Ok(item_id) = head.trim().parse::<i64>() {
            if quantity.is_none_or(|q| !q.contains(':')) {
                let quantity = match quantity {
                    Some(q) => spec_number(s, "quantity", q)?,
                    None => Decimal::ONE,
                };
                return Ok(Self::Catalogue { item_id, quantity });
            }
        }

        let mut fields = s.rsplitn(4, ':');
        let (Some(rate), Some(price), Some(quantity), Some(description)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(LineSpecError::Shape(s.to_string()));
        };
        if description.trim().is_empty() {
            return Err(LineSpecError::Shape(s.to_string()));
        }

        Ok(Self::Custom {
            description: description.trim().to_string(),
            quantity: spec_number(s, "quantity", quantity)?,
            unit_price: spec_number(s, "price", price)?,
            tax_rate: spec_number(s, "rate", rate.trim().trim_end_matches('%'))?,
        })
    }
}

async fn resolve_line(
    repo: &dyn InvoiceRepository,
    spec: &LineSpec,
) -> Result<TaxableLine> {
    match spec {
        LineSpec::Catalogue { item_id, quantity } => {
            let item = repo
                .get_service_item(*item_id)
                .await
                .with_context(|| format!("Failed to load service item {item_id}"))?;
            item.to_line(*quantity)
                .with_context(|| format!("Invalid line for '{}'", item.name))
        }
        LineSpec::Custom {
            description,
            quantity,
            unit_price,
            tax_rate,
        } => TaxableLine::new(description.as_str(), *quantity, *unit_price, *tax_rate)
            .with_context(|| format!("Invalid line '{description}'")),
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub client_id: i64,
    pub issue_date: NaiveDate,
    pub lines: Vec<LineSpec>,
    pub notes: Option<String>,
}

/// Drafts, finalizes and stores an invoice for `request.client_id`.
///
/// The seller's home state and the client's state fix the tax regime for
/// every line. The number continues the configured prefix's sequence.
pub async fn create_invoice(
    repo: &dyn InvoiceRepository,
    registry: &JurisdictionRegistry,
    config: &InvoiceConfig,
    request: InvoiceRequest,
) -> Result<Invoice> {
    let profile = require_profile(repo).await?;
    let seller = profile
        .home_jurisdiction(registry)
        .context("Business profile has an unknown state code")?
        .clone();

    let client = repo
        .get_client(request.client_id)
        .await
        .with_context(|| format!("Failed to load client {}", request.client_id))?;
    let place_of_supply = registry
        .require(client.state_code)
        .with_context(|| format!("Client '{}' has an unknown state code", client.name))?
        .clone();

    let mut draft = InvoiceAggregate::new(seller, place_of_supply);
    for spec in &request.lines {
        draft.push_line(resolve_line(repo, spec).await?);
    }
    debug!(
        client = %client.name,
        lines = draft.lines().len(),
        kind = ?draft.supply_kind(),
        "drafted invoice"
    );

    let latest = repo
        .latest_invoice_number(&config.prefix)
        .await
        .context("Failed to read the latest invoice number")?;
    let invoice_number = next_invoice_number(&config.prefix, latest.as_deref())?;

    let due_date = match config.payment_terms_days {
        0 => None,
        days => Some(
            request
                .issue_date
                .checked_add_days(Days::new(u64::from(days)))
                .context("Due date is out of range")?,
        ),
    };

    let new_invoice = draft.finalize(
        invoice_number,
        client.id,
        request.issue_date,
        due_date,
        request.notes,
    )?;
    let invoice = repo
        .create_invoice(new_invoice)
        .await
        .context("Failed to save invoice")?;

    info!(
        invoice_number = %invoice.invoice_number,
        grand_total = %invoice.totals.grand_total,
        "invoice created"
    );
    Ok(invoice)
}

/// The rendered document for `invoice_number`.
pub async fn show_invoice(
    repo: &dyn InvoiceRepository,
    registry: &JurisdictionRegistry,
    invoice_number: &str,
) -> Result<String> {
    let invoice = match repo.get_invoice_by_number(invoice_number).await {
        Ok(invoice) => invoice,
        Err(RepositoryError::NotFound) => bail!("invoice {invoice_number} not found"),
        Err(e) => return Err(e).context("Failed to load invoice"),
    };
    let profile = require_profile(repo).await?;
    let client = repo
        .get_client(invoice.client_id)
        .await
        .with_context(|| format!("Failed to load client {}", invoice.client_id))?;

    render_invoice(&invoice, &profile, &client, registry)
        .with_context(|| format!("Failed to render invoice {invoice_number}"))
}

pub async fn list_invoices(
    repo: &dyn InvoiceRepository,
    client_id: Option<i64>,
) -> Result<String> {
    let invoices = repo
        .list_invoices(client_id)
        .await
        .context("Failed to list invoices")?;
    let names: HashMap<i64, String> = repo
        .list_clients()
        .await
        .context("Failed to list clients")?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    Ok(invoices
        .iter()
        .map(|invoice| {
            format!(
                "{:<12} {}  {:<30} {:>16}\n",
                invoice.invoice_number,
                invoice.issue_date.format("%Y-%m-%d"),
                names.get(&invoice.client_id).map_or("?", String::as_str),
                format_inr(invoice.totals.grand_total)
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use gst_core::db::DbConfig;
    use gst_core::{BankDetails, Gstin, TaxSplit};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn repo() -> Box<dyn InvoiceRepository> {
        build_registry()
            .create(&DbConfig::default())
            .await
            .expect("in-memory repository")
    }

    fn profile() -> BusinessProfile {
        BusinessProfile {
            business_name: "Asha Rao Studio".to_string(),
            gstin: Some(Gstin::parse("29ABCDE1234F1ZW").unwrap()),
            state_code: 29,
            address: None,
            email: None,
            phone: None,
            bank: None,
            upi_id: None,
        }
    }

    fn new_client(
        name: &str,
        state_code: u8,
    ) -> NewClient {
        NewClient {
            name: name.to_string(),
            gstin: None,
            state_code,
            address: None,
            email: None,
            phone: None,
        }
    }

    fn april_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    fn custom(
        description: &str,
        quantity: Decimal,
        unit_price: Decimal,
        tax_rate: Decimal,
    ) -> LineSpec {
        LineSpec::Custom {
            description: description.to_string(),
            quantity,
            unit_price,
            tax_rate,
        }
    }

    #[test]
    fn line_spec_parses_catalogue_references() {
        assert_eq!(
            "3".parse::<LineSpec>(),
            Ok(LineSpec::Catalogue { item_id: 3, quantity: dec!(1) })
        );
        assert_eq!(
            "3:2.5".parse::<LineSpec>(),
            Ok(LineSpec::Catalogue { item_id: 3, quantity: dec!(2.5) })
        );
    }

    #[test]
    fn line_spec_parses_custom_lines_from_the_right() {
        assert_eq!(
            "Audit: phase 1:1:25,000:18%".parse::<LineSpec>(),
            Ok(custom("Audit: phase 1", dec!(1), dec!(25000), dec!(18)))
        );
        assert_eq!(
            "2024 retainer:1:500:0".parse::<LineSpec>(),
            Ok(custom("2024 retainer", dec!(1), dec!(500), dec!(0)))
        );
    }

    #[test]
    fn line_spec_rejects_bad_input() {
        assert_eq!(
            "Design:2".parse::<LineSpec>(),
            Err(LineSpecError::Shape("Design:2".to_string()))
        );
        assert!(matches!(
            "3:".parse::<LineSpec>(),
            Err(LineSpecError::Number { field: "quantity", .. })
        ));
        assert!(matches!(
            "Design:1:abc:18".parse::<LineSpec>(),
            Err(LineSpecError::Number { field: "price", .. })
        ));
    }

    #[test]
    fn quote_intra_state_splits_half_rates() {
        let registry = JurisdictionRegistry::india();

        let text = quote(&registry, dec!(1000), dec!(18), 29, 29).unwrap();

        assert!(text.contains("CGST @ 9%"));
        assert!(text.contains("SGST @ 9%"));
        assert!(!text.contains("IGST"));
        assert!(text.trim_end().ends_with("₹1,180.00"));
    }

    #[test]
    fn quote_inter_state_uses_igst() {
        let registry = JurisdictionRegistry::india();

        let text = quote(&registry, dec!(1000), dec!(18), 29, 27).unwrap();

        assert!(text.contains("Place of supply: Maharashtra (27)"));
        assert!(text.contains("IGST @ 18%"));
        assert!(text.contains("₹180.00"));
    }

    #[test]
    fn quote_rejects_unknown_state() {
        let registry = JurisdictionRegistry::india();

        let err = quote(&registry, dec!(1000), dec!(18), 29, 28).unwrap_err();

        assert_eq!(err.to_string(), "unknown jurisdiction code 28");
    }

    #[test]
    fn list_states_has_one_row_per_code() {
        let registry = JurisdictionRegistry::india();

        let text = list_states(&registry);

        assert_eq!(text.lines().count(), registry.len());
        assert!(text.lines().any(|line| line == "07  Delhi"));
    }

    #[tokio::test]
    async fn invoice_needs_a_profile() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        let client = add_client(&*repo, &registry, new_client("Meera Textiles", 29))
            .await
            .unwrap();

        let err = create_invoice(
            &*repo,
            &registry,
            &InvoiceConfig::default(),
            InvoiceRequest {
                client_id: client.id,
                issue_date: april_first(),
                lines: vec![custom("Design", dec!(1), dec!(1000), dec!(18))],
                notes: None,
            },
        )
        .await
        .unwrap_err();

        assert!(err.to_string().starts_with("no business profile"));
    }

    #[tokio::test]
    async fn save_profile_rejects_bad_ifsc() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        let mut profile = profile();
        profile.bank = Some(BankDetails {
            account_name: "Asha Rao".to_string(),
            account_number: "001234567890".to_string(),
            ifsc: "HDFC1234".to_string(),
        });

        let err = save_profile(&*repo, &registry, &profile).await.unwrap_err();

        assert_eq!(err.to_string(), "invalid IFSC 'HDFC1234'");
    }

    #[tokio::test]
    async fn saved_profile_is_shown() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        let mut profile = profile();
        profile.upi_id = Some("asha@okhdfc".to_string());
        save_profile(&*repo, &registry, &profile).await.unwrap();

        let text = show_profile(&*repo, &registry).await.unwrap();

        assert_eq!(
            text,
            "Business: Asha Rao Studio\n\
             GSTIN:    29ABCDE1234F1ZW\n\
             State:    Karnataka (29)\n\
             UPI:      asha@okhdfc\n"
        );
    }

    #[tokio::test]
    async fn create_invoice_numbers_sequentially_and_splits_by_state() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        save_profile(&*repo, &registry, &profile()).await.unwrap();
        let local = add_client(&*repo, &registry, new_client("Meera Textiles", 29))
            .await
            .unwrap();
        let remote = add_client(&*repo, &registry, new_client("Pune Labs", 27))
            .await
            .unwrap();
        let config = InvoiceConfig::default();
        let lines = vec![
            custom("Design", dec!(2), dec!(500), dec!(18)),
            custom("Hosting", dec!(1), dec!(1000), dec!(0)),
        ];

        let first = create_invoice(
            &*repo,
            &registry,
            &config,
            InvoiceRequest {
                client_id: local.id,
                issue_date: april_first(),
                lines: lines.clone(),
                notes: None,
            },
        )
        .await
        .unwrap();
        let second = create_invoice(
            &*repo,
            &registry,
            &config,
            InvoiceRequest {
                client_id: remote.id,
                issue_date: april_first(),
                lines,
                notes: Some("Net 15".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(first.invoice_number, "INV-0001");
        assert_eq!(second.invoice_number, "INV-0002");
        assert_eq!(first.totals.grand_total, dec!(2180));
        assert_eq!(first.tax_split, TaxSplit::intra_state(dec!(180)));
        assert_eq!(second.tax_split, TaxSplit::inter_state(dec!(180)));
        assert_eq!(first.due_date, NaiveDate::from_ymd_opt(2025, 4, 16));
    }

    #[tokio::test]
    async fn zero_payment_terms_leave_due_date_unset() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        save_profile(&*repo, &registry, &profile()).await.unwrap();
        let client = add_client(&*repo, &registry, new_client("Meera Textiles", 29))
            .await
            .unwrap();
        let config = InvoiceConfig {
            prefix: "ARS".to_string(),
            payment_terms_days: 0,
        };

        let invoice = create_invoice(
            &*repo,
            &registry,
            &config,
            InvoiceRequest {
                client_id: client.id,
                issue_date: april_first(),
                lines: vec![custom("Design", dec!(1), dec!(1000), dec!(18))],
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(invoice.invoice_number, "ARS-0001");
        assert_eq!(invoice.due_date, None);
    }

    #[tokio::test]
    async fn switching_prefix_back_resumes_its_own_sequence() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        save_profile(&*repo, &registry, &profile()).await.unwrap();
        let client = add_client(&*repo, &registry, new_client("Meera Textiles", 29))
            .await
            .unwrap();
        let inv = InvoiceConfig::default();
        let ars = InvoiceConfig {
            prefix: "ARS".to_string(),
            ..InvoiceConfig::default()
        };

        let mut numbers = Vec::new();
        for config in [&inv, &inv, &ars, &inv, &ars] {
            let invoice = create_invoice(
                &*repo,
                &registry,
                config,
                InvoiceRequest {
                    client_id: client.id,
                    issue_date: april_first(),
                    lines: vec![custom("Design", dec!(1), dec!(1000), dec!(18))],
                    notes: None,
                },
            )
            .await
            .unwrap();
            numbers.push(invoice.invoice_number);
        }

        assert_eq!(numbers, vec!["INV-0001", "INV-0002", "ARS-0001", "INV-0003", "ARS-0002"]);
    }

    #[tokio::test]
    async fn catalogue_lines_use_item_price_and_rate() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        save_profile(&*repo, &registry, &profile()).await.unwrap();
        let client = add_client(&*repo, &registry, new_client("Meera Textiles", 29))
            .await
            .unwrap();
        let item = add_item(
            &*repo,
            NewServiceItem {
                name: "Brand workshop".to_string(),
                sac_code: Some("999293".to_string()),
                unit_price: dec!(12000),
                tax_rate: dec!(18),
            },
        )
        .await
        .unwrap();

        let invoice = create_invoice(
            &*repo,
            &registry,
            &InvoiceConfig::default(),
            InvoiceRequest {
                client_id: client.id,
                issue_date: april_first(),
                lines: vec![LineSpec::Catalogue { item_id: item.id, quantity: dec!(0.5) }],
                notes: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(invoice.lines[0].sac_code(), Some("999293"));
        assert_eq!(invoice.totals.subtotal, dec!(6000));
        assert_eq!(invoice.totals.total_tax, dec!(1080));
    }

    #[tokio::test]
    async fn empty_invoice_is_refused_and_nothing_is_stored() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        save_profile(&*repo, &registry, &profile()).await.unwrap();
        let client = add_client(&*repo, &registry, new_client("Meera Textiles", 29))
            .await
            .unwrap();

        let result = create_invoice(
            &*repo,
            &registry,
            &InvoiceConfig::default(),
            InvoiceRequest {
                client_id: client.id,
                issue_date: april_first(),
                lines: Vec::new(),
                notes: None,
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(list_invoices(&*repo, None).await.unwrap(), "");
    }

    #[tokio::test]
    async fn show_invoice_renders_stored_invoice() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();
        save_profile(&*repo, &registry, &profile()).await.unwrap();
        let client = add_client(&*repo, &registry, new_client("Pune Labs", 27))
            .await
            .unwrap();
        create_invoice(
            &*repo,
            &registry,
            &InvoiceConfig::default(),
            InvoiceRequest {
                client_id: client.id,
                issue_date: april_first(),
                lines: vec![custom("Design", dec!(1), dec!(1000), dec!(18))],
                notes: None,
            },
        )
        .await
        .unwrap();

        let text = show_invoice(&*repo, &registry, "INV-0001").await.unwrap();
        let listing = list_invoices(&*repo, Some(client.id)).await.unwrap();

        assert!(text.contains("Bill To: Pune Labs"));
        assert!(text.contains("Place of Supply: Maharashtra (27)"));
        assert!(listing.starts_with("INV-0001"));
        assert!(listing.contains("Pune Labs"));
        assert!(listing.trim_end().ends_with("₹1,180.00"));
    }

    #[tokio::test]
    async fn show_missing_invoice_names_the_number() {
        let repo = repo().await;
        let registry = JurisdictionRegistry::india();

        let err = show_invoice(&*repo, &registry, "INV-0099").await.unwrap_err();

        assert_eq!(err.to_string(), "invoice INV-0099 not found");
    }

    #[tokio::test]
    async fn seeded_catalogue_is_listed() {
        let repo = repo().await;

        let text = list_items(&*repo).await.unwrap();

        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("Software development (per hour)"));
    }
}
