use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;

use gst_app::app::{self, InvoiceRequest, LineSpec};
use gst_app::config::{AppConfig, DEFAULT_CONFIG_FILE};
use gst_app::logging;
use gst_app::utils::parse_decimal;
use gst_core::{BankDetails, BusinessProfile, Gstin, JurisdictionRegistry, NewClient, NewServiceItem};

/// GST invoicing for freelancers: clients, a service catalogue and invoices
/// with CGST/SGST or IGST breakdowns.
#[derive(Debug, Parser)]
#[command(name = "gst-invoice", version, about)]
struct Cli {
    /// Settings file. Defaults to `gst-invoice.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database connection string; overrides the settings file.
    /// For SQLite this is a file path (e.g. `invoices.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log filter, e.g. `debug` or `gst_core=trace`; overrides the settings file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List GST state codes.
    States,
    /// Compute the tax on one amount.
    Quote {
        /// Taxable amount, e.g. `1,25,000` or `1000.50`.
        #[arg(value_parser = parse_decimal)]
        amount: Decimal,
        /// GST rate in percent.
        #[arg(long, value_parser = parse_decimal)]
        rate: Decimal,
        /// Seller's state code.
        #[arg(long)]
        from: u8,
        /// Place of supply state code.
        #[arg(long)]
        to: u8,
    },
    /// The business profile printed on every invoice.
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Clients invoices are raised to.
    Client {
        #[command(subcommand)]
        action: ClientCommand,
    },
    /// The reusable service catalogue.
    Item {
        #[command(subcommand)]
        action: ItemCommand,
    },
    /// Create, print and list invoices.
    Invoice {
        #[command(subcommand)]
        action: InvoiceCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    Show,
    Set(ProfileArgs),
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[arg(long)]
    name: String,
    /// Home state code; the seller side of every tax split.
    #[arg(long)]
    state: u8,
    #[arg(long)]
    gstin: Option<Gstin>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long, requires_all = ["account_number", "ifsc"])]
    account_name: Option<String>,
    #[arg(long, requires_all = ["account_name", "ifsc"])]
    account_number: Option<String>,
    #[arg(long, requires_all = ["account_name", "account_number"])]
    ifsc: Option<String>,
    #[arg(long)]
    upi: Option<String>,
}

impl ProfileArgs {
    fn into_profile(self) -> BusinessProfile {
        let bank = match (self.account_name, self.account_number, self.ifsc) {
            (Some(account_name), Some(account_number), Some(ifsc)) => Some(BankDetails {
                account_name,
                account_number,
                ifsc: ifsc.trim().to_ascii_uppercase(),
            }),
            _ => None,
        };
        BusinessProfile {
            business_name: self.name,
            gstin: self.gstin,
            state_code: self.state,
            address: self.address,
            email: self.email,
            phone: self.phone,
            bank,
            upi_id: self.upi,
        }
    }
}

#[derive(Debug, Subcommand)]
enum ClientCommand {
    Add {
        #[arg(long)]
        name: String,
        /// Place of supply for this client's invoices.
        #[arg(long)]
        state: u8,
        #[arg(long)]
        gstin: Option<Gstin>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    List,
}

#[derive(Debug, Subcommand)]
enum ItemCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        sac: Option<String>,
        #[arg(long, value_parser = parse_decimal)]
        price: Decimal,
        #[arg(long, value_parser = parse_decimal)]
        rate: Decimal,
    },
    List,
}

#[derive(Debug, Subcommand)]
enum InvoiceCommand {
    /// Draft, finalize and save an invoice.
    Create {
        #[arg(long)]
        client: i64,
        /// `ITEM_ID[:QTY]` or `DESCRIPTION:QTY:PRICE:RATE`. Repeatable.
        #[arg(long = "line", required = true)]
        lines: Vec<LineSpec>,
        /// Issue date (YYYY-MM-DD); today when omitted.
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Print a saved invoice.
    Show { number: String },
    List {
        #[arg(long)]
        client: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging("info");

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = AppConfig::load(&config_path, cli.config.is_some())?;
    if let Some(db) = cli.db {
        config.database.connection_string = db;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if !logging::env_filter_overrides() {
        logging::set_log_level(&config.logging.level)?;
    }
    if let Some(file) = &config.logging.file {
        logging::enable_file_logging(file)?;
    }

    let jurisdictions = JurisdictionRegistry::india();

    let command = match cli.command {
        Command::States => {
            print!("{}", app::list_states(&jurisdictions));
            return Ok(());
        }
        Command::Quote {
            amount,
            rate,
            from,
            to,
        } => {
            print!("{}", app::quote(&jurisdictions, amount, rate, from, to)?);
            return Ok(());
        }
        command => command,
    };

    let db_config = config.db_config();
    debug!("connecting to {} backend", db_config.backend);
    let repo = app::build_registry()
        .create(&db_config)
        .await
        .with_context(|| format!("Failed to open database '{}'", db_config.connection_string))?;
    let repo = &*repo;

    match command {
        Command::Profile { action } => match action {
            ProfileCommand::Show => print!("{}", app::show_profile(repo, &jurisdictions).await?),
            ProfileCommand::Set(args) => {
                app::save_profile(repo, &jurisdictions, &args.into_profile()).await?;
                println!("Business profile saved.");
            }
        },
        Command::Client { action } => match action {
            ClientCommand::Add {
                name,
                state,
                gstin,
                address,
                email,
                phone,
            } => {
                let client = app::add_client(
                    repo,
                    &jurisdictions,
                    NewClient {
                        name,
                        gstin,
                        state_code: state,
                        address,
                        email,
                        phone,
                    },
                )
                .await?;
                println!("Added client {} ({})", client.id, client.name);
            }
            ClientCommand::List => print!("{}", app::list_clients(repo).await?),
        },
        Command::Item { action } => match action {
            ItemCommand::Add {
                name,
                sac,
                price,
                rate,
            } => {
                let item = app::add_item(
                    repo,
                    NewServiceItem {
                        name,
                        sac_code: sac,
                        unit_price: price,
                        tax_rate: rate,
                    },
                )
                .await?;
                println!("Added service item {} ({})", item.id, item.name);
            }
            ItemCommand::List => print!("{}", app::list_items(repo).await?),
        },
        Command::Invoice { action } => match action {
            InvoiceCommand::Create {
                client,
                lines,
                date,
                notes,
            } => {
                let invoice = app::create_invoice(
                    repo,
                    &jurisdictions,
                    &config.invoice,
                    InvoiceRequest {
                        client_id: client,
                        issue_date: date.unwrap_or_else(|| Local::now().date_naive()),
                        lines,
                        notes,
                    },
                )
                .await?;
                print!(
                    "{}",
                    app::show_invoice(repo, &jurisdictions, &invoice.invoice_number).await?
                );
            }
            InvoiceCommand::Show { number } => {
                print!("{}", app::show_invoice(repo, &jurisdictions, &number).await?)
            }
            InvoiceCommand::List { client } => {
                print!("{}", app::list_invoices(repo, client).await?)
            }
        },
        Command::States | Command::Quote { .. } => {}
    }

    Ok(())
}
