//! End-to-end flow through the library: settings file, repository from the
//! backend registry, profile, client, invoice, rendered document.

use std::path::PathBuf;

use chrono::NaiveDate;
use gst_app::app::{self, InvoiceRequest, LineSpec};
use gst_app::config::AppConfig;
use gst_core::{BusinessProfile, Gstin, JurisdictionRegistry, NewClient};
use rust_decimal_macros::dec;

fn write_config(
    name: &str,
    contents: &str,
) -> PathBuf {
    let path = std::env::temp_dir().join(format!("gst-invoice-{}-{name}.toml", std::process::id()));
    std::fs::write(&path, contents).expect("temp config is writable");
    path
}

#[tokio::test]
async fn configured_prefix_and_terms_flow_into_the_invoice() {
    let path = write_config(
        "flow",
        r#"
        [database]
        connection_string = ":memory:"

        [invoice]
        prefix = "ARS"
        payment_terms_days = 30
        "#,
    );
    let config = AppConfig::load(&path, true).expect("config loads");
    let _ = std::fs::remove_file(&path);

    let repo = app::build_registry()
        .create(&config.db_config())
        .await
        .expect("in-memory repository");
    let repo = &*repo;
    let registry = JurisdictionRegistry::india();

    app::save_profile(
        repo,
        &registry,
        &BusinessProfile {
            business_name: "Asha Rao Studio".to_string(),
            gstin: Some(Gstin::parse("29ABCDE1234F1ZW").unwrap()),
            state_code: 29,
            address: None,
            email: None,
            phone: None,
            bank: None,
            upi_id: None,
        },
    )
    .await
    .unwrap();
    let client = app::add_client(
        repo,
        &registry,
        NewClient {
            name: "Hindustan Retail".to_string(),
            gstin: Some(Gstin::parse("07AAACH7409R1Z3").unwrap()),
            state_code: 7,
            address: None,
            email: None,
            phone: None,
        },
    )
    .await
    .unwrap();

    let lines: Vec<LineSpec> = ["Site audit:1:1,00,000:18", "Travel:1:5000:0"]
        .iter()
        .map(|spec| spec.parse().unwrap())
        .collect();
    let invoice = app::create_invoice(
        repo,
        &registry,
        &config.invoice,
        InvoiceRequest {
            client_id: client.id,
            issue_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            lines,
            notes: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(invoice.invoice_number, "ARS-0001");
    assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2025, 4, 14));
    assert_eq!(invoice.totals.subtotal, dec!(105000));
    assert_eq!(invoice.tax_split.igst(), Some(dec!(18000)));

    let text = app::show_invoice(repo, &registry, "ARS-0001").await.unwrap();

    assert!(text.contains("Place of Supply: Delhi (07)"));
    assert!(text.contains("GSTIN: 07AAACH7409R1Z3"));
    assert!(text.contains("₹1,23,000.00"));
}

#[test]
fn invalid_prefix_in_file_is_rejected() {
    let path = write_config(
        "bad-prefix",
        r#"
        [invoice]
        prefix = ""
        "#,
    );

    let result = AppConfig::load(&path, true);
    let _ = std::fs::remove_file(&path);

    assert!(result.is_err());
}
