//! Plain-text layout of a finalized invoice.
//!
//! Every figure comes from the stored [`Invoice`]; nothing is recomputed
//! from rates here. Money is rounded half-up to paise only when printed.

use gst_core::{BusinessProfile, Client, Gstin, Invoice, InvoiceError, JurisdictionRegistry, TaxSplit};
use rust_decimal::Decimal;

use crate::utils::{format_inr, format_rate};

const DATE_FORMAT: &str = "%d %b %Y";
const RULE_WIDTH: usize = 78;

/// `"Maharashtra (27)"`, or the bare padded code when the registry does not
/// know it.
fn jurisdiction_label(
    registry: &JurisdictionRegistry,
    code: u8,
) -> String {
    registry
        .lookup(code)
        .map_or_else(|| format!("{code:02}"), ToString::to_string)
}

fn push_party(
    out: &mut Vec<String>,
    heading: &str,
    name: &str,
    gstin: Option<&Gstin>,
    address: Option<&str>,
) {
    out.push(format!("{heading}: {name}"));
    if let Some(address) = address {
        for line in address.lines() {
            out.push(format!("  {}", line.trim()));
        }
    }
    match gstin {
        Some(gstin) => out.push(format!("  GSTIN: {gstin}")),
        None => out.push("  GSTIN: Unregistered".to_string()),
    }
}

fn push_amount(
    out: &mut Vec<String>,
    label: &str,
    amount: Decimal,
) {
    out.push(format!("{label:>58} {:>19}", format_inr(amount)));
}

/// Renders `invoice` issued by `seller` to `client`.
///
/// # Errors
///
/// [`InvoiceError::Overflow`] if the stored amounts cannot be summed.
pub fn render_invoice(
    invoice: &Invoice,
    seller: &BusinessProfile,
    client: &Client,
    registry: &JurisdictionRegistry,
) -> Result<String, InvoiceError> {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = Vec::new();

    out.push(format!("{:^RULE_WIDTH$}", "TAX INVOICE"));
    out.push(rule.clone());
    out.push(format!("Invoice No:   {}", invoice.invoice_number));
    out.push(format!("Invoice Date: {}", invoice.issue_date.format(DATE_FORMAT)));
    if let Some(due) = invoice.due_date {
        out.push(format!("Due Date:     {}", due.format(DATE_FORMAT)));
    }
    out.push(String::new());

    push_party(
        &mut out,
        "From",
        &seller.business_name,
        seller.gstin.as_ref(),
        seller.address.as_deref(),
    );
    out.push(format!(
        "  State: {}",
        jurisdiction_label(registry, invoice.seller_state_code)
    ));
    out.push(String::new());

    push_party(
        &mut out,
        "Bill To",
        &client.name,
        client.gstin.as_ref(),
        client.address.as_deref(),
    );
    out.push(format!(
        "  Place of Supply: {}",
        jurisdiction_label(registry, invoice.place_of_supply_code)
    ));
    out.push(String::new());

    out.push(format!(
        "{:>3}  {:<28} {:<8} {:>8} {:>12} {:>14}",
        "#", "Description", "SAC", "Qty", "Rate", "Amount"
    ));
    out.push(rule.clone());
    for (index, line) in invoice.lines.iter().enumerate() {
        out.push(format!(
            "{:>3}  {:<28} {:<8} {:>8} {:>12} {:>14}",
            index + 1,
            line.description(),
            line.sac_code().unwrap_or("-"),
            line.quantity().normalize(),
            format_inr(line.unit_price()),
            format_inr(line.taxable_amount()),
        ));
        out.push(format!("{:>5}GST @ {}", "", format_rate(line.tax_rate())));
    }
    out.push(rule.clone());

    out.push("Tax summary".to_string());
    match invoice.tax_split {
        TaxSplit::IntraState { .. } => out.push(format!(
            "{:>8} {:>16} {:>16} {:>16} {:>16}",
            "GST", "Taxable", "CGST", "SGST", "Total tax"
        )),
        TaxSplit::InterState { .. } => out.push(format!(
            "{:>8} {:>16} {:>16} {:>16}",
            "GST", "Taxable", "IGST", "Total tax"
        )),
    }
    for row in invoice.rate_summary()? {
        let breakdown = row.breakdown.rounded();
        let rate = format_rate(row.rate);
        let taxable = format_inr(breakdown.taxable_amount());
        let tax = format_inr(breakdown.tax());
        match (breakdown.cgst(), breakdown.sgst(), breakdown.igst()) {
            (Some(cgst), Some(sgst), _) => out.push(format!(
                "{rate:>8} {taxable:>16} {:>16} {:>16} {tax:>16}",
                format_inr(cgst),
                format_inr(sgst),
            )),
            (_, _, Some(igst)) => out.push(format!(
                "{rate:>8} {taxable:>16} {:>16} {tax:>16}",
                format_inr(igst),
            )),
            _ => {}
        }
    }
    out.push(rule.clone());

    // Printed total is the sum of the printed parts.
    let totals = invoice.tax_breakdown()?.rounded();
    push_amount(&mut out, "Subtotal", totals.taxable_amount());
    match *totals.split() {
        TaxSplit::IntraState { cgst, sgst } => {
            push_amount(&mut out, "CGST", cgst);
            push_amount(&mut out, "SGST", sgst);
        }
        TaxSplit::InterState { igst } => push_amount(&mut out, "IGST", igst),
    }
    push_amount(&mut out, "Total", totals.total());
    out.push(rule);

    if let Some(notes) = invoice.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        out.push(format!("Notes: {}", notes.trim()));
    }
    if let Some(bank) = &seller.bank {
        out.push("Bank details:".to_string());
        out.push(format!("  Account name:   {}", bank.account_name));
        out.push(format!("  Account number: {}", bank.account_number));
        out.push(format!("  IFSC:           {}", bank.ifsc));
    }
    if let Some(upi) = &seller.upi_id {
        out.push(format!("UPI: {upi}"));
    }

    Ok(out.join("\n") + "\n")
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use gst_core::{BankDetails, InvoiceTotals, TaxableLine};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn seller() -> BusinessProfile {
        BusinessProfile {
            business_name: "Asha Rao Studio".to_string(),
            gstin: Some(Gstin::parse("29ABCDE1234F1ZW").unwrap()),
            state_code: 29,
            address: Some("12 MG Road\nBengaluru".to_string()),
            email: None,
            phone: None,
            bank: Some(BankDetails {
                account_name: "Asha Rao".to_string(),
                account_number: "001234567890".to_string(),
                ifsc: "HDFC0001234".to_string(),
            }),
            upi_id: Some("asha@okhdfc".to_string()),
        }
    }

    fn client(state_code: u8) -> Client {
        Client {
            id: 7,
            name: "Meridian Analytics".to_string(),
            gstin: (state_code == 27).then(|| Gstin::parse("27AAPFU0939F1ZV").unwrap()),
            state_code,
            address: None,
            email: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    fn invoice(
        place_of_supply_code: u8,
        tax_split: TaxSplit,
    ) -> Invoice {
        Invoice {
            id: 1,
            invoice_number: "INV-0042".to_string(),
            client_id: 7,
            issue_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 4, 16),
            seller_state_code: 29,
            place_of_supply_code,
            lines: vec![
                TaxableLine::new("Logo design", dec!(2), dec!(500), dec!(18))
                    .unwrap()
                    .with_sac_code(Some("998391".to_string())),
                TaxableLine::new("Hosting", dec!(1), dec!(1000), dec!(0)).unwrap(),
            ],
            totals: InvoiceTotals {
                subtotal: dec!(2000),
                total_tax: dec!(180),
                grand_total: dec!(2180),
            },
            tax_split,
            notes: Some("Thank you".to_string()),
            created_at: Utc::now(),
        }
    }

    fn line_with<'a>(
        text: &'a str,
        prefix: &str,
    ) -> &'a str {
        text.lines()
            .find(|line| line.trim_start().starts_with(prefix))
            .unwrap_or_else(|| panic!("no line starting with {prefix:?} in:\n{text}"))
    }

    #[test]
    fn intra_state_invoice_shows_cgst_and_sgst() {
        let registry = JurisdictionRegistry::india();
        let text = render_invoice(
            &invoice(29, TaxSplit::intra_state(dec!(180))),
            &seller(),
            &client(29),
            &registry,
        )
        .unwrap();

        assert!(text.contains("Invoice No:   INV-0042"));
        assert!(text.contains("Invoice Date: 01 Apr 2025"));
        assert!(text.contains("Due Date:     16 Apr 2025"));
        assert!(text.contains("Place of Supply: Karnataka (29)"));
        assert!(text.contains("GSTIN: Unregistered"));
        assert!(line_with(&text, "CGST").ends_with("₹90.00"));
        assert!(line_with(&text, "SGST").ends_with("₹90.00"));
        assert!(line_with(&text, "Total").ends_with("₹2,180.00"));
        assert!(!text.contains("IGST"));
    }

    #[test]
    fn inter_state_invoice_shows_igst_only() {
        let registry = JurisdictionRegistry::india();
        let text = render_invoice(
            &invoice(27, TaxSplit::inter_state(dec!(180))),
            &seller(),
            &client(27),
            &registry,
        )
        .unwrap();

        assert!(text.contains("GSTIN: 27AAPFU0939F1ZV"));
        assert!(text.contains("Place of Supply: Maharashtra (27)"));
        assert!(line_with(&text, "IGST").ends_with("₹180.00"));
        assert!(!text.contains("CGST"));
    }

    #[test]
    fn rate_summary_lists_each_rate_once() {
        let registry = JurisdictionRegistry::india();
        let text = render_invoice(
            &invoice(27, TaxSplit::inter_state(dec!(180))),
            &seller(),
            &client(27),
            &registry,
        )
        .unwrap();

        let summary: Vec<&str> = text
            .lines()
            .skip_while(|line| *line != "Tax summary")
            .skip(2)
            .take(2)
            .collect();

        assert_eq!(
            summary,
            vec![
                format!("{:>8} {:>16} {:>16} {:>16}", "0%", "₹1,000.00", "₹0.00", "₹0.00"),
                format!("{:>8} {:>16} {:>16} {:>16}", "18%", "₹1,000.00", "₹180.00", "₹180.00"),
            ]
        );
    }

    #[test]
    fn printed_totals_are_the_stored_figures() {
        let registry = JurisdictionRegistry::india();
        let mut stored = invoice(29, TaxSplit::intra_state(dec!(180.02)));
        stored.totals = InvoiceTotals {
            subtotal: dec!(2000),
            total_tax: dec!(180.02),
            grand_total: dec!(2180.02),
        };

        let text = render_invoice(&stored, &seller(), &client(29), &registry).unwrap();

        assert!(line_with(&text, "Subtotal").ends_with("₹2,000.00"));
        assert!(line_with(&text, "CGST").ends_with("₹90.01"));
        assert!(line_with(&text, "Total").ends_with("₹2,180.02"));
    }

    #[test]
    fn printed_total_adds_up_when_halves_round_down() {
        let registry = JurisdictionRegistry::india();
        // 1000.03 at 18%: tax 180.0054, halves of 90.0027 each.
        let mut stored = invoice(29, TaxSplit::intra_state(dec!(180.0054)));
        stored.totals = InvoiceTotals {
            subtotal: dec!(1000.03),
            total_tax: dec!(180.0054),
            grand_total: dec!(1180.0354),
        };

        let text = render_invoice(&stored, &seller(), &client(29), &registry).unwrap();

        assert!(line_with(&text, "Subtotal").ends_with("₹1,000.03"));
        assert!(line_with(&text, "CGST").ends_with("₹90.00"));
        assert!(line_with(&text, "SGST").ends_with("₹90.00"));
        assert!(line_with(&text, "Total").ends_with("₹1,180.03"));
    }

    #[test]
    fn printed_total_adds_up_when_halves_round_up() {
        let registry = JurisdictionRegistry::india();
        let mut stored = invoice(29, TaxSplit::intra_state(dec!(0.01)));
        stored.totals = InvoiceTotals {
            subtotal: dec!(0.05),
            total_tax: dec!(0.01),
            grand_total: dec!(0.06),
        };

        let text = render_invoice(&stored, &seller(), &client(29), &registry).unwrap();

        assert!(line_with(&text, "CGST").ends_with("₹0.01"));
        assert!(line_with(&text, "SGST").ends_with("₹0.01"));
        assert!(line_with(&text, "Total").ends_with("₹0.07"));
    }

    #[test]
    fn unknown_state_code_prints_padded_code() {
        let registry = JurisdictionRegistry::new(Vec::new()).unwrap();

        assert_eq!(jurisdiction_label(&registry, 7), "07");
    }

    #[test]
    fn payment_details_follow_totals() {
        let registry = JurisdictionRegistry::india();
        let text = render_invoice(
            &invoice(29, TaxSplit::intra_state(dec!(180))),
            &seller(),
            &client(29),
            &registry,
        )
        .unwrap();

        assert!(text.contains("Notes: Thank you"));
        assert!(text.contains("  IFSC:           HDFC0001234"));
        assert!(text.ends_with("UPI: asha@okhdfc\n"));
    }
}
