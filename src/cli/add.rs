use super::ui;
use crate::core::ledger::TransactionLedger;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

/// Validates and appends one buy transaction to the ledger. A write failure
/// surfaces to the caller; nothing is recomputed or cached here.
pub fn run(
    ledger: &dyn TransactionLedger,
    code: &str,
    date: &str,
    quantity: f64,
    price: f64,
) -> Result<()> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        bail!("Fund code must not be empty");
    }
    if quantity <= 0.0 {
        bail!("Quantity must be positive");
    }
    if price <= 0.0 {
        bail!("Price must be positive");
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{date}', expected YYYY-MM-DD"))?;

    ledger
        .append(&code, date, quantity, price)
        .context("Failed to add transaction to ledger")?;

    println!(
        "{}",
        ui::style_text(
            &format!("Added {quantity} units of {code} at {price}"),
            ui::StyleType::TotalValue
        )
    );
    Ok(())
}
