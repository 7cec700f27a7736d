use super::ui;
use crate::core::ledger::TransactionLedger;
use crate::core::price::{PriceSource, resolve_prices};
use crate::core::valuation::{self, PortfolioReport};
use anyhow::{Context, Result};
use comfy_table::Cell;

const ALLOCATION_BAR_WIDTH: f64 = 30.0;

impl PortfolioReport {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Code"),
            ui::header_cell("Fund"),
            ui::header_cell("Units"),
            ui::header_cell("Avg Cost"),
            ui::header_cell("Price"),
            ui::header_cell("Cost"),
            ui::header_cell("Value"),
            ui::header_cell("P/L"),
            ui::header_cell("P/L %"),
        ]);

        for position in &self.positions {
            table.add_row(vec![
                Cell::new(&position.code),
                Cell::new(&position.title),
                ui::amount_cell(format!("{:.2}", position.quantity)),
                ui::amount_cell(format!("{:.4}", position.avg_cost)),
                ui::amount_cell(format!("{:.4}", position.current_price)),
                ui::amount_cell(format!("{:.2}", position.total_cost)),
                ui::amount_cell(format!("{:.2}", position.current_value)),
                ui::profit_loss_cell(position.profit_loss, format!("{:.2}", position.profit_loss)),
                ui::profit_loss_cell(
                    position.profit_loss,
                    format!("{:.2}%", position.profit_loss_pct),
                ),
            ]);
        }

        let mut output = format!(
            "Portfolio: {}\n\n",
            ui::style_text("Holdings", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\nTotal Value: {}    Invested: {}    Net P/L: {} ({:.2}%)",
            ui::style_text(&format!("{:.2}", self.total_value), ui::StyleType::TotalValue),
            ui::style_text(
                &format!("{:.2}", self.total_invested),
                ui::StyleType::TotalLabel
            ),
            ui::style_text(
                &format!("{:.2}", self.net_profit),
                if self.net_profit >= 0.0 {
                    ui::StyleType::TotalValue
                } else {
                    ui::StyleType::Error
                }
            ),
            self.net_profit_pct
        ));

        output
    }

    /// Textual allocation chart: one bar per position, weighted by current
    /// value. Empty when the portfolio has no market value.
    pub fn display_allocation(&self) -> String {
        let (labels, values) = self.chart_series();
        if self.total_value <= 0.0 {
            return String::new();
        }

        let width = labels.iter().map(String::len).max().unwrap_or(0);
        let mut output = format!(
            "\n{}\n",
            ui::style_text("Allocation", ui::StyleType::Title)
        );
        for (label, value) in labels.iter().zip(values.iter()) {
            let pct = value / self.total_value * 100.0;
            let bar_len = (pct / 100.0 * ALLOCATION_BAR_WIDTH).round() as usize;
            output.push_str(&format!(
                "{label:width$}  {} {pct:.1}%\n",
                ui::style_text(&"█".repeat(bar_len), ui::StyleType::Subtle),
            ));
        }
        output
    }
}

/// Reads the ledger, resolves a price snapshot, and prints the valuation
/// report. A ledger failure aborts with no report; a price source failure
/// degrades to zeroed market values with a warning line.
pub async fn run(ledger: &dyn TransactionLedger, price_source: &dyn PriceSource) -> Result<()> {
    let records = ledger
        .read_all()
        .context("Failed to read transaction ledger")?;
    let codes = valuation::distinct_codes(&records);

    let pb = ui::new_spinner("Fetching fund prices...");
    let snapshot = resolve_prices(price_source, &codes).await;
    pb.finish_and_clear();

    let report = valuation::valuate(&records, &snapshot.quotes);

    println!("{}", report.display_as_table());
    println!("{}", report.display_allocation());

    if snapshot.degraded {
        println!(
            "{}",
            ui::style_text(
                "Price source unavailable; market values are shown as zero.",
                ui::StyleType::Error
            )
        );
    }

    Ok(())
}
