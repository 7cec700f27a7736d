use crate::core::ledger::{RawRecord, TransactionLedger};
use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

const HEADER: [&str; 4] = ["Code", "Date", "Quantity", "Price"];

/// Append-only transaction ledger stored as a CSV file with
/// `Code, Date, Quantity, Price` columns.
///
/// Reads are best-effort at the cell level: rows keep whatever cells they
/// have and validation happens downstream. File-level failures surface to
/// the caller. A ledger file that does not exist yet reads as empty.
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CsvLedger { path: path.into() }
    }
}

impl TransactionLedger for CsvLedger {
    fn read_all(&self) -> Result<Vec<RawRecord>> {
        if !self.path.exists() {
            debug!("Ledger file {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open ledger file: {}", self.path.display()))?;

        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read ledger header: {}", self.path.display()))?
            .clone();
        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let code_col = column("Code");
        let date_col = column("Date");
        let quantity_col = column("Quantity");
        let price_col = column("Price");

        let cell = |record: &csv::StringRecord, col: Option<usize>| {
            col.and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result
                .with_context(|| format!("Failed to read ledger row: {}", self.path.display()))?;
            records.push(RawRecord {
                code: cell(&record, code_col),
                date: cell(&record, date_col),
                quantity: cell(&record, quantity_col),
                price: cell(&record, price_col),
            });
        }

        debug!("Read {} ledger records", records.len());
        Ok(records)
    }

    fn append(&self, code: &str, date: &str, quantity: f64, price: f64) -> Result<()> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(anyhow!("Fund code must not be empty"));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create ledger directory: {}", parent.display())
            })?;
        }

        let needs_header =
            !self.path.exists() || fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger file: {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record(HEADER)
                .context("Failed to write ledger header")?;
        }
        writer
            .write_record([
                code.as_str(),
                date,
                &quantity.to_string(),
                &price.to_string(),
            ])
            .context("Failed to append transaction")?;
        writer.flush().context("Failed to flush ledger file")?;

        debug!("Appended {} {} x {} @ {}", code, date, quantity, price);
        Ok(())
    }
}
