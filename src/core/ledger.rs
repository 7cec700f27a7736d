//! Transaction ledger abstraction.
//!
//! The ledger is an append-only tabular store with `Code, Date, Quantity,
//! Price` columns. Reads return raw, untrusted records; validation happens in
//! the valuation pipeline. A failed read or append is surfaced to the caller,
//! unlike price failures which degrade locally.

use anyhow::Result;

/// One untyped row as read from the store. Missing cells are `None` and turn
/// into data-quality skips downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub code: Option<String>,
    pub date: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
}

pub trait TransactionLedger: Send + Sync {
    /// Reads every record in the ledger, in stored order.
    fn read_all(&self) -> Result<Vec<RawRecord>>;

    /// Appends one buy transaction.
    fn append(&self, code: &str, date: &str, quantity: f64, price: f64) -> Result<()>;
}
