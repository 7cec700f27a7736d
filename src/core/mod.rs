//! Core business logic abstractions

pub mod config;
pub mod ledger;
pub mod log;
pub mod price;
pub mod valuation;

// Re-export main types for cleaner imports
pub use ledger::{RawRecord, TransactionLedger};
pub use price::{PriceQuote, PriceSnapshot, PriceSource, resolve_prices};
pub use valuation::{FundPosition, PortfolioReport, Transaction, valuate};
