pub mod csv_ledger;

pub use csv_ledger::CsvLedger;
