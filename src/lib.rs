pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::providers::tefas::TefasProvider;
use crate::store::CsvLedger;
use anyhow::Result;
use tracing::{debug, info};

/// Application commands, decoupled from the clap surface in `main.rs`.
pub enum AppCommand {
    Summary,
    Add {
        code: String,
        date: String,
        quantity: f64,
        price: f64,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fonfolio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => {
            let path = AppConfig::default_config_path()?;
            if path.exists() {
                AppConfig::load_from_path(&path)?
            } else {
                AppConfig::default()
            }
        }
    };
    debug!("Loaded config: {config:#?}");

    let ledger = CsvLedger::new(config.ledger_path()?);
    let price_source = TefasProvider::new(config.tefas_base_url())?;

    match command {
        AppCommand::Summary => cli::summary::run(&ledger, &price_source).await,
        AppCommand::Add {
            code,
            date,
            quantity,
            price,
        } => cli::add::run(&ledger, &code, &date, quantity, price),
    }
}
