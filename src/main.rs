use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fonfolio::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fonfolio::AppCommand {
    fn from(cmd: Commands) -> fonfolio::AppCommand {
        match cmd {
            Commands::Summary => fonfolio::AppCommand::Summary,
            Commands::Add {
                code,
                date,
                quantity,
                price,
            } => fonfolio::AppCommand::Add {
                code,
                date,
                quantity,
                price,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display portfolio valuation summary
    Summary,
    /// Add a buy transaction to the ledger
    Add {
        /// Fund code, e.g. AFT
        code: String,
        /// Purchase date (YYYY-MM-DD)
        date: String,
        /// Number of units bought
        quantity: f64,
        /// Purchase price per unit
        price: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fonfolio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fonfolio::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
# ledger:
#   path: "/path/to/ledger.csv"

providers:
  tefas:
    base_url: "https://www.tefas.gov.tr"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
