use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::application::LedgerService;
use crate::config::{self, DEFAULT_DATABASE, DEFAULT_LOG_LEVEL, Settings};
use crate::domain::{classify, format_amount, format_rupiah};
use crate::logger;

/// Ledgerbot - chat-driven personal finance ledger
#[derive(Parser)]
#[command(name = "ledgerbot")]
#[command(about = "Record income and expenses from free-text notes, via Telegram or the terminal")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "LEDGERBOT_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Log level: error, warn, info, debug, trace (RUST_LOG overrides it)
    #[arg(long, env = "LEDGERBOT_LOG", default_value = DEFAULT_LOG_LEVEL, global = true)]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Classify a note and record it (e.g. "makan siang 25000")
    Record {
        /// The note, as it would be sent to the bot
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show how a note would be classified, without recording it
    Classify {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Show total inflow, total outflow and balance
    Balance,

    /// List recorded transactions
    List {
        /// Show only the most recent N transactions
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Export all transactions
    Export {
        /// Format: csv, xlsx, pdf, json
        format: String,

        /// Output file (stdout if omitted; required for xlsx and pdf)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Verify ledger integrity
    Check,

    /// Talk to the bot from the terminal, one message per line
    Chat {
        /// Directory where exported documents are saved
        #[arg(long, default_value = ".")]
        export_dir: PathBuf,
    },

    /// Run the Telegram bot
    Serve {
        /// Bot token from @BotFather
        #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let settings = Settings::resolve(&self.database, &self.log_level, self.verbose)?;
        logger::init(&settings.log_level)?;
        debug!(database = %settings.database, "settings resolved");

        match self.command {
            Commands::Init => {
                let service = LedgerService::init(&settings.database).await?;
                service.close().await;
                println!("Database initialized: {}", settings.database);
            }

            Commands::Record { text, date } => {
                let service = LedgerService::connect(&settings.database).await?;
                let text = text.join(" ");

                let date = match date {
                    Some(date_str) => parse_date(&date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?,
                    None => Local::now().date_naive(),
                };

                let result = service.record_message(&text, date).await?;
                let c = result.classification;
                println!(
                    "Recorded #{}: {} {} ({}) on {}",
                    result.id,
                    c.direction,
                    format_rupiah(c.amount),
                    c.category,
                    result.date
                );
            }

            Commands::Classify { text } => {
                let c = classify(&text.join(" "));
                println!("Direction: {}", c.direction);
                println!("Category:  {}", c.category);
                println!("Amount:    {}", format_amount(c.amount));
            }

            Commands::Balance => {
                let service = LedgerService::connect(&settings.database).await?;
                let totals = service.totals().await?;
                println!("Inflow:   {:>18}", format_amount(totals.inflow));
                println!("Outflow:  {:>18}", format_amount(totals.outflow));
                println!("{}", "-".repeat(28));
                println!("Balance:  {:>18}", format_amount(totals.balance()));
            }

            Commands::List { limit } => {
                let service = LedgerService::connect(&settings.database).await?;
                run_list_command(&service, limit).await?;
            }

            Commands::Export { format, output } => {
                let service = LedgerService::connect(&settings.database).await?;
                run_export_command(&service, &format, output.as_deref()).await?;
            }

            Commands::Check => {
                let service = LedgerService::connect(&settings.database).await?;
                run_check_command(&service).await?;
            }

            Commands::Chat { export_dir } => {
                let service = LedgerService::init(&settings.database).await?;
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                crate::bot::console::run(&service, stdin, std::io::stdout(), &export_dir)
                    .await?;
            }

            Commands::Serve { token } => {
                let token = config::telegram_token(token.as_deref())?;
                run_serve_command(&settings, token).await?;
            }
        }

        Ok(())
    }
}

async fn run_list_command(service: &LedgerService, limit: Option<usize>) -> Result<()> {
    let transactions = match limit {
        Some(limit) => service.recent_records(limit).await?,
        None => service.all_records().await?,
    };

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:>6} {:<12} {:<8} {:<10} {:>15}",
        "ID", "DATE", "TYPE", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(55));
    for tx in &transactions {
        println!(
            "{:>6} {:<12} {:<8} {:<10} {:>15}",
            tx.id,
            tx.date.to_string(),
            tx.direction,
            tx.category,
            format_amount(tx.amount)
        );
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::{ExportFormat, Exporter};
    use std::io::{Write, stdout};

    let format: ExportFormat = format.parse().map_err(|e| {
        anyhow::anyhow!(
            "Invalid export format. Valid formats: csv, xlsx, pdf, json. Error: {}",
            e
        )
    })?;

    let bytes = Exporter::new(service).export_bytes(format).await?;

    match output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("Failed to write output file: {}", path))?;
            eprintln!("Exported {} bytes to {}", bytes.len(), path);
        }
        None if format.is_binary() => {
            anyhow::bail!(
                "{} output is binary; use --output <file> (e.g. --output {})",
                format.extension(),
                format.file_name()
            );
        }
        None => {
            let mut out = stdout();
            out.write_all(&bytes)?;
            out.flush()?;
        }
    }

    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!("Transactions: {}", report.transaction_count);
    println!("Inflow:       {}", format_amount(report.stored_totals.inflow));
    println!("Outflow:      {}", format_amount(report.stored_totals.outflow));
    println!("Balance:      {}", format_amount(report.stored_totals.balance()));
    println!();

    if report.is_consistent() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        anyhow::bail!("ledger integrity check failed");
    }
    Ok(())
}

#[cfg(feature = "telegram")]
async fn run_serve_command(settings: &Settings, token: String) -> Result<()> {
    use std::sync::Arc;

    let service = Arc::new(LedgerService::init(&settings.database).await?);
    crate::bot::telegram::run(token, service.clone()).await?;
    service.close().await;
    Ok(())
}

#[cfg(not(feature = "telegram"))]
async fn run_serve_command(_settings: &Settings, _token: String) -> Result<()> {
    anyhow::bail!("this build has no Telegram support; rebuild with `--features telegram`")
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}
