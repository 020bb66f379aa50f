//! Transport-independent chat handling.
//!
//! Turns inbound chat text into a [`Reply`]. Transports (Telegram, console)
//! only deliver text here and send the reply back.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use crate::application::{AppError, LedgerService};
use crate::domain::format_rupiah;
use crate::io::{ExportFormat, Exporter};

/// Telegram rejects messages above 4096 characters; stay below it.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Shown to the user when handling fails; details go to the log.
pub const FAILURE_TEXT: &str = "⚠️ Something went wrong while talking to the ledger. Please try again later.";

/// Bot commands understood by every transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Balance,
    ExportCsv,
    ExportExcel,
    ExportPdf,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Start,
        Command::Help,
        Command::Balance,
        Command::ExportCsv,
        Command::ExportExcel,
        Command::ExportPdf,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Balance => "balance",
            Command::ExportCsv => "exportcsv",
            Command::ExportExcel => "exportexcel",
            Command::ExportPdf => "exportpdf",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Start => "start the bot",
            Command::Help => "show this help",
            Command::Balance => "show the current balance",
            Command::ExportCsv => "download all transactions as CSV",
            Command::ExportExcel => "download all transactions as Excel",
            Command::ExportPdf => "download a PDF report",
        }
    }

    /// Parse "/balance" or "/balance@SomeBot". Returns `None` for plain text
    /// and for unknown commands.
    pub fn parse(text: &str) -> Option<Command> {
        let word = text.trim().strip_prefix('/')?.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word).to_lowercase();

        match name.as_str() {
            "saldo" => Some(Command::Balance),
            _ => Command::ALL.into_iter().find(|c| c.name() == name),
        }
    }
}

/// What the transport should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Document { file_name: String, bytes: Vec<u8> },
}

/// Help listing every command.
pub fn help_text() -> String {
    let mut text = String::from(
        "Send a note like \"makan siang 25000\" or \"gaji 5000000\" and I'll record it.\n\nCommands:\n",
    );
    for command in Command::ALL {
        text.push_str(&format!("/{} - {}\n", command.name(), command.description()));
    }
    text
}

/// Route any inbound text: commands go to [`handle_command`], everything
/// else is recorded as a transaction dated `date`.
pub async fn handle_input(service: &LedgerService, text: &str, date: NaiveDate) -> Result<Reply> {
    if text.trim_start().starts_with('/') {
        return match Command::parse(text) {
            Some(command) => handle_command(service, command).await,
            None => Ok(Reply::Text(
                "Unknown command. Send /help to see what I understand.".to_string(),
            )),
        };
    }
    Ok(handle_text(service, text, date).await?)
}

/// Classify and record a free-text note.
pub async fn handle_text(
    service: &LedgerService,
    text: &str,
    date: NaiveDate,
) -> Result<Reply, AppError> {
    let result = service.record_message(text, date).await?;
    let c = result.classification;

    Ok(Reply::Text(format!(
        "✅ {} {} ({}) recorded.",
        c.direction.label(),
        format_rupiah(c.amount),
        c.category
    )))
}

/// Execute a bot command.
pub async fn handle_command(service: &LedgerService, command: Command) -> Result<Reply> {
    debug!(command = command.name(), "handling command");

    match command {
        Command::Start | Command::Help => Ok(Reply::Text(help_text())),
        Command::Balance => {
            let balance = service.balance().await?;
            Ok(Reply::Text(format!(
                "💰 Current balance: {}",
                format_rupiah(balance)
            )))
        }
        Command::ExportCsv => export_document(service, ExportFormat::Csv).await,
        Command::ExportExcel => export_document(service, ExportFormat::Xlsx).await,
        Command::ExportPdf => export_document(service, ExportFormat::Pdf).await,
    }
}

async fn export_document(service: &LedgerService, format: ExportFormat) -> Result<Reply> {
    let bytes = Exporter::new(service).export_bytes(format).await?;
    Ok(Reply::Document {
        file_name: format.file_name(),
        bytes,
    })
}

/// Split a reply into chunks of at most `max_chars` characters.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}
