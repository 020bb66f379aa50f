use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::info;

use crate::application::LedgerService;
use crate::domain::{LedgerTotals, Transaction, compute_totals, format_rupiah};

const CSV_HEADER: [&str; 5] = ["id", "direction", "category", "amount", "date"];
const XLSX_HEADER: [&str; 5] = ["ID", "Direction", "Category", "Amount", "Date"];
const XLSX_SHEET: &str = "Transactions";

const PDF_TITLE: &str = "Transaction Report";
const PDF_PAGE_WIDTH: f32 = 210.0;
const PDF_PAGE_HEIGHT: f32 = 297.0;
const PDF_LEFT: f32 = 18.0;
const PDF_TOP: f32 = 272.0;
const PDF_BOTTOM: f32 = 20.0;
const PDF_LINE_HEIGHT: f32 = 7.0;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
        }
    }

    /// Default file name for a document in this format.
    pub fn file_name(&self) -> String {
        format!("transactions.{}", self.extension())
    }

    /// Binary formats can't be written to a terminal.
    pub fn is_binary(&self) -> bool {
        matches!(self, ExportFormat::Xlsx | ExportFormat::Pdf)
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Full ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub totals: LedgerTotals,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting ledger data to document formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Render the whole ledger in the given format.
    pub async fn export_bytes(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let bytes = match format {
            ExportFormat::Csv => {
                let mut buf = Vec::new();
                self.export_csv(&mut buf).await?;
                buf
            }
            ExportFormat::Xlsx => self.export_xlsx().await?,
            ExportFormat::Pdf => self.export_pdf().await?,
            ExportFormat::Json => {
                let mut buf = Vec::new();
                self.export_json(&mut buf).await?;
                buf
            }
        };
        info!(format = format.extension(), bytes = bytes.len(), "ledger exported");
        Ok(bytes)
    }

    /// Export transactions to CSV format
    pub async fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let transactions = self.service.all_records().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(CSV_HEADER)?;

        for tx in &transactions {
            csv_writer.write_record(&[
                tx.id.to_string(),
                tx.direction.as_str().to_string(),
                tx.category.as_str().to_string(),
                tx.amount.to_string(),
                tx.date.format("%Y-%m-%d").to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export transactions to an Excel workbook
    pub async fn export_xlsx(&self) -> Result<Vec<u8>> {
        let transactions = self.service.all_records().await?;

        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(XLSX_SHEET)?;

        for (col, title) in XLSX_HEADER.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }

        for (i, tx) in transactions.iter().enumerate() {
            let row = u32::try_from(i + 1).context("Too many rows for a worksheet")?;
            sheet.write_number(row, 0, tx.id as f64)?;
            sheet.write_string(row, 1, tx.direction.as_str())?;
            sheet.write_string(row, 2, tx.category.as_str())?;
            sheet.write_number(row, 3, tx.amount as f64)?;
            sheet.write_string(row, 4, &tx.date.format("%Y-%m-%d").to_string())?;
        }

        workbook
            .save_to_buffer()
            .context("Failed to write Excel workbook")
    }

    /// Export transactions to a PDF report, one line per transaction
    pub async fn export_pdf(&self) -> Result<Vec<u8>> {
        let transactions = self.service.all_records().await?;

        let (doc, page, layer) = PdfDocument::new(
            PDF_TITLE,
            Mm(PDF_PAGE_WIDTH),
            Mm(PDF_PAGE_HEIGHT),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow::anyhow!("Failed to load PDF font: {:?}", e))?;
        let title_font = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow::anyhow!("Failed to load PDF font: {:?}", e))?;

        let mut current = doc.get_page(page).get_layer(layer);
        current.use_text(PDF_TITLE, 16.0, Mm(PDF_LEFT), Mm(PDF_TOP + 10.0), &title_font);

        let mut y = PDF_TOP;
        for tx in &transactions {
            if y < PDF_BOTTOM {
                let (page, layer) =
                    doc.add_page(Mm(PDF_PAGE_WIDTH), Mm(PDF_PAGE_HEIGHT), "Layer 1");
                current = doc.get_page(page).get_layer(layer);
                y = PDF_TOP + 10.0;
            }
            current.use_text(pdf_line(tx), 11.0, Mm(PDF_LEFT), Mm(y), &font);
            y -= PDF_LINE_HEIGHT;
        }

        doc.save_to_bytes()
            .map_err(|e| anyhow::anyhow!("Failed to write PDF: {:?}", e))
    }

    /// Export full ledger as JSON snapshot
    pub async fn export_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let transactions = self.service.all_records().await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            totals: compute_totals(&transactions),
            transactions,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

/// One report line: "2024-01-15 - outflow Rp25,000 (food)"
pub fn pdf_line(tx: &Transaction) -> String {
    format!(
        "{} - {} {} ({})",
        tx.date.format("%Y-%m-%d"),
        tx.direction,
        format_rupiah(tx.amount),
        tx.category
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Category, Direction};

    #[test]
    fn test_pdf_line() {
        let tx = Transaction {
            id: 1,
            direction: Direction::Outflow,
            category: Category::Food,
            amount: 25000,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        };
        assert_eq!(pdf_line(&tx), "2024-01-15 - outflow Rp25,000 (food)");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("excel".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert_eq!("pdf".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(ExportFormat::Csv.file_name(), "transactions.csv");
        assert_eq!(ExportFormat::Xlsx.file_name(), "transactions.xlsx");
        assert!(ExportFormat::Pdf.is_binary());
        assert!(!ExportFormat::Json.is_binary());
    }
}
