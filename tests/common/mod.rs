// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use ledgerbot::application::LedgerService;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Test fixture: a month of typical chat notes
pub struct SampleNotes;

impl SampleNotes {
    /// Notes with their expected effect: 5,000,000 in, 25,000 + 50,000 out, 1,000 in
    pub const JANUARY: [(&'static str, &'static str); 4] = [
        ("Gaji bulan ini 5000000", "2024-01-01"),
        ("makan siang 25000", "2024-01-02"),
        ("bensin motor 50000", "2024-01-03"),
        ("dapat bonus +1000", "2024-01-04"),
    ];

    pub async fn record_january(service: &LedgerService) -> Result<()> {
        for (text, date) in Self::JANUARY {
            service.record_message(text, parse_date(date)).await?;
        }
        Ok(())
    }
}
