mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{SampleNotes, parse_date, test_service};
use ledgerbot::application::{AppError, LedgerService};
use ledgerbot::domain::{Category, Direction};
use ledgerbot::io::Exporter;

#[tokio::test]
async fn test_empty_ledger_aggregates_to_zero() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert_eq!(service.total_inflow().await?, 0);
    assert_eq!(service.total_outflow().await?, 0);
    assert_eq!(service.balance().await?, 0);
    assert!(service.all_records().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_record_assigns_increasing_ids() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2024-01-15");

    let first = service
        .record(Direction::Inflow, Category::Salary, 5000000, date)
        .await?;
    let second = service
        .record(Direction::Outflow, Category::Food, 25000, date)
        .await?;
    let third = service
        .record(Direction::Outflow, Category::Other, 0, date)
        .await?;

    assert!(first < second && second < third);

    let records = service.all_records().await?;
    assert_eq!(records.len(), 3);
    assert_eq!(
        records.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![first, second, third]
    );
    assert_eq!(records[1].direction, Direction::Outflow);
    assert_eq!(records[1].category, Category::Food);
    assert_eq!(records[1].amount, 25000);
    assert_eq!(records[1].date, date);

    Ok(())
}

#[tokio::test]
async fn test_record_message_classifies_and_persists() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .record_message("bensin motor 50 rb dan token 20rb", parse_date("2024-02-01"))
        .await?;

    assert_eq!(result.classification.direction, Direction::Outflow);
    assert_eq!(result.classification.category, Category::Transport);
    assert_eq!(result.classification.amount, 50);

    let stored = service
        .get_transaction(result.id)
        .await?
        .expect("transaction should be stored");
    assert_eq!(stored.amount, 50);
    assert_eq!(stored.category, Category::Transport);
    assert_eq!(stored.date.to_string(), "2024-02-01");

    Ok(())
}

#[tokio::test]
async fn test_totals_and_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleNotes::record_january(&service).await?;

    assert_eq!(service.total_inflow().await?, 5001000);
    assert_eq!(service.total_outflow().await?, 75000);
    assert_eq!(service.balance().await?, 5001000 - 75000);

    Ok(())
}

#[tokio::test]
async fn test_balance_can_be_negative() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2024-03-01");

    service
        .record(Direction::Inflow, Category::Other, 100, date)
        .await?;
    service
        .record(Direction::Outflow, Category::Food, 350, date)
        .await?;

    assert_eq!(service.balance().await?, -250);
    Ok(())
}

#[tokio::test]
async fn test_balance_matches_totals_after_every_record() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2024-04-01");

    let notes = [
        "gaji 3000000",
        "makan 15000",
        "transport 12000",
        "uang masuk 200000",
        "beli buku",
        "makan malam 40000",
        "+75000 dari teman",
    ];

    for (i, text) in notes.iter().enumerate() {
        service.record_message(text, date).await?;

        let inflow = service.total_inflow().await?;
        let outflow = service.total_outflow().await?;
        assert_eq!(service.balance().await?, inflow - outflow);
        assert_eq!(service.all_records().await?.len(), i + 1);
    }

    Ok(())
}

#[tokio::test]
async fn test_aggregates_are_idempotent() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleNotes::record_january(&service).await?;

    let first = (
        service.total_inflow().await?,
        service.total_outflow().await?,
        service.balance().await?,
    );
    let second = (
        service.total_inflow().await?,
        service.total_outflow().await?,
        service.balance().await?,
    );

    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_negative_amount_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .record(
            Direction::Outflow,
            Category::Food,
            -10,
            parse_date("2024-01-01"),
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidAmount(-10))));
    assert_eq!(service.count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_amount_overflowing_total_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2024-05-01");

    // Saturates to Amount::MAX and fills the inflow total
    let huge = service
        .record_message("gaji 99999999999999999999999", date)
        .await?;
    assert_eq!(huge.classification.amount, i64::MAX);

    let result = service.record_message("masuk 1", date).await;
    assert!(matches!(result, Err(AppError::InvalidAmount(1))));

    // Outflow has its own headroom
    service.record_message("makan 25000", date).await?;

    assert_eq!(service.count().await?, 2);
    assert_eq!(service.total_inflow().await?, i64::MAX);
    assert_eq!(service.total_outflow().await?, 25000);
    assert_eq!(service.balance().await?, i64::MAX - 25000);
    assert!(service.check_integrity().await?.is_consistent());
    Ok(())
}

#[tokio::test]
async fn test_large_amounts_keep_exports_readable() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2024-05-01");

    service
        .record_message("gaji 9000000000000000000", date)
        .await?;
    let second = service
        .record_message("gaji 9000000000000000000", date)
        .await;
    assert!(matches!(second, Err(AppError::InvalidAmount(_))));

    let mut buf = Vec::new();
    let snapshot = Exporter::new(&service).export_json(&mut buf).await?;
    assert_eq!(snapshot.totals.inflow, 9_000_000_000_000_000_000);
    assert_eq!(snapshot.transactions.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_record_after_close_is_storage_error() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.close().await;

    let result = service
        .record_message("makan siang 25000", parse_date("2024-01-02"))
        .await;

    assert!(matches!(result, Err(AppError::Storage(_))));
    Ok(())
}

#[tokio::test]
async fn test_records_survive_reconnect() -> Result<()> {
    let (service, temp) = test_service().await?;
    SampleNotes::record_january(&service).await?;
    service.close().await;

    let db_path = temp.path().join("test.db");
    let reopened = LedgerService::connect(db_path.to_str().unwrap()).await?;

    assert_eq!(reopened.all_records().await?.len(), 4);
    assert_eq!(reopened.balance().await?, 5001000 - 75000);
    Ok(())
}

#[tokio::test]
async fn test_init_is_idempotent() -> Result<()> {
    let (service, temp) = test_service().await?;
    SampleNotes::record_january(&service).await?;
    service.close().await;

    let db_path = temp.path().join("test.db");
    let again = LedgerService::init(db_path.to_str().unwrap()).await?;
    assert_eq!(again.count().await?, 4);
    Ok(())
}

#[tokio::test]
async fn test_connect_to_missing_database_is_storage_error() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let db_path = temp.path().join("missing").join("nope.db");

    let result = LedgerService::connect(db_path.to_str().unwrap()).await;
    assert!(matches!(result, Err(AppError::Storage(_))));
    Ok(())
}

#[tokio::test]
async fn test_recent_records_keep_id_order() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleNotes::record_january(&service).await?;

    let recent = service.recent_records(2).await?;
    assert_eq!(recent.len(), 2);
    assert!(recent[0].id < recent[1].id);
    assert_eq!(recent[0].category, Category::Transport);
    assert_eq!(recent[1].direction, Direction::Inflow);

    assert_eq!(service.recent_records(100).await?.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_is_not_live() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleNotes::record_january(&service).await?;

    let snapshot = service.all_records().await?;
    service
        .record_message("makan 1000", parse_date("2024-01-31"))
        .await?;

    assert_eq!(snapshot.len(), 4);
    assert_eq!(service.all_records().await?.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_records_are_serialized() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let service = Arc::new(service);
    let date = parse_date("2024-05-01");

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.record_message(&format!("makan {}", i + 1), date).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let records = service.all_records().await?;
    assert_eq!(records.len(), 20);
    assert!(records.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(service.total_outflow().await?, (1..=20).sum::<i64>());
    Ok(())
}

#[tokio::test]
async fn test_integrity_check_on_healthy_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleNotes::record_january(&service).await?;

    let report = service.check_integrity().await?;
    assert!(report.is_consistent(), "issues: {:?}", report.issues);
    assert_eq!(report.transaction_count, 4);
    assert_eq!(report.stored_totals, report.computed_totals);
    Ok(())
}
