use std::sync::Arc;

use chrono::NaiveDate;
use report_core::{Bar, InvestmentStyle};
use report_store::SqliteReportStore;

use crate::BatchRunner;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn daily_bars(len: usize, start_price: f64) -> Vec<Bar> {
    let start = date("2024-01-01");
    (0..len)
        .map(|i| {
            let close = start_price + i as f64;
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open: Some(close),
                high: Some(close + 1.0),
                low: Some(close - 1.0),
                close: Some(close),
                volume: Some(50_000.0),
            }
        })
        .collect()
}

async fn seeded_store() -> Arc<SqliteReportStore> {
    let store = SqliteReportStore::open("sqlite::memory:").await.unwrap();

    // A healthy instrument with plenty of history.
    store
        .add_holding("7203", 100.0, 1450.0, date("2023-12-01"))
        .await
        .unwrap();
    store
        .import_price_history("7203", &daily_bars(120, 1400.0))
        .await
        .unwrap();

    // An instrument with too little history for any style.
    store
        .add_trading_plan("9984", "swing", None)
        .await
        .unwrap();
    store
        .import_price_history("9984", &daily_bars(3, 6000.0))
        .await
        .unwrap();

    // An instrument with no price rows at all.
    store.add_trading_plan("4755", "day", None).await.unwrap();

    Arc::new(store)
}

async fn indicator_rows(store: &SqliteReportStore, code: &str) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM technical_indicators WHERE stock_code = ?")
            .bind(code)
            .fetch_one(store.db().pool())
            .await
            .unwrap();
    count
}

async fn decision_rows(store: &SqliteReportStore, code: &str) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM investment_decisions WHERE stock_code = ?")
            .bind(code)
            .fetch_one(store.db().pool())
            .await
            .unwrap();
    count
}

#[tokio::test]
async fn bad_instruments_never_abort_the_batch() {
    let store = seeded_store().await;
    let runner = BatchRunner::new(Arc::clone(&store));

    let summary = runner.run().await.unwrap();

    assert_eq!(summary.total_stocks, 3);
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failed_count, 2);
    assert!(summary.failed_stocks.contains(&"9984".to_string()));
    assert!(summary.failed_stocks.contains(&"4755".to_string()));

    // One indicator and one decision row per style for the healthy code.
    assert_eq!(indicator_rows(&store, "7203").await, 3);
    assert_eq!(decision_rows(&store, "7203").await, 3);
    assert_eq!(indicator_rows(&store, "9984").await, 0);
}

#[tokio::test]
async fn rerunning_the_batch_is_idempotent() {
    let store = seeded_store().await;
    let runner = BatchRunner::new(Arc::clone(&store));

    runner.run().await.unwrap();
    runner.run().await.unwrap();

    assert_eq!(indicator_rows(&store, "7203").await, 3);
    assert_eq!(decision_rows(&store, "7203").await, 3);
}

#[tokio::test]
async fn style_selection_limits_what_is_persisted() {
    let store = seeded_store().await;
    let runner = BatchRunner::new(Arc::clone(&store))
        .with_styles(vec![InvestmentStyle::LongTerm])
        .with_history_days(365);

    let summary = runner.run().await.unwrap();

    assert_eq!(summary.investment_styles, vec!["long_term".to_string()]);
    assert_eq!(indicator_rows(&store, "7203").await, 1);

    let (style,): (String,) = sqlx::query_as(
        "SELECT investment_style FROM technical_indicators WHERE stock_code = ?",
    )
    .bind("7203")
    .fetch_one(store.db().pool())
    .await
    .unwrap();
    assert_eq!(style, "long_term");
}

#[tokio::test]
async fn decision_rows_carry_signals_and_rationale() {
    let store = seeded_store().await;
    let runner =
        BatchRunner::new(Arc::clone(&store)).with_styles(vec![InvestmentStyle::SwingTrading]);

    runner.run().await.unwrap();

    let (overall, reasoning, buy_count): (String, String, i64) = sqlx::query_as(
        r#"
        SELECT overall_signal, ai_reasoning, buy_count
        FROM investment_decisions
        WHERE stock_code = ? AND investment_style = 'swing_trading'
        "#,
    )
    .bind("7203")
    .fetch_one(store.db().pool())
    .await
    .unwrap();

    assert!(["buy", "sell", "neutral"].contains(&overall.as_str()));
    assert!(!reasoning.is_empty());
    assert!((0..=5).contains(&buy_count));
}
