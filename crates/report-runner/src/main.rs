//! report-runner: analyze every portfolio/trading-plan instrument and save
//! indicator and decision snapshots to the report database.
//!
//! Usage:
//!   cargo run -p report-runner
//!   cargo run -p report-runner -- --styles day_trading,long_term
//!   cargo run -p report-runner -- --days 500 --summary batch_summary.json

use std::sync::Arc;

use report_core::InvestmentStyle;
use report_runner::BatchRunner;
use report_store::SqliteReportStore;

const DEFAULT_DATABASE_URL: &str = "sqlite:portfolio_report.db";
const DEFAULT_SUMMARY_FILE: &str = "batch_summary.json";

fn parse_styles(arg: &str) -> Vec<InvestmentStyle> {
    arg.split(',')
        .filter_map(|s| match s.trim() {
            "day_trading" => Some(InvestmentStyle::DayTrading),
            "swing_trading" => Some(InvestmentStyle::SwingTrading),
            "long_term" => Some(InvestmentStyle::LongTerm),
            other => {
                tracing::warn!("Ignoring unknown investment style: {}", other);
                None
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "report_runner=info,report_store=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let history_days: u32 = args
        .iter()
        .position(|a| a == "--days")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(365);

    let styles = args
        .iter()
        .position(|a| a == "--styles")
        .and_then(|i| args.get(i + 1))
        .map(|s| parse_styles(s))
        .unwrap_or_else(|| InvestmentStyle::all().to_vec());

    let summary_file = args
        .iter()
        .position(|a| a == "--summary")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_SUMMARY_FILE)
        .to_string();

    if styles.is_empty() {
        anyhow::bail!("no valid investment styles selected");
    }

    tracing::info!("Opening report database at {}", database_url);
    let store = Arc::new(SqliteReportStore::open(&database_url).await?);

    let runner = BatchRunner::new(store)
        .with_styles(styles)
        .with_history_days(history_days);

    let summary = runner.run().await?;

    std::fs::write(&summary_file, serde_json::to_string_pretty(&summary)?)?;
    tracing::info!("Wrote batch summary to {}", summary_file);

    if summary.failed_count > 0 {
        tracing::warn!(
            "{} instruments failed: {:?}",
            summary.failed_count,
            summary.failed_stocks
        );
    }

    Ok(())
}
