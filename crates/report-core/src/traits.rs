use async_trait::async_trait;

use crate::{AnalysisError, Bar, StockAnalysis, StockInfo};

/// Read side of the data store: which instruments to analyze and their data.
#[async_trait]
pub trait MarketDataStore: Send + Sync {
    /// Distinct instrument codes from holdings and trading plans.
    async fn target_codes(&self) -> Result<Vec<String>, AnalysisError>;

    /// Daily bars for an instrument, ascending by date, at most `days` rows.
    async fn price_history(&self, code: &str, days: u32) -> Result<Vec<Bar>, AnalysisError>;

    async fn basic_info(&self, code: &str) -> Result<Option<StockInfo>, AnalysisError>;
}

/// Write side of the data store. Both saves are idempotent per
/// (stock_code, analysis_date, investment_style): a repeat write for the
/// same key replaces the existing row instead of duplicating it.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save_indicators(&self, analysis: &StockAnalysis) -> Result<(), AnalysisError>;

    async fn save_decision(&self, analysis: &StockAnalysis) -> Result<(), AnalysisError>;
}

/// Convenience bound for callers that need both sides.
pub trait ReportStore: MarketDataStore + AnalysisStore {}

impl<T: MarketDataStore + AnalysisStore> ReportStore for T {}
