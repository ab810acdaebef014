//! SQLite-backed data store: instrument discovery, price history, and
//! idempotent persistence of indicator and decision snapshots.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use report_core::{
    AnalysisError, AnalysisStore, Bar, MarketDataStore, StockAnalysis, StockInfo,
};

use crate::db::ReportDb;

const ANALYSIS_VERSION: &str = "v1.0";

fn db_err(e: sqlx::Error) -> AnalysisError {
    AnalysisError::DatabaseError(e.to_string())
}

pub struct SqliteReportStore {
    db: ReportDb,
}

impl SqliteReportStore {
    pub fn new(db: ReportDb) -> Self {
        Self { db }
    }

    pub async fn open(database_url: &str) -> Result<Self, AnalysisError> {
        Ok(Self::new(ReportDb::new(database_url).await?))
    }

    pub fn db(&self) -> &ReportDb {
        &self.db
    }

    /// Insert or update listing data for an instrument.
    pub async fn upsert_stock(&self, info: &StockInfo) -> Result<(), AnalysisError> {
        sqlx::query(
            r#"
            INSERT INTO stocks (stock_code, stock_name, industry, market)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(stock_code) DO UPDATE SET
                stock_name = excluded.stock_name,
                industry = excluded.industry,
                market = excluded.market
            "#,
        )
        .bind(&info.stock_code)
        .bind(&info.stock_name)
        .bind(&info.industry)
        .bind(&info.market)
        .execute(self.db.pool())
        .await
        .map_err(db_err)?;

        Ok(())
    }

    /// Import daily bars; re-imported dates replace the stored row.
    pub async fn import_price_history(
        &self,
        code: &str,
        bars: &[Bar],
    ) -> Result<(), AnalysisError> {
        for bar in bars {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO stock_prices_history
                    (stock_code, price_date, open_price, high_price, low_price, close_price, volume)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(code)
            .bind(bar.date)
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.volume)
            .execute(self.db.pool())
            .await
            .map_err(db_err)?;
        }

        Ok(())
    }

    pub async fn add_holding(
        &self,
        code: &str,
        quantity: f64,
        purchase_price: f64,
        purchase_date: NaiveDate,
    ) -> Result<(), AnalysisError> {
        sqlx::query(
            "INSERT INTO portfolio_holdings (stock_code, quantity, purchase_price, purchase_date) VALUES (?, ?, ?, ?)",
        )
        .bind(code)
        .bind(quantity)
        .bind(purchase_price)
        .bind(purchase_date)
        .execute(self.db.pool())
        .await
        .map_err(db_err)?;

        Ok(())
    }

    pub async fn add_trading_plan(
        &self,
        code: &str,
        analysis_type: &str,
        notes: Option<&str>,
    ) -> Result<(), AnalysisError> {
        sqlx::query(
            "INSERT INTO trading_plans (stock_code, analysis_type, notes) VALUES (?, ?, ?)",
        )
        .bind(code)
        .bind(analysis_type)
        .bind(notes)
        .execute(self.db.pool())
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl MarketDataStore for SqliteReportStore {
    async fn target_codes(&self) -> Result<Vec<String>, AnalysisError> {
        let codes: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT stock_code FROM portfolio_holdings WHERE stock_code IS NOT NULL
            UNION
            SELECT DISTINCT stock_code FROM trading_plans WHERE stock_code IS NOT NULL
            "#,
        )
        .fetch_all(self.db.pool())
        .await
        .map_err(db_err)?;

        tracing::info!("Found {} target instruments", codes.len());
        Ok(codes)
    }

    async fn price_history(&self, code: &str, days: u32) -> Result<Vec<Bar>, AnalysisError> {
        type PriceRow = (
            NaiveDate,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<f64>,
        );

        // Newest rows first to honor the limit, then flipped ascending.
        let rows: Vec<PriceRow> = sqlx::query_as(
            r#"
            SELECT price_date, open_price, high_price, low_price, close_price, volume
            FROM stock_prices_history
            WHERE stock_code = ?
            ORDER BY price_date DESC
            LIMIT ?
            "#,
        )
        .bind(code)
        .bind(days as i64)
        .fetch_all(self.db.pool())
        .await
        .map_err(db_err)?;

        let bars = rows
            .into_iter()
            .rev()
            .map(|(date, open, high, low, close, volume)| Bar {
                date,
                open,
                high,
                low,
                close,
                volume,
            })
            .collect();

        Ok(bars)
    }

    async fn basic_info(&self, code: &str) -> Result<Option<StockInfo>, AnalysisError> {
        let row: Option<(String, Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as(
                "SELECT stock_code, stock_name, industry, market FROM stocks WHERE stock_code = ?",
            )
            .bind(code)
            .fetch_optional(self.db.pool())
            .await
            .map_err(db_err)?;

        Ok(row.map(|(stock_code, stock_name, industry, market)| StockInfo {
            stock_code,
            stock_name,
            industry,
            market,
        }))
    }
}

#[async_trait]
impl AnalysisStore for SqliteReportStore {
    async fn save_indicators(&self, analysis: &StockAnalysis) -> Result<(), AnalysisError> {
        sqlx::query(
            r#"
            INSERT INTO technical_indicators (
                stock_code, analysis_date, investment_style, current_price,
                sma_5, sma_10, sma_20, sma_50, rsi_14,
                macd_line, macd_signal, macd_histogram,
                bb_upper, bb_middle, bb_lower, stoch_k, stoch_d,
                volume_ratio, price_change_1d, price_change_5d, price_change_20d,
                volatility_20d, confidence_score, analysis_version, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(stock_code, analysis_date, investment_style) DO UPDATE SET
                current_price = excluded.current_price,
                sma_5 = excluded.sma_5,
                sma_10 = excluded.sma_10,
                sma_20 = excluded.sma_20,
                sma_50 = excluded.sma_50,
                rsi_14 = excluded.rsi_14,
                macd_line = excluded.macd_line,
                macd_signal = excluded.macd_signal,
                macd_histogram = excluded.macd_histogram,
                bb_upper = excluded.bb_upper,
                bb_middle = excluded.bb_middle,
                bb_lower = excluded.bb_lower,
                stoch_k = excluded.stoch_k,
                stoch_d = excluded.stoch_d,
                volume_ratio = excluded.volume_ratio,
                price_change_1d = excluded.price_change_1d,
                price_change_5d = excluded.price_change_5d,
                price_change_20d = excluded.price_change_20d,
                volatility_20d = excluded.volatility_20d,
                confidence_score = excluded.confidence_score,
                analysis_version = excluded.analysis_version,
                created_at = excluded.created_at
            "#,
        )
        .bind(&analysis.stock_code)
        .bind(analysis.analysis_date)
        .bind(analysis.investment_style.as_str())
        .bind(analysis.current_price)
        .bind(analysis.value("sma_5"))
        .bind(analysis.value("sma_10"))
        .bind(analysis.value("sma_20"))
        .bind(analysis.value("sma_50"))
        .bind(analysis.value("rsi_14"))
        .bind(analysis.value("macd_line"))
        .bind(analysis.value("macd_signal"))
        .bind(analysis.value("macd_histogram"))
        .bind(analysis.value("bb_upper"))
        .bind(analysis.value("bb_middle"))
        .bind(analysis.value("bb_lower"))
        .bind(analysis.value("stoch_k"))
        .bind(analysis.value("stoch_d"))
        .bind(analysis.value("volume_ratio"))
        .bind(analysis.value("price_change_1d"))
        .bind(analysis.value("price_change_5d"))
        .bind(analysis.value("price_change_20d"))
        .bind(analysis.value("volatility_20d"))
        .bind(analysis.confidence_score)
        .bind(ANALYSIS_VERSION)
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await
        .map_err(db_err)?;

        tracing::info!(
            "Saved indicator snapshot for {} ({})",
            analysis.stock_code,
            analysis.investment_style.as_str()
        );
        Ok(())
    }

    async fn save_decision(&self, analysis: &StockAnalysis) -> Result<(), AnalysisError> {
        let signal_label =
            |name: &str| analysis.signals.signals.get(name).map(|s| s.label());

        sqlx::query(
            r#"
            INSERT INTO investment_decisions (
                stock_code, analysis_date, investment_style, decision_type,
                target_price, stop_loss, confidence_score,
                rsi_signal, macd_signal, bb_signal, stoch_signal, overall_signal,
                buy_count, sell_count, ai_reasoning, risk_assessment, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(stock_code, analysis_date, investment_style) DO UPDATE SET
                decision_type = excluded.decision_type,
                target_price = excluded.target_price,
                stop_loss = excluded.stop_loss,
                confidence_score = excluded.confidence_score,
                rsi_signal = excluded.rsi_signal,
                macd_signal = excluded.macd_signal,
                bb_signal = excluded.bb_signal,
                stoch_signal = excluded.stoch_signal,
                overall_signal = excluded.overall_signal,
                buy_count = excluded.buy_count,
                sell_count = excluded.sell_count,
                ai_reasoning = excluded.ai_reasoning,
                risk_assessment = excluded.risk_assessment,
                created_at = excluded.created_at
            "#,
        )
        .bind(&analysis.stock_code)
        .bind(analysis.analysis_date)
        .bind(analysis.investment_style.as_str())
        .bind("analyze")
        .bind(Option::<f64>::None)
        .bind(Option::<f64>::None)
        .bind(analysis.confidence_score)
        .bind(signal_label("rsi_signal"))
        .bind(signal_label("macd_signal"))
        .bind(signal_label("bb_signal"))
        .bind(signal_label("stoch_signal"))
        .bind(analysis.signals.overall.label())
        .bind(analysis.signals.buy_count as i64)
        .bind(analysis.signals.sell_count as i64)
        .bind(&analysis.rationale)
        .bind(analysis.risk.map(|r| r.label()))
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await
        .map_err(db_err)?;

        tracing::info!(
            "Saved decision snapshot for {} ({})",
            analysis.stock_code,
            analysis.investment_style.as_str()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::{Coverage, InvestmentStyle, Signal, SignalReport, Verdict};
    use std::collections::BTreeMap;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn open_store() -> SqliteReportStore {
        SqliteReportStore::open("sqlite::memory:").await.unwrap()
    }

    fn sample_analysis() -> StockAnalysis {
        let mut indicators = report_core::IndicatorMap::new();
        indicators.insert("sma_5".to_string(), Some(101.2));
        indicators.insert("sma_20".to_string(), Some(100.4));
        indicators.insert("rsi_14".to_string(), Some(55.0));
        indicators.insert("volatility_20d".to_string(), Some(0.15));

        let mut signals = BTreeMap::new();
        signals.insert("rsi_signal".to_string(), Signal::Neutral);
        signals.insert("macd_signal".to_string(), Signal::Buy);

        StockAnalysis {
            stock_code: "7203".to_string(),
            investment_style: InvestmentStyle::SwingTrading,
            analysis_date: date("2024-06-03"),
            current_price: Some(102.0),
            indicators,
            trend_direction: None,
            support_levels: vec![],
            resistance_levels: vec![],
            signals: SignalReport {
                signals,
                buy_count: 1,
                sell_count: 0,
                overall: Verdict::Buy,
            },
            confidence_score: 0.8,
            rationale: "= rsi_signal (neutral), + macd_signal (buy)".to_string(),
            risk: None,
            coverage: Coverage::Full,
            data_points: 60,
        }
    }

    #[tokio::test]
    async fn target_codes_are_distinct_union_of_holdings_and_plans() {
        let store = open_store().await;
        store
            .add_holding("7203", 100.0, 1500.0, date("2024-01-10"))
            .await
            .unwrap();
        store
            .add_trading_plan("7203", "swing", None)
            .await
            .unwrap();
        store
            .add_trading_plan("9984", "long", Some("watch"))
            .await
            .unwrap();

        let mut codes = store.target_codes().await.unwrap();
        codes.sort();
        assert_eq!(codes, vec!["7203".to_string(), "9984".to_string()]);
    }

    #[tokio::test]
    async fn price_history_is_ascending_and_keeps_nulls() {
        let store = open_store().await;
        let bars = vec![
            Bar {
                date: date("2024-06-03"),
                open: Some(100.0),
                high: Some(101.0),
                low: Some(99.0),
                close: Some(100.5),
                volume: Some(1_000.0),
            },
            Bar {
                date: date("2024-06-04"),
                open: None,
                high: None,
                low: None,
                close: None,
                volume: None,
            },
            Bar {
                date: date("2024-06-05"),
                open: Some(100.5),
                high: Some(102.0),
                low: Some(100.0),
                close: Some(101.5),
                volume: Some(1_200.0),
            },
        ];
        store.import_price_history("7203", &bars).await.unwrap();

        let loaded = store.price_history("7203", 365).await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].date, date("2024-06-03"));
        assert_eq!(loaded[2].date, date("2024-06-05"));
        assert_eq!(loaded[1].close, None);
        assert_eq!(loaded[2].close, Some(101.5));
    }

    #[tokio::test]
    async fn price_history_honors_row_limit_from_newest() {
        let store = open_store().await;
        let bars: Vec<Bar> = (1..=5)
            .map(|d| Bar {
                date: date(&format!("2024-06-0{d}")),
                open: Some(100.0),
                high: Some(101.0),
                low: Some(99.0),
                close: Some(100.0 + d as f64),
                volume: Some(1_000.0),
            })
            .collect();
        store.import_price_history("7203", &bars).await.unwrap();

        let loaded = store.price_history("7203", 2).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].date, date("2024-06-04"));
        assert_eq!(loaded[1].date, date("2024-06-05"));
    }

    #[tokio::test]
    async fn saving_indicators_twice_keeps_one_row() {
        let store = open_store().await;
        let mut analysis = sample_analysis();

        store.save_indicators(&analysis).await.unwrap();
        analysis.confidence_score = 0.9;
        store.save_indicators(&analysis).await.unwrap();

        let (count, confidence): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), MAX(confidence_score) FROM technical_indicators WHERE stock_code = ?",
        )
        .bind(&analysis.stock_code)
        .fetch_one(store.db().pool())
        .await
        .unwrap();

        assert_eq!(count, 1);
        assert!((confidence - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn saving_decision_twice_keeps_one_row() {
        let store = open_store().await;
        let analysis = sample_analysis();

        store.save_decision(&analysis).await.unwrap();
        store.save_decision(&analysis).await.unwrap();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM investment_decisions WHERE stock_code = ? AND investment_style = ?",
        )
        .bind(&analysis.stock_code)
        .bind(analysis.investment_style.as_str())
        .fetch_one(store.db().pool())
        .await
        .unwrap();
        assert_eq!(count, 1);

        let (overall, risk): (String, Option<String>) = sqlx::query_as(
            "SELECT overall_signal, risk_assessment FROM investment_decisions WHERE stock_code = ?",
        )
        .bind(&analysis.stock_code)
        .fetch_one(store.db().pool())
        .await
        .unwrap();
        assert_eq!(overall, "buy");
        assert_eq!(risk, None);
    }

    #[tokio::test]
    async fn distinct_styles_get_distinct_rows() {
        let store = open_store().await;
        let mut analysis = sample_analysis();

        store.save_indicators(&analysis).await.unwrap();
        analysis.investment_style = InvestmentStyle::LongTerm;
        store.save_indicators(&analysis).await.unwrap();

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM technical_indicators WHERE stock_code = ?")
                .bind(&analysis.stock_code)
                .fetch_one(store.db().pool())
                .await
                .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn basic_info_round_trips() {
        let store = open_store().await;
        store
            .upsert_stock(&StockInfo {
                stock_code: "7203".to_string(),
                stock_name: Some("Sample Motor".to_string()),
                industry: Some("Transportation Equipment".to_string()),
                market: Some("Prime".to_string()),
            })
            .await
            .unwrap();

        let info = store.basic_info("7203").await.unwrap().unwrap();
        assert_eq!(info.stock_name.as_deref(), Some("Sample Motor"));
        assert!(store.basic_info("0000").await.unwrap().is_none());
    }
}
