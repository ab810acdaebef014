//! Batch orchestration: run every target instrument through the analysis
//! engine for each configured style and persist the snapshots. One bad
//! instrument never aborts the rest of the batch.

use std::sync::Arc;
use std::time::Instant;

use indicator_engine::AnalysisEngine;
use report_core::{AnalysisError, InvestmentStyle, ReportStore};
use serde::Serialize;

/// Outcome summary of one batch run, written next to the reports as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub success: bool,
    pub total_stocks: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub failed_stocks: Vec<String>,
    pub execution_time_secs: f64,
    pub investment_styles: Vec<String>,
}

pub struct BatchRunner<S> {
    store: Arc<S>,
    styles: Vec<InvestmentStyle>,
    history_days: u32,
}

impl<S> BatchRunner<S>
where
    S: ReportStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            styles: InvestmentStyle::all().to_vec(),
            history_days: 365,
        }
    }

    pub fn with_styles(mut self, styles: Vec<InvestmentStyle>) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_history_days(mut self, days: u32) -> Self {
        self.history_days = days;
        self
    }

    /// Analyze and persist every target instrument. Instruments run as
    /// independent tasks; per-instrument failures are collected, not
    /// propagated.
    pub async fn run(&self) -> Result<BatchSummary, AnalysisError> {
        let start = Instant::now();
        let codes = self.store.target_codes().await?;
        tracing::info!("Starting batch analysis for {} instruments", codes.len());

        let mut handles = Vec::with_capacity(codes.len());
        for code in &codes {
            let store = Arc::clone(&self.store);
            let styles = self.styles.clone();
            let days = self.history_days;
            let code = code.clone();
            handles.push((
                code.clone(),
                tokio::spawn(async move {
                    analyze_instrument(store.as_ref(), &code, &styles, days).await
                }),
            ));
        }

        let mut success_count = 0;
        let mut failed_stocks = Vec::new();
        for (code, handle) in handles {
            match handle.await {
                Ok(Ok(())) => success_count += 1,
                Ok(Err(e)) => {
                    tracing::error!("Analysis failed for {}: {}", code, e);
                    failed_stocks.push(code);
                }
                Err(e) => {
                    tracing::error!("Analysis task for {} did not finish: {}", code, e);
                    failed_stocks.push(code);
                }
            }
        }

        let summary = BatchSummary {
            success: true,
            total_stocks: codes.len(),
            success_count,
            failed_count: failed_stocks.len(),
            failed_stocks,
            execution_time_secs: start.elapsed().as_secs_f64(),
            investment_styles: self.styles.iter().map(|s| s.as_str().to_string()).collect(),
        };

        tracing::info!(
            "Batch analysis finished: {}/{} instruments saved in {:.2}s",
            summary.success_count,
            summary.total_stocks,
            summary.execution_time_secs
        );

        Ok(summary)
    }
}

/// Analyze one instrument for every requested style and persist both
/// snapshots. A style whose history is too short is skipped; if no style
/// could be saved the instrument counts as failed.
async fn analyze_instrument<S: ReportStore>(
    store: &S,
    code: &str,
    styles: &[InvestmentStyle],
    history_days: u32,
) -> Result<(), AnalysisError> {
    if let Some(info) = store.basic_info(code).await? {
        tracing::info!(
            "Analyzing {} {}",
            code,
            info.stock_name.as_deref().unwrap_or("(unnamed)")
        );
    }

    let bars = store.price_history(code, history_days).await?;
    if bars.is_empty() {
        return Err(AnalysisError::InsufficientData(format!(
            "no price history for {code}"
        )));
    }

    let engine = AnalysisEngine::new();
    let mut saved = 0;
    for style in styles {
        let analysis = engine.analyze(code, &bars, *style);
        if !analysis.is_available() {
            tracing::warn!(
                "Analysis unavailable for {} ({}): {} bars",
                code,
                style.as_str(),
                bars.len()
            );
            continue;
        }

        store.save_indicators(&analysis).await?;
        store.save_decision(&analysis).await?;
        saved += 1;
    }

    if saved == 0 {
        return Err(AnalysisError::InsufficientData(format!(
            "no style produced indicators for {code}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod runner_tests;
