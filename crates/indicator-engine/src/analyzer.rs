//! Entry point tying the horizon engines, style extras, signal pass, and
//! confidence scoring into one immutable analysis result.

use chrono::Utc;
use report_core::{
    Bar, Coverage, IndicatorMap, InvestmentStyle, SignalReport, StockAnalysis, TrendDirection,
};

use crate::indicators;
use crate::long_term;
use crate::series::{last_valid, latest_value, percent_change, rolling_mean, valid_count};
use crate::short_term;
use crate::signals::{classify, confidence_score};
use crate::styles::{profile, risk_level, Horizon, StyleProfile};

/// Stateless analysis engine: every call is a pure function of the input
/// series and the style parameters.
pub struct AnalysisEngine;

impl AnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        stock_code: &str,
        bars: &[Bar],
        style: InvestmentStyle,
    ) -> StockAnalysis {
        let profile = profile(style);
        let closes = indicators::close_column(bars);
        let current_price = last_valid(&closes);
        let analysis_date = bars
            .last()
            .map(|b| b.date)
            .unwrap_or_else(|| Utc::now().date_naive());
        let data_length = valid_count(&closes);

        let (mut map, mut trend_direction, mut support, mut resistance, coverage) =
            match profile.horizon {
                Horizon::Short => {
                    let map = short_term::compute_indicators(bars);
                    let coverage = if map.is_empty() {
                        Coverage::Empty
                    } else {
                        Coverage::Full
                    };
                    (map, None, Vec::new(), Vec::new(), coverage)
                }
                Horizon::Long => {
                    let out = long_term::compute_indicators(bars);
                    let coverage = if out.indicators.is_empty() {
                        Coverage::Empty
                    } else if out.degraded {
                        Coverage::Degraded
                    } else {
                        Coverage::Full
                    };
                    (
                        out.indicators,
                        out.trend_direction,
                        out.support_levels,
                        out.resistance_levels,
                        coverage,
                    )
                }
            };

        if coverage != Coverage::Empty {
            self.apply_extras(
                &profile,
                &closes,
                data_length,
                &mut map,
                &mut trend_direction,
                &mut support,
                &mut resistance,
            );
        }

        let signals = if coverage == Coverage::Empty {
            SignalReport::empty()
        } else {
            classify(
                &map,
                current_price,
                &profile.keys,
                &profile.rsi_thresholds,
                profile.with_trend_cross,
            )
        };

        let confidence = confidence_score(&map);
        let rationale = build_rationale(&signals, coverage);
        let risk = risk_level(
            map.get(profile.keys.volatility).copied().flatten(),
            map.get("max_drawdown_1y").copied().flatten(),
        );

        StockAnalysis {
            stock_code: stock_code.to_string(),
            investment_style: style,
            analysis_date,
            current_price,
            indicators: map,
            trend_direction,
            support_levels: support,
            resistance_levels: resistance,
            signals,
            confidence_score: confidence,
            rationale,
            risk,
            coverage,
            data_points: bars.len(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_extras(
        &self,
        profile: &StyleProfile,
        closes: &[Option<f64>],
        data_length: usize,
        map: &mut IndicatorMap,
        trend_direction: &mut Option<TrendDirection>,
        support: &mut Vec<f64>,
        resistance: &mut Vec<f64>,
    ) {
        for period in profile.extra_rsi {
            if data_length > *period {
                map.insert(
                    format!("rsi_{period}"),
                    latest_value(&indicators::rsi(closes, *period)),
                );
            }
        }

        for window in profile.extra_sma {
            if data_length >= *window {
                map.insert(
                    format!("sma_{window}"),
                    latest_value(&rolling_mean(closes, *window)),
                );
            }
        }

        for window in profile.extra_volatility {
            if data_length > *window {
                map.insert(
                    format!("volatility_{window}d"),
                    latest_value(&indicators::volatility(closes, *window)),
                );
            }
        }

        if profile.trend_overlay {
            if let Some(window) = [200, 100, 50, 20].into_iter().find(|w| data_length >= *w) {
                map.insert(
                    "trend_strength".to_string(),
                    indicators::trend_strength(closes, window),
                );
                *trend_direction = indicators::trend_direction(closes, window);
            }
            let (s, r) = indicators::support_resistance(closes, data_length.min(200));
            *support = s;
            *resistance = r;
        }

        if profile.yearly_metrics {
            if data_length >= 252 {
                map.insert(
                    "annual_return_1y".to_string(),
                    latest_value(&percent_change(closes, 252)),
                );
            }
            map.insert(
                "max_drawdown_1y".to_string(),
                indicators::max_drawdown(closes, 252),
            );
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn build_rationale(signals: &SignalReport, coverage: Coverage) -> String {
    if coverage == Coverage::Empty {
        return "insufficient price history".to_string();
    }
    if signals.signals.is_empty() {
        return "no signals available".to_string();
    }

    let parts: Vec<String> = signals
        .signals
        .iter()
        .map(|(name, signal)| {
            let mark = if signal.is_buy() {
                "+"
            } else if signal.is_sell() {
                "-"
            } else {
                "="
            };
            format!("{} {} ({})", mark, name, signal.label())
        })
        .collect();

    format!(
        "{} => {} ({} buy / {} sell)",
        parts.join(", "),
        signals.overall.label(),
        signals.buy_count,
        signals.sell_count
    )
}
