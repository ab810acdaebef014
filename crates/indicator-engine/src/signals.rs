//! Threshold rules mapping indicator snapshots to discrete signals, and the
//! tally that turns them into one overall verdict.

use std::collections::BTreeMap;

use report_core::{IndicatorMap, Signal, SignalReport, Verdict};

/// Indicator-map keys one signal pass reads. Horizons publish the same
/// families under different names, so the rule set is pointed at the right
/// keys instead of being duplicated per horizon.
#[derive(Debug, Clone, Copy)]
pub struct SignalKeys {
    pub rsi: &'static str,
    pub macd_line: &'static str,
    pub macd_signal: &'static str,
    pub macd_histogram: &'static str,
    pub bb_upper: &'static str,
    pub bb_lower: &'static str,
    pub stoch_k: &'static str,
    pub stoch_d: &'static str,
    pub volatility: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct RsiThresholds {
    pub overbought: f64,
    pub oversold: f64,
    /// Optional (overbought, oversold) pair for the strong variants.
    pub strong: Option<(f64, f64)>,
}

impl RsiThresholds {
    pub const fn standard() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
            strong: None,
        }
    }

    pub const fn sharpened() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
            strong: Some((75.0, 25.0)),
        }
    }
}

fn value(map: &IndicatorMap, key: &str) -> Option<f64> {
    map.get(key).copied().flatten()
}

fn rsi_rule(rsi: f64, thresholds: &RsiThresholds) -> Signal {
    if let Some((strong_ob, strong_os)) = thresholds.strong {
        if rsi > strong_ob {
            return Signal::StrongSell;
        }
        if rsi < strong_os {
            return Signal::StrongBuy;
        }
    }
    if rsi > thresholds.overbought {
        Signal::Sell
    } else if rsi < thresholds.oversold {
        Signal::Buy
    } else {
        Signal::Neutral
    }
}

fn macd_rule(line: f64, signal: f64, histogram: f64) -> Signal {
    if line > signal && histogram > 0.0 {
        Signal::Buy
    } else if line < signal && histogram < 0.0 {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

fn bollinger_rule(price: f64, upper: f64, lower: f64) -> Signal {
    if price >= upper {
        Signal::Sell
    } else if price <= lower {
        Signal::Buy
    } else {
        Signal::Neutral
    }
}

fn stochastic_rule(k: f64, d: f64) -> Signal {
    if k > 80.0 && d > 80.0 {
        Signal::Sell
    } else if k < 20.0 && d < 20.0 {
        Signal::Buy
    } else {
        Signal::Neutral
    }
}

/// Golden/dead cross from the 50/200 moving-average pair, falling back to
/// the 20/50 pair when the long one is unavailable.
fn trend_cross_rule(map: &IndicatorMap) -> Option<Signal> {
    let pair = value(map, "sma_50")
        .zip(value(map, "sma_200"))
        .or_else(|| value(map, "sma_20").zip(value(map, "sma_50")));
    pair.map(|(short, long)| {
        if short > long {
            Signal::Buy
        } else {
            Signal::Sell
        }
    })
}

/// Run every applicable rule. A rule only produces an entry when all of its
/// inputs are defined; rules never read each other's output.
pub fn classify(
    indicators: &IndicatorMap,
    current_price: Option<f64>,
    keys: &SignalKeys,
    rsi_thresholds: &RsiThresholds,
    with_trend_cross: bool,
) -> SignalReport {
    let mut signals = BTreeMap::new();

    if let Some(rsi) = value(indicators, keys.rsi) {
        signals.insert("rsi_signal".to_string(), rsi_rule(rsi, rsi_thresholds));
    }

    if let (Some(line), Some(signal), Some(histogram)) = (
        value(indicators, keys.macd_line),
        value(indicators, keys.macd_signal),
        value(indicators, keys.macd_histogram),
    ) {
        signals.insert(
            "macd_signal".to_string(),
            macd_rule(line, signal, histogram),
        );
    }

    if let (Some(price), Some(upper), Some(lower)) = (
        current_price,
        value(indicators, keys.bb_upper),
        value(indicators, keys.bb_lower),
    ) {
        signals.insert("bb_signal".to_string(), bollinger_rule(price, upper, lower));
    }

    if let (Some(k), Some(d)) = (
        value(indicators, keys.stoch_k),
        value(indicators, keys.stoch_d),
    ) {
        signals.insert("stoch_signal".to_string(), stochastic_rule(k, d));
    }

    if with_trend_cross {
        if let Some(signal) = trend_cross_rule(indicators) {
            signals.insert("trend_signal".to_string(), signal);
        }
    }

    aggregate(signals)
}

/// Count directional labels and resolve the verdict; ties (including no
/// signals at all) are neutral.
pub fn aggregate(signals: BTreeMap<String, Signal>) -> SignalReport {
    let buy_count = signals.values().filter(|s| s.is_buy()).count() as u32;
    let sell_count = signals.values().filter(|s| s.is_sell()).count() as u32;

    let overall = match buy_count.cmp(&sell_count) {
        std::cmp::Ordering::Greater => Verdict::Buy,
        std::cmp::Ordering::Less => Verdict::Sell,
        std::cmp::Ordering::Equal => Verdict::Neutral,
    };

    SignalReport {
        signals,
        buy_count,
        sell_count,
        overall,
    }
}

/// Heuristic confidence in the snapshot: base 0.5, up to +0.3 for indicator
/// completeness, +0.1 in calm markets (20-day volatility under 0.2).
pub fn confidence_score(indicators: &IndicatorMap) -> f64 {
    let mut score = 0.5;

    if !indicators.is_empty() {
        let defined = indicators.values().filter(|v| v.is_some()).count();
        score += defined as f64 / indicators.len() as f64 * 0.3;
    }

    if let Some(vol) = value(indicators, "volatility_20d") {
        if vol < 0.2 {
            score += 0.1;
        }
    }

    score.clamp(0.0, 1.0)
}
