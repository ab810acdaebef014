//! Long-horizon indicator set (26–252 day windows) with graceful
//! degradation: short history narrows the output instead of failing.

use report_core::{Bar, IndicatorMap, TrendDirection};

use crate::indicators::*;
use crate::series::{latest_value, percent_change, rolling_mean, valid_count};

/// Minimum valid closes for the full long-horizon set; below it the reduced
/// set is computed instead.
pub const MIN_FULL_HISTORY: usize = 50;

pub struct LongTermOutput {
    pub indicators: IndicatorMap,
    pub trend_direction: Option<TrendDirection>,
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
    pub degraded: bool,
}

fn put(map: &mut IndicatorMap, key: &str, series: &[Option<f64>]) {
    map.insert(key.to_string(), latest_value(series));
}

/// Largest trend window the history supports.
fn best_trend_window(data_length: usize) -> Option<usize> {
    [200, 100, 50, 20]
        .into_iter()
        .find(|w| data_length >= *w)
}

pub fn compute_indicators(bars: &[Bar]) -> LongTermOutput {
    let closes = close_column(bars);
    let highs = high_column(bars);
    let lows = low_column(bars);
    let volumes = volume_column(bars);
    let data_length = valid_count(&closes);

    if data_length < MIN_FULL_HISTORY {
        return compute_reduced(&closes, &highs, &lows, data_length);
    }

    let mut map = IndicatorMap::new();

    for window in [50, 100, 200] {
        if data_length >= window {
            put(&mut map, &format!("sma_{window}"), &rolling_mean(&closes, window));
            put(
                &mut map,
                &format!("ema_{window}"),
                &crate::series::exponential_mean(&closes, window),
            );
        }
    }

    for period in [26, 52] {
        if data_length >= period {
            put(&mut map, &format!("rsi_{period}"), &rsi(&closes, period));
        }
    }

    let bb = bollinger_bands(&closes, 50, 2.0);
    put(&mut map, "bb_upper_50", &bb.upper);
    put(&mut map, "bb_middle_50", &bb.middle);
    put(&mut map, "bb_lower_50", &bb.lower);

    let macd = macd(&closes, 12, 26, 9);
    put(&mut map, "macd_line_26", &macd.line);
    put(&mut map, "macd_signal_26", &macd.signal);
    put(&mut map, "macd_histogram_26", &macd.histogram);

    let stoch = stochastic(&highs, &lows, &closes, 26, 9);
    put(&mut map, "stoch_k_26", &stoch.k);
    put(&mut map, "stoch_d_26", &stoch.d);

    for lag in [50, 100, 200] {
        if data_length >= lag {
            put(
                &mut map,
                &format!("price_change_{lag}d"),
                &percent_change(&closes, lag),
            );
        }
    }
    if data_length >= 252 {
        put(&mut map, "price_change_1y", &percent_change(&closes, 252));
    }

    for window in [50, 100, 200] {
        if data_length >= window {
            put(
                &mut map,
                &format!("volatility_{window}d"),
                &volatility(&closes, window),
            );
        }
    }

    let trend_window = best_trend_window(data_length).unwrap_or(50);
    map.insert(
        "trend_strength".to_string(),
        trend_strength(&closes, trend_window),
    );
    let trend = trend_direction(&closes, trend_window);

    let lookback = data_length.min(200);
    let (support_levels, resistance_levels) = support_resistance(&closes, lookback);

    put(&mut map, "volume_sma_50", &rolling_mean(&volumes, 50));
    put(&mut map, "volume_ratio_50", &volume_ratio(&volumes, 50));

    LongTermOutput {
        indicators: map,
        trend_direction: trend,
        support_levels,
        resistance_levels,
        degraded: false,
    }
}

/// Reduced set for series below [`MIN_FULL_HISTORY`] valid closes: the same
/// families re-parameterized at 20/14/10/5 windows.
fn compute_reduced(
    closes: &[Option<f64>],
    highs: &[Option<f64>],
    lows: &[Option<f64>],
    data_length: usize,
) -> LongTermOutput {
    let mut map = IndicatorMap::new();
    let mut trend = None;

    if data_length >= 20 {
        put(&mut map, "sma_20", &rolling_mean(closes, 20));
        put(
            &mut map,
            "ema_20",
            &crate::series::exponential_mean(closes, 20),
        );
        put(&mut map, "rsi_14", &rsi(closes, 14));

        let bb = bollinger_bands(closes, 20, 2.0);
        put(&mut map, "bb_upper_20", &bb.upper);
        put(&mut map, "bb_middle_20", &bb.middle);
        put(&mut map, "bb_lower_20", &bb.lower);
    }

    if data_length >= 14 {
        let stoch = stochastic(highs, lows, closes, 14, 3);
        put(&mut map, "stoch_k_14", &stoch.k);
        put(&mut map, "stoch_d_14", &stoch.d);
    }

    for lag in [5, 10, 20] {
        if data_length >= lag {
            put(
                &mut map,
                &format!("price_change_{lag}d"),
                &percent_change(closes, lag),
            );
        }
    }

    if data_length >= 20 {
        map.insert("trend_strength".to_string(), trend_strength(closes, 20));
        trend = trend_direction(closes, 20);
    }

    let lookback = data_length.min(50);
    let (support_levels, resistance_levels) = support_resistance(closes, lookback);

    LongTermOutput {
        indicators: map,
        trend_direction: trend,
        support_levels,
        resistance_levels,
        degraded: true,
    }
}
