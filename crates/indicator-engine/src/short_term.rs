//! Short-horizon indicator set (5–50 day windows), one snapshot per series.

use report_core::{Bar, IndicatorMap};

use crate::indicators::*;
use crate::series::{latest_value, valid_count};

/// Minimum valid closes before any short-horizon indicator is produced.
pub const MIN_HISTORY: usize = 20;

fn put(map: &mut IndicatorMap, key: &str, series: &[Option<f64>]) {
    map.insert(key.to_string(), latest_value(series));
}

/// Compute the short-horizon snapshot. Series with fewer than
/// [`MIN_HISTORY`] valid closes yield an empty map, which callers surface as
/// "analysis unavailable".
pub fn compute_indicators(bars: &[Bar]) -> IndicatorMap {
    let closes = close_column(bars);
    let highs = high_column(bars);
    let lows = low_column(bars);
    let volumes = volume_column(bars);

    let mut map = IndicatorMap::new();
    if valid_count(&closes) < MIN_HISTORY {
        return map;
    }

    for window in [5, 10, 20, 50] {
        put(
            &mut map,
            &format!("sma_{window}"),
            &crate::series::rolling_mean(&closes, window),
        );
    }

    put(&mut map, "rsi_14", &rsi(&closes, 14));

    let macd = macd(&closes, 12, 26, 9);
    put(&mut map, "macd_line", &macd.line);
    put(&mut map, "macd_signal", &macd.signal);
    put(&mut map, "macd_histogram", &macd.histogram);

    let bb = bollinger_bands(&closes, 20, 2.0);
    put(&mut map, "bb_upper", &bb.upper);
    put(&mut map, "bb_middle", &bb.middle);
    put(&mut map, "bb_lower", &bb.lower);

    let stoch = stochastic(&highs, &lows, &closes, 14, 3);
    put(&mut map, "stoch_k", &stoch.k);
    put(&mut map, "stoch_d", &stoch.d);

    put(
        &mut map,
        "volume_sma_20",
        &crate::series::rolling_mean(&volumes, 20),
    );
    put(&mut map, "volume_ratio", &volume_ratio(&volumes, 20));

    for lag in [1, 5, 20] {
        put(
            &mut map,
            &format!("price_change_{lag}d"),
            &crate::series::percent_change(&closes, lag),
        );
    }

    put(&mut map, "volatility_20d", &volatility(&closes, 20));

    map
}
