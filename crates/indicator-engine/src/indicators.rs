//! Indicator families built on the windowed series transforms. All outputs
//! stay aligned with the input series; snapshots take the latest value only.

use report_core::{Bar, TrendDirection};

use crate::series::*;

pub fn close_column(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| b.close).collect()
}

pub fn high_column(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| b.high).collect()
}

pub fn low_column(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| b.low).collect()
}

pub fn volume_column(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| b.volume).collect()
}

/// Relative strength index over simple average gain / average loss.
///
/// A window with losses but no gains comes out near 0, a window with gains
/// but no losses clamps to 100, and a fully flat window (no gains and no
/// losses) is undefined.
pub fn rsi(closes: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut gains = vec![None; n];
    let mut losses = vec![None; n];
    for i in 1..n {
        if let (Some(cur), Some(prev)) = (closes[i], closes[i - 1]) {
            let delta = cur - prev;
            gains[i] = Some(delta.max(0.0));
            losses[i] = Some((-delta).max(0.0));
        }
    }

    let gain_mean = rolling_mean(&gains, period);
    let loss_mean = rolling_mean(&losses, period);

    gain_mean
        .iter()
        .zip(&loss_mean)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) if *l > 0.0 => {
                let rs = g / l;
                Some(100.0 - 100.0 / (1.0 + rs))
            }
            (Some(g), Some(_)) if *g > 0.0 => Some(100.0),
            _ => None,
        })
        .collect()
}

pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// MACD line (fast EMA − slow EMA), its EMA signal line, and the histogram.
pub fn macd(closes: &[Option<f64>], fast: usize, slow: usize, signal_span: usize) -> Macd {
    let fast_ema = exponential_mean(closes, fast);
    let slow_ema = exponential_mean(closes, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal = exponential_mean(&line, signal_span);

    let histogram = line
        .iter()
        .zip(&signal)
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    Macd {
        line,
        signal,
        histogram,
    }
}

pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Volatility bands at middle ± `width` trailing standard deviations.
pub fn bollinger_bands(closes: &[Option<f64>], period: usize, width: f64) -> BollingerBands {
    let middle = rolling_mean(closes, period);
    let std = rolling_std(closes, period);

    let upper = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m + width * s),
            _ => None,
        })
        .collect();
    let lower = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - width * s),
            _ => None,
        })
        .collect();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

pub struct Stochastic {
    pub k: Vec<Option<f64>>,
    pub d: Vec<Option<f64>>,
}

/// Stochastic oscillator %K/%D. %K is undefined where the trailing
/// high-low range is zero.
pub fn stochastic(
    highs: &[Option<f64>],
    lows: &[Option<f64>],
    closes: &[Option<f64>],
    k_period: usize,
    d_period: usize,
) -> Stochastic {
    let lowest = rolling_min(lows, k_period);
    let highest = rolling_max(highs, k_period);

    let k: Vec<Option<f64>> = (0..closes.len())
        .map(|i| match (closes[i], lowest[i], highest[i]) {
            (Some(c), Some(lo), Some(hi)) if hi > lo => Some(100.0 * (c - lo) / (hi - lo)),
            _ => None,
        })
        .collect();

    let d = rolling_mean(&k, d_period);

    Stochastic { k, d }
}

/// Volume relative to its trailing average.
pub fn volume_ratio(volumes: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mean = rolling_mean(volumes, period);
    volumes
        .iter()
        .zip(&mean)
        .map(|(v, m)| match (v, m) {
            (Some(v), Some(m)) if *m != 0.0 => Some(v / m),
            _ => None,
        })
        .collect()
}

/// Annualized volatility: trailing standard deviation of daily returns
/// scaled by √252.
pub fn volatility(closes: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let returns = daily_returns(closes);
    rolling_std(&returns, period)
        .into_iter()
        .map(|s| s.map(|s| s * (252.0_f64).sqrt()))
        .collect()
}

/// Distance of the 20-day average from the long average, as a percentage of
/// the long average, capped at 100.
pub fn trend_strength(closes: &[Option<f64>], long_window: usize) -> Option<f64> {
    let short = last_valid(&rolling_mean(closes, 20))?;
    let long = last_valid(&rolling_mean(closes, long_window))?;
    if long == 0.0 {
        return None;
    }
    Some(((short - long) / long * 100.0).abs().min(100.0))
}

/// Trend direction from the same moving-average pair.
pub fn trend_direction(closes: &[Option<f64>], long_window: usize) -> Option<TrendDirection> {
    let short = last_valid(&rolling_mean(closes, 20))?;
    let long = last_valid(&rolling_mean(closes, long_window))?;
    if short > long {
        Some(TrendDirection::Uptrend)
    } else if short < long {
        Some(TrendDirection::Downtrend)
    } else {
        Some(TrendDirection::Flat)
    }
}

/// Support levels (min, 25th, 33rd percentile) and resistance levels
/// (max, 75th, 67th percentile) of the trailing `lookback` closes. The
/// levels are raw statistics, returned unsorted.
pub fn support_resistance(closes: &[Option<f64>], lookback: usize) -> (Vec<f64>, Vec<f64>) {
    let start = closes.len().saturating_sub(lookback);
    let recent: Vec<f64> = closes[start..]
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if recent.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let support = [
        percentile(&recent, 0.0),
        percentile(&recent, 0.25),
        percentile(&recent, 0.33),
    ]
    .into_iter()
    .flatten()
    .collect();
    let resistance = [
        percentile(&recent, 1.0),
        percentile(&recent, 0.75),
        percentile(&recent, 0.67),
    ]
    .into_iter()
    .flatten()
    .collect();

    (support, resistance)
}

/// Largest peak-to-trough decline over the trailing `lookback` closes, as a
/// fraction of the peak.
pub fn max_drawdown(closes: &[Option<f64>], lookback: usize) -> Option<f64> {
    let start = closes.len().saturating_sub(lookback);
    let mut peak: Option<f64> = None;
    let mut max_dd = 0.0_f64;
    let mut seen = false;

    for value in closes[start..].iter().flatten().filter(|v| v.is_finite()) {
        seen = true;
        let p = peak.get_or_insert(*value);
        if *value > *p {
            *p = *value;
        } else if *p > 0.0 {
            max_dd = max_dd.max((*p - value) / *p);
        }
    }

    seen.then_some(max_dd)
}
