//! Windowed transforms over daily value series.
//!
//! Every function is total: positions without a complete window, and
//! positions whose window contains a missing observation, come back as
//! `None` instead of an error. Outputs are aligned with the input (same
//! length, same dates).

use statrs::statistics::Statistics;

/// Values of one trailing window ending at `end`, or `None` when the window
/// is incomplete or contains a missing observation.
fn window_values(values: &[Option<f64>], end: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || end + 1 < window {
        return None;
    }
    values[end + 1 - window..=end].iter().copied().collect()
}

/// Simple moving average over a trailing window.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| window_values(values, i, window).map(|w| w.as_slice().mean()))
        .collect()
}

/// Trailing sample standard deviation (n − 1 denominator).
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window < 2 {
                return None;
            }
            window_values(values, i, window).map(|w| w.as_slice().std_dev())
        })
        .collect()
}

/// Trailing minimum.
pub fn rolling_min(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| window_values(values, i, window).map(|w| w.as_slice().min()))
        .collect()
}

/// Trailing maximum.
pub fn rolling_max(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| window_values(values, i, window).map(|w| w.as_slice().max()))
        .collect()
}

/// Exponential moving average with smoothing factor 2/(span + 1).
///
/// Unlike the rolling functions there is no warm-up window: the first valid
/// observation seeds the average and every later valid observation updates
/// it. A missing observation yields `None` at its position and leaves the
/// running state untouched.
pub fn exponential_mean(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut state: Option<f64> = None;
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Some(v) => {
                let next = match state {
                    Some(prev) => prev + alpha * (v - prev),
                    None => *v,
                };
                state = Some(next);
                out.push(Some(next));
            }
            None => out.push(None),
        }
    }
    out
}

/// Percent change against the value `lag` positions earlier:
/// (v[i] / v[i − lag] − 1) × 100. Undefined when either value is missing or
/// the base is zero.
pub fn percent_change(values: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if lag == 0 || i < lag {
                return None;
            }
            match (values[i], values[i - lag]) {
                (Some(cur), Some(base)) if base != 0.0 => Some((cur / base - 1.0) * 100.0),
                _ => None,
            }
        })
        .collect()
}

/// Day-over-day fractional returns (the volatility input).
pub fn daily_returns(values: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            match (values[i], values[i - 1]) {
                (Some(cur), Some(prev)) if prev != 0.0 => Some(cur / prev - 1.0),
                _ => None,
            }
        })
        .collect()
}

/// The latest value of a derived series, with non-finite results normalized
/// to `None`. This is the single extraction step every indicator snapshot
/// goes through.
pub fn latest_value(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten().filter(|v| v.is_finite())
}

/// Latest defined value, scanning back past trailing gaps.
pub fn last_valid(series: &[Option<f64>]) -> Option<f64> {
    series
        .iter()
        .rev()
        .find_map(|v| *v)
        .filter(|v| v.is_finite())
}

/// Count of present, finite observations.
pub fn valid_count(values: &[Option<f64>]) -> usize {
    values.iter().flatten().filter(|v| v.is_finite()).count()
}

/// Linear-interpolated percentile of an unsorted sample, `q` in [0, 1].
pub fn percentile(sample: &[f64], q: f64) -> Option<f64> {
    if sample.is_empty() {
        return None;
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        Some(sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo]))
    }
}
