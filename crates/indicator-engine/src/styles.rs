//! Per-style parameterization. Each investment style is a configuration
//! record over the same engine: which horizon to run, which keys the signal
//! pass reads, and which extra indicators to add on top.

use report_core::{InvestmentStyle, RiskLevel};

use crate::signals::{RsiThresholds, SignalKeys};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    Short,
    Long,
}

#[derive(Debug, Clone)]
pub struct StyleProfile {
    pub style: InvestmentStyle,
    pub horizon: Horizon,
    pub keys: SignalKeys,
    pub rsi_thresholds: RsiThresholds,
    pub with_trend_cross: bool,
    /// Extra RSI periods added to the base set.
    pub extra_rsi: &'static [usize],
    /// Extra simple moving averages added to the base set.
    pub extra_sma: &'static [usize],
    /// Extra volatility windows added to the base set.
    pub extra_volatility: &'static [usize],
    /// Add trend strength/direction and support/resistance on top of a
    /// short-horizon base.
    pub trend_overlay: bool,
    /// Add trailing-year return and maximum drawdown.
    pub yearly_metrics: bool,
}

const SHORT_KEYS: SignalKeys = SignalKeys {
    rsi: "rsi_14",
    macd_line: "macd_line",
    macd_signal: "macd_signal",
    macd_histogram: "macd_histogram",
    bb_upper: "bb_upper",
    bb_lower: "bb_lower",
    stoch_k: "stoch_k",
    stoch_d: "stoch_d",
    volatility: "volatility_20d",
};

const LONG_KEYS: SignalKeys = SignalKeys {
    rsi: "rsi_26",
    macd_line: "macd_line_26",
    macd_signal: "macd_signal_26",
    macd_histogram: "macd_histogram_26",
    bb_upper: "bb_upper_50",
    bb_lower: "bb_lower_50",
    stoch_k: "stoch_k_26",
    stoch_d: "stoch_d_26",
    volatility: "volatility_50d",
};

pub fn profile(style: InvestmentStyle) -> StyleProfile {
    match style {
        InvestmentStyle::DayTrading => StyleProfile {
            style,
            horizon: Horizon::Short,
            keys: SHORT_KEYS,
            rsi_thresholds: RsiThresholds::sharpened(),
            with_trend_cross: false,
            extra_rsi: &[7],
            extra_sma: &[],
            extra_volatility: &[5],
            trend_overlay: false,
            yearly_metrics: false,
        },
        InvestmentStyle::SwingTrading => StyleProfile {
            style,
            horizon: Horizon::Short,
            keys: SHORT_KEYS,
            rsi_thresholds: RsiThresholds::standard(),
            with_trend_cross: false,
            extra_rsi: &[],
            extra_sma: &[100],
            extra_volatility: &[],
            trend_overlay: true,
            yearly_metrics: false,
        },
        InvestmentStyle::LongTerm => StyleProfile {
            style,
            horizon: Horizon::Long,
            keys: LONG_KEYS,
            rsi_thresholds: RsiThresholds::sharpened(),
            with_trend_cross: true,
            extra_rsi: &[],
            extra_sma: &[],
            extra_volatility: &[],
            trend_overlay: false,
            yearly_metrics: true,
        },
    }
}

/// Band volatility and drawdown into a risk bucket; when both are available
/// the worse band wins.
pub fn risk_level(volatility: Option<f64>, drawdown: Option<f64>) -> Option<RiskLevel> {
    let from_volatility = volatility.map(|v| {
        if v > 0.4 {
            RiskLevel::High
        } else if v > 0.2 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    });
    let from_drawdown = drawdown.map(|d| {
        if d > 0.30 {
            RiskLevel::High
        } else if d > 0.15 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    });

    match (from_volatility, from_drawdown) {
        (Some(v), Some(d)) => Some(v.max(d)),
        (Some(v), None) => Some(v),
        (None, Some(d)) => Some(d),
        (None, None) => None,
    }
}
