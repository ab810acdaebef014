use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar. Fields are optional because the price store keeps
/// NULL for days where a quote could not be parsed; a missing value is never
/// substituted with zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Basic listing data for an instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockInfo {
    pub stock_code: String,
    pub stock_name: Option<String>,
    pub industry: Option<String>,
    pub market: Option<String>,
}

/// Latest-value snapshot of every computed indicator. An absent key means the
/// indicator was not computed for this horizon; a key mapped to `None` means
/// it was computed but is undefined at the latest date.
pub type IndicatorMap = BTreeMap<String, Option<f64>>;

/// Discrete per-indicator signal label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl Signal {
    pub fn is_buy(&self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Signal::StrongSell | Signal::Sell)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Signal::StrongBuy => "strong buy",
            Signal::Buy => "buy",
            Signal::Neutral => "neutral",
            Signal::Sell => "sell",
            Signal::StrongSell => "strong sell",
        }
    }
}

/// Aggregate classification across all produced signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Buy,
    Sell,
    Neutral,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Buy => "buy",
            Verdict::Sell => "sell",
            Verdict::Neutral => "neutral",
        }
    }
}

/// Per-family signals plus the directional tally and overall verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    pub signals: BTreeMap<String, Signal>,
    pub buy_count: u32,
    pub sell_count: u32,
    pub overall: Verdict,
}

impl SignalReport {
    pub fn empty() -> Self {
        Self {
            signals: BTreeMap::new(),
            buy_count: 0,
            sell_count: 0,
            overall: Verdict::Neutral,
        }
    }
}

/// Trend direction from comparing the short moving average to a long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Uptrend,
    Downtrend,
    Flat,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Uptrend => "uptrend",
            TrendDirection::Downtrend => "downtrend",
            TrendDirection::Flat => "flat",
        }
    }
}

/// Risk bucket derived from volatility and drawdown banding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// How much of the configured indicator set the input history could support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coverage {
    /// Every indicator of the horizon was computed.
    Full,
    /// History was too short for the full set; a reduced set was computed.
    Degraded,
    /// History was too short for any indicator at all.
    Empty,
}

/// Investment horizon the analysis is parameterized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentStyle {
    DayTrading,
    SwingTrading,
    LongTerm,
}

impl InvestmentStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStyle::DayTrading => "day_trading",
            InvestmentStyle::SwingTrading => "swing_trading",
            InvestmentStyle::LongTerm => "long_term",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InvestmentStyle::DayTrading => "Day trading",
            InvestmentStyle::SwingTrading => "Swing trading",
            InvestmentStyle::LongTerm => "Long-term investment",
        }
    }

    pub fn all() -> [InvestmentStyle; 3] {
        [
            InvestmentStyle::DayTrading,
            InvestmentStyle::SwingTrading,
            InvestmentStyle::LongTerm,
        ]
    }
}

/// Complete result of analyzing one instrument for one style. Built once per
/// invocation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub stock_code: String,
    pub investment_style: InvestmentStyle,
    pub analysis_date: NaiveDate,
    pub current_price: Option<f64>,
    pub indicators: IndicatorMap,
    pub trend_direction: Option<TrendDirection>,
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
    pub signals: SignalReport,
    pub confidence_score: f64,
    pub rationale: String,
    pub risk: Option<RiskLevel>,
    pub coverage: Coverage,
    pub data_points: usize,
}

impl StockAnalysis {
    /// Latest value of a named indicator, or `None` when the indicator is
    /// absent or undefined.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.indicators.get(key).copied().flatten()
    }

    pub fn is_available(&self) -> bool {
        self.coverage != Coverage::Empty
    }
}
