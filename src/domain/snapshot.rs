//! Per-cycle market snapshot: recent bars plus the indicator values the signal
//! logic reads.

use crate::domain::indicator::adx::calculate_adx;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::ohlcv::OhlcvBar;

/// Indicator windows, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorWindows {
    pub fast_ema: usize,
    pub slow_ema: usize,
    pub adx_period: usize,
    pub atr_period: usize,
    /// ADX above this reads as a trending market.
    pub trend_threshold: f64,
}

impl Default for IndicatorWindows {
    fn default() -> Self {
        IndicatorWindows {
            fast_ema: 50,
            slow_ema: 200,
            adx_period: 14,
            atr_period: 14,
            trend_threshold: 25.0,
        }
    }
}

impl IndicatorWindows {
    /// Bars needed before every indicator has a valid latest value.
    pub fn required_bars(&self) -> usize {
        self.fast_ema
            .max(self.slow_ema)
            .max(2 * self.adx_period)
            .max(self.atr_period)
    }
}

/// Latest valid value of each indicator; `None` while still in warmup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    pub trend_strength: Option<f64>,
    pub atr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub pair: String,
    /// Oldest first.
    pub bars: Vec<OhlcvBar>,
    pub indicators: IndicatorSnapshot,
}

impl MarketSnapshot {
    pub fn from_bars(pair: &str, bars: Vec<OhlcvBar>, windows: &IndicatorWindows) -> Self {
        let indicators = IndicatorSnapshot {
            fast_ema: calculate_ema(&bars, windows.fast_ema).latest(),
            slow_ema: calculate_ema(&bars, windows.slow_ema).latest(),
            trend_strength: calculate_adx(&bars, windows.adx_period).latest(),
            atr: calculate_atr(&bars, windows.atr_period).latest(),
        };
        MarketSnapshot {
            pair: pair.to_string(),
            bars,
            indicators,
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn current_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn fast_ema(&self) -> Option<f64> {
        self.indicators.fast_ema
    }

    pub fn slow_ema(&self) -> Option<f64> {
        self.indicators.slow_ema
    }

    pub fn trend_strength(&self) -> Option<f64> {
        self.indicators.trend_strength
    }

    pub fn atr(&self) -> Option<f64> {
        self.indicators.atr
    }

    /// High - low of the most recent bar; the per-cycle volatility estimate
    /// used for sizing.
    pub fn volatility_range(&self) -> Option<f64> {
        self.bars.last().map(OhlcvBar::range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_closes;

    fn small_windows() -> IndicatorWindows {
        IndicatorWindows {
            fast_ema: 3,
            slow_ema: 6,
            adx_period: 4,
            atr_period: 4,
            trend_threshold: 25.0,
        }
    }

    #[test]
    fn default_windows_match_hourly_setup() {
        let w = IndicatorWindows::default();
        assert_eq!(w.required_bars(), 200);
    }

    #[test]
    fn required_bars_accounts_for_adx_warmup() {
        let w = IndicatorWindows {
            fast_ema: 5,
            slow_ema: 10,
            adx_period: 14,
            atr_period: 14,
            trend_threshold: 25.0,
        };
        assert_eq!(w.required_bars(), 28);
    }

    #[test]
    fn from_bars_fills_indicators() {
        let closes: Vec<f64> = (0..12).map(|i| 100.0 + i as f64).collect();
        let snap = MarketSnapshot::from_bars("BTCUSDT", from_closes(&closes), &small_windows());

        assert_eq!(snap.pair, "BTCUSDT");
        assert_eq!(snap.bar_count(), 12);
        assert_eq!(snap.current_close(), Some(111.0));
        assert!(snap.fast_ema().unwrap() > snap.slow_ema().unwrap());
        assert!(snap.trend_strength().is_some());
        assert!(snap.atr().is_some());
        assert!((snap.volatility_range().unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn warmup_leaves_indicators_empty() {
        let snap = MarketSnapshot::from_bars("ETHUSDT", from_closes(&[10.0, 11.0]), &small_windows());
        assert_eq!(snap.indicators, IndicatorSnapshot::default());
        assert_eq!(snap.current_close(), Some(11.0));
    }

    #[test]
    fn empty_snapshot() {
        let snap = MarketSnapshot::from_bars("ETHUSDT", Vec::new(), &small_windows());
        assert_eq!(snap.current_close(), None);
        assert_eq!(snap.volatility_range(), None);
    }
}
