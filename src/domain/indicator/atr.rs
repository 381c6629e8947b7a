//! Average True Range with Wilder smoothing.
//!
//! Seed is the mean true range of the first n bars (bar 0 uses high - low),
//! then ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < period {
        return IndicatorSeries::empty(IndicatorType::Atr(period));
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let mut values = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let valid = if i < period - 1 {
            false
        } else if i == period - 1 {
            atr = tr_values[..=i].iter().sum::<f64>() / period as f64;
            true
        } else {
            atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
            true
        };
        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: if valid { atr } else { 0.0 },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::from_hlc;

    #[test]
    fn atr_warmup() {
        let bars = from_hlc(&[(110.0, 90.0, 100.0); 5]);
        let series = calculate_atr(&bars, 3);
        assert_eq!(series.values.len(), 5);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2..].iter().all(|p| p.valid));
    }

    #[test]
    fn atr_seed_is_average() {
        let bars = from_hlc(&[
            (110.0, 100.0, 105.0),
            (115.0, 105.0, 110.0),
            (120.0, 110.0, 115.0),
        ]);
        let series = calculate_atr(&bars, 3);
        assert!((series.values[2].value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let bars = from_hlc(&[
            (110.0, 100.0, 105.0),
            (115.0, 105.0, 110.0),
            (120.0, 110.0, 115.0),
            (135.0, 115.0, 130.0),
        ]);
        let series = calculate_atr(&bars, 3);
        // TR[3] = max(20, |135-115|, |115-115|) = 20
        let expected = (10.0 * 2.0 + 20.0) / 3.0;
        assert!((series.latest().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn atr_insufficient_bars() {
        let bars = from_hlc(&[(110.0, 90.0, 100.0); 2]);
        assert!(calculate_atr(&bars, 5).values.is_empty());
    }
}
