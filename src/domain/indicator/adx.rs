//! Average Directional Index (trend strength), Wilder's method.
//!
//! For each bar after the first:
//! - +DM = high - prev_high when it exceeds prev_low - low and is positive, else 0
//! - -DM = prev_low - low when it exceeds high - prev_high and is positive, else 0
//! - TR  = true range against the previous close
//!
//! +DM, -DM and TR are Wilder-smoothed (first value is the plain sum of bars
//! 1..=n, then S[i] = S[i-1] - S[i-1]/n + x[i]). From those:
//! +DI = 100 * S(+DM) / S(TR), -DI = 100 * S(-DM) / S(TR),
//! DX = 100 * |+DI - -DI| / (+DI + -DI).
//!
//! ADX seeds with the mean of the first n DX values and is then smoothed like
//! ATR. Warmup: first (2n - 1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 * period {
        return IndicatorSeries::empty(IndicatorType::Adx(period));
    }

    let n = period as f64;
    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint {
        timestamp: bars[0].timestamp,
        valid: false,
        value: 0.0,
    });

    let mut smoothed_plus = 0.0;
    let mut smoothed_minus = 0.0;
    let mut smoothed_tr = 0.0;
    let mut dx_sum = 0.0;
    let mut adx = 0.0;

    for i in 1..bars.len() {
        let (bar, prev) = (&bars[i], &bars[i - 1]);
        let up = bar.high - prev.high;
        let down = prev.low - bar.low;
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
        let tr = bar.true_range(prev.close);

        if i <= period {
            smoothed_plus += plus_dm;
            smoothed_minus += minus_dm;
            smoothed_tr += tr;
        } else {
            smoothed_plus = smoothed_plus - smoothed_plus / n + plus_dm;
            smoothed_minus = smoothed_minus - smoothed_minus / n + minus_dm;
            smoothed_tr = smoothed_tr - smoothed_tr / n + tr;
        }

        if i < period {
            values.push(IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: 0.0,
            });
            continue;
        }

        let dx = directional_index(smoothed_plus, smoothed_minus, smoothed_tr);
        let first_adx = 2 * period - 1;

        let valid = if i < first_adx {
            dx_sum += dx;
            false
        } else if i == first_adx {
            dx_sum += dx;
            adx = dx_sum / n;
            true
        } else {
            adx = (adx * (n - 1.0) + dx) / n;
            true
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value: if valid { adx } else { 0.0 },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Adx(period),
        values,
    }
}

fn directional_index(plus_dm: f64, minus_dm: f64, tr: f64) -> f64 {
    if tr == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_dm / tr;
    let minus_di = 100.0 * minus_dm / tr;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / di_sum
    }
}
