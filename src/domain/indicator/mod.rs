//! Technical indicator implementations.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of indicator values, one point per bar

pub mod adx;
pub mod atr;
pub mod ema;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Atr(usize),
    Adx(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn empty(indicator_type: IndicatorType) -> Self {
        IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        }
    }

    /// Value of the most recent bar, if it is past warmup.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().filter(|p| p.valid).map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(valid: bool, value: f64) -> IndicatorPoint {
        IndicatorPoint {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            valid,
            value,
        }
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Ema(50).to_string(), "EMA(50)");
        assert_eq!(IndicatorType::Atr(14).to_string(), "ATR(14)");
        assert_eq!(IndicatorType::Adx(14).to_string(), "ADX(14)");
    }

    #[test]
    fn latest_skips_warmup() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Ema(3),
            values: vec![point(false, 0.0), point(false, 0.0)],
        };
        assert_eq!(series.latest(), None);

        let series = IndicatorSeries {
            indicator_type: IndicatorType::Ema(3),
            values: vec![point(false, 0.0), point(true, 42.0)],
        };
        assert_eq!(series.latest(), Some(42.0));
    }

    #[test]
    fn latest_of_empty_series() {
        assert_eq!(IndicatorSeries::empty(IndicatorType::Adx(14)).latest(), None);
    }
}
