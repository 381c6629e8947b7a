//! Per-pair trade decision from predictor output and trend indicators.
//!
//! Predictor-covered pairs always trade: BUY when the prediction is above the
//! current close and the fast EMA is above the slow EMA, SELL otherwise.
//! Pairs without a predictor only ever BUY (trend strength above threshold)
//! or HOLD.

use std::fmt;

use crate::domain::error::TraderError;
use crate::domain::snapshot::{IndicatorWindows, MarketSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalSource {
    WithPredictor(f64),
    IndicatorOnly,
}

impl From<Option<f64>> for SignalSource {
    fn from(prediction: Option<f64>) -> Self {
        match prediction {
            Some(p) => SignalSource::WithPredictor(p),
            None => SignalSource::IndicatorOnly,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalGenerator {
    windows: IndicatorWindows,
}

impl SignalGenerator {
    pub fn new(windows: IndicatorWindows) -> Self {
        SignalGenerator { windows }
    }

    pub fn generate(
        &self,
        pair: &str,
        snapshot: &MarketSnapshot,
        source: SignalSource,
    ) -> Result<Signal, TraderError> {
        let minimum = self.windows.required_bars();
        let insufficient = || TraderError::InsufficientData {
            pair: pair.to_string(),
            bars: snapshot.bar_count(),
            minimum,
        };

        if snapshot.bar_count() < minimum {
            return Err(insufficient());
        }

        match source {
            SignalSource::WithPredictor(prediction) => {
                let (Some(close), Some(fast), Some(slow)) = (
                    snapshot.current_close(),
                    snapshot.fast_ema(),
                    snapshot.slow_ema(),
                ) else {
                    return Err(insufficient());
                };
                let cross_up = fast > slow;
                if prediction > close && cross_up {
                    Ok(Signal::Buy)
                } else {
                    Ok(Signal::Sell)
                }
            }
            SignalSource::IndicatorOnly => {
                let strength = snapshot.trend_strength().ok_or_else(insufficient)?;
                if strength > self.windows.trend_threshold {
                    Ok(Signal::Buy)
                } else {
                    Ok(Signal::Hold)
                }
            }
        }
    }
}
