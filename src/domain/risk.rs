//! Risk parameters and the trading pairs they cover.

use std::collections::HashMap;

use crate::domain::error::TraderError;

/// Tolerance used for fraction sums.
pub const FRACTION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct TradingPair {
    pub symbol: String,
    pub allocation: f64,
    pub volatility_multiplier: f64,
}

/// Process-wide risk configuration. Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskParameters {
    /// Negative fraction of the session's initial balance, e.g. -0.05.
    pub max_daily_loss: f64,
    /// Take-profit price offsets above entry, nearest first.
    pub take_profit_tiers: [f64; 3],
    /// Share of the position closed at each tier. Sums to 1.0.
    pub take_profit_split: [f64; 3],
    /// Stop-limit sits this fraction below the stop trigger.
    pub stop_limit_offset: f64,
    /// ATR substitute as a fraction of entry price when no ATR is available.
    pub default_atr_fraction: f64,
    pub allocations: HashMap<String, f64>,
    pub volatility_multipliers: HashMap<String, f64>,
}

impl Default for RiskParameters {
    fn default() -> Self {
        RiskParameters {
            max_daily_loss: -0.05,
            take_profit_tiers: [0.02, 0.05, 0.10],
            take_profit_split: [0.5, 0.25, 0.25],
            stop_limit_offset: 0.02,
            default_atr_fraction: 0.02,
            allocations: HashMap::new(),
            volatility_multipliers: HashMap::new(),
        }
    }
}

impl RiskParameters {
    pub fn allocation(&self, pair: &str) -> Result<f64, TraderError> {
        self.allocations
            .get(pair)
            .copied()
            .ok_or_else(|| TraderError::Configuration {
                reason: format!("no allocation configured for {pair}"),
            })
    }

    pub fn volatility_multiplier(&self, pair: &str) -> Result<f64, TraderError> {
        self.volatility_multipliers
            .get(pair)
            .copied()
            .ok_or_else(|| TraderError::Configuration {
                reason: format!("no volatility multiplier configured for {pair}"),
            })
    }

    pub fn pair(&self, symbol: &str) -> Result<TradingPair, TraderError> {
        Ok(TradingPair {
            symbol: symbol.to_string(),
            allocation: self.allocation(symbol)?,
            volatility_multiplier: self.volatility_multiplier(symbol)?,
        })
    }

    /// ATR stand-in for when the feed has none.
    pub fn fallback_atr(&self, entry_price: f64) -> f64 {
        self.default_atr_fraction * entry_price
    }

    /// Resolve every symbol into a `TradingPair`, failing on the first gap or
    /// out-of-range value.
    pub fn validate_pairs(&self, symbols: &[String]) -> Result<Vec<TradingPair>, TraderError> {
        if symbols.is_empty() {
            return Err(TraderError::Configuration {
                reason: "no trading pairs configured".into(),
            });
        }
        if !(self.max_daily_loss < 0.0 && self.max_daily_loss > -1.0) {
            return Err(TraderError::Configuration {
                reason: format!(
                    "max_daily_loss must be between -1 and 0, got {}",
                    self.max_daily_loss
                ),
            });
        }

        let pairs = symbols
            .iter()
            .map(|s| self.pair(s))
            .collect::<Result<Vec<_>, _>>()?;

        for pair in &pairs {
            if !(pair.allocation > 0.0 && pair.allocation <= 1.0) {
                return Err(TraderError::Configuration {
                    reason: format!(
                        "allocation for {} must be in (0, 1], got {}",
                        pair.symbol, pair.allocation
                    ),
                });
            }
            if !(pair.volatility_multiplier > 0.0 && pair.volatility_multiplier.is_finite()) {
                return Err(TraderError::Configuration {
                    reason: format!(
                        "volatility multiplier for {} must be positive, got {}",
                        pair.symbol, pair.volatility_multiplier
                    ),
                });
            }
        }

        let total: f64 = pairs.iter().map(|p| p.allocation).sum();
        if total > 1.0 + FRACTION_EPSILON {
            return Err(TraderError::Configuration {
                reason: format!("allocations sum to {total:.4}, must not exceed 1"),
            });
        }

        Ok(pairs)
    }
}
