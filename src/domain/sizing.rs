//! Volatility-adjusted position sizing and stop-loss placement.

use crate::domain::error::TraderError;
use crate::domain::risk::RiskParameters;

pub struct PositionSizer<'a> {
    params: &'a RiskParameters,
}

impl<'a> PositionSizer<'a> {
    pub fn new(params: &'a RiskParameters) -> Self {
        PositionSizer { params }
    }

    /// (balance * allocation) / (volatility_estimate * multiplier), in units of
    /// the pair's base asset. Zero means "do not trade".
    pub fn size(
        &self,
        pair: &str,
        balance: f64,
        volatility_estimate: f64,
    ) -> Result<f64, TraderError> {
        let allocation = self.params.allocation(pair)?;
        let multiplier = self.params.volatility_multiplier(pair)?;

        if !(volatility_estimate > 0.0 && volatility_estimate.is_finite()) {
            return Err(TraderError::DegenerateVolatility {
                pair: pair.to_string(),
                estimate: volatility_estimate,
            });
        }

        let size = (balance * allocation) / (volatility_estimate * multiplier);
        Ok(size.max(0.0))
    }

    /// entry_price - atr * multiplier. The caller substitutes
    /// `RiskParameters::fallback_atr` when no ATR is available.
    pub fn stop_loss(&self, entry_price: f64, atr: f64, pair: &str) -> Result<f64, TraderError> {
        let multiplier = self.params.volatility_multiplier(pair)?;
        Ok(entry_price - atr * multiplier)
    }
}
