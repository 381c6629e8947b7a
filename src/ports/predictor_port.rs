//! Price predictor port trait.

use crate::domain::error::TraderError;
use crate::domain::snapshot::MarketSnapshot;

pub trait Predictor {
    /// Predicted next close for `pair`. `Ok(None)` means no model covers the
    /// pair, which is a normal configuration.
    fn infer(&self, pair: &str, snapshot: &MarketSnapshot) -> Result<Option<f64>, TraderError>;
}

/// Predictor with no models; every pair falls back to indicator-only signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPredictor;

impl Predictor for NoPredictor {
    fn infer(&self, _pair: &str, _snapshot: &MarketSnapshot) -> Result<Option<f64>, TraderError> {
        Ok(None)
    }
}

impl<T: Predictor + ?Sized> Predictor for Box<T> {
    fn infer(&self, pair: &str, snapshot: &MarketSnapshot) -> Result<Option<f64>, TraderError> {
        (**self).infer(pair, snapshot)
    }
}
