//! Market data port trait.

use crate::domain::error::TraderError;
use crate::domain::snapshot::MarketSnapshot;

pub trait MarketDataFeed {
    /// Fresh bars and indicators for `pair`. Fails with
    /// `TraderError::DataUnavailable`.
    fn fetch(&self, pair: &str) -> Result<MarketSnapshot, TraderError>;
}
