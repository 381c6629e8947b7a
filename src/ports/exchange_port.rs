//! Exchange gateway port trait.

use crate::domain::error::TraderError;
use crate::domain::ladder::OrderLadder;

/// Acknowledgement for a fully placed ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub pair: String,
    pub order_ids: Vec<String>,
}

pub trait ExchangeGateway {
    /// Free quote-asset balance.
    fn balance(&self) -> Result<f64, TraderError>;

    /// Place every leg of the ladder. A rejected leg fails with
    /// `TraderError::OrderRejected` carrying the number of legs already placed.
    fn submit(&mut self, ladder: &OrderLadder) -> Result<SubmissionReceipt, TraderError>;
}
