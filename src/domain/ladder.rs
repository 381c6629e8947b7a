//! Exit ladder construction: one stop-loss and three take-profit tiers.
//!
//! The first tier and the stop-loss travel together as a single OCO
//! (one-cancels-other) instruction; the remaining tiers are standalone limit
//! orders. Every exit leg trades on the opposite side of the entry.

use std::fmt;

use crate::domain::error::TraderError;
use crate::domain::risk::{FRACTION_EPSILON, RiskParameters};
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl TryFrom<Signal> for Side {
    type Error = TraderError;

    fn try_from(signal: Signal) -> Result<Self, Self::Error> {
        match signal {
            Signal::Buy => Ok(Side::Buy),
            Signal::Sell => Ok(Side::Sell),
            Signal::Hold => Err(TraderError::InvalidLadder {
                reason: "HOLD has no order side".into(),
            }),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopLoss {
    pub trigger_price: f64,
    pub limit_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TakeProfit {
    pub target_price: f64,
    pub fraction: f64,
    pub quantity: f64,
}

/// Exit structure for one entry. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLadder {
    pub pair: String,
    pub entry_side: Side,
    pub exit_side: Side,
    pub entry_price: f64,
    pub quantity: f64,
    pub stop_loss: StopLoss,
    pub take_profits: [TakeProfit; 3],
}

/// One logical order handed to the exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderInstruction {
    Oco {
        side: Side,
        quantity: f64,
        take_profit_price: f64,
        stop_price: f64,
        stop_limit_price: f64,
    },
    Limit {
        side: Side,
        quantity: f64,
        price: f64,
    },
}

impl OrderInstruction {
    pub fn side(&self) -> Side {
        match self {
            OrderInstruction::Oco { side, .. } | OrderInstruction::Limit { side, .. } => *side,
        }
    }

    pub fn quantity(&self) -> f64 {
        match self {
            OrderInstruction::Oco { quantity, .. } | OrderInstruction::Limit { quantity, .. } => {
                *quantity
            }
        }
    }

    /// Take-profit price for OCO legs, limit price otherwise.
    pub fn price(&self) -> f64 {
        match self {
            OrderInstruction::Oco {
                take_profit_price, ..
            } => *take_profit_price,
            OrderInstruction::Limit { price, .. } => *price,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OrderInstruction::Oco { .. } => "OCO",
            OrderInstruction::Limit { .. } => "LIMIT",
        }
    }
}

impl OrderLadder {
    /// Legs in submission order: the OCO first, then the two limit tiers.
    pub fn instructions(&self) -> [OrderInstruction; 3] {
        let [first, second, third] = self.take_profits;
        [
            OrderInstruction::Oco {
                side: self.exit_side,
                quantity: first.quantity,
                take_profit_price: first.target_price,
                stop_price: self.stop_loss.trigger_price,
                stop_limit_price: self.stop_loss.limit_price,
            },
            OrderInstruction::Limit {
                side: self.exit_side,
                quantity: second.quantity,
                price: second.target_price,
            },
            OrderInstruction::Limit {
                side: self.exit_side,
                quantity: third.quantity,
                price: third.target_price,
            },
        ]
    }
}

#[derive(Debug, Clone)]
pub struct OrderLadderBuilder {
    tiers: [f64; 3],
    split: [f64; 3],
    stop_limit_offset: f64,
}

impl OrderLadderBuilder {
    pub fn new(tiers: [f64; 3], split: [f64; 3], stop_limit_offset: f64) -> Self {
        OrderLadderBuilder {
            tiers,
            split,
            stop_limit_offset,
        }
    }

    pub fn from_params(params: &RiskParameters) -> Self {
        Self::new(
            params.take_profit_tiers,
            params.take_profit_split,
            params.stop_limit_offset,
        )
    }

    pub fn build(
        &self,
        pair: &str,
        entry_price: f64,
        signal: Signal,
        quantity: f64,
        stop_loss: f64,
    ) -> Result<OrderLadder, TraderError> {
        let entry_side = Side::try_from(signal)?;
        self.validate(entry_price, quantity, stop_loss)?;

        let take_profits = std::array::from_fn(|i| TakeProfit {
            target_price: entry_price * (1.0 + self.tiers[i]),
            fraction: self.split[i],
            quantity: quantity * self.split[i],
        });

        Ok(OrderLadder {
            pair: pair.to_string(),
            entry_side,
            exit_side: entry_side.opposite(),
            entry_price,
            quantity,
            stop_loss: StopLoss {
                trigger_price: stop_loss,
                limit_price: stop_loss * (1.0 - self.stop_limit_offset),
            },
            take_profits,
        })
    }

    fn validate(&self, entry_price: f64, quantity: f64, stop_loss: f64) -> Result<(), TraderError> {
        let invalid = |reason: String| Err(TraderError::InvalidLadder { reason });

        if !(quantity > 0.0 && quantity.is_finite()) {
            return invalid(format!("quantity must be positive, got {quantity}"));
        }
        if !(entry_price > 0.0 && entry_price.is_finite()) {
            return invalid(format!("entry price must be positive, got {entry_price}"));
        }
        if !(stop_loss > 0.0 && stop_loss.is_finite()) {
            return invalid(format!("stop-loss must be positive, got {stop_loss}"));
        }
        if let Some(t) = self.tiers.iter().find(|t| !(**t > 0.0)) {
            return invalid(format!("take-profit tier must be positive, got {t}"));
        }
        if let Some(f) = self.split.iter().find(|f| !(**f > 0.0)) {
            return invalid(format!("take-profit fraction must be positive, got {f}"));
        }
        let total: f64 = self.split.iter().sum();
        if (total - 1.0).abs() > FRACTION_EPSILON {
            return invalid(format!("take-profit fractions sum to {total}, expected 1.0"));
        }
        if !(0.0..1.0).contains(&self.stop_limit_offset) {
            return invalid(format!(
                "stop-limit offset must be in [0, 1), got {}",
                self.stop_limit_offset
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn builder() -> OrderLadderBuilder {
        OrderLadderBuilder::new([0.02, 0.05, 0.10], [0.5, 0.25, 0.25], 0.02)
    }

    #[test]
    fn buy_ladder_legs() {
        let ladder = builder()
            .build("BTCUSDT", 100.0, Signal::Buy, 50.0, 97.6)
            .unwrap();

        assert_eq!(ladder.entry_side, Side::Buy);
        assert_eq!(ladder.exit_side, Side::Sell);

        let legs = ladder.instructions();
        assert_eq!(legs[0].kind(), "OCO");
        assert_relative_eq!(legs[0].quantity(), 25.0);
        assert_relative_eq!(legs[0].price(), 102.0, epsilon = 1e-9);
        assert_relative_eq!(legs[1].quantity(), 12.5);
        assert_relative_eq!(legs[1].price(), 105.0, epsilon = 1e-9);
        assert_relative_eq!(legs[2].quantity(), 12.5);
        assert_relative_eq!(legs[2].price(), 110.0, epsilon = 1e-9);
        assert!(legs.iter().all(|l| l.side() == Side::Sell));
    }

    #[test]
    fn oco_carries_stop_and_stop_limit() {
        let ladder = builder()
            .build("BTCUSDT", 100.0, Signal::Buy, 10.0, 95.0)
            .unwrap();
        match ladder.instructions()[0] {
            OrderInstruction::Oco {
                stop_price,
                stop_limit_price,
                ..
            } => {
                assert_relative_eq!(stop_price, 95.0);
                assert_relative_eq!(stop_limit_price, 93.1, epsilon = 1e-9);
            }
            other => panic!("expected OCO, got {other:?}"),
        }
    }

    #[test]
    fn sell_entry_exits_with_buy() {
        let ladder = builder()
            .build("ETHUSDT", 2000.0, Signal::Sell, 1.0, 1900.0)
            .unwrap();
        assert_eq!(ladder.exit_side, Side::Buy);
        assert!(ladder.instructions().iter().all(|l| l.side() == Side::Buy));
    }

    #[test]
    fn fractions_sum_to_one() {
        let ladder = builder()
            .build("ETHUSDT", 2000.0, Signal::Buy, 3.0, 1900.0)
            .unwrap();
        let total: f64 = ladder.take_profits.iter().map(|t| t.fraction).sum();
        assert_eq!(total, 1.0);
        let qty: f64 = ladder.take_profits.iter().map(|t| t.quantity).sum();
        assert_relative_eq!(qty, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn hold_is_invalid() {
        let err = builder()
            .build("BTCUSDT", 100.0, Signal::Hold, 1.0, 95.0)
            .unwrap_err();
        assert!(matches!(err, TraderError::InvalidLadder { .. }));
    }

    #[test]
    fn non_positive_quantity_is_invalid() {
        assert!(builder().build("BTCUSDT", 100.0, Signal::Buy, 0.0, 95.0).is_err());
        assert!(builder().build("BTCUSDT", 100.0, Signal::Buy, -1.0, 95.0).is_err());
    }

    #[test]
    fn non_positive_tier_is_invalid() {
        let b = OrderLadderBuilder::new([0.02, 0.0, 0.10], [0.5, 0.25, 0.25], 0.02);
        assert!(b.build("BTCUSDT", 100.0, Signal::Buy, 1.0, 95.0).is_err());
    }

    #[test]
    fn split_not_summing_to_one_is_invalid() {
        let b = OrderLadderBuilder::new([0.02, 0.05, 0.10], [0.5, 0.25, 0.3], 0.02);
        let err = b.build("BTCUSDT", 100.0, Signal::Buy, 1.0, 95.0).unwrap_err();
        assert!(matches!(err, TraderError::InvalidLadder { ref reason } if reason.contains("sum")));
    }

    #[test]
    fn non_positive_split_is_invalid() {
        let b = OrderLadderBuilder::new([0.02, 0.05, 0.10], [1.0, 0.0, 0.0], 0.02);
        assert!(b.build("BTCUSDT", 100.0, Signal::Buy, 1.0, 95.0).is_err());
    }

    #[test]
    fn side_opposite_and_display() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(Side::Sell.to_string(), "SELL");
    }
}
