//! Paper-trading exchange gateway.
//!
//! Keeps an in-memory quote balance, charges a percentage fee on each placed
//! leg's notional, enforces a minimum leg quantity, and optionally journals
//! every placed leg to CSV.

use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing::warn;

use crate::domain::error::TraderError;
use crate::domain::ladder::{OrderInstruction, OrderLadder, Side};
use crate::ports::exchange_port::{ExchangeGateway, SubmissionReceipt};

#[derive(Debug, Clone, PartialEq)]
pub struct PaperConfig {
    pub balance: f64,
    /// Percent of notional, e.g. 0.1 for 0.1%.
    pub fee_pct: f64,
    pub min_quantity: f64,
}

impl Default for PaperConfig {
    fn default() -> Self {
        PaperConfig {
            balance: 10_000.0,
            fee_pct: 0.1,
            min_quantity: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperOrder {
    pub order_id: String,
    pub pair: String,
    pub instruction: OrderInstruction,
    pub fee: f64,
}

pub struct PaperGateway {
    config: PaperConfig,
    balance: f64,
    orders: Vec<PaperOrder>,
    journal: Option<csv::Writer<File>>,
}

/// fee = notional * pct / 100
pub fn calculate_fee(notional: f64, fee_pct: f64) -> f64 {
    notional * fee_pct / 100.0
}

impl PaperGateway {
    pub fn new(config: PaperConfig) -> Self {
        PaperGateway {
            balance: config.balance,
            config,
            orders: Vec::new(),
            journal: None,
        }
    }

    /// Append placed legs to `path`, writing a header when the file is new.
    pub fn with_journal<P: AsRef<Path>>(mut self, path: P) -> Result<Self, TraderError> {
        let path = path.as_ref();
        let needs_header = !path.exists() || path.metadata()?.len() == 0;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record([
                    "order_id", "pair", "kind", "side", "quantity", "price", "stop_price",
                    "stop_limit_price", "fee",
                ])
                .map_err(std::io::Error::other)?;
            writer.flush()?;
        }
        self.journal = Some(writer);
        Ok(self)
    }

    pub fn orders(&self) -> &[PaperOrder] {
        &self.orders
    }

    fn journal_order(&mut self, order: &PaperOrder) {
        let Some(writer) = self.journal.as_mut() else {
            return;
        };
        let (stop, stop_limit) = match order.instruction {
            OrderInstruction::Oco {
                stop_price,
                stop_limit_price,
                ..
            } => (stop_price.to_string(), stop_limit_price.to_string()),
            OrderInstruction::Limit { .. } => (String::new(), String::new()),
        };
        let side = match order.instruction.side() {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        };
        let quantity = order.instruction.quantity().to_string();
        let price = order.instruction.price().to_string();
        let fee = order.fee.to_string();
        let result = writer
            .write_record([
                order.order_id.as_str(),
                order.pair.as_str(),
                order.instruction.kind(),
                side,
                quantity.as_str(),
                price.as_str(),
                stop.as_str(),
                stop_limit.as_str(),
                fee.as_str(),
            ])
            .and_then(|_| writer.flush().map_err(csv::Error::from));
        if let Err(e) = result {
            warn!(order_id = %order.order_id, error = %e, "journal write failed");
        }
    }
}

impl ExchangeGateway for PaperGateway {
    fn balance(&self) -> Result<f64, TraderError> {
        Ok(self.balance)
    }

    fn submit(&mut self, ladder: &OrderLadder) -> Result<SubmissionReceipt, TraderError> {
        let mut order_ids = Vec::with_capacity(3);

        for (placed, instruction) in ladder.instructions().into_iter().enumerate() {
            if instruction.quantity() < self.config.min_quantity {
                return Err(TraderError::OrderRejected {
                    pair: ladder.pair.clone(),
                    legs_placed: placed,
                    reason: format!(
                        "{} leg quantity {} below minimum {}",
                        instruction.kind(),
                        instruction.quantity(),
                        self.config.min_quantity
                    ),
                });
            }

            let fee = calculate_fee(
                instruction.quantity() * instruction.price(),
                self.config.fee_pct,
            );
            if fee > self.balance {
                return Err(TraderError::OrderRejected {
                    pair: ladder.pair.clone(),
                    legs_placed: placed,
                    reason: "insufficient balance for fees".into(),
                });
            }
            self.balance -= fee;

            let order = PaperOrder {
                order_id: format!("PAPER-{}", self.orders.len() + 1),
                pair: ladder.pair.clone(),
                instruction,
                fee,
            };
            self.journal_order(&order);
            order_ids.push(order.order_id.clone());
            self.orders.push(order);
        }

        Ok(SubmissionReceipt {
            pair: ladder.pair.clone(),
            order_ids,
        })
    }
}
