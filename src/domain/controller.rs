//! Per-cycle trading loop with the drawdown circuit breaker.
//!
//! One cycle walks the configured pairs in order: fetch, signal, size, build
//! the exit ladder, submit. Failures are scoped to the pair that raised them.
//! After the last pair the balance is refreshed once and checked against the
//! session floor; crossing it moves the controller to `Halted`, which is
//! terminal until `start_new_session` is called.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::domain::account::AccountState;
use crate::domain::error::TraderError;
use crate::domain::ladder::OrderLadderBuilder;
use crate::domain::risk::{RiskParameters, TradingPair};
use crate::domain::signal::{Signal, SignalGenerator, SignalSource};
use crate::domain::sizing::PositionSizer;
use crate::domain::snapshot::IndicatorWindows;
use crate::ports::exchange_port::{ExchangeGateway, SubmissionReceipt};
use crate::ports::market_data_port::MarketDataFeed;
use crate::ports::predictor_port::Predictor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Evaluating(String),
    Executing(String),
    Halted,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::Idle => write!(f, "IDLE"),
            ControllerState::Evaluating(pair) => write!(f, "EVALUATING({pair})"),
            ControllerState::Executing(pair) => write!(f, "EXECUTING({pair})"),
            ControllerState::Halted => write!(f, "HALTED"),
        }
    }
}

/// What happened to one pair within a cycle.
#[derive(Debug)]
pub enum PairOutcome {
    Submitted {
        signal: Signal,
        quantity: f64,
        receipt: SubmissionReceipt,
    },
    Held,
    /// Signal was BUY or SELL but the sizer produced nothing to trade.
    ZeroSize { signal: Signal },
    Failed(TraderError),
}

impl PairOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, PairOutcome::Failed(_))
    }
}

impl fmt::Display for PairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairOutcome::Submitted {
                signal, quantity, ..
            } => write!(f, "submitted {signal} {quantity:.6}"),
            PairOutcome::Held => write!(f, "hold"),
            PairOutcome::ZeroSize { signal } => write!(f, "{signal} skipped (zero size)"),
            PairOutcome::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Cycle completed; the next one may run.
    Active,
    /// Circuit breaker tripped. Not a failure.
    Halted,
}

#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub outcomes: Vec<(String, PairOutcome)>,
    pub balance: f64,
    pub initial_balance: f64,
    pub status: CycleStatus,
}

impl CycleReport {
    pub fn submitted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PairOutcome::Submitted { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn outcome(&self, pair: &str) -> Option<&PairOutcome> {
        self.outcomes
            .iter()
            .find(|(p, _)| p == pair)
            .map(|(_, o)| o)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSummary {
    pub balance: f64,
    pub initial_balance: f64,
    pub daily_return: f64,
}

pub struct TradingCycleController<F, P, G> {
    pairs: Vec<TradingPair>,
    params: RiskParameters,
    signals: SignalGenerator,
    ladders: OrderLadderBuilder,
    feed: F,
    predictor: P,
    gateway: G,
    account: AccountState,
    state: ControllerState,
    cycles: u64,
}

impl<F, P, G> TradingCycleController<F, P, G>
where
    F: MarketDataFeed,
    P: Predictor,
    G: ExchangeGateway,
{
    /// Fails with a configuration error when the risk parameters do not cover
    /// every pair, and with the gateway's error if the opening balance cannot
    /// be read.
    pub fn new(
        symbols: &[String],
        params: RiskParameters,
        windows: IndicatorWindows,
        feed: F,
        predictor: P,
        gateway: G,
    ) -> Result<Self, TraderError> {
        let pairs = params.validate_pairs(symbols)?;
        let balance = gateway.balance()?;
        info!(pairs = pairs.len(), balance, "controller ready");

        Ok(TradingCycleController {
            pairs,
            ladders: OrderLadderBuilder::from_params(&params),
            params,
            signals: SignalGenerator::new(windows),
            feed,
            predictor,
            gateway,
            account: AccountState::new(balance),
            state: ControllerState::Idle,
            cycles: 0,
        })
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == ControllerState::Halted
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn pairs(&self) -> &[TradingPair] {
        &self.pairs
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles
    }

    pub fn performance(&self) -> PerformanceSummary {
        PerformanceSummary {
            balance: self.account.balance,
            initial_balance: self.account.initial_balance,
            daily_return: self.account.daily_return(),
        }
    }

    /// Re-read the balance and make it the new session baseline. This is the
    /// only way out of `Halted`.
    pub fn start_new_session(&mut self) -> Result<(), TraderError> {
        let balance = self.gateway.balance()?;
        self.account.start_session(balance);
        if self.is_halted() {
            info!(balance, "new session started, leaving halted state");
        }
        self.state = ControllerState::Idle;
        Ok(())
    }

    pub fn run_cycle(&mut self) -> Result<CycleReport, TraderError> {
        if self.is_halted() {
            debug!("cycle requested while halted, ignoring");
            return Ok(self.report(Vec::new(), CycleStatus::Halted));
        }

        self.cycles += 1;
        let balance = self.account.balance;
        let mut outcomes = Vec::with_capacity(self.pairs.len());

        for index in 0..self.pairs.len() {
            let pair = self.pairs[index].symbol.clone();
            let outcome = match self.process_pair(&pair, balance) {
                Ok(outcome) => outcome,
                Err(e) if e.is_per_pair() => {
                    warn!(pair = %pair, error = %e, "skipping pair");
                    PairOutcome::Failed(e)
                }
                Err(e) => {
                    self.state = ControllerState::Idle;
                    error!(pair = %pair, error = %e, "cycle aborted");
                    return Err(e);
                }
            };
            outcomes.push((pair, outcome));
        }

        self.state = ControllerState::Idle;

        let refreshed = match self.gateway.balance() {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "balance refresh failed, breaker not evaluated");
                return Err(e);
            }
        };
        self.account.balance = refreshed;

        let status = if self.account.is_breached(self.params.max_daily_loss) {
            warn!(
                balance = refreshed,
                floor = self.account.drawdown_floor(self.params.max_daily_loss),
                "daily loss limit reached, halting"
            );
            self.state = ControllerState::Halted;
            CycleStatus::Halted
        } else {
            CycleStatus::Active
        };

        let report = self.report(outcomes, status);
        info!(
            cycle = report.cycle,
            submitted = report.submitted_count(),
            failed = report.failed_count(),
            balance = report.balance,
            daily_return_pct = self.account.daily_return() * 100.0,
            "cycle complete"
        );
        Ok(report)
    }

    fn process_pair(&mut self, pair: &str, balance: f64) -> Result<PairOutcome, TraderError> {
        self.state = ControllerState::Evaluating(pair.to_string());

        let snapshot = self.feed.fetch(pair)?;
        let source = SignalSource::from(self.predictor.infer(pair, &snapshot)?);

        let signal = match self.signals.generate(pair, &snapshot, source) {
            Ok(s) => s,
            Err(e @ TraderError::InsufficientData { .. }) => {
                warn!(pair, error = %e, "treating as HOLD");
                Signal::Hold
            }
            Err(e) => return Err(e),
        };
        debug!(pair, %signal, ?source, "signal");

        if signal == Signal::Hold {
            return Ok(PairOutcome::Held);
        }

        let sizer = PositionSizer::new(&self.params);
        let volatility = snapshot.volatility_range().unwrap_or(0.0);
        let quantity = sizer.size(pair, balance, volatility)?;
        if quantity <= 0.0 {
            return Ok(PairOutcome::ZeroSize { signal });
        }

        self.state = ControllerState::Executing(pair.to_string());

        let entry_price = snapshot
            .current_close()
            .ok_or_else(|| TraderError::DataUnavailable {
                pair: pair.to_string(),
                reason: "snapshot has no bars".into(),
            })?;
        let atr = snapshot
            .atr()
            .filter(|a| *a > 0.0)
            .unwrap_or_else(|| self.params.fallback_atr(entry_price));
        let stop_loss = sizer.stop_loss(entry_price, atr, pair)?;

        let ladder = self
            .ladders
            .build(pair, entry_price, signal, quantity, stop_loss)?;
        debug!(pair, ?ladder, "submitting ladder");

        let receipt = self.gateway.submit(&ladder)?;
        info!(pair, %signal, quantity, entry_price, stop_loss, "ladder placed");

        Ok(PairOutcome::Submitted {
            signal,
            quantity,
            receipt,
        })
    }

    fn report(&self, outcomes: Vec<(String, PairOutcome)>, status: CycleStatus) -> CycleReport {
        CycleReport {
            cycle: self.cycles,
            outcomes,
            balance: self.account.balance,
            initial_balance: self.account.initial_balance,
            status,
        }
    }
}
