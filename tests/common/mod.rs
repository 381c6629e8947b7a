#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use ladderbot::domain::error::TraderError;
use ladderbot::domain::ladder::OrderLadder;
pub use ladderbot::domain::ohlcv::OhlcvBar;
use ladderbot::domain::risk::RiskParameters;
use ladderbot::domain::snapshot::{IndicatorSnapshot, IndicatorWindows, MarketSnapshot};
use ladderbot::ports::exchange_port::{ExchangeGateway, SubmissionReceipt};
use ladderbot::ports::market_data_port::MarketDataFeed;
use ladderbot::ports::predictor_port::Predictor;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

pub struct MockFeed {
    pub snapshots: HashMap<String, MarketSnapshot>,
    pub errors: HashMap<String, String>,
    pub fatal: HashSet<String>,
    pub fetched: RefCell<Vec<String>>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
            errors: HashMap::new(),
            fatal: HashSet::new(),
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn with_snapshot(mut self, snapshot: MarketSnapshot) -> Self {
        self.snapshots.insert(snapshot.pair.clone(), snapshot);
        self
    }

    pub fn with_error(mut self, pair: &str, reason: &str) -> Self {
        self.errors.insert(pair.to_string(), reason.to_string());
        self
    }

    /// Fetching `pair` fails with an I/O error rather than a per-pair one.
    pub fn with_fatal(mut self, pair: &str) -> Self {
        self.fatal.insert(pair.to_string());
        self
    }
}

impl MarketDataFeed for MockFeed {
    fn fetch(&self, pair: &str) -> Result<MarketSnapshot, TraderError> {
        self.fetched.borrow_mut().push(pair.to_string());
        if self.fatal.contains(pair) {
            return Err(TraderError::Io(std::io::Error::other("disk unavailable")));
        }
        if let Some(reason) = self.errors.get(pair) {
            return Err(TraderError::DataUnavailable {
                pair: pair.to_string(),
                reason: reason.clone(),
            });
        }
        self.snapshots
            .get(pair)
            .cloned()
            .ok_or_else(|| TraderError::DataUnavailable {
                pair: pair.to_string(),
                reason: "no mock data".into(),
            })
    }
}

pub struct MockPredictor {
    pub predictions: HashMap<String, f64>,
    pub failing: HashSet<String>,
}

impl MockPredictor {
    pub fn new() -> Self {
        Self {
            predictions: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    pub fn with_prediction(mut self, pair: &str, predicted: f64) -> Self {
        self.predictions.insert(pair.to_string(), predicted);
        self
    }

    pub fn with_failure(mut self, pair: &str) -> Self {
        self.failing.insert(pair.to_string());
        self
    }
}

impl Predictor for MockPredictor {
    fn infer(&self, pair: &str, _snapshot: &MarketSnapshot) -> Result<Option<f64>, TraderError> {
        if self.failing.contains(pair) {
            return Err(TraderError::Prediction {
                pair: pair.to_string(),
                reason: "model unavailable".into(),
            });
        }
        Ok(self.predictions.get(pair).copied())
    }
}

/// Gateway with scripted balance reads. Once the script runs out, the last
/// balance repeats.
pub struct MockGateway {
    pub balances: RefCell<VecDeque<f64>>,
    pub last_balance: Cell<f64>,
    pub balance_fails: Cell<bool>,
    pub rejected_pairs: HashSet<String>,
    pub submitted: Vec<OrderLadder>,
}

impl MockGateway {
    pub fn new(balances: &[f64]) -> Self {
        Self {
            balances: RefCell::new(balances.iter().copied().collect()),
            last_balance: Cell::new(balances.first().copied().unwrap_or(0.0)),
            balance_fails: Cell::new(false),
            rejected_pairs: HashSet::new(),
            submitted: Vec::new(),
        }
    }

    pub fn rejecting(mut self, pair: &str) -> Self {
        self.rejected_pairs.insert(pair.to_string());
        self
    }

    pub fn submitted_pairs(&self) -> Vec<&str> {
        self.submitted.iter().map(|l| l.pair.as_str()).collect()
    }
}

impl ExchangeGateway for MockGateway {
    fn balance(&self) -> Result<f64, TraderError> {
        if self.balance_fails.get() {
            return Err(TraderError::Io(std::io::Error::other("balance endpoint down")));
        }
        if let Some(next) = self.balances.borrow_mut().pop_front() {
            self.last_balance.set(next);
        }
        Ok(self.last_balance.get())
    }

    fn submit(&mut self, ladder: &OrderLadder) -> Result<SubmissionReceipt, TraderError> {
        if self.rejected_pairs.contains(&ladder.pair) {
            return Err(TraderError::OrderRejected {
                pair: ladder.pair.clone(),
                legs_placed: 0,
                reason: "insufficient balance".into(),
            });
        }
        self.submitted.push(ladder.clone());
        let n = self.submitted.len();
        Ok(SubmissionReceipt {
            pair: ladder.pair.clone(),
            order_ids: (0..3).map(|i| format!("MOCK-{n}-{i}")).collect(),
        })
    }
}

pub fn test_windows() -> IndicatorWindows {
    IndicatorWindows {
        fast_ema: 2,
        slow_ema: 3,
        adx_period: 2,
        atr_period: 2,
        trend_threshold: 25.0,
    }
}

/// `count` hourly bars closing at `close`, each spanning `range`.
pub fn flat_bars(pair: &str, count: usize, close: f64, range: f64) -> Vec<OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..count)
        .map(|i| OhlcvBar {
            pair: pair.to_string(),
            timestamp: start + Duration::hours(i as i64),
            open: close,
            high: close + range / 2.0,
            low: close - range / 2.0,
            close,
            volume: 1.0,
        })
        .collect()
}

pub fn snapshot(pair: &str, close: f64, range: f64, indicators: IndicatorSnapshot) -> MarketSnapshot {
    MarketSnapshot {
        pair: pair.to_string(),
        bars: flat_bars(pair, test_windows().required_bars(), close, range),
        indicators,
    }
}

/// Snapshot the indicator-only path turns into BUY.
pub fn trending(pair: &str, close: f64, range: f64) -> MarketSnapshot {
    snapshot(
        pair,
        close,
        range,
        IndicatorSnapshot {
            fast_ema: Some(close * 1.01),
            slow_ema: Some(close * 0.99),
            trend_strength: Some(40.0),
            atr: Some(range),
        },
    )
}

/// Snapshot the indicator-only path turns into HOLD.
pub fn ranging(pair: &str, close: f64, range: f64) -> MarketSnapshot {
    snapshot(
        pair,
        close,
        range,
        IndicatorSnapshot {
            fast_ema: Some(close * 0.99),
            slow_ema: Some(close * 1.01),
            trend_strength: Some(12.0),
            atr: Some(range),
        },
    )
}

pub fn risk_params(pairs: &[(&str, f64, f64)]) -> RiskParameters {
    let mut params = RiskParameters::default();
    for (symbol, allocation, multiplier) in pairs {
        params.allocations.insert(symbol.to_string(), *allocation);
        params
            .volatility_multipliers
            .insert(symbol.to_string(), *multiplier);
    }
    params
}

pub fn symbols(pairs: &[&str]) -> Vec<String> {
    pairs.iter().map(|p| p.to_string()).collect()
}
