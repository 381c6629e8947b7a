//! CSV file market data adapter.
//!
//! Reads `{base_path}/{PAIR}.csv` with columns
//! `timestamp,open,high,low,close,volume` (timestamp as `%Y-%m-%d %H:%M:%S`),
//! keeps the most recent `bar_limit` bars and computes the snapshot indicators.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::snapshot::{IndicatorWindows, MarketSnapshot};
use crate::ports::market_data_port::MarketDataFeed;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default number of bars retained per fetch.
pub const DEFAULT_BAR_LIMIT: usize = 500;

pub struct CsvMarketFeed {
    base_path: PathBuf,
    bar_limit: usize,
    windows: IndicatorWindows,
}

impl CsvMarketFeed {
    pub fn new(base_path: PathBuf, bar_limit: usize, windows: IndicatorWindows) -> Self {
        Self {
            base_path,
            bar_limit,
            windows,
        }
    }

    fn csv_path(&self, pair: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", pair))
    }

    fn read_bars(&self, pair: &str) -> Result<Vec<OhlcvBar>, String> {
        let path = self.csv_path(pair);
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| format!("CSV parse error: {}", e))?;
            let field = |idx: usize, name: &str| {
                record
                    .get(idx)
                    .map(|v| v.trim().to_string())
                    .ok_or_else(|| format!("row {}: missing {} column", line + 1, name))
            };
            let number = |idx: usize, name: &str| -> Result<f64, String> {
                field(idx, name)?
                    .parse()
                    .map_err(|e| format!("row {}: invalid {} value: {}", line + 1, name, e))
            };

            let timestamp = NaiveDateTime::parse_from_str(&field(0, "timestamp")?, TIMESTAMP_FORMAT)
                .map_err(|e| format!("row {}: invalid timestamp: {}", line + 1, e))?;

            bars.push(OhlcvBar {
                pair: pair.to_string(),
                timestamp,
                open: number(1, "open")?,
                high: number(2, "high")?,
                low: number(3, "low")?,
                close: number(4, "close")?,
                volume: number(5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if bars.len() > self.bar_limit {
            bars.drain(..bars.len() - self.bar_limit);
        }
        Ok(bars)
    }
}

impl MarketDataFeed for CsvMarketFeed {
    fn fetch(&self, pair: &str) -> Result<MarketSnapshot, TraderError> {
        let bars = self
            .read_bars(pair)
            .map_err(|reason| TraderError::DataUnavailable {
                pair: pair.to_string(),
                reason,
            })?;
        if bars.is_empty() {
            return Err(TraderError::DataUnavailable {
                pair: pair.to_string(),
                reason: "no bars".into(),
            });
        }
        Ok(MarketSnapshot::from_bars(pair, bars, &self.windows))
    }
}
