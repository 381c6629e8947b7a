//! Predictions file adapter.
//!
//! An external model writes `pair,predicted` rows; pairs absent from the file
//! have no predictor and fall back to indicator-only signals.

use crate::domain::error::TraderError;
use crate::domain::snapshot::MarketSnapshot;
use crate::ports::predictor_port::Predictor;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct CsvPredictor {
    predictions: HashMap<String, f64>,
}

impl CsvPredictor {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TraderError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_csv(&content).map_err(|reason| TraderError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })
    }

    pub fn from_csv(content: &str) -> Result<Self, String> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut predictions = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| format!("CSV parse error: {}", e))?;
            let pair = record
                .get(0)
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| "missing pair column".to_string())?;
            let predicted: f64 = record
                .get(1)
                .ok_or_else(|| format!("missing prediction for {}", pair))?
                .trim()
                .parse()
                .map_err(|e| format!("invalid prediction for {}: {}", pair, e))?;
            predictions.insert(pair, predicted);
        }

        Ok(Self { predictions })
    }
}

impl Predictor for CsvPredictor {
    fn infer(&self, pair: &str, _snapshot: &MarketSnapshot) -> Result<Option<f64>, TraderError> {
        match self.predictions.get(pair) {
            Some(p) if !p.is_finite() => Err(TraderError::Prediction {
                pair: pair.to_string(),
                reason: format!("non-finite prediction {p}"),
            }),
            Some(p) => Ok(Some(*p)),
            None => Ok(None),
        }
    }
}
