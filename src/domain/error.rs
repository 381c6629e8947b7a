//! Domain error types.

/// Top-level error type for ladderbot.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    /// Risk parameters do not cover a configured pair, or cover it with
    /// unusable values. Fatal at startup.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("insufficient data for {pair}: have {bars} bars, need {minimum}")]
    InsufficientData {
        pair: String,
        bars: usize,
        minimum: usize,
    },

    #[error("degenerate volatility estimate for {pair}: {estimate}")]
    DegenerateVolatility { pair: String, estimate: f64 },

    #[error("invalid order ladder: {reason}")]
    InvalidLadder { reason: String },

    #[error("market data unavailable for {pair}: {reason}")]
    DataUnavailable { pair: String, reason: String },

    #[error("order rejected for {pair} after {legs_placed} leg(s) placed: {reason}")]
    OrderRejected {
        pair: String,
        legs_placed: usize,
        reason: String,
    },

    #[error("prediction failed for {pair}: {reason}")]
    Prediction { pair: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TraderError {
    /// Errors scoped to a single pair within a cycle. The controller skips the
    /// pair and keeps going when it sees one of these.
    pub fn is_per_pair(&self) -> bool {
        matches!(
            self,
            TraderError::InsufficientData { .. }
                | TraderError::DegenerateVolatility { .. }
                | TraderError::InvalidLadder { .. }
                | TraderError::DataUnavailable { .. }
                | TraderError::OrderRejected { .. }
                | TraderError::Prediction { .. }
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TraderError::ConfigParse { .. }
                | TraderError::ConfigMissing { .. }
                | TraderError::ConfigInvalid { .. }
                | TraderError::Configuration { .. }
        )
    }
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. }
            | TraderError::Configuration { .. } => 2,
            TraderError::DataUnavailable { .. }
            | TraderError::InsufficientData { .. }
            | TraderError::DegenerateVolatility { .. } => 3,
            TraderError::InvalidLadder { .. } | TraderError::OrderRejected { .. } => 4,
            TraderError::Prediction { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
