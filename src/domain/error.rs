//! Domain error types.
//!
//! Indicator and scoring code never fails for data-shape reasons; these
//! variants cover configuration, the candle collaborator and output.

/// Top-level error type for confluence.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no candles for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} candles, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("candle series is empty")]
    EmptyCandles,

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ConfluenceError> for std::process::ExitCode {
    fn from(err: &ConfluenceError) -> Self {
        let code: u8 = match err {
            ConfluenceError::Io(_) => 1,
            ConfluenceError::ConfigParse { .. }
            | ConfluenceError::ConfigMissing { .. }
            | ConfluenceError::ConfigInvalid { .. } => 2,
            ConfluenceError::Data { .. } => 3,
            ConfluenceError::NoData { .. }
            | ConfluenceError::InsufficientData { .. }
            | ConfluenceError::EmptyCandles => 5,
            ConfluenceError::Serialize(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
