//! Domain error types.

/// A parse error with position information for indicator specs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for alphamind.
#[derive(Debug, thiserror::Error)]
pub enum AlphamindError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    IndicatorParse(#[from] ParseError),

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("journal error: {reason}")]
    Journal { reason: String },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    #[error("trade rejected: {}", reasons.join("; "))]
    TradeRejected { reasons: Vec<String> },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for AlphamindError {
    fn from(err: serde_json::Error) -> Self {
        AlphamindError::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<&AlphamindError> for std::process::ExitCode {
    fn from(err: &AlphamindError) -> Self {
        let code: u8 = match err {
            AlphamindError::Io(_) => 1,
            AlphamindError::ConfigParse { .. } | AlphamindError::ConfigInvalid { .. } => 2,
            AlphamindError::Journal { .. } | AlphamindError::Serialization { .. } => 3,
            AlphamindError::IndicatorParse(_) => 4,
            AlphamindError::Data { .. } => 5,
            AlphamindError::TradeRejected { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
