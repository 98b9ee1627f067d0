use crate::domain::contract::InsightValidationError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum InsightError {
    #[error("failed to parse insights due to invalid JSON format: {message}")]
    MalformedJson {
        message: String,
        /// Text that was handed to the parser, kept for diagnostics.
        raw_text: String,
    },

    #[error("received malformed or incomplete insight data: {0}")]
    IncompleteData(#[from] InsightValidationError),

    #[error("failed to fetch insights: {0}")]
    TransportFailure(String),
}

impl InsightError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::IncompleteData(_) => "incomplete_data",
            Self::TransportFailure(_) => "transport_failure",
        }
    }
}
