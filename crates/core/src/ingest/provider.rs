use crate::domain::price::{PricePoint, TimeRange};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataFetchError {
    /// Request could not be sent, or the provider answered with a non-success
    /// status. The message is already user-facing.
    #[error("{0}")]
    Transport(String),

    /// Provider answered successfully but with an explicit error envelope.
    #[error("FMP API Error: {0}")]
    ProviderError(String),

    #[error("price history response is not valid JSON: {0}")]
    MalformedBody(String),
}

impl DataFetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::ProviderError(_) => "provider_error",
            Self::MalformedBody(_) => "malformed_body",
        }
    }
}

/// Historical prices for charting. An empty `Ok` means "no data for this
/// ticker/range", which callers report differently from an error.
#[async_trait::async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    async fn fetch_price_history(
        &self,
        ticker: &str,
        range: TimeRange,
    ) -> Result<Vec<PricePoint>, DataFetchError>;
}
