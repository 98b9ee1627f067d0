use crate::domain::insights::StockInsights;
use crate::llm::error::InsightError;

pub mod error;
pub mod gemini;
pub mod json;
pub mod prompt;

/// One generative round trip per call: no retries, no caching.
#[async_trait::async_trait]
pub trait InsightClient: Send + Sync {
    async fn fetch_insights(&self, ticker: &str) -> Result<StockInsights, InsightError>;
}
