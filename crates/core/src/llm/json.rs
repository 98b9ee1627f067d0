use crate::domain::contract::LlmStockInsights;
use crate::domain::insights::StockInsights;
use crate::llm::error::InsightError;

/// Returns the inner content when the whole payload is a Markdown code fence
/// (```` ```json ... ``` ```` or ```` ``` ... ``` ````); otherwise the trimmed
/// payload unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    // Optional language tag directly after the opening fence.
    let tag_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    let inner = body[tag_len..].trim();
    if inner.is_empty() {
        trimmed
    } else {
        inner
    }
}

pub fn parse_insights(text: &str) -> Result<StockInsights, InsightError> {
    let json_str = strip_code_fence(text);
    let value = serde_json::from_str::<serde_json::Value>(json_str).map_err(|e| {
        InsightError::MalformedJson {
            message: e.to_string(),
            raw_text: json_str.to_string(),
        }
    })?;

    let loose = LlmStockInsights::from_json(value)?;
    Ok(loose.validate_and_into_insights()?)
}
