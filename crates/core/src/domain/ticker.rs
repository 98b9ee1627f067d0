use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("ticker must be non-empty")]
    Empty,
}

/// Trims and uppercases a user-supplied ticker; blank input is rejected here so
/// the adapters never see it.
pub fn normalize_ticker(raw: &str) -> Result<String, TickerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TickerError::Empty);
    }
    Ok(trimmed.to_uppercase())
}
