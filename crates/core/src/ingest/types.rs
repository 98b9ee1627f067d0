use crate::domain::price::{PricePoint, TimeRange};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key FMP uses for its error envelope, on both failed and "successful" replies.
pub const FMP_ERROR_KEY: &str = "Error Message";

/// The two fields of an FMP price row that are read. Other keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FmpPriceRow {
    pub date: String,
    pub close: f64,
}

/// Locates the row array for a range: intraday replies are a bare array, daily
/// replies nest it under `historical`. Anything else yields `None`.
pub fn row_array(body: &Value, range: TimeRange) -> Option<&Vec<Value>> {
    if range.is_intraday() {
        body.as_array()
    } else {
        body.get("historical").and_then(Value::as_array)
    }
}

pub fn provider_error_message(body: &Value) -> Option<String> {
    match body.get(FMP_ERROR_KEY)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Newest-first provider rows -> ascending points, keeping only the most recent
/// `range.window()` of them.
pub fn to_price_series(rows: &[FmpPriceRow], range: TimeRange) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = rows
        .iter()
        .rev()
        .map(|row| PricePoint {
            date: row.date.clone(),
            price: row.close,
        })
        .collect();

    let start = points.len().saturating_sub(range.window());
    points.split_off(start)
}
