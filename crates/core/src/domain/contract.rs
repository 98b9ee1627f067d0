use crate::domain::insights::{Recommendation, StockInsights};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Loosely typed view of the model's JSON output. Every field is optional and
/// untyped so that shape problems surface as validation errors, not as serde
/// errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmStockInsights {
    pub stock_name: Option<Value>,
    pub sentiment_analysis: Option<Value>,
    pub predictive_insights: Option<Value>,
    pub risk_assessment: Option<Value>,
    pub medium_term_investment: Option<Value>,
    pub long_term_investment: Option<Value>,
    pub overall_recommendation: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsightValidationError {
    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must be a string")]
    NotAString(&'static str),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("field `{0}` must be an array")]
    NotAnArray(&'static str),

    #[error("field `{0}` must contain at least one entry")]
    EmptyArray(&'static str),

    #[error("field `{field}` has a non-string entry at index {index}")]
    NonStringElement { field: &'static str, index: usize },

    #[error("overallRecommendation must be one of Buy, Hold, Sell (got {0})")]
    InvalidRecommendation(String),
}

impl LlmStockInsights {
    /// Reads the loose structure out of an already-parsed JSON value.
    pub fn from_json(value: Value) -> Result<Self, InsightValidationError> {
        if !value.is_object() {
            return Err(InsightValidationError::NotAnObject);
        }
        serde_json::from_value(value).map_err(|_| InsightValidationError::NotAnObject)
    }

    pub fn validate_and_into_insights(self) -> Result<StockInsights, InsightValidationError> {
        let stock_name = required_text(self.stock_name, "stockName")?;
        let sentiment_analysis = required_text(self.sentiment_analysis, "sentimentAnalysis")?;
        let predictive_insights = required_text_list(self.predictive_insights, "predictiveInsights")?;
        let risk_assessment = required_text_list(self.risk_assessment, "riskAssessment")?;
        let medium_term_investment =
            required_text(self.medium_term_investment, "mediumTermInvestment")?;
        let long_term_investment = required_text(self.long_term_investment, "longTermInvestment")?;
        let overall_recommendation = required_recommendation(self.overall_recommendation)?;

        Ok(StockInsights {
            stock_name,
            sentiment_analysis,
            predictive_insights,
            risk_assessment,
            medium_term_investment,
            long_term_investment,
            overall_recommendation,
        })
    }
}

fn required_text(
    value: Option<Value>,
    field: &'static str,
) -> Result<String, InsightValidationError> {
    match value {
        None => Err(InsightValidationError::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(InsightValidationError::EmptyField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(InsightValidationError::NotAString(field)),
    }
}

fn required_text_list(
    value: Option<Value>,
    field: &'static str,
) -> Result<Vec<String>, InsightValidationError> {
    let items = match value {
        None => return Err(InsightValidationError::MissingField(field)),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(InsightValidationError::NotAnArray(field)),
    };
    if items.is_empty() {
        return Err(InsightValidationError::EmptyArray(field));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(s),
            _ => Err(InsightValidationError::NonStringElement { field, index }),
        })
        .collect()
}

fn required_recommendation(value: Option<Value>) -> Result<Recommendation, InsightValidationError> {
    match value {
        None => Err(InsightValidationError::MissingField("overallRecommendation")),
        Some(Value::String(s)) => s
            .parse::<Recommendation>()
            .map_err(|_| InsightValidationError::InvalidRecommendation(s)),
        Some(other) => Err(InsightValidationError::InvalidRecommendation(other.to_string())),
    }
}
