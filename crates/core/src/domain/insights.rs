use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fully validated insight report for one ticker.
///
/// Only built by [`crate::domain::contract::LlmStockInsights::validate_and_into_insights`],
/// so every field is guaranteed present and well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInsights {
    pub stock_name: String,
    pub sentiment_analysis: String,
    pub predictive_insights: Vec<String>,
    pub risk_assessment: Vec<String>,
    pub medium_term_investment: String,
    pub long_term_investment: String,
    pub overall_recommendation: Recommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub const ALL: [Recommendation; 3] = [Self::Buy, Self::Hold, Self::Sell];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Hold => "Hold",
            Self::Sell => "Sell",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match on the wire token.
impl FromStr for Recommendation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_tokens_are_case_sensitive() {
        assert_eq!("Buy".parse::<Recommendation>(), Ok(Recommendation::Buy));
        assert_eq!("Hold".parse::<Recommendation>(), Ok(Recommendation::Hold));
        assert_eq!("Sell".parse::<Recommendation>(), Ok(Recommendation::Sell));
        assert!("buy".parse::<Recommendation>().is_err());
        assert!("Strong Buy".parse::<Recommendation>().is_err());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let insights = StockInsights {
            stock_name: "Acme Innovations Ltd.".to_string(),
            sentiment_analysis: "Neutral.".to_string(),
            predictive_insights: vec!["a".to_string(), "b".to_string()],
            risk_assessment: vec!["c".to_string(), "d".to_string()],
            medium_term_investment: "m".to_string(),
            long_term_investment: "l".to_string(),
            overall_recommendation: Recommendation::Hold,
        };
        let v = serde_json::to_value(&insights).unwrap();
        assert_eq!(v["stockName"], "Acme Innovations Ltd.");
        assert_eq!(v["overallRecommendation"], "Hold");
        assert_eq!(v["riskAssessment"][1], "d");
    }
}
