//! Prompt text for the insight request.

pub const TEMPERATURE: f32 = 0.5;
pub const RESPONSE_MIME_TYPE: &str = "application/json";

pub fn build_prompt(ticker: &str) -> String {
    let ticker = ticker.trim().to_uppercase();
    let schema = [
        "{",
        "  \"stockName\": \"string - full official company name, e.g. \\\"Apple Inc.\\\"\",",
        "  \"sentimentAnalysis\": \"string - one concise paragraph on market sentiment (bullish, bearish, neutral) and its main drivers\",",
        "  \"predictiveInsights\": [",
        "    \"string - a possible price trend or support/resistance level for the next week\",",
        "    \"string - another distinct insight, catalyst or risk for the next week\"",
        "  ],",
        "  \"riskAssessment\": [",
        "    \"string - a main risk factor (volatility, sector, company specifics)\",",
        "    \"string - another distinct risk factor\"",
        "  ],",
        "  \"mediumTermInvestment\": \"string - outlook for roughly 3-12 months with 1-2 sentences of reasoning\",",
        "  \"longTermInvestment\": \"string - outlook for roughly 1-5 years with 1-2 sentences of reasoning\",",
        "  \"overallRecommendation\": \"string - exactly one of 'Buy', 'Hold' or 'Sell', weighing all fields above\"",
        "}",
    ]
    .join("\n");

    let example = [
        "{",
        "  \"stockName\": \"Acme Innovations Ltd.\",",
        "  \"sentimentAnalysis\": \"Sentiment for ACME is cautiously optimistic. Positive product news is offset by rising sector competition and macro uncertainty.\",",
        "  \"predictiveInsights\": [",
        "    \"ACME may test the $210 resistance level this week if broader sentiment holds.\",",
        "    \"The upcoming quarterly earnings report is the main near-term catalyst.\"",
        "  ],",
        "  \"riskAssessment\": [",
        "    \"Reliance on a single key supplier is a notable operational risk.\",",
        "    \"New entrants in its primary market could erode market share.\"",
        "  ],",
        "  \"mediumTermInvestment\": \"Neutral to slightly positive; depends on adoption of the new product line and supply chain execution.\",",
        "  \"longTermInvestment\": \"Strong growth prospects if the international expansion succeeds and the innovation lead holds.\",",
        "  \"overallRecommendation\": \"Hold\"",
        "}",
    ]
    .join("\n");

    format!(
        "Provide a comprehensive analysis for the stock ticker {ticker}.\n\
Your response MUST be a single, valid JSON object. Do not include any text, comments, or markdown formatting (such as code fences) outside of this JSON object.\n\
All property names and string values MUST use double quotes. No trailing commas.\n\n\
The JSON object must have exactly this structure:\n{schema}\n\n\
Example for a hypothetical ticker \"ACME\" (Acme Innovations Ltd.):\n{example}\n\n\
Now produce this JSON object for the stock ticker: {ticker}.\n\
- \"predictiveInsights\" MUST contain 2 to 3 distinct strings.\n\
- \"riskAssessment\" MUST contain 2 to 3 distinct strings.\n\
- \"overallRecommendation\" MUST be exactly 'Buy', 'Hold', or 'Sell'.\n\
IMPORTANT: This information is general and for informational purposes only. It MUST NOT constitute financial advice or a specific instruction to trade, including the 'overallRecommendation' field, which is only a summary of your own analysis.\n\
Keep a factual, objective, neutral tone; be concise but well-reasoned."
    )
}
