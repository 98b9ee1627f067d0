use crate::config::Settings;
use crate::domain::insights::StockInsights;
use crate::llm::error::InsightError;
use crate::llm::{json, prompt};
use crate::llm::InsightClient;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: HeaderValue,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Fails when `GEMINI_API_KEY` is absent, so callers can refuse to start.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?;
        let base_url = settings
            .gemini_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(api_key, base_url, model, Duration::from_secs(timeout_secs))
    }

    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "Gemini API key must be non-empty");
        let mut api_key =
            HeaderValue::from_str(api_key).context("Gemini API key is not a valid header value")?;
        api_key.set_sensitive(true);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Gemini http client")?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn request_for(ticker: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt::build_prompt(ticker),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: prompt::RESPONSE_MIME_TYPE,
                temperature: prompt::TEMPERATURE,
            },
        }
    }

    async fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, InsightError> {
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", self.api_key.clone());

        let res = self
            .http
            .post(self.url())
            .headers(headers)
            .json(req)
            .send()
            .await
            .map_err(|e| InsightError::TransportFailure(format!("Gemini request failed: {e}")))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            InsightError::TransportFailure(format!("failed to read Gemini response body: {e}"))
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .and_then(|env| env.error.message)
                .unwrap_or(text);
            return Err(InsightError::TransportFailure(format!(
                "Gemini HTTP {status}: {detail}"
            )));
        }

        serde_json::from_str::<GenerateContentResponse>(&text).map_err(|e| {
            InsightError::TransportFailure(format!(
                "failed to decode Gemini generateContent response: {e}"
            ))
        })
    }

    /// Concatenated text parts of the first candidate.
    fn response_text(res: &GenerateContentResponse) -> Result<String, InsightError> {
        let Some(candidate) = res.candidates.first() else {
            let reason = res
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("no candidates");
            return Err(InsightError::TransportFailure(format!(
                "Gemini returned no candidates (block_reason={reason})"
            )));
        };

        let text: String = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(InsightError::TransportFailure(format!(
                "Gemini candidate contained no text (finish_reason={reason})"
            )));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl InsightClient for GeminiClient {
    async fn fetch_insights(&self, ticker: &str) -> Result<StockInsights, InsightError> {
        tracing::debug!(%ticker, model = %self.model, "requesting stock insights");
        let res = self.generate_content(&Self::request_for(ticker)).await?;
        let text = Self::response_text(&res)?;
        json::parse_insights(&text)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,

    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,

    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}
