use crate::config::Settings;
use crate::domain::price::{PricePoint, TimeRange};
use crate::ingest::provider::{DataFetchError, PriceHistoryProvider};
use crate::ingest::types::{self, FmpPriceRow};
use anyhow::Context;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Financial Modeling Prep historical prices: hourly bars for `1D`, the full
/// daily history for every other range.
#[derive(Debug, Clone)]
pub struct FmpClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl FmpClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_fmp_api_key()?;
        let base_url = settings.fmp_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let timeout_secs = std::env::var("FMP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::new(api_key, base_url, Duration::from_secs(timeout_secs))
    }

    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "FMP API key must be non-empty");
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid FMP base url: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "FMP base url cannot carry a path: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build FMP http client")?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    fn url_for(&self, ticker: &str, range: TimeRange) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            if range.is_intraday() {
                segments.extend(["historical-chart", "1hour"]);
            } else {
                segments.push("historical-price-full");
            }
            segments.push(&ticker.trim().to_uppercase());
        }
        url.query_pairs_mut().append_pair("apikey", &self.api_key);
        url
    }

    async fn fetch_body(&self, ticker: &str, range: TimeRange) -> Result<Value, DataFetchError> {
        let res = self
            .http
            .get(self.url_for(ticker, range))
            .send()
            .await
            .map_err(|e| {
                DataFetchError::Transport(format!("Failed to fetch historical data: {e}"))
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            DataFetchError::Transport(format!("Failed to read historical data response: {e}"))
        })?;

        if !status.is_success() {
            let provider_msg = serde_json::from_str::<Value>(&text)
                .ok()
                .as_ref()
                .and_then(types::provider_error_message);
            let msg = match provider_msg {
                Some(m) => format!("FMP API Error: {m}"),
                None => format!(
                    "Failed to fetch historical data: {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                ),
            };
            return Err(DataFetchError::Transport(msg));
        }

        let body = serde_json::from_str::<Value>(&text)
            .map_err(|e| DataFetchError::MalformedBody(e.to_string()))?;

        if let Some(msg) = types::provider_error_message(&body) {
            return Err(DataFetchError::ProviderError(msg));
        }
        Ok(body)
    }
}

/// Rows missing a usable `date`/`close` are skipped, not fatal.
fn decode_rows(raw_rows: &[Value], ticker: &str) -> Vec<FmpPriceRow> {
    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut skipped: usize = 0;
    for raw in raw_rows {
        match FmpPriceRow::deserialize(raw) {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(%ticker, skipped, "skipped FMP rows without date/close");
    }
    rows
}

#[async_trait::async_trait]
impl PriceHistoryProvider for FmpClient {
    async fn fetch_price_history(
        &self,
        ticker: &str,
        range: TimeRange,
    ) -> Result<Vec<PricePoint>, DataFetchError> {
        tracing::debug!(%ticker, %range, "requesting price history");
        let body = self.fetch_body(ticker, range).await?;

        let Some(raw_rows) = types::row_array(&body, range) else {
            tracing::warn!(%ticker, %range, "unexpected FMP response shape; treating as no data");
            return Ok(Vec::new());
        };

        let rows = decode_rows(raw_rows, ticker);
        let points = types::to_price_series(&rows, range);
        tracing::debug!(%ticker, %range, points = points.len(), "price history received");
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_upstream;
    use axum::http::StatusCode;
    use serde_json::json;

    fn client(base_url: &str) -> FmpClient {
        FmpClient::new("demo-key", &format!("{base_url}/api/v3"), Duration::from_secs(5)).unwrap()
    }

    fn daily_rows(n: usize) -> Vec<Value> {
        // Newest first, as FMP sends them.
        (0..n)
            .rev()
            .map(|i| {
                json!({
                    "date": format!("2024-{:02}-{:02}", 1 + i / 28, 1 + i % 28),
                    "open": 1.0, "high": 2.0, "low": 0.5,
                    "close": 100.0 + i as f64,
                    "volume": 1000
                })
            })
            .collect()
    }

    #[test]
    fn routes_by_range_and_uppercases_ticker() {
        let c = FmpClient::new("k", "https://fmp.example/api/v3/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            c.url_for("aapl", TimeRange::OneDay).as_str(),
            "https://fmp.example/api/v3/historical-chart/1hour/AAPL?apikey=k"
        );
        for range in [TimeRange::OneWeek, TimeRange::OneMonth, TimeRange::OneYear, TimeRange::FiveYears] {
            assert_eq!(
                c.url_for(" aapl ", range).as_str(),
                "https://fmp.example/api/v3/historical-price-full/AAPL?apikey=k"
            );
        }
    }

    #[test]
    fn ticker_is_a_single_encoded_segment() {
        let c = FmpClient::new("k", "https://fmp.example/api/v3", Duration::from_secs(1)).unwrap();
        let url = c.url_for("a/b", TimeRange::OneMonth);
        assert_eq!(url.path(), "/api/v3/historical-price-full/A%2FB");
    }

    #[test]
    fn rejects_blank_key_and_bad_base_url() {
        assert!(FmpClient::new("", DEFAULT_BASE_URL, Duration::from_secs(1)).is_err());
        assert!(FmpClient::new("k", "not a url", Duration::from_secs(1)).is_err());
        assert!(FmpClient::new("k", "mailto:x@example.com", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn daily_history_is_ascending_and_truncated() {
        let upstream = spawn_upstream(
            StatusCode::OK,
            json!({"symbol": "ACME", "historical": daily_rows(40)}).to_string(),
        )
        .await;

        let points = client(&upstream.base_url)
            .fetch_price_history("acme", TimeRange::OneMonth)
            .await
            .unwrap();

        assert_eq!(points.len(), 30);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(points[0].price, 110.0);
        assert_eq!(points[29].price, 139.0);

        let captured = upstream.captured();
        assert_eq!(captured.len(), 1);
        assert_eq!(
            captured[0].path_and_query,
            "/api/v3/historical-price-full/ACME?apikey=demo-key"
        );
    }

    #[tokio::test]
    async fn intraday_reads_bare_array() {
        let rows: Vec<Value> = (0..30)
            .rev()
            .map(|h| json!({"date": format!("2024-03-{:02} {:02}:00:00", 1 + h / 24, h % 24), "close": h as f64}))
            .collect();
        let upstream = spawn_upstream(StatusCode::OK, Value::Array(rows).to_string()).await;

        let points = client(&upstream.base_url)
            .fetch_price_history("MSFT", TimeRange::OneDay)
            .await
            .unwrap();
        assert_eq!(points.len(), 24);
        assert_eq!(points[0].price, 6.0);
        assert_eq!(points[23].price, 29.0);
        assert!(upstream.captured()[0]
            .path_and_query
            .starts_with("/api/v3/historical-chart/1hour/MSFT?"));
    }

    #[tokio::test]
    async fn unrecognized_shape_is_empty_not_error() {
        let upstream = spawn_upstream(StatusCode::OK, json!({"symbol": "ZZZZ"}).to_string()).await;
        let points = client(&upstream.base_url)
            .fetch_price_history("ZZZZ", TimeRange::OneYear)
            .await
            .unwrap();
        assert!(points.is_empty());

        let upstream = spawn_upstream(StatusCode::OK, "{}").await;
        let points = client(&upstream.base_url)
            .fetch_price_history("ZZZZ", TimeRange::OneDay)
            .await
            .unwrap();
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn rows_without_close_are_skipped() {
        let upstream = spawn_upstream(
            StatusCode::OK,
            json!({"historical": [
                {"date": "2024-01-03", "close": 3.0},
                {"date": "2024-01-02"},
                {"date": "2024-01-01", "close": 1.0}
            ]})
            .to_string(),
        )
        .await;
        let points = client(&upstream.base_url)
            .fetch_price_history("ACME", TimeRange::OneWeek)
            .await
            .unwrap();
        let dates: Vec<_> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-03"]);
    }

    #[tokio::test]
    async fn non_numeric_extra_fields_do_not_drop_rows() {
        let upstream = spawn_upstream(
            StatusCode::OK,
            json!({"historical": [
                {"date": "2024-01-03", "open": 2.5, "volume": "1,000", "close": 3.0},
                {"date": "2024-01-02", "open": "n/a", "high": null, "close": 2.0},
                {"date": "2024-01-01", "close": 1.0}
            ]})
            .to_string(),
        )
        .await;
        let points = client(&upstream.base_url)
            .fetch_price_history("ACME", TimeRange::OneWeek)
            .await
            .unwrap();
        let got: Vec<_> = points.iter().map(|p| (p.date.as_str(), p.price)).collect();
        assert_eq!(
            got,
            vec![("2024-01-01", 1.0), ("2024-01-02", 2.0), ("2024-01-03", 3.0)]
        );
    }

    #[tokio::test]
    async fn error_envelope_on_success_status_is_provider_error() {
        let upstream = spawn_upstream(
            StatusCode::OK,
            json!({"Error Message": "Invalid API KEY. Please retry or visit our documentation."})
                .to_string(),
        )
        .await;
        let err = client(&upstream.base_url)
            .fetch_price_history("AAPL", TimeRange::OneMonth)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DataFetchError::ProviderError(
                "Invalid API KEY. Please retry or visit our documentation.".to_string()
            )
        );
        assert!(err.to_string().starts_with("FMP API Error: Invalid API KEY"));
    }

    #[tokio::test]
    async fn failed_status_prefers_provider_message() {
        let upstream = spawn_upstream(
            StatusCode::UNAUTHORIZED,
            json!({"Error Message": "Limit Reach"}).to_string(),
        )
        .await;
        let err = client(&upstream.base_url)
            .fetch_price_history("AAPL", TimeRange::OneMonth)
            .await
            .unwrap_err();
        assert_eq!(err, DataFetchError::Transport("FMP API Error: Limit Reach".to_string()));
    }

    #[tokio::test]
    async fn failed_status_falls_back_to_status_text() {
        let upstream = spawn_upstream(StatusCode::NOT_FOUND, "<html>nope</html>").await;
        let err = client(&upstream.base_url)
            .fetch_price_history("AAPL", TimeRange::OneDay)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DataFetchError::Transport("Failed to fetch historical data: Not Found".to_string())
        );
    }

    #[tokio::test]
    async fn non_json_success_body_is_malformed() {
        let upstream = spawn_upstream(StatusCode::OK, "not json").await;
        let err = client(&upstream.base_url)
            .fetch_price_history("AAPL", TimeRange::OneDay)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "malformed_body");
    }
}
