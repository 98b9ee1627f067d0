use crate::chart::{self, ChartView};
use crate::domain::insights::StockInsights;
use crate::domain::price::TimeRange;
use crate::domain::ticker::{normalize_ticker, TickerError};
use crate::ingest::provider::PriceHistoryProvider;
use crate::llm::InsightClient;
use crate::session::slot::RequestSlot;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub selected_ticker: Option<String>,
    pub time_range: TimeRange,
    pub insights: RequestSlot<StockInsights>,
    pub chart: RequestSlot<ChartView>,
}

/// Insight and chart streams for the selected ticker. The two streams load
/// independently; the state lock is never held across an upstream call.
pub struct Dashboard {
    insights_client: Arc<dyn InsightClient>,
    price_provider: Arc<dyn PriceHistoryProvider>,
    state: Mutex<DashboardSnapshot>,
}

impl Dashboard {
    pub fn new(
        insights_client: Arc<dyn InsightClient>,
        price_provider: Arc<dyn PriceHistoryProvider>,
    ) -> Self {
        Self {
            insights_client,
            price_provider,
            state: Mutex::new(DashboardSnapshot::default()),
        }
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.state.get_mut().time_range = range;
        self
    }

    /// Selects a ticker without loading anything. Both streams go back to idle
    /// and results still in flight for the previous ticker are dropped.
    pub async fn select_ticker(&self, raw: &str) -> Result<String, TickerError> {
        let ticker = normalize_ticker(raw)?;
        let mut st = self.state.lock().await;
        st.selected_ticker = Some(ticker.clone());
        st.insights.reset();
        st.chart.reset();
        Ok(ticker)
    }

    /// Selects a ticker and loads insights and the chart concurrently.
    pub async fn search(&self, raw: &str) -> Result<(), TickerError> {
        let ticker = self.select_ticker(raw).await?;
        tracing::info!(%ticker, "loading dashboard");
        tokio::join!(self.refresh_insights(), self.refresh_chart());
        Ok(())
    }

    pub async fn change_range(&self, range: TimeRange) {
        self.state.lock().await.time_range = range;
        self.refresh_chart().await;
    }

    pub async fn refresh_insights(&self) {
        let (ticker, token) = {
            let mut st = self.state.lock().await;
            let Some(ticker) = st.selected_ticker.clone() else {
                return;
            };
            (ticker, st.insights.begin())
        };

        let result = self.insights_client.fetch_insights(&ticker).await;
        if let Err(err) = &result {
            tracing::warn!(%ticker, kind = err.kind(), error = %err, "insight load failed");
        }

        let applied = self.state.lock().await.insights.complete(token, result);
        if !applied {
            tracing::debug!(%ticker, token = token.get(), "discarding stale insight result");
        }
    }

    pub async fn refresh_chart(&self) {
        let (ticker, range, token) = {
            let mut st = self.state.lock().await;
            let Some(ticker) = st.selected_ticker.clone() else {
                return;
            };
            let range = st.time_range;
            (ticker, range, st.chart.begin())
        };

        let result = self
            .price_provider
            .fetch_price_history(&ticker, range)
            .await
            .map(|points| ChartView::from_points(&ticker, range, points))
            .map_err(|err| {
                tracing::warn!(%ticker, %range, kind = err.kind(), error = %err, "chart load failed");
                chart::display_error(&err)
            });

        let applied = self.state.lock().await.chart.complete(token, result);
        if !applied {
            tracing::debug!(%ticker, %range, token = token.get(), "discarding stale chart result");
        }
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.lock().await.clone()
    }
}
