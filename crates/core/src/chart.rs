use crate::domain::price::{PricePoint, TimeRange};
use crate::ingest::provider::DataFetchError;
use serde::{Deserialize, Serialize};

pub const NO_DATA_MESSAGE: &str =
    "No historical data available for this stock or time range from the provider.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Hour,
    Day,
    Month,
    Year,
}

/// Everything a front end needs to draw one price line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub ticker: String,
    pub range: TimeRange,
    pub label: String,
    pub title: String,
    pub time_unit: TimeUnit,
    pub show_points: bool,
    pub max_ticks: u8,
    pub points: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartView {
    Series(ChartSeries),
    NoData {
        ticker: String,
        range: TimeRange,
        message: String,
    },
}

impl ChartView {
    pub fn from_points(ticker: &str, range: TimeRange, points: Vec<PricePoint>) -> Self {
        let ticker = ticker.trim().to_uppercase();
        if points.is_empty() {
            return Self::NoData {
                ticker,
                range,
                message: NO_DATA_MESSAGE.to_string(),
            };
        }

        let (time_unit, max_ticks) = match range {
            TimeRange::OneDay => (TimeUnit::Hour, 8),
            TimeRange::OneWeek | TimeRange::OneMonth => (TimeUnit::Day, 7),
            TimeRange::OneYear => (TimeUnit::Month, 10),
            TimeRange::FiveYears => (TimeUnit::Year, 10),
        };

        Self::Series(ChartSeries {
            label: format!("{ticker} Price"),
            title: format!("Historical Price for {ticker} ({range})"),
            time_unit,
            show_points: matches!(range, TimeRange::OneDay | TimeRange::OneWeek),
            max_ticks,
            points,
            ticker,
            range,
        })
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// User-facing text for a chart failure. The demo-tier key rejection gets an
/// explanation instead of the raw provider string.
pub fn display_error(err: &DataFetchError) -> String {
    let msg = err.to_string();
    if msg.contains("Invalid API KEY") {
        return "FMP API Error: the configured API key is invalid or restricted. Demo keys may \
                not cover every ticker and have daily limits; try a common ticker such as AAPL \
                or check the key's plan."
            .to_string();
    }
    msg
}
