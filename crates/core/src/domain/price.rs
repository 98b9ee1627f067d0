use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Provider-supplied timestamp, `YYYY-MM-DD` for daily rows and
    /// `YYYY-MM-DD HH:MM:SS` for intraday rows.
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported time range `{0}` (expected one of 1D, 1W, 1M, 1Y, 5Y)")]
pub struct ParseTimeRangeError(pub String);

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::OneYear,
        Self::FiveYears,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
        }
    }

    /// Number of most-recent points kept after the fetch.
    pub fn window(self) -> usize {
        match self {
            Self::OneDay => 24,
            Self::OneWeek => 7,
            Self::OneMonth => 30,
            Self::OneYear => 252,
            Self::FiveYears => 252 * 5,
        }
    }

    /// `1D` is served from the hourly intraday route; every other range shares
    /// the full daily history.
    pub fn is_intraday(self) -> bool {
        matches!(self, Self::OneDay)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ParseTimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseTimeRangeError(s.to_string()))
    }
}
