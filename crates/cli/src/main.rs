use clap::Parser;
use std::sync::Arc;
use stocklens_core::domain::price::TimeRange;
use stocklens_core::ingest::fmp::FmpClient;
use stocklens_core::llm::gemini::GeminiClient;
use stocklens_core::session::{Dashboard, DashboardSnapshot, FetchState};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "stocklens", about = "AI insights and price history for one ticker")]
struct Args {
    /// Stock ticker, e.g. AAPL. Case and surrounding whitespace are ignored.
    ticker: String,

    /// Price history window: 1D, 1W, 1M, 1Y or 5Y.
    #[arg(long, default_value = "1M")]
    range: TimeRange,

    /// Only load the price chart.
    #[arg(long, conflicts_with = "skip_chart")]
    skip_insights: bool,

    /// Only load the insights.
    #[arg(long)]
    skip_chart: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stocklens_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    // stdout carries the JSON snapshot; logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let insights = GeminiClient::from_settings(&settings)?;
    let prices = FmpClient::from_settings(&settings)?;
    let dashboard = Dashboard::new(Arc::new(insights), Arc::new(prices)).with_time_range(args.range);

    if args.skip_insights || args.skip_chart {
        dashboard.select_ticker(&args.ticker).await?;
        if !args.skip_insights {
            dashboard.refresh_insights().await;
        }
        if !args.skip_chart {
            dashboard.refresh_chart().await;
        }
    } else {
        dashboard.search(&args.ticker).await?;
    }

    let snapshot = dashboard.snapshot().await;
    let out = if args.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{out}");

    let failed = failed_streams(&snapshot);
    if !failed.is_empty() {
        let err = anyhow::anyhow!("dashboard load failed for: {}", failed.join(", "));
        sentry_anyhow::capture_anyhow(&err);
        return Err(err);
    }
    Ok(())
}

fn failed_streams(snapshot: &DashboardSnapshot) -> Vec<&'static str> {
    let mut failed = Vec::new();
    if snapshot.insights.state() == FetchState::Error {
        failed.push("insights");
    }
    if snapshot.chart.state() == FetchState::Error {
        failed.push("chart");
    }
    failed
}

fn init_sentry(settings: &stocklens_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_range_and_defaults_to_one_month() {
        let args = Args::parse_from(["stocklens", "aapl"]);
        assert_eq!(args.range, TimeRange::OneMonth);
        assert_eq!(args.ticker, "aapl");

        let args = Args::parse_from(["stocklens", "aapl", "--range", "5Y", "--skip-insights"]);
        assert_eq!(args.range, TimeRange::FiveYears);
        assert!(args.skip_insights);
    }

    #[test]
    fn rejects_unknown_range_and_conflicting_skips() {
        assert!(Args::try_parse_from(["stocklens", "aapl", "--range", "2W"]).is_err());
        assert!(
            Args::try_parse_from(["stocklens", "aapl", "--skip-insights", "--skip-chart"]).is_err()
        );
    }

    #[test]
    fn idle_snapshot_has_no_failures() {
        assert!(failed_streams(&DashboardSnapshot::default()).is_empty());
    }
}
