use std::process::ExitCode;
use std::sync::Arc;

use churn_insight::config::DashboardConfig;
use churn_insight::render::TracingSink;
use churn_insight::trend::DemoTrendSource;
use churn_insight::{Dashboard, HttpPredictionClient, RawForm};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Score one customer against the churn service", long_about = None)]
struct Args {
    /// Months the customer has been subscribed.
    #[arg(long)]
    tenure: String,
    /// Current monthly bill.
    #[arg(long)]
    monthly_charges: String,
    /// One of "Month-to-month", "One year", "Two year".
    #[arg(long)]
    contract: String,
    /// JSON dashboard config; falls back to CHURN_API_* env vars.
    #[arg(long)]
    config: Option<String>,
}

impl Args {
    fn form(&self) -> RawForm {
        RawForm::new(&self.tenure, &self.monthly_charges, &self.contract)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "churn_insight=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::from_env()?,
    };

    let client = HttpPredictionClient::from_config(&cfg)?;
    tracing::info!("scoring endpoint {}", client.endpoint());

    let trend = DemoTrendSource::new(cfg.trend_days);
    let dash = Dashboard::new(Arc::new(client), &trend, TracingSink::new());

    let outcome = dash.submit(&args.form()).await;

    let panel = dash.with_sink(|sink| sink.panel().cloned());
    if let Some(panel) = panel {
        println!("{}", serde_json::to_string_pretty(&panel)?);
    }

    match outcome {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!("prediction failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn all_flags_build_the_form() {
        let args = Args::try_parse_from([
            "churn_console",
            "--tenure",
            "3",
            "--monthly-charges",
            "85.5",
            "--contract",
            "Month-to-month",
        ])
        .unwrap();
        assert_eq!(args.form(), RawForm::new("3", "85.5", "Month-to-month"));
        assert!(args.config.is_none());
    }

    #[test]
    fn missing_flag_is_reported() {
        let err = Args::try_parse_from(["churn_console", "--tenure", "3"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn help_is_not_an_error_value() {
        let err = Args::try_parse_from(["churn_console", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
