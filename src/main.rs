use std::sync::Arc;

use churn_insight::config::ServiceConfig;
use churn_insight::service::{self, RuleModel};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "churn_insight=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ServiceConfig::from_env()?;
    let model = RuleModel::from_config(&cfg);

    // Warmup so a broken model fails before we bind
    let warm = model.score(&[0.0, 0.0, 0.0])?;
    tracing::info!("warmup score ok: {:?}", warm);
    tracing::info!("jitter=±{} seed={:?}", cfg.jitter, cfg.seed);

    let app = service::router(Arc::new(model));

    tracing::info!("listening on {}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
