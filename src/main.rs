//! task-scheduler - HTTP Server Entry Point
//!
//! Serves the task API and the static web frontend.

use task_scheduler::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_scheduler=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        "Loaded configuration: db={} store={:?} web={} auth={}",
        config.db_path.display(),
        config.store_type,
        config.web_dir.display(),
        config.auth.auth_required()
    );

    api::serve(config).await?;

    Ok(())
}
