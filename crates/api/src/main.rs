use anyhow::Context;

use warehouse_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    warehouse_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    // Store connection failures are fatal: no retry at startup.
    let app = warehouse_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
