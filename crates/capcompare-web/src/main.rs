use std::sync::Arc;

use capcompare_core::{FmpGateway, ReqwestHttpClient};
use capcompare_web::{router, AppState, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let mut gateway = FmpGateway::new(Arc::new(ReqwestHttpClient::new()), config.api_key.clone());
    if let Some(base_url) = &config.base_url {
        gateway = gateway.with_base_url(base_url.clone());
    }

    let state = AppState::new(gateway, config.cache_capacity);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
