use eyre::WrapErr;
use geohunt_server::{config::Config, create_router, state::AppState, ticker::spawn_roving_ticker};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let state = AppState::from_config(&config).await?;
    let ticker = spawn_roving_ticker(state.clone());

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.addr()))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    ticker.abort();
    Ok(())
}
