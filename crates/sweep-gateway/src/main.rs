use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use sweep_core::types::ConnectionState;

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sweep_gateway=info,sweep_discord=info,tower_http=debug".into()
            }),
        )
        .init();

    // load config: explicit path > SWEEP_CONFIG env > ~/.sweep/sweep.toml
    let config_path = std::env::var("SWEEP_CONFIG").ok();
    let config = sweep_core::config::SweepConfig::load(config_path.as_deref())?;

    let bind = config.http.bind.clone();
    let port = config.http.port;

    // One Discord session per process — the adapter owns the serenity client,
    // HTTP handlers share the handle.
    let session = sweep_discord::SessionHandle::new(config.purge.clone());
    let adapter =
        sweep_discord::DiscordAdapter::new(&config.discord, &config.commands, session.clone());
    tokio::spawn(async move { adapter.run().await });
    info!("Discord adapter started");

    let state = Arc::new(app::AppState::new(config, session.clone()));
    let router = app::build_router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("sweep gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    session.set_state(ConnectionState::Closed);
    Ok(())
}
