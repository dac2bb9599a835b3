mod api;
mod core;
mod utils;

use dotenv::dotenv;
use salvo::conn::tcp::TcpAcceptor;
use salvo::prelude::*;
use std::time::Duration;

use crate::utils::middleware::inject_state;
use crate::utils::{AppState, Config, StudioConfig};

#[handler]
async fn health_check(res: &mut Response) {
    res.render(Json(serde_json::json!({"status": "ok"})));
}

/// Bind to the address, retrying while a previous process releases the port.
async fn bind_with_retry(address: &str, max_retries: u32) -> anyhow::Result<TcpAcceptor> {
    let socket_addr: std::net::SocketAddr = address
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid address format: {}", address))?;

    for attempt in 1..=max_retries {
        match tokio::net::TcpListener::bind(socket_addr).await {
            Ok(test_listener) => {
                drop(test_listener);
                tracing::info!("Binding to {} (attempt {})", address, attempt);
                return Ok(TcpListener::new(address).bind().await);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse && attempt < max_retries => {
                tracing::warn!(
                    "Port {} in use (attempt {}/{}), retrying in 1 second",
                    socket_addr.port(),
                    attempt,
                    max_retries
                );
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => return Err(anyhow::anyhow!("Failed to bind to {}: {}", address, e)),
        }
    }
    Err(anyhow::anyhow!("Failed to bind to {}", address))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("studio_backend=info".parse()?)
                .add_directive("salvo=info".parse()?)
                .add_directive("sqlx=warn".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::new(&config, StudioConfig::default()).await?;

    let router = Router::new()
        .hoop(inject_state(state))
        .push(Router::with_path("/health").get(health_check))
        .push(api::api_routes());

    let acceptor = bind_with_retry(&config.server_address, 5).await?;
    tracing::info!("Studio backend listening on {}", config.server_address);
    Server::new(acceptor).serve(router).await;
    Ok(())
}
