use anyhow::Context;
use axum::Router;
use std::net::SocketAddr;
use tracing::{error, info};

use statserve::{api, app, config, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let (cfg, cfg_path) = config::Config::load().context("loading config/statserve.toml")?;
    info!(?cfg_path, base_path = %cfg.base_path(), root = %cfg.root().display(), "config loaded");

    let state = app::AppState::new(cfg);
    let router: Router = api::build_router(state);

    let addr: SocketAddr = std::env::var("STATSERVE_BIND")
        .unwrap_or_else(|_| "127.0.0.1:6071".to_string())
        .parse()
        .context("invalid STATSERVE_BIND address")?;

    info!(%addr, version = env!("CARGO_PKG_VERSION"), "statserve listening");

    let server = axum::serve(tokio::net::TcpListener::bind(addr).await?, router);

    let graceful = server.with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("ctrl-c received; shutting down");
    });

    if let Err(e) = graceful.await {
        error!(error = %e, "server error");
    }

    Ok(())
}
