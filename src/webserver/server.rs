/// Axum webserver implementation
///
/// Server lifecycle: bind, serve, graceful shutdown on ctrl-c.
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::logger::{self, LogTag};
use crate::webserver::{routes, state::AppState};

/// Start the webserver
///
/// Blocks until the server is shut down.
pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port)
        .parse()
        .context("invalid bind address")?;

    let app = build_app(state);

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        match e.kind() {
            std::io::ErrorKind::AddrInUse => anyhow!(
                "failed to bind to {}: address already in use\n\
                 another instance is probably running on this port",
                addr
            ),
            std::io::ErrorKind::PermissionDenied => anyhow!(
                "failed to bind to {}: permission denied\n\
                 consider a port above 1024 or appropriate permissions",
                addr
            ),
            _ => anyhow!("failed to bind to {}: {}", addr, e),
        }
    })?;

    logger::info(
        LogTag::Http,
        &format!("webserver listening on http://{}", addr),
    );

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        logger::info(LogTag::Http, "shutdown signal received, stopping webserver");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
    .context("server error")?;

    logger::info(LogTag::Http, "webserver stopped gracefully");
    Ok(())
}

/// Build the axum application with all routes and middleware
fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state).layer(CompressionLayer::new())
}
