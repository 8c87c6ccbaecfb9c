use routine_tracker::{
    clock::SystemClock, resolve_bind_addr, resolve_port, resolve_session_capacity, router, AppState,
    Sessions,
};
use std::sync::Arc;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let sessions = Sessions::with_capacity(resolve_session_capacity());
    let app = router(AppState::new(sessions, Arc::new(SystemClock)));

    let addr = SocketAddr::new(resolve_bind_addr(), resolve_port());
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
