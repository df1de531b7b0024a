use std::net::SocketAddr;
use std::sync::Arc;
use storefront_cart::cart::AppState;
use storefront_cart::router::create_app_router;
use tracing_subscriber::EnvFilter;

/// Listen port, from the `PORT` environment variable (default 8000).
fn listen_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8000)
}

#[tokio::main]
async fn main() {
    // Structured logging, filterable via RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize application state
    let state = Arc::new(AppState::new());

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Configure the server address
    let addr = SocketAddr::from(([0, 0, 0, 0], listen_port()));
    tracing::info!("server running on http://{addr}");

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
