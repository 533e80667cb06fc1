use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use edupulse::env_config;
use edupulse::server::create_router;
use edupulse::storage::load_context;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    env_config::init_base_path();

    let ctx = Arc::new(load_context(&env_config::data_dir()));
    if ctx.is_empty() {
        warn!("starting with empty tables; endpoints will serve empty results");
    }
    let app = create_router(ctx);

    let port = env_config::server_port();
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(port, error = %err, "failed to bind");
            std::process::exit(1);
        }
    };
    info!(port, "EduPulse API server listening");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "server error");
    }
    info!("server stopped");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
