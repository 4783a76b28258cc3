use anyhow::Context;
use clap::Parser;
use cluster_gateway::AppState;
use cluster_gateway::api::{self, auth::StaticCredentials};
use cluster_gateway::backend::ClusterBackend;
use cluster_gateway::backend::http::HttpBackend;
use cluster_gateway::backend::memory::MemoryBackend;
use cluster_gateway::config::GatewayConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::parse();

    let credentials = if config.users.is_empty() {
        StaticCredentials::defaults()
    } else {
        StaticCredentials::new(
            config
                .users
                .iter()
                .map(|c| (c.username.clone(), c.password.clone())),
        )
    };

    let backend: Arc<dyn ClusterBackend> = if config.in_memory {
        info!("serving an in-memory cluster");
        Arc::new(MemoryBackend::new())
    } else {
        if !config.verify_certs() {
            warn!("TLS certificate verification towards the cluster is disabled");
        }
        let backend = HttpBackend::new(config.target.clone(), config.verify_certs())
            .with_context(|| format!("failed to set up client for {}", config.target))?;
        info!("forwarding to {}", backend.target());
        Arc::new(backend)
    };

    let state = Arc::new(AppState {
        backend,
        credentials: Arc::new(credentials.clone()),
    });

    let addr = config
        .bind_address()
        .await
        .with_context(|| format!("invalid local url {}", config.local))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(users = credentials.len(), "listening on http://{}", addr);

    axum::serve(listener, api::router::build(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}
