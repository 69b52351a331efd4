use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Full application router with the HTTP middleware stack
pub fn app(config: &ServerConfig, state: AppState) -> Result<Router> {
    let origins = if config.allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed = config
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid CORS origin: {origin}"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(parsed)
    };

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .nest("/api", api::router(state))
        .layer(RequestBodyLimitLayer::new(
            config.body_limit_kb as usize * 1024,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds.into(),
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = app(config, state)?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    if let (Some(cert), Some(key)) = (&config.tls_cert_path, &config.tls_key_path) {
        return serve_tls(addr, app, cert, key).await;
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;
    tracing::info!("Web server stopped");
    Ok(())
}

#[cfg(feature = "tls")]
async fn serve_tls(addr: SocketAddr, app: Router, cert: &str, key: &str) -> Result<()> {
    let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
        .await
        .context("Failed to load TLS certificate or key")?;
    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(_addr: SocketAddr, _app: Router, _cert: &str, _key: &str) -> Result<()> {
    anyhow::bail!("TLS certificate configured but the binary was built without the `tls` feature")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
