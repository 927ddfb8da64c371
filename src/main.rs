use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use s3_proxy::{config, drivers, proxy, S3Proxy};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_TIME: &str = env!("BUILD_TIME");

/// GET /api/health - 健康检查
async fn health_check(started_at: String) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "build_time": BUILD_TIME,
        "started_at": started_at,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, stopping server");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_proxy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("s3-proxy v{} (built {})", VERSION, BUILD_TIME);

    // Load configuration / 加载配置
    let app_config = config::load_config()?;
    tracing::info!(
        "Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    let storage = drivers::create_storage(&app_config.storage)?;
    let proxy = Arc::new(S3Proxy::new(
        app_config.proxy.clone(),
        storage,
        &app_config.server.custom_header_prefix,
    )?);

    // Requests the proxy declines end up in the 404 handler / 代理未处理的请求返回404
    let proxy_routes = proxy::router(proxy, Router::new().fallback(proxy::not_found));

    let started_at = chrono::Utc::now().to_rfc3339();
    let app = Router::new()
        .route("/api/health", get(move || health_check(started_at.clone())))
        .fallback_service(proxy_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
