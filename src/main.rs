/// sketch-api 入口
/// 启动 HTTP 服务器，装配 Unsplash 客户端和 Table Storage 缓存

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use sketch_api::config::AppConfig;
use sketch_api::services::orchestrator::{ImageCache, ImageOrchestrator, ImageProvider};
use sketch_api::table_store::TableStore;
use sketch_api::unsplash_client::{UnsplashClient, UnsplashClientOptions};
use sketch_api::AppState;

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env();

    println!(
        r#"
╔══════════════════════════════════════╗
║       sketch-api v0.1.0 (Rust)       ║
║      速写练习参考图服务              ║
╚══════════════════════════════════════╝
"#
    );
    println!(
        "UNSPLASH_ACCESS_KEY: {}",
        if config.unsplash_access_key.is_empty() { "✗ missing" } else { "✓ set" }
    );
    println!(
        "AZURE_STORAGE:       {}",
        if config.cache_enabled() { "✓ set" } else { "✗ missing" }
    );
    println!("监听地址:            http://{}:{}", config.host, config.port);
    println!();

    let provider: Arc<dyn ImageProvider> = Arc::new(UnsplashClient::new(
        &config.unsplash_access_key,
        UnsplashClientOptions::default(),
    ));

    let store: Option<Arc<dyn ImageCache>> = match &config.storage_connection_string {
        Some(connection_string) => match TableStore::new(connection_string, &config.table_name) {
            Ok(store) => {
                // 启动时建表，失败不阻塞启动
                if let Err(err) = store.ensure_table().await {
                    warn!("[STORE] 建表失败: {}", err);
                }
                Some(Arc::new(store))
            }
            Err(err) => {
                warn!("[STORE] 连接串无效，禁用缓存回退: {}", err);
                None
            }
        },
        None => None,
    };

    let state = AppState {
        config: config.clone(),
        orchestrator: Arc::new(ImageOrchestrator::new(provider, store)),
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    info!("✅ 服务已启动: http://{}", addr);

    axum::serve(listener, app).await.expect("Server error");
}

fn build_router(state: AppState) -> Router {
    // CORS：任意来源，仅 GET/OPTIONS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(sketch_api::routes::images::router())
        .merge(sketch_api::routes::categories::router())
        .merge(sketch_api::routes::cache::router())
        .merge(sketch_api::routes::system::router())
        // 兜底
        .fallback(fallback)
        .layer(cors)
        .with_state(state)
}

async fn fallback(req: axum::extract::Request) -> Response {
    warn!("[HTTP] 未匹配路由: {} {}", req.method(), req.uri().path());
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}
