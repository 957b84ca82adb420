/// 健康检查路由
/// 只报告凭证是否配置，不探测外部服务可用性

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "unsplash": if state.config.unsplash_access_key.is_empty() { "missing" } else { "configured" },
        "azure": if state.config.cache_enabled() { "configured" } else { "missing" },
    }))
}
