/// 缓存诊断路由

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::types::image::SketchImage;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cache/status", get(cache_status))
        .route("/cache/images", get(cache_images))
}

async fn cache_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let count = state.orchestrator.cache_count().await;
    Json(json!({
        "imageCount": count,
        "storage": "Azure Table Storage",
        "table": state.config.table_name,
    }))
}

async fn cache_images(State(state): State<AppState>) -> Json<Vec<SketchImage>> {
    Json(state.orchestrator.cache_contents().await)
}
