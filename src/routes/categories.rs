/// 类别列表路由

use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::types::image::ImageCategory;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories))
}

async fn list_categories() -> Json<serde_json::Value> {
    Json(json!({
        "categories": ImageCategory::ALL,
        "default": ImageCategory::DEFAULT,
    }))
}
