/// 取图路由：类别取图 + 自定义关键词搜索

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::image::{ImageCategory, SketchImage};
use crate::unsplash_client::FetchError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/image", get(get_image))
        .route("/search", get(search))
}

#[derive(Debug, Deserialize)]
struct ImageParams {
    exclude: Option<String>,
    category: Option<String>,
}

async fn get_image(
    State(state): State<AppState>,
    Query(params): Query<ImageParams>,
) -> Response {
    // 空字符串的 category 等同于没传，落到默认类别
    let category = match params.category.as_deref() {
        None | Some("") => ImageCategory::DEFAULT,
        Some(raw) => match ImageCategory::parse(raw) {
            Some(category) => category,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Invalid category",
                        "validCategories": ImageCategory::ALL,
                    })),
                )
                    .into_response();
            }
        },
    };

    let outcome = state
        .orchestrator
        .next_image(params.exclude.as_deref(), category)
        .await;

    match outcome.image {
        Some(image) => Json(tag_source(&image, outcome.source.as_str())).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "No images available" })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = params.query.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Query parameter is required" })),
        )
            .into_response();
    }

    match state.orchestrator.search(&query).await {
        Ok(image) => Json(tag_source(&image, "custom")).into_response(),
        Err(err) => (
            search_failure_status(&err),
            Json(json!({
                "error": err.to_string(),
                "rateLimited": err.is_rate_limited(),
            })),
        )
            .into_response(),
    }
}

/// 在图片 JSON 上追加 _source 标记
fn tag_source(image: &SketchImage, source: &str) -> Value {
    let mut value = serde_json::to_value(image).unwrap_or_else(|_| json!({}));
    if let Some(object) = value.as_object_mut() {
        object.insert("_source".into(), Value::String(source.to_string()));
    }
    value
}

/// 自定义搜索的失败不走缓存回退，直接映射状态码
fn search_failure_status(err: &FetchError) -> StatusCode {
    match err {
        FetchError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        FetchError::EmptyQuery => StatusCode::BAD_REQUEST,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::services::orchestrator::{ImageCache, ImageOrchestrator, ImageProvider};

    fn image(id: &str, category: Option<ImageCategory>) -> SketchImage {
        SketchImage {
            id: id.into(),
            url: format!("https://images.example/{id}"),
            city: "Lisbon".into(),
            photographer: "Ana".into(),
            photographer_url: "https://unsplash.com/@ana".into(),
            cached_at: 1_700_000_000_000,
            query: Some("city street".into()),
            category,
        }
    }

    struct FakeProvider {
        response: Result<SketchImage, FetchError>,
    }

    #[async_trait]
    impl ImageProvider for FakeProvider {
        async fn fetch_by_category(
            &self,
            category: ImageCategory,
        ) -> Result<SketchImage, FetchError> {
            self.response.clone().map(|mut img| {
                img.category = Some(category);
                img
            })
        }

        async fn fetch_by_query(&self, query: &str) -> Result<SketchImage, FetchError> {
            if query.trim().is_empty() {
                return Err(FetchError::EmptyQuery);
            }
            self.response.clone().map(|mut img| {
                img.query = Some(query.trim().to_string());
                img.category = None;
                img
            })
        }
    }

    #[derive(Default)]
    struct FakeStore {
        images: Mutex<Vec<SketchImage>>,
    }

    #[async_trait]
    impl ImageCache for FakeStore {
        async fn put(&self, image: &SketchImage) {
            let mut images = self.images.lock().unwrap();
            if !images.iter().any(|existing| existing.id == image.id) {
                images.push(image.clone());
            }
        }

        async fn list_all(&self) -> Vec<SketchImage> {
            self.images.lock().unwrap().clone()
        }
    }

    fn test_state(
        response: Result<SketchImage, FetchError>,
        store: Option<Arc<dyn ImageCache>>,
    ) -> AppState {
        AppState {
            config: AppConfig {
                port: 8000,
                host: "127.0.0.1".into(),
                unsplash_access_key: "test-key".into(),
                storage_connection_string: None,
                table_name: "sketchimages".into(),
            },
            orchestrator: Arc::new(ImageOrchestrator::new(
                Arc::new(FakeProvider { response }),
                store,
            )),
        }
    }

    /// 和生产 build_router 一样把取图和缓存路由挂到同一棵树上
    fn app(state: AppState) -> axum::Router {
        axum::Router::new()
            .merge(router())
            .merge(crate::routes::cache::router())
            .with_state(state)
    }

    async fn send(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bogus_category_returns_400_with_valid_set() {
        let app = app(test_state(Ok(image("fresh", None)), None));
        let (status, body) = send(app, "/image?category=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Invalid category"));
        assert_eq!(
            body["validCategories"],
            json!(["cities", "landscapes", "people", "animals"])
        );
    }

    #[tokio::test]
    async fn empty_category_param_serves_default() {
        let app = app(test_state(Ok(image("fresh", None)), None));
        let (status, body) = send(app, "/image?category=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], json!("cities"));
        assert_eq!(body["_source"], json!("live"));
    }

    #[tokio::test]
    async fn blank_search_query_returns_400() {
        let app = app(test_state(Ok(image("fresh", None)), None));
        let (status, body) = send(app.clone(), "/search?query=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Query parameter is required"));

        let (status, _) = send(app, "/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rate_limited_search_returns_429() {
        let app = app(test_state(Err(FetchError::RateLimited), None));
        let (status, body) = send(app, "/search?query=sunset").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["rateLimited"], json!(true));
        assert_eq!(body["error"], json!("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn exhausted_sources_return_503() {
        let app = app(test_state(Err(FetchError::RateLimited), None));
        let (status, body) = send(app, "/image?category=cities").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], json!("No images available"));
    }

    #[tokio::test]
    async fn cache_fallback_is_tagged_as_cache() {
        let store = Arc::new(FakeStore::default());
        store.put(&image("cached", Some(ImageCategory::Cities))).await;
        let app = app(test_state(
            Err(FetchError::RateLimited),
            Some(store.clone()),
        ));
        let (status, body) = send(app, "/image?category=cities&exclude=other").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!("cached"));
        assert_eq!(body["_source"], json!("cache"));
    }

    #[tokio::test]
    async fn live_image_appears_in_cache_listing() {
        let store = Arc::new(FakeStore::default());
        let app = app(test_state(Ok(image("fresh", None)), Some(store.clone())));

        let (status, body) = send(app.clone(), "/image?category=cities").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], json!("cities"));
        assert_eq!(body["_source"], json!("live"));

        let (status, body) = send(app, "/cache/images").await;
        assert_eq!(status, StatusCode::OK);
        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["id"], json!("fresh"));
    }

    #[test]
    fn tag_source_appends_marker_and_keeps_fields() {
        let image = SketchImage {
            id: "abc123".into(),
            url: "https://images.example/abc123".into(),
            city: "Lisbon".into(),
            photographer: "Ana".into(),
            photographer_url: "https://unsplash.com/@ana".into(),
            cached_at: 1_700_000_000_000,
            query: Some("city street".into()),
            category: Some(ImageCategory::Cities),
        };
        let value = tag_source(&image, "live");
        assert_eq!(value["_source"], json!("live"));
        assert_eq!(value["id"], json!("abc123"));
        assert_eq!(value["category"], json!("cities"));
    }

    #[test]
    fn rate_limit_maps_to_429() {
        assert_eq!(
            search_failure_status(&FetchError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn other_failures_map_to_503() {
        assert_eq!(
            search_failure_status(&FetchError::MissingKey),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            search_failure_status(&FetchError::Provider("API error: 500".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn empty_query_maps_to_400() {
        assert_eq!(
            search_failure_status(&FetchError::EmptyQuery),
            StatusCode::BAD_REQUEST
        );
    }
}
