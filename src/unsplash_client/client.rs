/// Unsplash HTTP 客户端
/// 按类别或自定义关键词请求随机图片，区分限流和其他失败

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use tracing::{debug, warn};

use crate::services::orchestrator::ImageProvider;
use crate::types::image::{ImageCategory, SketchImage};
use crate::types::unsplash::UnsplashPhoto;

/// 抓取失败的分类
/// RateLimited 和 Provider 可以回退到缓存，MissingKey 同样按可回退处理
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("UNSPLASH_ACCESS_KEY not set")]
    MissingKey,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("{0}")]
    Provider(String),
    #[error("Custom query cannot be empty")]
    EmptyQuery,
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }
}

#[derive(Debug, Clone)]
pub struct UnsplashClientOptions {
    /// API 根地址，测试时可指向本地
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for UnsplashClientOptions {
    fn default() -> Self {
        Self {
            base_url: "https://api.unsplash.com".into(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Clone)]
pub struct UnsplashClient {
    access_key: String,
    base_url: String,
    http: Client,
}

impl UnsplashClient {
    pub fn new(access_key: &str, options: UnsplashClientOptions) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_millis(options.timeout_ms))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            access_key: access_key.to_string(),
            base_url: options.base_url,
            http,
        }
    }

    async fn fetch_random(&self, term: &str) -> Result<UnsplashPhoto, FetchError> {
        if self.access_key.is_empty() {
            return Err(FetchError::MissingKey);
        }

        let url = format!("{}/photos/random", self.base_url);
        debug!("[UNSPLASH] GET {} query={}", url, term);

        let response = self
            .http
            .get(&url)
            .query(&[("query", term), ("orientation", "landscape")])
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .send()
            .await
            .map_err(|e| FetchError::Provider(e.to_string()))?;

        let status = response.status().as_u16();

        // 限流检测
        if status == 403 || status == 429 {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("?")
                .to_string();
            warn!("[UNSPLASH] 触发限流 (remaining: {})", remaining);
            return Err(FetchError::RateLimited);
        }

        if !response.status().is_success() {
            return Err(FetchError::Provider(format!("API error: {}", status)));
        }

        response
            .json::<UnsplashPhoto>()
            .await
            .map_err(|e| FetchError::Provider(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl ImageProvider for UnsplashClient {
    async fn fetch_by_category(&self, category: ImageCategory) -> Result<SketchImage, FetchError> {
        let term = random_search_term(category);
        let photo = self.fetch_random(term).await?;
        Ok(map_photo(photo, term.to_string(), Some(category)))
    }

    async fn fetch_by_query(&self, query: &str) -> Result<SketchImage, FetchError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(FetchError::EmptyQuery);
        }
        let photo = self.fetch_random(trimmed).await?;
        Ok(map_photo(photo, trimmed.to_string(), None))
    }
}

/// 从类别的候选搜索词里均匀随机取一个
pub fn random_search_term(category: ImageCategory) -> &'static str {
    let terms = category.search_terms();
    terms[rand::thread_rng().gen_range(0..terms.len())]
}

/// 把 Unsplash 响应映射成 SketchImage
/// 地点取值优先级：城市 > 国家 > 描述 > "Unknown"，空字符串同样跳过
fn map_photo(photo: UnsplashPhoto, query: String, category: Option<ImageCategory>) -> SketchImage {
    let location = photo.location.unwrap_or_default();
    let city = location
        .city
        .filter(|v| !v.is_empty())
        .or(location.country.filter(|v| !v.is_empty()))
        .or(photo.alt_description.filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "Unknown".into());

    SketchImage {
        id: photo.id,
        url: photo.urls.regular,
        city,
        photographer: photo.user.name,
        photographer_url: photo.user.links.html,
        cached_at: Utc::now().timestamp_millis(),
        query: Some(query),
        category,
    }
}
