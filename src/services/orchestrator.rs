/// 图片编排器
/// 固定优先级的取图流水线：先实时抓取，成功则写通缓存，失败再从缓存随机回退

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::info;

use crate::types::image::{ImageCategory, SketchImage};
use crate::unsplash_client::FetchError;

/// 实时图片来源的接缝，生产实现为 UnsplashClient
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn fetch_by_category(&self, category: ImageCategory) -> Result<SketchImage, FetchError>;

    async fn fetch_by_query(&self, query: &str) -> Result<SketchImage, FetchError>;
}

/// 缓存存储的接缝，生产实现为 TableStore
/// 存储故障不往外传：put 尽力而为，list_all 降级为空列表
#[async_trait]
pub trait ImageCache: Send + Sync {
    async fn put(&self, image: &SketchImage);

    async fn list_all(&self) -> Vec<SketchImage>;

    /// 不变量：count() == list_all().len()
    async fn count(&self) -> usize {
        self.list_all().await.len()
    }

    async fn pick_random(
        &self,
        exclude_id: Option<&str>,
        category: Option<ImageCategory>,
    ) -> Option<SketchImage> {
        pick_from(self.list_all().await, exclude_id, category)
    }
}

/// 过滤后均匀随机取一张，集合为空时返回 None
pub fn pick_from(
    images: Vec<SketchImage>,
    exclude_id: Option<&str>,
    category: Option<ImageCategory>,
) -> Option<SketchImage> {
    let mut available: Vec<SketchImage> = images
        .into_iter()
        .filter(|img| exclude_id.map_or(true, |ex| img.id != ex))
        .filter(|img| category.map_or(true, |c| img.category == Some(c)))
        .collect();

    if available.is_empty() {
        return None;
    }
    let index = rand::thread_rng().gen_range(0..available.len());
    Some(available.swap_remove(index))
}

/// 图片来自哪一路，响应里经 as_str 写进 _source 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Live,
    Cache,
    None,
}

impl ImageSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSource::Live => "live",
            ImageSource::Cache => "cache",
            ImageSource::None => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageOutcome {
    pub image: Option<SketchImage>,
    pub source: ImageSource,
}

pub struct ImageOrchestrator {
    provider: Arc<dyn ImageProvider>,
    store: Option<Arc<dyn ImageCache>>,
}

impl ImageOrchestrator {
    pub fn new(provider: Arc<dyn ImageProvider>, store: Option<Arc<dyn ImageCache>>) -> Self {
        Self { provider, store }
    }

    /// 取下一张类别图
    /// exclude_id 只作用于缓存回退，实时抓取没有排除概念
    pub async fn next_image(
        &self,
        exclude_id: Option<&str>,
        category: ImageCategory,
    ) -> ImageOutcome {
        match self.provider.fetch_by_category(category).await {
            Ok(image) => {
                // 写通缓存，写失败不影响本次返回
                if let Some(store) = &self.store {
                    store.put(&image).await;
                }
                ImageOutcome {
                    image: Some(image),
                    source: ImageSource::Live,
                }
            }
            Err(err) => {
                info!("[ORCH] 实时抓取失败 ({}), 回退到缓存", err);
                if let Some(store) = &self.store {
                    if let Some(image) = store.pick_random(exclude_id, Some(category)).await {
                        return ImageOutcome {
                            image: Some(image),
                            source: ImageSource::Cache,
                        };
                    }
                }
                ImageOutcome {
                    image: None,
                    source: ImageSource::None,
                }
            }
        }
    }

    /// 自定义关键词搜索：不写缓存，失败也不回退，原样交给调用方
    pub async fn search(&self, query: &str) -> Result<SketchImage, FetchError> {
        self.provider.fetch_by_query(query).await
    }

    pub async fn cache_count(&self) -> usize {
        match &self.store {
            Some(store) => store.count().await,
            None => 0,
        }
    }

    pub async fn cache_contents(&self) -> Vec<SketchImage> {
        match &self.store {
            Some(store) => store.list_all().await,
            None => Vec::new(),
        }
    }
}
