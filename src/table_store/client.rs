/// Azure Table Storage REST 客户端
/// 建表、写入实体、按分区列出实体（带续页 token）
/// 读写故障都只降级：写是尽力而为，读按空缓存处理

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::entity;
use super::signature::{parse_connection_string, rfc1123_now, shared_key_lite, StorageCredentials};
use crate::services::orchestrator::ImageCache;
use crate::types::image::SketchImage;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("连接串无效: {0}")]
    BadConnectionString(String),
    #[error("请求失败: {0}")]
    Http(String),
    #[error("意外的响应状态: {0}")]
    Unexpected(u16),
}

#[derive(Clone)]
pub struct TableStore {
    credentials: StorageCredentials,
    table: String,
    http: Client,
}

impl TableStore {
    pub fn new(connection_string: &str, table: &str) -> Result<Self, StoreError> {
        let credentials = parse_connection_string(connection_string)?;
        let http = Client::builder()
            .timeout(std::time::Duration::from_millis(10_000))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            credentials,
            table: table.to_string(),
            http,
        })
    }

    /// 按资源路径签名并组装公共请求头
    /// 查询参数不参与 SharedKeyLite 的签名串
    fn request(&self, method: Method, resource: &str) -> reqwest::RequestBuilder {
        let date = rfc1123_now();
        let canonical = format!("/{}/{}", self.credentials.account, resource);
        let authorization = shared_key_lite(&self.credentials, &date, &canonical);

        self.http
            .request(
                method,
                format!("{}/{}", self.credentials.table_endpoint, resource),
            )
            .header("Authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", "2019-02-02")
            .header("Accept", "application/json;odata=nometadata")
            .header("DataServiceVersion", "3.0;NetFx")
    }

    /// 建表，已存在（409）视为成功
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, "Tables")
            .header("Prefer", "return-no-content")
            .json(&json!({ "TableName": self.table }))
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        match response.status().as_u16() {
            201 | 204 => {
                info!("[STORE] 表 '{}' 已创建", self.table);
                Ok(())
            }
            409 => {
                debug!("[STORE] 表 '{}' 已存在", self.table);
                Ok(())
            }
            status => Err(StoreError::Unexpected(status)),
        }
    }

    /// 插入实体，主键冲突（409）视为成功，即 insert-if-absent
    async fn insert_entity(&self, image: &SketchImage) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, &self.table)
            .header("Prefer", "return-no-content")
            .json(&entity::to_entity(image))
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        match response.status().as_u16() {
            201 | 204 => {
                info!("[STORE] 图片已保存: {}", image.id);
                Ok(())
            }
            409 => {
                debug!("[STORE] 图片已存在: {}", image.id);
                Ok(())
            }
            status => Err(StoreError::Unexpected(status)),
        }
    }

    /// 列出分区下的全部实体，跟随 x-ms-continuation-* 续页头
    async fn query_entities(&self) -> Result<Vec<SketchImage>, StoreError> {
        let resource = format!("{}()", self.table);
        let filter = format!("PartitionKey eq '{}'", entity::PARTITION_KEY);
        let mut images = Vec::new();
        let mut continuation: Option<(String, String)> = None;

        loop {
            let mut request = self
                .request(Method::GET, &resource)
                .query(&[("$filter", filter.as_str())]);

            if let Some((next_pk, next_rk)) = &continuation {
                request = request.query(&[
                    ("NextPartitionKey", next_pk.as_str()),
                    ("NextRowKey", next_rk.as_str()),
                ]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| StoreError::Http(e.to_string()))?;

            let status = response.status().as_u16();
            if status != 200 {
                return Err(StoreError::Unexpected(status));
            }

            let next = read_continuation(response.headers());
            let body: Value = response
                .json()
                .await
                .map_err(|e| StoreError::Http(e.to_string()))?;

            if let Some(rows) = body.get("value").and_then(Value::as_array) {
                for row in rows {
                    match entity::from_entity(row) {
                        Some(image) => images.push(image),
                        None => warn!("[STORE] 跳过无法解析的实体"),
                    }
                }
            }

            match next {
                Some(next) => continuation = Some(next),
                None => break,
            }
        }

        Ok(images)
    }
}

fn read_continuation(headers: &HeaderMap) -> Option<(String, String)> {
    let next_pk = headers
        .get("x-ms-continuation-NextPartitionKey")?
        .to_str()
        .ok()?
        .to_string();
    let next_rk = headers
        .get("x-ms-continuation-NextRowKey")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Some((next_pk, next_rk))
}

#[async_trait]
impl ImageCache for TableStore {
    async fn put(&self, image: &SketchImage) {
        if let Err(err) = self.insert_entity(image).await {
            warn!("[STORE] 保存失败: {} ({})", image.id, err);
        }
    }

    async fn list_all(&self) -> Vec<SketchImage> {
        match self.query_entities().await {
            Ok(images) => images,
            Err(err) => {
                error!("[STORE] 读取失败，按空缓存处理: {}", err);
                Vec::new()
            }
        }
    }
}
