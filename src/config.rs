/// sketch-api 配置模块
/// 支持环境变量和默认值

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP 服务监听端口
    pub port: u16,
    /// HTTP 服务监听地址
    pub host: String,
    /// Unsplash API 凭证，为空时不发起实时抓取
    pub unsplash_access_key: String,
    /// Azure 存储连接串，缺失时整体关闭缓存回退
    pub storage_connection_string: Option<String>,
    /// 缓存表名
    pub table_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            unsplash_access_key: std::env::var("UNSPLASH_ACCESS_KEY").unwrap_or_default(),
            storage_connection_string: std::env::var("AZURE_STORAGE_CONNECTION_STRING")
                .ok()
                .filter(|v| !v.is_empty()),
            table_name: "sketchimages".into(),
        }
    }

    pub fn cache_enabled(&self) -> bool {
        self.storage_connection_string.is_some()
    }
}
