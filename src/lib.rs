/// sketch-api 库入口
/// Unsplash 实时取图 + Azure Table Storage 缓存回退

use std::sync::Arc;

pub mod config;
pub mod routes;
pub mod services;
pub mod table_store;
pub mod types;
pub mod unsplash_client;

use config::AppConfig;
use services::orchestrator::ImageOrchestrator;

/// 路由共享状态：配置 + 启动时注入好的编排器
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: Arc<ImageOrchestrator>,
}
