/// Unsplash /photos/random 响应的反序列化结构
/// 只声明用得到的字段，其余忽略

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashPhoto {
    pub id: String,
    pub urls: UnsplashUrls,
    #[serde(default)]
    pub location: Option<UnsplashLocation>,
    #[serde(default)]
    pub alt_description: Option<String>,
    pub user: UnsplashUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUrls {
    pub regular: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnsplashLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUser {
    pub name: String,
    pub links: UnsplashUserLinks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUserLinks {
    pub html: String,
}
