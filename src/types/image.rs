/// 核心数据类型：速写参考图 + 图片类别

use serde::{Deserialize, Serialize};

/// 图片类别，封闭枚举，每个类别有一组固定的候选搜索词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
    Cities,
    Landscapes,
    People,
    Animals,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 4] = [
        ImageCategory::Cities,
        ImageCategory::Landscapes,
        ImageCategory::People,
        ImageCategory::Animals,
    ];

    pub const DEFAULT: ImageCategory = ImageCategory::Cities;

    pub fn as_str(self) -> &'static str {
        match self {
            ImageCategory::Cities => "cities",
            ImageCategory::Landscapes => "landscapes",
            ImageCategory::People => "people",
            ImageCategory::Animals => "animals",
        }
    }

    pub fn parse(value: &str) -> Option<ImageCategory> {
        ImageCategory::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// 类别对应的候选搜索词，抓取时从中均匀随机取一个
    pub fn search_terms(self) -> &'static [&'static str] {
        match self {
            ImageCategory::Cities => &[
                "city street",
                "urban architecture",
                "old town",
                "city square",
                "european city",
                "cityscape",
                "street scene",
                "historic building",
            ],
            ImageCategory::Landscapes => &[
                "mountain landscape",
                "countryside",
                "forest path",
                "lake scenery",
                "coastal landscape",
                "valley view",
                "nature panorama",
                "rural scenery",
            ],
            ImageCategory::People => &[
                "portrait photography",
                "street portrait",
                "candid people",
                "human expression",
                "people sitting",
                "person standing",
                "cafe scene people",
                "market people",
            ],
            ImageCategory::Animals => &[
                "wildlife photography",
                "bird portrait",
                "cat portrait",
                "dog portrait",
                "animal close up",
                "zoo animals",
                "farm animals",
                "pets",
            ],
        }
    }
}

impl std::fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一张速写参考图
/// 序列化保持原 API 的 camelCase 字段名（photographerUrl、cachedAt）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchImage {
    /// Unsplash 图片 id，缓存内唯一
    pub id: String,
    pub url: String,
    /// 地点描述，取不到时为 "Unknown"
    pub city: String,
    pub photographer: String,
    pub photographer_url: String,
    /// 首次抓取时间（unix 毫秒）
    pub cached_at: i64,
    /// 实际使用的搜索词
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// 自定义关键词搜索的结果没有类别
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ImageCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_parse_roundtrip() {
        for category in ImageCategory::ALL {
            assert_eq!(ImageCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn category_parse_rejects_unknown() {
        assert_eq!(ImageCategory::parse("bogus"), None);
        assert_eq!(ImageCategory::parse(""), None);
        assert_eq!(ImageCategory::parse("Cities"), None);
    }

    #[test]
    fn default_category_is_member() {
        assert!(ImageCategory::ALL.contains(&ImageCategory::DEFAULT));
        assert_eq!(ImageCategory::DEFAULT.as_str(), "cities");
    }

    #[test]
    fn every_category_has_terms() {
        for category in ImageCategory::ALL {
            assert_eq!(category.search_terms().len(), 8);
        }
    }

    #[test]
    fn category_serializes_lowercase() {
        let value = serde_json::to_value(ImageCategory::Landscapes).unwrap();
        assert_eq!(value, json!("landscapes"));
    }

    #[test]
    fn image_serializes_camel_case() {
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
        let value = serde_json::to_value(&image).unwrap();
        assert_eq!(value["photographerUrl"], json!("https://unsplash.com/@ana"));
        assert_eq!(value["cachedAt"], json!(1_700_000_000_000i64));
        assert_eq!(value["category"], json!("cities"));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let image = SketchImage {
            id: "abc123".into(),
            url: "https://images.example/abc123".into(),
            city: "Unknown".into(),
            photographer: "Ana".into(),
            photographer_url: "https://unsplash.com/@ana".into(),
            cached_at: 0,
            query: None,
            category: None,
        };
        let value = serde_json::to_value(&image).unwrap();
        assert!(value.get("query").is_none());
        assert!(value.get("category").is_none());
    }
}
