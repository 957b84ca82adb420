/// SketchImage 与表实体之间的映射
/// 所有图片挂在同一个分区下，RowKey 就是图片 id

use serde_json::{json, Value};

use crate::types::image::{ImageCategory, SketchImage};

pub const PARTITION_KEY: &str = "images";

/// 生成插入实体的 JSON
/// cachedAt 超出 Int32 范围，必须带 Edm.Int64 类型注解并以字符串传值
pub fn to_entity(image: &SketchImage) -> Value {
    json!({
        "PartitionKey": PARTITION_KEY,
        "RowKey": image.id,
        "url": image.url,
        "city": image.city,
        "photographer": image.photographer,
        "photographerUrl": image.photographer_url,
        "cachedAt": image.cached_at.to_string(),
        "cachedAt@odata.type": "Edm.Int64",
        "query": image.query.clone().unwrap_or_default(),
        "category": image.category.unwrap_or(ImageCategory::DEFAULT).as_str(),
    })
}

/// 从查询结果里还原 SketchImage，分区不符或缺 RowKey 时返回 None
/// 缓存里只有类别抓取的图，类别字段缺失或不识别时落到默认类别
pub fn from_entity(entity: &Value) -> Option<SketchImage> {
    if entity.get("PartitionKey").and_then(Value::as_str) != Some(PARTITION_KEY) {
        return None;
    }
    let id = entity.get("RowKey")?.as_str()?.to_string();

    let cached_at = match entity.get("cachedAt") {
        Some(Value::String(raw)) => raw.parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        _ => 0,
    };
    let query = entity
        .get("query")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    let category = entity
        .get("category")
        .and_then(Value::as_str)
        .and_then(ImageCategory::parse)
        .unwrap_or(ImageCategory::DEFAULT);

    Some(SketchImage {
        id,
        url: text_field(entity, "url"),
        city: text_field(entity, "city"),
        photographer: text_field(entity, "photographer"),
        photographer_url: text_field(entity, "photographerUrl"),
        cached_at,
        query,
        category: Some(category),
    })
}

fn text_field(entity: &Value, key: &str) -> String {
    entity
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
