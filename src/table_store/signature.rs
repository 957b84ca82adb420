/// Azure Table Storage 连接串解析 + SharedKeyLite 请求签名

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::client::StoreError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct StorageCredentials {
    pub account: String,
    /// base64 解码后的账户密钥
    pub key: Vec<u8>,
    /// 表服务根地址，不带尾部斜杠
    pub table_endpoint: String,
}

/// 解析 "AccountName=...;AccountKey=...;..." 形式的连接串
/// TableEndpoint 显式给出时优先（本地 Azurite 场景），否则按 EndpointSuffix 拼默认地址
pub fn parse_connection_string(connection_string: &str) -> Result<StorageCredentials, StoreError> {
    let mut account = None;
    let mut key = None;
    let mut endpoint = None;
    let mut suffix = "core.windows.net".to_string();

    for pair in connection_string.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        // AccountKey 是 base64，自身带 '='，只按第一个 '=' 切
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        match name {
            "AccountName" => account = Some(value.to_string()),
            "AccountKey" => key = Some(value.to_string()),
            "TableEndpoint" => endpoint = Some(value.trim_end_matches('/').to_string()),
            "EndpointSuffix" => suffix = value.to_string(),
            _ => {}
        }
    }

    let account =
        account.ok_or_else(|| StoreError::BadConnectionString("缺少 AccountName".into()))?;
    let key = key.ok_or_else(|| StoreError::BadConnectionString("缺少 AccountKey".into()))?;
    let key = BASE64
        .decode(key)
        .map_err(|_| StoreError::BadConnectionString("AccountKey 不是合法 base64".into()))?;
    let table_endpoint =
        endpoint.unwrap_or_else(|| format!("https://{}.table.{}", account, suffix));

    Ok(StorageCredentials {
        account,
        key,
        table_endpoint,
    })
}

/// SharedKeyLite (Table service):
/// 签名串 = date + "\n" + canonical_resource，HMAC-SHA256 后 base64
pub fn shared_key_lite(
    credentials: &StorageCredentials,
    date: &str,
    canonical_resource: &str,
) -> String {
    let string_to_sign = format!("{}\n{}", date, canonical_resource);
    let mut mac =
        HmacSha256::new_from_slice(&credentials.key).expect("HMAC accepts any key length");
    mac.update(string_to_sign.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());
    format!("SharedKeyLite {}:{}", credentials.account, signature)
}

/// x-ms-date 要求 RFC 1123 格式的 GMT 时间
pub fn rfc1123_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
