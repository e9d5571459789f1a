use axum::http::{HeaderMap, header::CONTENT_TYPE};

/// True for `application/json` and `application/*+json`, ignoring parameters.
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

// 启动日志中只展示密钥前 4 个字符
pub fn key_preview(key: Option<&str>) -> String {
    let prefix: String = key.unwrap_or("").chars().take(4).collect();
    format!("{}…", prefix)
}
