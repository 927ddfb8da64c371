//! Response translation / 响应头转换
//!
//! Maps a found object's metadata onto the outbound response through a fixed,
//! ordered table of header rules, then attaches the (optionally transcoded) body.

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::Response,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::storage::{ObjectMeta, StoredObject};
use crate::transcode::Base64Stream;

/// Content-Encoding value used for transcoded bodies / 转码后的内容编码
pub const BASE64_ENCODING: &str = "base64";

/// Suffix inserted into the etag of transcoded bodies / 转码后 etag 的后缀
pub const ETAG_SUFFIX: &str = "_base64";

const GENERIC_CONTENT_TYPES: [&str; 2] = ["application/octet-stream", "binary/octet-stream"];

/// Per-request inputs of the header rules / 头转换上下文
#[derive(Debug, Clone, Copy)]
pub struct TranslateContext<'a> {
    /// Request path relative to the mount point / 请求路径
    pub request_path: &'a str,
    /// Storage key that was resolved / 命中的存储键
    pub key: &'a str,
    /// Client negotiated base64 delivery / 客户端接受 base64
    pub transcode: bool,
    pub config: &'a ProxyConfig,
}

type HeaderRule = fn(&TranslateContext<'_>, Option<&str>) -> Option<String>;

/// Forwarded headers and their rules, applied in order / 转发头规则表
const HEADER_RULES: [(&str, HeaderRule); 5] = [
    ("content-type", content_type_rule),
    ("last-modified", pass_through),
    ("etag", etag_rule),
    ("cache-control", cache_control_rule),
    ("content-length", content_length_rule),
];

fn pass_through(_ctx: &TranslateContext<'_>, value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn content_type_rule(ctx: &TranslateContext<'_>, value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if !GENERIC_CONTENT_TYPES.iter().any(|g| v.eq_ignore_ascii_case(g)) => {
            Some(v.to_string())
        }
        _ => Some(guess_content_type(ctx.request_path, ctx.key)),
    }
}

fn etag_rule(ctx: &TranslateContext<'_>, value: Option<&str>) -> Option<String> {
    let value = value?;
    if ctx.transcode {
        Some(suffix_etag(value))
    } else {
        Some(value.to_string())
    }
}

fn cache_control_rule(ctx: &TranslateContext<'_>, value: Option<&str>) -> Option<String> {
    if let Some(forced) = &ctx.config.override_cache_control {
        return Some(forced.clone());
    }
    match value {
        Some(v) => Some(v.to_string()),
        None => ctx.config.default_cache_control.clone(),
    }
}

fn content_length_rule(ctx: &TranslateContext<'_>, value: Option<&str>) -> Option<String> {
    // Encoded length differs from the stored length
    if ctx.transcode {
        None
    } else {
        value.map(str::to_string)
    }
}

/// MIME type from the request path, falling back to the resolved key / 推断内容类型
/// "/docs/" served by "docs/index.html" still gets text/html.
pub fn guess_content_type(request_path: &str, key: &str) -> String {
    mime_guess::from_path(request_path)
        .first()
        .or_else(|| mime_guess::from_path(key).first())
        .map(|m| m.to_string())
        .unwrap_or_else(|| GENERIC_CONTENT_TYPES[0].to_string())
}

/// `"abc"` -> `"abc_base64"`, `W/"abc"` -> `W/"abc_base64"`, `abc` -> `abc_base64`
pub fn suffix_etag(etag: &str) -> String {
    match etag.strip_suffix('"') {
        Some(body) if body.contains('"') => format!("{}{}\"", body, ETAG_SUFFIX),
        _ => format!("{}{}", etag, ETAG_SUFFIX),
    }
}

/// Apply the rule table / 应用规则表
pub fn translate_headers(meta: &ObjectMeta, ctx: &TranslateContext<'_>) -> Vec<(HeaderName, String)> {
    HEADER_RULES
        .iter()
        .filter_map(|(name, rule)| {
            rule(ctx, meta.get(name)).map(|value| (HeaderName::from_static(*name), value))
        })
        .collect()
}

/// Build the streaming response for a found object / 构建对象响应
pub fn object_response(
    object: StoredObject,
    ctx: &TranslateContext<'_>,
    key_header: &HeaderName,
) -> Result<Response, ProxyError> {
    let mut builder = Response::builder().status(StatusCode::OK);

    for (name, value) in translate_headers(&object.meta, ctx) {
        match HeaderValue::from_str(&value) {
            Ok(v) => builder = builder.header(name, v),
            Err(_) => tracing::warn!("Skipping invalid {} header on {}: {:?}", name, ctx.key, value),
        }
    }

    match HeaderValue::from_str(ctx.key) {
        Ok(v) => builder = builder.header(key_header.clone(), v),
        Err(_) => tracing::warn!("Key not representable as header value: {:?}", ctx.key),
    }

    let body = if ctx.transcode {
        builder = builder.header(header::CONTENT_ENCODING, BASE64_ENCODING);
        Body::from_stream(Base64Stream::new(object.body))
    } else {
        Body::from_stream(object.body)
    };

    builder
        .body(body)
        .map_err(|e| ProxyError::Config(e.to_string()))
}
