//! S3 proxy handler / S3 代理处理器
//!
//! Walks the candidate keys of a GET request one at a time and stops at the
//! first object or non-empty listing. A miss on every candidate hands the
//! request to the next handler in the chain.
//! 依次尝试候选键，全部未命中时交给下一个处理器

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, request::Parts, HeaderMap, HeaderName, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::headers::{object_response, TranslateContext, BASE64_ENCODING};
use crate::listing::format_listing;
use crate::resolver::{resolve_candidates, Candidate};
use crate::storage::{GetOutcome, ObjectStorage};
use crate::utils::strip_mount;

/// Name of the response header carrying the resolved key, after the custom prefix
pub const KEY_HEADER_SUFFIX: &str = "s3-proxy-key";

/// Request-independent proxy state, shared by all requests / 代理共享状态
pub struct S3Proxy {
    config: Arc<ProxyConfig>,
    storage: Arc<dyn ObjectStorage>,
    key_header: HeaderName,
}

impl S3Proxy {
    pub fn new(
        config: ProxyConfig,
        storage: Arc<dyn ObjectStorage>,
        custom_header_prefix: &str,
    ) -> Result<Self, ProxyError> {
        let name = format!("{}{}", custom_header_prefix, KEY_HEADER_SUFFIX).to_ascii_lowercase();
        let key_header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ProxyError::Config(format!("invalid custom header name '{}'", name)))?;

        tracing::info!(
            "S3 proxy mounted at {} (backend={}, prefix={:?}, index={:?}, listing={})",
            config.mount_path,
            storage.name(),
            config.normalized_prefix(),
            config.index_documents,
            config.list_directories
        );

        Ok(Self {
            config: Arc::new(config),
            storage,
            key_header,
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    pub fn key_header(&self) -> &HeaderName {
        &self.key_header
    }

    /// Handle one request. `Ok(None)` means "not mine": defer to the next handler.
    /// 处理请求，返回 None 表示交给下一个处理器
    pub async fn handle(&self, parts: &Parts) -> Result<Option<Response>, ProxyError> {
        if parts.method != Method::GET {
            return Ok(None);
        }
        let Some(relative) = strip_mount(&self.config.mount_path, parts.uri.path()) else {
            return Ok(None);
        };

        let span = tracing::info_span!("s3_proxy", path = %parts.uri.path());
        self.resolve(relative, &parts.headers).instrument(span).await
    }

    async fn resolve(
        &self,
        relative: &str,
        headers: &HeaderMap,
    ) -> Result<Option<Response>, ProxyError> {
        let candidates = resolve_candidates(relative, &self.config)?;
        let transcode = accepts_base64(headers);
        // Validators describe the stored bytes, not the base64 text
        let if_none_match = if transcode {
            None
        } else {
            headers
                .get(header::IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok())
        };

        for candidate in candidates {
            tracing::debug!("Trying candidate {:?}", candidate);

            let key = match candidate {
                Candidate::Listing(prefix) => {
                    if let Some(response) = self.try_listing(&prefix).await? {
                        return Ok(Some(response));
                    }
                    continue;
                }
                Candidate::Object(key) => key,
            };

            match self.storage.get_object(&key, if_none_match).await {
                Ok(GetOutcome::Found(object)) => {
                    tracing::info!("Serving {} (base64={})", key, transcode);
                    let ctx = TranslateContext {
                        request_path: relative,
                        key: &key,
                        transcode,
                        config: &self.config,
                    };
                    return object_response(object, &ctx, &self.key_header).map(Some);
                }
                Ok(GetOutcome::NotModified) => {
                    tracing::debug!("Not modified: {}", key);
                    return Ok(Some(not_modified()));
                }
                Ok(GetOutcome::NotFound) => continue,
                Err(source) => return Err(ProxyError::Fetch { key, source }),
            }
        }

        tracing::debug!("No candidate matched {}, deferring", relative);
        Ok(None)
    }

    async fn try_listing(&self, prefix: &str) -> Result<Option<Response>, ProxyError> {
        let keys = self
            .storage
            .list_objects(prefix)
            .await
            .map_err(|source| ProxyError::Listing {
                prefix: prefix.to_string(),
                source,
            })?;

        let entries = format_listing(prefix, &keys);
        if entries.is_empty() {
            return Ok(None);
        }

        tracing::info!("Listing {} ({} keys)", prefix, entries.len());
        Ok(Some(Json(entries).into_response()))
    }
}

fn not_modified() -> Response {
    (StatusCode::NOT_MODIFIED, Body::empty()).into_response()
}

/// Whether Accept-Encoding explicitly lists base64 with a non-zero quality
/// 客户端是否接受 base64 编码
pub fn accepts_base64(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|coding| {
            let mut params = coding.split(';');
            let name = params.next().unwrap_or("").trim();
            if !name.eq_ignore_ascii_case(BASE64_ENCODING) {
                return false;
            }
            let quality = params
                .filter_map(|p| p.trim().strip_prefix("q="))
                .filter_map(|q| q.trim().parse::<f32>().ok())
                .next()
                .unwrap_or(1.0);
            quality > 0.0
        })
}

/// Axum middleware entry point / 中间件入口
pub async fn s3_proxy_middleware(
    State(proxy): State<Arc<S3Proxy>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    match proxy.handle(&parts).await {
        Ok(Some(response)) => response,
        Ok(None) => next.run(Request::from_parts(parts, body)).await,
        Err(e) => e.into_response(),
    }
}

/// Default next handler: nothing served the path / 默认下一个处理器
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "code": 404,
            "message": "Not Found"
        })),
    )
        .into_response()
}

/// Router serving the bucket, with `next` as the fallback chain / 构建代理路由
pub fn router(proxy: Arc<S3Proxy>, next: Router) -> Router {
    next.layer(middleware::from_fn_with_state(proxy, s3_proxy_middleware))
}
