//! Candidate key resolution / 候选键解析
//!
//! Turns a request path into the ordered list of storage keys to try:
//! direct key, then index documents in configured order, then a listing prefix.
//! 顺序: 直接键 -> 索引文档 -> 目录列表

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::utils::{decode_path, join_key, strip_cache_busting};

/// One storage key or prefix tried during resolution / 候选键
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Exact object key, never ends with a slash / 对象键
    Object(String),
    /// Listing prefix ending with a slash, or empty for the bucket root / 列表前缀
    Listing(String),
}

impl Candidate {
    pub fn key(&self) -> &str {
        match self {
            Candidate::Object(key) | Candidate::Listing(key) => key,
        }
    }
}

/// Sanitized, prefix-joined key derived from the request path / 基础键
pub fn base_key(relative_path: &str, config: &ProxyConfig) -> Result<String, ProxyError> {
    let decoded = decode_path(relative_path)
        .map_err(|_| ProxyError::MalformedPath(relative_path.to_string()))?;
    let sanitized = strip_cache_busting(&decoded);
    Ok(join_key(config.normalized_prefix(), &sanitized))
}

/// Build the ordered candidate list for a path relative to the mount point
/// 根据相对路径生成有序候选列表
pub fn resolve_candidates(
    relative_path: &str,
    config: &ProxyConfig,
) -> Result<Vec<Candidate>, ProxyError> {
    let base = base_key(relative_path, config)?;
    let mut candidates = Vec::with_capacity(config.index_documents.len() + 2);

    if !base.is_empty() {
        candidates.push(Candidate::Object(base.clone()));
    }

    for document in &config.index_documents {
        let document = document.trim_matches('/');
        if document.is_empty() {
            continue;
        }
        candidates.push(Candidate::Object(join_key(&base, document)));
    }

    if config.list_directories {
        let prefix = if base.is_empty() {
            String::new()
        } else {
            format!("{}/", base)
        };
        candidates.push(Candidate::Listing(prefix));
    }

    Ok(candidates)
}
