use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::BTreeMap;
use std::pin::Pin;

/// Object body, consumed lazily after headers arrived / 对象内容流
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Headers the proxy reads from a stored object / 代理关心的对象头
pub const OBJECT_HEADERS: [&str; 5] = [
    "content-type",
    "last-modified",
    "etag",
    "cache-control",
    "content-length",
];

/// Object metadata: the fixed header set, any subset present / 对象元数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    values: BTreeMap<&'static str, String>,
}

impl ObjectMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the known headers through a lookup function (case-insensitive names)
    /// 通过查找函数收集已知头
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut meta = Self::new();
        for name in OBJECT_HEADERS {
            if let Some(value) = lookup(name) {
                meta.values.insert(name, value);
            }
        }
        meta
    }

    /// Builder-style setter, unknown header names are ignored / 设置头
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Some(known) = OBJECT_HEADERS.iter().find(|h| h.eq_ignore_ascii_case(name)) {
            self.values.insert(*known, value.into());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.values.get(name.as_str()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A found object: headers first, body stream second / 找到的对象
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub body: ByteStream,
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredObject")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Result of a conditional GET / 条件读取结果
#[derive(Debug)]
pub enum GetOutcome {
    Found(StoredObject),
    NotModified,
    NotFound,
}

/// Storage backend failure / 存储后端错误
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage returned unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("S3 client error: {0}")]
    S3(#[from] s3::error::S3Error),
}

/// Object storage interface (read-only primitives) / 对象存储接口
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Backend name / 后端名称
    fn name(&self) -> &str;

    /// Fetch one object. `if_none_match` is forwarded as a conditional validator.
    /// 读取对象，可附带 If-None-Match
    async fn get_object(
        &self,
        key: &str,
        if_none_match: Option<&str>,
    ) -> Result<GetOutcome, StorageError>;

    /// List every key under a prefix, in backend order / 列出前缀下的所有键
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

#[cfg(test)]
pub mod memory;
