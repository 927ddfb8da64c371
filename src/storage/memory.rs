//! In-memory storage used by tests / 测试用内存存储

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{GetOutcome, ObjectMeta, ObjectStorage, StorageError, StoredObject};

/// Recorded backend call / 记录的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get { key: String, if_none_match: Option<String> },
    List { prefix: String },
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: BTreeMap<String, (ObjectMeta, Bytes)>,
    calls: Mutex<Vec<Call>>,
    fail_list: bool,
    fail_get_status: Option<u16>,
    chunk_size: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object with the given metadata / 添加对象
    pub fn with_object(mut self, key: &str, meta: ObjectMeta, body: &[u8]) -> Self {
        self.objects.insert(key.to_string(), (meta, Bytes::copy_from_slice(body)));
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_get(mut self, status: u16) -> Self {
        self.fail_get_status = Some(status);
        self
    }

    /// Serve bodies in chunks of this size / 按块返回内容
    pub fn chunked(mut self, size: usize) -> Self {
        self.chunk_size = Some(size.max(1));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_object(
        &self,
        key: &str,
        if_none_match: Option<&str>,
    ) -> Result<GetOutcome, StorageError> {
        self.record(Call::Get {
            key: key.to_string(),
            if_none_match: if_none_match.map(str::to_string),
        });

        if let Some(status) = self.fail_get_status {
            return Err(StorageError::UnexpectedStatus(status));
        }

        let Some((meta, data)) = self.objects.get(key) else {
            return Ok(GetOutcome::NotFound);
        };

        if let (Some(tag), Some(etag)) = (if_none_match, meta.get("etag")) {
            if tag == etag {
                return Ok(GetOutcome::NotModified);
            }
        }

        let chunk_size = self.chunk_size.unwrap_or(data.len().max(1));
        let chunks: Vec<std::io::Result<Bytes>> = data
            .chunks(chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        Ok(GetOutcome::Found(StoredObject {
            meta: meta.clone(),
            body: Box::pin(futures::stream::iter(chunks)),
        }))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.record(Call::List { prefix: prefix.to_string() });

        if self.fail_list {
            return Err(StorageError::UnexpectedStatus(500));
        }

        Ok(self
            .objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
