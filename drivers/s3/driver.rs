//! S3驱动核心实现
//!
//! - 只提供只读原语（get_object, list_objects）
//! - GET 通过预签名URL由共享的 reqwest 连接池发出，先拿到响应头，再流式读取内容
//! - 列表使用 rust-s3 的分页 ListObjects

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::Region;

use super::config::S3Config;
use crate::storage::{GetOutcome, ObjectMeta, ObjectStorage, StorageError, StoredObject};

/// S3驱动
pub struct S3Driver {
    config: S3Config,
    bucket: Box<Bucket>,
    http: reqwest::Client,
}

impl S3Driver {
    /// 创建新的S3驱动实例
    pub fn new(config: S3Config) -> Result<Self> {
        if config.bucket.is_empty() {
            return Err(anyhow!("S3 bucket 未配置"));
        }
        let bucket = Self::create_bucket(&config)?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| anyhow!("创建HTTP客户端失败: {}", e))?;
        Ok(Self { config, bucket, http })
    }

    /// 创建S3 Bucket客户端
    fn create_bucket(config: &S3Config) -> Result<Box<Bucket>> {
        // 未配置密钥时交给默认凭证链（环境变量、profile）
        let credentials = (if config.access_key_id.is_empty() {
            Credentials::new(None, None, None, None, None)
        } else {
            Credentials::new(
                Some(&config.access_key_id),
                Some(&config.secret_access_key),
                if config.session_token.is_empty() { None } else { Some(&config.session_token) },
                None,
                None,
            )
        })
        .map_err(|e| anyhow!("创建S3凭证失败: {}", e))?;

        let region = if config.endpoint.is_empty() {
            Region::Custom {
                region: config.region.clone(),
                endpoint: format!("https://s3.{}.amazonaws.com", config.region),
            }
        } else {
            Region::Custom {
                region: config.region.clone(),
                endpoint: config.endpoint.clone(),
            }
        };

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| anyhow!("创建S3 Bucket失败: {}", e))?;

        let bucket = if config.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(bucket)
    }
}

#[async_trait]
impl ObjectStorage for S3Driver {
    fn name(&self) -> &str {
        "S3"
    }

    async fn get_object(
        &self,
        key: &str,
        if_none_match: Option<&str>,
    ) -> Result<GetOutcome, StorageError> {
        let url = self
            .bucket
            .presign_get(key, self.config.sign_url_expire_secs.max(1), None)
            .await?;

        let mut request = self.http.get(url);
        if let Some(tag) = if_none_match {
            request = request.header("if-none-match", tag);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        tracing::debug!("S3 GET: key={}, status={}", key, status);

        match status {
            304 => Ok(GetOutcome::NotModified),
            404 => Ok(GetOutcome::NotFound),
            200..=299 => {
                let headers = response.headers();
                let meta = ObjectMeta::from_lookup(|name| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                });
                let body = response
                    .bytes_stream()
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
                Ok(GetOutcome::Found(StoredObject {
                    meta,
                    body: Box::pin(body),
                }))
            }
            other => Err(StorageError::UnexpectedStatus(other)),
        }
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let results = self.bucket.list(prefix.to_string(), None).await?;

        let keys: Vec<String> = results
            .into_iter()
            .flat_map(|page| page.contents.into_iter().map(|obj| obj.key))
            .collect();

        tracing::debug!("S3 LIST: prefix={}, keys={}", prefix, keys.len());
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_bucket() {
        let config = S3Config::default();
        assert!(S3Driver::new(config).is_err());
    }

    #[test]
    fn test_new_with_static_credentials() {
        let config = S3Config {
            bucket: "site-assets".to_string(),
            endpoint: "http://localhost:9000".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            force_path_style: true,
            ..Default::default()
        };
        let driver = S3Driver::new(config).unwrap();
        assert_eq!(driver.name(), "S3");
    }
}
