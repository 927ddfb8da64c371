// Driver package / 驱动包
pub mod s3;

use std::sync::Arc;

use crate::storage::ObjectStorage;

/// Build the storage backend from configuration / 根据配置创建存储后端
pub fn create_storage(config: &s3::S3Config) -> anyhow::Result<Arc<dyn ObjectStorage>> {
    let driver = s3::S3Driver::new(config.clone())?;
    tracing::info!(
        "S3 storage ready: bucket={}, region={}, path_style={}",
        config.bucket, config.region, config.force_path_style
    );
    Ok(Arc::new(driver))
}
