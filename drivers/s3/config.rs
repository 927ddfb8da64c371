//! S3驱动配置 / S3 connection settings

use serde::{Deserialize, Serialize};

/// S3配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// 存储桶名称
    #[serde(default)]
    pub bucket: String,
    /// S3端点地址，为空时使用 AWS 区域端点
    /// AWS: https://s3.{region}.amazonaws.com
    /// MinIO: http://localhost:9000
    #[serde(default)]
    pub endpoint: String,
    /// 区域
    #[serde(default = "default_region")]
    pub region: String,
    /// Access Key ID，为空时从环境变量/配置文件读取凭证
    #[serde(default)]
    pub access_key_id: String,
    /// Secret Access Key
    #[serde(default)]
    pub secret_access_key: String,
    /// Session Token（用于临时凭证）
    #[serde(default)]
    pub session_token: String,
    /// 强制使用路径风格（而非虚拟主机风格）
    /// MinIO等需要设置为true
    #[serde(default)]
    pub force_path_style: bool,
    /// 预签名URL过期时间（秒），仅用于代理内部取对象
    #[serde(default = "default_sign_expire")]
    pub sign_url_expire_secs: u32,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_sign_expire() -> u32 {
    300
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            endpoint: String::new(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: String::new(),
            force_path_style: false,
            sign_url_expire_secs: default_sign_expire(),
        }
    }
}
