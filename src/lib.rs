pub mod config;
pub mod error;
pub mod utils;
pub mod storage;
pub mod resolver;
pub mod listing;
pub mod headers;
pub mod transcode;
pub mod proxy;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

pub use config::{AppConfig, ProxyConfig, ServerConfig};
pub use error::ProxyError;
pub use proxy::{s3_proxy_middleware, S3Proxy};
pub use storage::{ObjectStorage, StorageError};
