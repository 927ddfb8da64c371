//! S3 object storage backend / S3对象存储后端

pub mod config;
pub mod driver;

pub use config::S3Config;
pub use driver::S3Driver;
