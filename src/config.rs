//! Application configuration module / 应用配置模块
//!
//! Manages configuration loaded from config.json (path overridable with `S3_PROXY_CONFIG`)
//! Creates default config file on first run / 首次运行时创建默认配置文件

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::drivers::s3::S3Config;

/// Environment variable overriding the config file location / 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "S3_PROXY_CONFIG";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// Proxy behaviour / 代理配置
    #[serde(default)]
    pub proxy: ProxyConfig,
    /// Bucket connection / 存储桶配置
    #[serde(default)]
    pub storage: S3Config,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port / 服务器端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// Prefix for custom response headers, e.g. `x-4front-s3-proxy-key`
    /// 自定义响应头前缀
    #[serde(default = "default_header_prefix")]
    pub custom_header_prefix: String,
}

/// Per-mount proxy configuration / 代理挂载配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Where the bucket is mounted in the URL space / 挂载路径
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
    /// Key prefix inside the bucket / 存储桶内的键前缀
    #[serde(default)]
    pub prefix: Option<String>,
    /// Index documents tried for directory-like paths, in order / 目录索引文档
    #[serde(default)]
    pub index_documents: Vec<String>,
    /// Return a JSON listing when nothing else matched / 允许目录列表
    #[serde(default)]
    pub list_directories: bool,
    /// Replaces any stored Cache-Control / 覆盖缓存控制
    #[serde(default)]
    pub override_cache_control: Option<String>,
    /// Used when the object carries no Cache-Control / 默认缓存控制
    #[serde(default)]
    pub default_cache_control: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8180
}

fn default_header_prefix() -> String {
    "x-4front-".to_string()
}

fn default_mount_path() -> String {
    "/".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            custom_header_prefix: default_header_prefix(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            mount_path: default_mount_path(),
            prefix: None,
            index_documents: Vec::new(),
            list_directories: false,
            override_cache_control: None,
            default_cache_control: None,
        }
    }
}

impl ProxyConfig {
    /// Prefix without leading/trailing slashes, empty if unset / 规范化前缀
    pub fn normalized_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("").trim_matches('/')
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config() -> anyhow::Result<AppConfig> {
    let config_path = get_config_path();

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {:?}", config_path))?;

        let config = parse_config(&content)
            .with_context(|| format!("Failed to parse config file {:?}", config_path))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(&config, &config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Parse configuration JSON, missing fields take defaults / 解析配置
pub fn parse_config(content: &str) -> anyhow::Result<AppConfig> {
    Ok(serde_json::from_str(content)?)
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig, path: &std::path::Path) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(config)
        .context("Failed to serialize config")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.server.port, 8180);
        assert_eq!(config.server.custom_header_prefix, "x-4front-");
        assert_eq!(config.proxy.mount_path, "/");
        assert!(config.proxy.index_documents.is_empty());
        assert!(!config.proxy.list_directories);
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.get_bind_address(), "0.0.0.0:8180");
    }

    #[test]
    fn test_partial_proxy_section() {
        let config = parse_config(r#"{
            "proxy": { "prefix": "/public/", "index_documents": ["index.html"], "list_directories": true },
            "storage": { "bucket": "site-assets", "force_path_style": true }
        }"#).unwrap();

        assert_eq!(config.proxy.normalized_prefix(), "public");
        assert_eq!(config.proxy.index_documents, vec!["index.html".to_string()]);
        assert!(config.proxy.list_directories);
        assert_eq!(config.proxy.mount_path, "/");
        assert_eq!(config.storage.bucket, "site-assets");
        assert!(config.storage.force_path_style);
    }

    #[test]
    fn test_normalized_prefix_unset() {
        let config = ProxyConfig::default();
        assert_eq!(config.normalized_prefix(), "");

        let config = ProxyConfig { prefix: Some("///".to_string()), ..Default::default() };
        assert_eq!(config.normalized_prefix(), "");
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("s3_proxy_config_{}.json", std::process::id()));
        let mut config = AppConfig::default();
        config.proxy.default_cache_control = Some("max-age=60".to_string());
        save_config(&config, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reloaded = parse_config(&content).unwrap();
        assert_eq!(reloaded.proxy.default_cache_control.as_deref(), Some("max-age=60"));
        let _ = std::fs::remove_file(&path);
    }
}
