/// Path processing utility functions / 路径处理工具函数

/// Segments starting with this marker only bust caches and never reach the key
/// 以此开头的路径段仅用于缓存破坏
pub const CACHE_BUST_MARKER: &str = "--";

/// Strip the mount point from a request path / 从挂载路径中提取实际路径
/// mount_path: 挂载点路径，如 "/site"
/// raw_path: 请求的完整路径，如 "/site/docs/"
/// 返回: Some("/docs/")；不在挂载点下返回 None
pub fn strip_mount<'a>(mount_path: &str, raw_path: &'a str) -> Option<&'a str> {
    let mount = mount_path.trim_end_matches('/');
    if mount.is_empty() {
        return Some(raw_path);
    }

    let rest = raw_path.strip_prefix(mount)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        // "/sitemap" is not under "/site"
        None
    }
}

/// Drop the query string, then percent-decode / 去掉查询串并解码
pub fn decode_path(path: &str) -> Result<String, std::string::FromUtf8Error> {
    let path = path.split('?').next().unwrap_or("");
    urlencoding::decode(path).map(|p| p.into_owned())
}

/// Remove cache-busting segments and surrounding slashes / 移除缓存破坏路径段
/// "/--v123/css/site.css" -> "css/site.css"
pub fn strip_cache_busting(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.starts_with(CACHE_BUST_MARKER))
        .collect::<Vec<_>>()
        .join("/")
        .trim_matches('/')
        .to_string()
}

/// Join two key parts with a single slash, skipping empty parts / 拼接键
pub fn join_key(base: &str, name: &str) -> String {
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, name),
    }
}
