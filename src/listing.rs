/// Format raw keys under a prefix as keys relative to that prefix / 生成相对键列表
///
/// The key equal to the prefix itself (the "folder" marker object) is dropped.
/// An empty result means the listing is a miss.
pub fn format_listing(prefix: &str, keys: &[String]) -> Vec<String> {
    keys.iter()
        .filter(|key| key.as_str() != prefix)
        .map(|key| {
            if prefix.is_empty() {
                key.clone()
            } else {
                key.strip_prefix(prefix).unwrap_or(key).to_string()
            }
        })
        .collect()
}
