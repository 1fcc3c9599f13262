//! Virtual path helpers
//!
//! Virtual paths are POSIX-style and absolute: `/`, `/<theme>`,
//! `/<theme>/<asset key>`. The first segment names a theme, the rest is the
//! remote asset key.

/// Normalize a front-end path: forward slashes, leading `/`, no empty
/// segments, no trailing `/` except for the root.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim().replace('\\', "/");
    let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Path segments, root yields none
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// First segment (the theme name), empty for the root
pub fn theme_name(path: &str) -> &str {
    path.split('/').find(|s| !s.is_empty()).unwrap_or("")
}

/// Remote asset key: the path with its theme segment stripped
pub fn asset_key(path: &str) -> String {
    segments(path).into_iter().skip(1).collect::<Vec<_>>().join("/")
}

/// Last segment of a path or key
pub fn leaf_name(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("")
}

/// Join a parent virtual path and a child name or key
pub fn join(parent: &str, child: &str) -> String {
    if parent == "/" {
        format!("/{}", child)
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), child)
    }
}

/// Ancestor directories of an asset key, outermost first:
/// `a/b/c.liquid` gives `["a", "a/b"]`.
pub fn key_ancestors(key: &str) -> Vec<String> {
    let parts: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    (1..parts.len()).map(|i| parts[..i].join("/")).collect()
}

/// Directory key containing an asset key, empty for top-level assets
pub fn key_parent(key: &str) -> &str {
    match key.rfind('/') {
        Some(pos) => &key[..pos],
        None => "",
    }
}

/// Theme name with path separators replaced so it stays one segment
pub fn sanitize_theme_name(name: &str) -> String {
    name.replace('/', "-")
}
