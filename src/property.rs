//! 属性路径：`a.b[0].c` / `m[key]` 形式的嵌套访问。

use crate::value::SqlValue;

/// 路径中的一段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// `.name` 或首段名字
    Field(&'a str),
    /// `[key]`：List 下标或 Map key
    Index(&'a str),
}

/// 把属性路径切分为段；不做合法性校验，空段会被跳过。
pub fn split_path(path: &str) -> Vec<PathSegment<'_>> {
    let mut out = Vec::new();
    let mut rest = path.trim();
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('[') {
            match stripped.find(']') {
                Some(end) => {
                    out.push(PathSegment::Index(stripped[..end].trim()));
                    rest = &stripped[end + 1..];
                }
                None => {
                    out.push(PathSegment::Index(stripped.trim()));
                    rest = "";
                }
            }
            continue;
        }
        if let Some(stripped) = rest.strip_prefix('.') {
            rest = stripped;
            continue;
        }
        let end = rest.find(['.', '[']).unwrap_or(rest.len());
        let name = rest[..end].trim();
        if !name.is_empty() {
            out.push(PathSegment::Field(name));
        }
        rest = &rest[end..];
    }
    out
}

/// 路径首段名字（`a.b[0]` => `a`）。
pub fn root_name(path: &str) -> &str {
    let path = path.trim();
    let end = path.find(['.', '[']).unwrap_or(path.len());
    &path[..end]
}

/// 从 `root` 出发按段依次取值；中途遇到缺失或 Null 返回 None。
pub fn resolve_segments<'v>(root: &'v SqlValue, segments: &[PathSegment<'_>]) -> Option<&'v SqlValue> {
    let mut current = root;
    for seg in segments {
        current = match seg {
            PathSegment::Field(name) => current.property(name)?,
            PathSegment::Index(key) => current.index(key)?,
        };
    }
    Some(current)
}

/// 解析完整路径（首段也作为 `root` 的属性）。
pub fn resolve_path<'v>(root: &'v SqlValue, path: &str) -> Option<&'v SqlValue> {
    resolve_segments(root, &split_path(path))
}
