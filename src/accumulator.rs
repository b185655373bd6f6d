//! SQL 文本累加器：一次遍历中节点输出的去处。
//!
//! 顶层 `Accumulator` 以空格连接各片段；trim 与 foreach 通过包装器改写经过的文本。

use crate::string_builder::StringBuilder;
use crate::token_parser::TokenParser;

/// 节点输出的接收端。
pub trait SqlAccumulator {
    fn append_sql(&mut self, sql: &str);
}

/// 顶层累加器：片段之间以单个空格连接，结束时去掉首尾空白。
#[derive(Debug, Default)]
pub struct Accumulator {
    sb: StringBuilder,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            sb: StringBuilder::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        self.sb.as_str()
    }

    pub fn into_sql(self) -> String {
        self.sb.into_string().trim().to_string()
    }
}

impl SqlAccumulator for Accumulator {
    fn append_sql(&mut self, sql: &str) {
        self.sb.write_segment(sql);
    }
}

/// trim 节点的私有缓冲：片段直接拼接。
#[derive(Debug, Default)]
pub(crate) struct TrimBuffer {
    sb: StringBuilder,
}

impl TrimBuffer {
    pub(crate) fn into_string(self) -> String {
        self.sb.into_string()
    }
}

impl SqlAccumulator for TrimBuffer {
    fn append_sql(&mut self, sql: &str) {
        self.sb.write_str(sql);
    }
}

/// 在第一次出现非空白输出之前写入一次 `prefix`（foreach 的分隔符）。
pub(crate) struct PrefixedSink<'a> {
    delegate: &'a mut dyn SqlAccumulator,
    prefix: &'a str,
    applied: bool,
}

impl<'a> PrefixedSink<'a> {
    pub(crate) fn new(delegate: &'a mut dyn SqlAccumulator, prefix: &'a str) -> Self {
        Self {
            delegate,
            prefix,
            applied: false,
        }
    }

    pub(crate) fn is_prefix_applied(&self) -> bool {
        self.applied
    }
}

impl SqlAccumulator for PrefixedSink<'_> {
    fn append_sql(&mut self, sql: &str) {
        if !self.applied && !sql.trim().is_empty() {
            self.delegate.append_sql(self.prefix);
            self.applied = true;
        }
        self.delegate.append_sql(sql);
    }
}

/// foreach 单次迭代的输出：按原样保存各片段，迭代结束后再改写并转发。
#[derive(Debug, Default)]
pub(crate) struct SegmentBuffer {
    segments: Vec<String>,
}

impl SegmentBuffer {
    pub(crate) fn replay(self, out: &mut dyn SqlAccumulator) {
        for segment in &self.segments {
            out.append_sql(segment);
        }
    }
}

impl SqlAccumulator for SegmentBuffer {
    fn append_sql(&mut self, sql: &str) {
        self.segments.push(sql.to_string());
    }
}

/// 把占位符中的迭代变量改写为 `__frch_<name>_<n>`。
pub(crate) struct ItemRenamingSink<'a> {
    delegate: &'a mut dyn SqlAccumulator,
    parser: TokenParser<'a>,
    open: &'a str,
    close: &'a str,
    renames: Vec<(&'a str, &'a str)>,
}

impl<'a> ItemRenamingSink<'a> {
    /// `renames` 为 `(变量名, 合成名)`，按顺序取第一个命中的。
    pub(crate) fn new(
        delegate: &'a mut dyn SqlAccumulator,
        open: &'a str,
        close: &'a str,
        renames: Vec<(&'a str, &'a str)>,
    ) -> Self {
        Self {
            delegate,
            parser: TokenParser::new(open, close),
            open,
            close,
            renames,
        }
    }

    fn rename(&self, content: &str) -> String {
        let renamed = self
            .renames
            .iter()
            .find_map(|(name, synthetic)| rename_leading_name(content, name, synthetic))
            .unwrap_or_else(|| content.to_string());
        format!("{}{renamed}{}", self.open, self.close)
    }
}

impl SqlAccumulator for ItemRenamingSink<'_> {
    fn append_sql(&mut self, sql: &str) {
        let rewritten = self.parser.replace(sql, |content| self.rename(content));
        self.delegate.append_sql(&rewritten);
    }
}

/// 内容以（可带前导空白的）`name` 开头，且其后为结尾、`.`、`,`、`:` 或空白时，
/// 把这一段（含前导空白）替换为 `synthetic`。
pub(crate) fn rename_leading_name(content: &str, name: &str, synthetic: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let rest = content.trim_start().strip_prefix(name)?;
    match rest.chars().next() {
        None => {}
        Some(c) if matches!(c, '.' | ',' | ':') || c.is_whitespace() => {}
        Some(_) => return None,
    }
    Some(format!("{synthetic}{rest}"))
}

#[cfg(test)]
mod tests {
    use super::{Accumulator, PrefixedSink, SqlAccumulator, rename_leading_name};
    use pretty_assertions::assert_eq;

    #[test]
    fn rename_requires_whole_name() {
        assert_eq!(
            rename_leading_name(" u,typeHandler=X", "u", "__frch_u_0").as_deref(),
            Some("__frch_u_0,typeHandler=X")
        );
        assert_eq!(
            rename_leading_name("u.id", "u", "__frch_u_0").as_deref(),
            Some("__frch_u_0.id")
        );
        assert_eq!(
            rename_leading_name("u:VARCHAR", "u", "__frch_u_0").as_deref(),
            Some("__frch_u_0:VARCHAR")
        );
        assert_eq!(rename_leading_name("uuu.u", "u", "__frch_u_0"), None);
        assert_eq!(rename_leading_name("item[0]", "item", "__frch_item_0"), None);
    }

    #[test]
    fn prefix_written_once_before_non_blank_output() {
        let mut acc = Accumulator::new();
        {
            let mut sink = PrefixedSink::new(&mut acc, ",");
            sink.append_sql("  ");
            assert!(!sink.is_prefix_applied());
            sink.append_sql("a");
            sink.append_sql("b");
            assert!(sink.is_prefix_applied());
        }
        assert_eq!(acc.into_sql(), ", a b");
    }
}
