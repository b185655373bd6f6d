//! TrimNode：去掉多余的前缀连接词 / 后缀分隔符，并在内容非空时加上固定前后缀。
//!
//! `<where>` 与 `<set>` 都是预设好的 TrimNode。

use crate::accumulator::{SqlAccumulator, TrimBuffer};
use crate::context::DynamicContext;
use crate::error::BuildError;
use crate::node::SqlNode;

const WHERE_PREFIX_OVERRIDES: &str = "AND |OR |AND\n|OR\n|AND\r|OR\r|AND\t|OR\t";

#[derive(Debug, Clone, PartialEq)]
pub struct TrimNode {
    child: Box<SqlNode>,
    prefix: Option<String>,
    suffix: Option<String>,
    prefix_overrides: Vec<String>,
    suffix_overrides: Vec<String>,
}

impl TrimNode {
    pub fn new(child: SqlNode) -> Self {
        Self {
            child: Box::new(child),
            prefix: None,
            suffix: None,
            prefix_overrides: Vec::new(),
            suffix_overrides: Vec::new(),
        }
    }

    /// `<where>`
    pub fn where_clause(child: SqlNode) -> Self {
        Self::new(child)
            .prefix("WHERE")
            .prefix_overrides(WHERE_PREFIX_OVERRIDES)
    }

    /// `<set>`
    pub fn set_clause(child: SqlNode) -> Self {
        Self::new(child)
            .prefix("SET")
            .prefix_overrides(",")
            .suffix_overrides(",")
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// 以 `|` 分隔的候选前缀，例如 `"AND |OR "`。
    pub fn prefix_overrides(mut self, overrides: &str) -> Self {
        self.prefix_overrides = parse_overrides(overrides);
        self
    }

    /// 以 `|` 分隔的候选后缀。
    pub fn suffix_overrides(mut self, overrides: &str) -> Self {
        self.suffix_overrides = parse_overrides(overrides);
        self
    }

    pub(crate) fn apply(&self, ctx: &mut DynamicContext<'_>, out: &mut dyn SqlAccumulator) -> Result<bool, BuildError> {
        let mut buffer = TrimBuffer::default();
        let matched = self.child.apply(ctx, &mut buffer)?;
        if let Some(sql) = self.wrap(&buffer.into_string()) {
            out.append_sql(&sql);
        }
        Ok(matched)
    }

    /// 对子节点输出做 trim；剩余内容为空白时返回 None。
    pub(crate) fn wrap(&self, content: &str) -> Option<String> {
        let mut body = content.trim();
        if body.is_empty() {
            return None;
        }

        if let Some(o) = self
            .prefix_overrides
            .iter()
            .find(|o| starts_with_ignore_case(body, o) || body.eq_ignore_ascii_case(o.trim()))
        {
            body = &body[o.trim().len()..];
        }
        if let Some(o) = self
            .suffix_overrides
            .iter()
            .find(|o| ends_with_ignore_case(body, o) || ends_with_ignore_case(body, o.trim()))
        {
            body = &body[..body.len() - o.trim().len()];
        }
        if body.trim().is_empty() {
            return None;
        }

        let mut sql = String::with_capacity(body.len() + 16);
        if let Some(prefix) = &self.prefix {
            sql.push_str(prefix);
            sql.push(' ');
        }
        sql.push_str(body);
        if let Some(suffix) = &self.suffix {
            sql.push(' ');
            sql.push_str(suffix);
        }
        Some(sql)
    }
}

fn parse_overrides(overrides: &str) -> Vec<String> {
    overrides
        .split('|')
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_uppercase)
        .collect()
}

fn starts_with_ignore_case(s: &str, pat: &str) -> bool {
    !pat.is_empty()
        && s.len() >= pat.len()
        && s.as_bytes()[..pat.len()].eq_ignore_ascii_case(pat.as_bytes())
}

fn ends_with_ignore_case(s: &str, pat: &str) -> bool {
    !pat.is_empty()
        && s.len() >= pat.len()
        && s.as_bytes()[s.len() - pat.len()..].eq_ignore_ascii_case(pat.as_bytes())
}
