//! ForEachNode：遍历集合，逐个元素展开子节点。
//!
//! 每次迭代把 `item` / `index` 绑定到新的子作用域，同时在全局作用域绑定
//! `__frch_<name>_<n>`，并把子节点输出中引用迭代变量的 `#{}` 改写为该合成名，
//! 使每个占位符都能在 BoundSql 的附加参数里找到对应元素。迭代内 `<bind>` 的变量同样改写。

use crate::accumulator::{ItemRenamingSink, PrefixedSink, SegmentBuffer, SqlAccumulator};
use crate::context::{DynamicContext, itemize};
use crate::error::{BuildError, NodeKind};
use crate::node::SqlNode;
use crate::value::SqlValue;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachNode {
    collection: String,
    child: Box<SqlNode>,
    item: Option<String>,
    index: Option<String>,
    open: Option<String>,
    close: Option<String>,
    separator: Option<String>,
    nullable: Option<bool>,
}

impl ForEachNode {
    /// `collection` 是求值为 List / Map 的表达式。
    pub fn new(collection: impl Into<String>, child: SqlNode) -> Self {
        Self {
            collection: collection.into(),
            child: Box::new(child),
            item: None,
            index: None,
            open: None,
            close: None,
            separator: None,
            nullable: None,
        }
    }

    pub fn item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// List 为下标，Map 为 key。
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn open(mut self, open: impl Into<String>) -> Self {
        self.open = Some(open.into());
        self
    }

    pub fn close(mut self, close: impl Into<String>) -> Self {
        self.close = Some(close.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// 集合为 null 时按空集合处理；未设置时使用 `Configuration::nullable_on_for_each`。
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub(crate) fn apply(&self, ctx: &mut DynamicContext<'_>, out: &mut dyn SqlAccumulator) -> Result<bool, BuildError> {
        let config = ctx.config();
        let value = config
            .evaluator()
            .evaluate(&self.collection, &*ctx)
            .map_err(|e| BuildError::expression(NodeKind::ForEach, &self.collection, e))?;

        let entries = match self.entries(value) {
            Ok(entries) => entries,
            Err(None) if self.nullable.unwrap_or(config.nullable_on_for_each) => return Ok(true),
            Err(None) => {
                return Err(BuildError::NullCollection {
                    expression: self.collection.clone(),
                });
            }
            Err(Some(found)) => {
                return Err(BuildError::NotIterable {
                    expression: self.collection.clone(),
                    found,
                });
            }
        };
        if entries.is_empty() {
            return Ok(true);
        }

        let placeholder = &config.placeholder;
        let separator = self.separator.as_deref().unwrap_or("");
        if let Some(open) = &self.open {
            out.append_sql(open);
        }

        let mut first = true;
        for (key, element) in entries {
            let n = ctx.next_unique_number();
            trace!(collection = %self.collection, n, "foreach iteration");

            ctx.begin_iteration(n);
            let index_name = self.index.as_deref().map(|name| {
                ctx.bind(name, key.clone());
                let synthetic = itemize(name, n);
                ctx.bind_global(synthetic.clone(), key);
                (name, synthetic)
            });
            let item_name = self.item.as_deref().map(|name| {
                ctx.bind(name, element.clone());
                let synthetic = itemize(name, n);
                ctx.bind_global(synthetic.clone(), element);
                (name, synthetic)
            });

            let mut segments = SegmentBuffer::default();
            self.child.apply(ctx, &mut segments)?;
            let bound = ctx.end_iteration();

            // <bind> 遮蔽同名的 item / index
            let renames: Vec<(&str, &str)> = bound
                .iter()
                .map(|(name, s)| (name.as_str(), s.as_str()))
                .chain(item_name.as_ref().map(|(name, s)| (*name, s.as_str())))
                .chain(index_name.as_ref().map(|(name, s)| (*name, s.as_str())))
                .collect();
            let prefix = if first { "" } else { separator };
            let mut prefixed = PrefixedSink::new(&mut *out, prefix);
            let mut renaming = ItemRenamingSink::new(&mut prefixed, &placeholder.open, &placeholder.close, renames);
            segments.replay(&mut renaming);
            if first {
                first = !prefixed.is_prefix_applied();
            }
        }

        if let Some(close) = &self.close {
            out.append_sql(close);
        }
        Ok(true)
    }

    /// 展开为 (index, item) 列表；Null 返回 `Err(None)`，不可迭代返回 `Err(Some(类型名))`。
    fn entries(&self, value: SqlValue) -> Result<Vec<(SqlValue, SqlValue)>, Option<&'static str>> {
        match value {
            SqlValue::Null => Err(None),
            SqlValue::List(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (SqlValue::from(i), v))
                .collect()),
            SqlValue::Map(map) => Ok(map.into_iter().map(|(k, v)| (SqlValue::from(k), v)).collect()),
            SqlValue::Bytes(bytes) => Ok(bytes
                .into_iter()
                .enumerate()
                .map(|(i, b)| (SqlValue::from(i), SqlValue::from(b)))
                .collect()),
            other => Err(Some(other.type_name())),
        }
    }
}
