//! Configuration：每次构建时显式传入的只读配置快照。

use crate::evaluator::{DefaultEvaluator, ExpressionEvaluator};
use crate::flavor::Flavor;
use crate::token_parser::TokenParser;
use crate::type_handler::TypeHandlerRegistry;
use std::fmt;
use std::sync::Arc;

/// `${}` 插值结果的校验函数：返回 false 表示拒绝该值。
pub type InjectionFilter = Arc<dyn Fn(&str) -> bool + Send + Sync + 'static>;

/// 一对起止 token。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSyntax {
    pub open: String,
    pub close: String,
}

impl TokenSyntax {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// 参数占位符 `#{...}`。
    pub fn placeholder() -> Self {
        Self::new("#{", "}")
    }

    /// 文本插值 `${...}`。
    pub fn interpolation() -> Self {
        Self::new("${", "}")
    }

    pub(crate) fn parser(&self) -> TokenParser<'_> {
        TokenParser::new(&self.open, &self.close)
    }
}

#[derive(Clone)]
pub struct Configuration {
    /// 位置占位符的写法。
    pub flavor: Flavor,
    pub placeholder: TokenSyntax,
    pub interpolation: TokenSyntax,
    /// 提取占位符前把连续空白压缩为一个空格。
    pub shrink_whitespaces_in_sql: bool,
    /// foreach 的集合为 null 时按空集合处理（节点上的设置优先）。
    pub nullable_on_for_each: bool,
    /// 绑定为 `_databaseId`。
    pub database_id: Option<String>,
    evaluator: Box<dyn ExpressionEvaluator>,
    type_handlers: TypeHandlerRegistry,
    injection_filter: Option<InjectionFilter>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            flavor: Flavor::default(),
            placeholder: TokenSyntax::placeholder(),
            interpolation: TokenSyntax::interpolation(),
            shrink_whitespaces_in_sql: false,
            nullable_on_for_each: false,
            database_id: None,
            evaluator: Box::new(DefaultEvaluator::new()),
            type_handlers: TypeHandlerRegistry::default(),
            injection_filter: None,
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn with_placeholder(mut self, syntax: TokenSyntax) -> Self {
        self.placeholder = syntax;
        self
    }

    pub fn with_interpolation(mut self, syntax: TokenSyntax) -> Self {
        self.interpolation = syntax;
        self
    }

    pub fn with_shrink_whitespaces(mut self, shrink: bool) -> Self {
        self.shrink_whitespaces_in_sql = shrink;
        self
    }

    pub fn with_nullable_on_for_each(mut self, nullable: bool) -> Self {
        self.nullable_on_for_each = nullable;
        self
    }

    pub fn with_database_id(mut self, id: impl Into<String>) -> Self {
        self.database_id = Some(id.into());
        self
    }

    pub fn with_evaluator(mut self, evaluator: impl ExpressionEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_type_handlers(mut self, registry: TypeHandlerRegistry) -> Self {
        self.type_handlers = registry;
        self
    }

    pub fn with_injection_filter(mut self, filter: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.injection_filter = Some(Arc::new(filter));
        self
    }

    pub fn evaluator(&self) -> &dyn ExpressionEvaluator {
        self.evaluator.as_ref()
    }

    pub fn type_handlers(&self) -> &TypeHandlerRegistry {
        &self.type_handlers
    }

    pub fn type_handlers_mut(&mut self) -> &mut TypeHandlerRegistry {
        &mut self.type_handlers
    }

    pub fn injection_filter(&self) -> Option<&InjectionFilter> {
        self.injection_filter.as_ref()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("flavor", &self.flavor)
            .field("placeholder", &self.placeholder)
            .field("interpolation", &self.interpolation)
            .field("shrink_whitespaces_in_sql", &self.shrink_whitespaces_in_sql)
            .field("nullable_on_for_each", &self.nullable_on_for_each)
            .field("database_id", &self.database_id)
            .field("evaluator", &self.evaluator)
            .field("type_handlers", &self.type_handlers.len())
            .field("injection_filter", &self.injection_filter.is_some())
            .finish()
    }
}
