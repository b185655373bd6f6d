//! 类型处理器注册表：只做 名字 → 处理器标识 的查找，用于校验 `typeHandler=` 覆盖。

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// 处理器标识（不透明，由执行层解释）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHandlerId(Cow<'static, str>);

impl TypeHandlerId {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeHandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const BUILTIN_HANDLERS: &[&str] = &[
    "StringTypeHandler",
    "BooleanTypeHandler",
    "IntegerTypeHandler",
    "LongTypeHandler",
    "DoubleTypeHandler",
    "DecimalTypeHandler",
    "BytesTypeHandler",
    "DateTimeTypeHandler",
    "EnumTypeHandler",
    "ObjectTypeHandler",
];

#[derive(Debug, Clone)]
pub struct TypeHandlerRegistry {
    handlers: HashMap<String, TypeHandlerId>,
}

impl Default for TypeHandlerRegistry {
    fn default() -> Self {
        let mut r = Self::empty();
        for &name in BUILTIN_HANDLERS {
            r.register(name, TypeHandlerId::new(name));
        }
        r
    }
}

impl TypeHandlerRegistry {
    /// 预置内置处理器名的注册表。
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// 注册（或覆盖）一个别名，返回旧值。
    pub fn register(&mut self, alias: impl Into<String>, id: TypeHandlerId) -> Option<TypeHandlerId> {
        self.handlers.insert(alias.into(), id)
    }

    pub fn resolve(&self, alias: &str) -> Option<&TypeHandlerId> {
        self.handlers.get(alias.trim())
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.resolve(alias).is_some()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{TypeHandlerId, TypeHandlerRegistry};
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_and_custom_aliases() {
        let mut r = TypeHandlerRegistry::new();
        assert!(r.contains("StringTypeHandler"));
        assert!(!r.contains("MoneyTypeHandler"));

        r.register("money", TypeHandlerId::new("com.acme.MoneyTypeHandler"));
        assert_eq!(
            r.resolve("money").map(TypeHandlerId::as_str),
            Some("com.acme.MoneyTypeHandler")
        );
        assert!(TypeHandlerRegistry::empty().is_empty());
    }
}
