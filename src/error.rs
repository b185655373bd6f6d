//! 构建错误。

use crate::evaluator::EvalError;
use std::fmt;

/// 触发表达式求值的节点种类，用于定位模板中的出错位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    If,
    When,
    ForEach,
    Bind,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::If => "if",
            Self::When => "when",
            Self::ForEach => "foreach",
            Self::Bind => "bind",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("dynamic sql <{node}> failed to evaluate `{expression}`: {source}")]
    Expression {
        node: NodeKind,
        expression: String,
        source: EvalError,
    },
    #[error("dynamic sql malformed placeholder `{content}`: {reason}")]
    MalformedPlaceholder { content: String, reason: String },
    #[error("dynamic sql unknown type handler `{handler}` in placeholder `{content}`")]
    UnresolvedTypeHandler { content: String, handler: String },
    #[error("dynamic sql <foreach> collection `{expression}` is not iterable (found {found})")]
    NotIterable {
        expression: String,
        found: &'static str,
    },
    #[error("dynamic sql <foreach> collection `{expression}` evaluated to null")]
    NullCollection { expression: String },
    #[error("dynamic sql value of `{expression}` rejected by injection filter: {value}")]
    InjectionRejected { expression: String, value: String },
}

impl BuildError {
    pub(crate) fn expression(node: NodeKind, expression: &str, source: EvalError) -> Self {
        Self::Expression {
            node,
            expression: expression.to_string(),
            source,
        }
    }

    pub(crate) fn malformed(content: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPlaceholder {
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}
