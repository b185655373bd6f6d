//! SqlNode：动态 SQL 模板树。
//!
//! 节点树构建一次后只读，可在多个线程上并发求值；每次求值使用独立的
//! `DynamicContext` 与累加器。

use crate::accumulator::SqlAccumulator;
use crate::configuration::Configuration;
use crate::context::DynamicContext;
use crate::error::{BuildError, NodeKind};
use crate::foreach::ForEachNode;
use crate::token_parser::TokenHandler;
use crate::trim::TrimNode;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    /// 文本片段，可包含 `${}` 插值与 `#{}` 占位符。
    Text(String),
    /// 按顺序全部求值。
    Mixed(Vec<SqlNode>),
    If {
        test: String,
        child: Box<SqlNode>,
    },
    /// 第一个为真的 `when` 生效；都不为真时执行 `otherwise`。
    Choose {
        whens: Vec<(String, SqlNode)>,
        otherwise: Option<Box<SqlNode>>,
    },
    /// trim / where / set
    Trim(TrimNode),
    ForEach(ForEachNode),
    /// 求值 `expression` 并绑定到当前作用域的 `name`。
    Bind { name: String, expression: String },
}

impl SqlNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn mixed(children: impl IntoIterator<Item = SqlNode>) -> Self {
        Self::Mixed(children.into_iter().collect())
    }

    pub fn if_(test: impl Into<String>, child: SqlNode) -> Self {
        Self::If {
            test: test.into(),
            child: Box::new(child),
        }
    }

    pub fn choose<S: Into<String>>(
        whens: impl IntoIterator<Item = (S, SqlNode)>,
        otherwise: Option<SqlNode>,
    ) -> Self {
        Self::Choose {
            whens: whens.into_iter().map(|(t, n)| (t.into(), n)).collect(),
            otherwise: otherwise.map(Box::new),
        }
    }

    pub fn where_(child: SqlNode) -> Self {
        Self::Trim(TrimNode::where_clause(child))
    }

    pub fn set(child: SqlNode) -> Self {
        Self::Trim(TrimNode::set_clause(child))
    }

    pub fn trim(node: TrimNode) -> Self {
        Self::Trim(node)
    }

    pub fn foreach(node: ForEachNode) -> Self {
        Self::ForEach(node)
    }

    pub fn bind(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Bind {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// 是否需要按参数逐次求值；纯静态文本可以在构建时一次性解析。
    pub fn is_dynamic(&self, config: &Configuration) -> bool {
        match self {
            Self::Text(text) => config.interpolation.parser().has_token(text),
            Self::Mixed(children) => children.iter().any(|c| c.is_dynamic(config)),
            _ => true,
        }
    }

    /// 把节点输出写入 `out`；返回值表示节点是否“命中”（if 条件成立等）。
    pub fn apply(&self, ctx: &mut DynamicContext<'_>, out: &mut dyn SqlAccumulator) -> Result<bool, BuildError> {
        match self {
            Self::Text(text) => {
                apply_text(text, ctx, out)?;
                Ok(true)
            }
            Self::Mixed(children) => {
                for child in children {
                    child.apply(ctx, out)?;
                }
                Ok(true)
            }
            Self::If { test, child } => {
                if test_passes(NodeKind::If, test, ctx)? {
                    child.apply(ctx, out)?;
                    return Ok(true);
                }
                Ok(false)
            }
            Self::Choose { whens, otherwise } => {
                for (test, child) in whens {
                    if test_passes(NodeKind::When, test, ctx)? {
                        child.apply(ctx, out)?;
                        return Ok(true);
                    }
                }
                match otherwise {
                    Some(child) => {
                        child.apply(ctx, out)?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            Self::Trim(trim) => trim.apply(ctx, out),
            Self::ForEach(foreach) => foreach.apply(ctx, out),
            Self::Bind { name, expression } => {
                let value = ctx
                    .config()
                    .evaluator()
                    .evaluate(expression, &*ctx)
                    .map_err(|e| BuildError::expression(NodeKind::Bind, expression, e))?;
                ctx.bind_variable(name, value);
                Ok(true)
            }
        }
    }
}

fn test_passes(node: NodeKind, test: &str, ctx: &DynamicContext<'_>) -> Result<bool, BuildError> {
    ctx.config()
        .evaluator()
        .evaluate_boolean(test, ctx)
        .map_err(|e| BuildError::expression(node, test, e))
}

fn apply_text(text: &str, ctx: &DynamicContext<'_>, out: &mut dyn SqlAccumulator) -> Result<(), BuildError> {
    let parser = ctx.config().interpolation.parser();
    if !parser.has_token(text) {
        out.append_sql(text);
        return Ok(());
    }
    let sql = parser.parse(text, &mut Interpolator { ctx })?;
    out.append_sql(&sql);
    Ok(())
}

/// `${expr}` => 求值结果的文本；Null 为空串。
struct Interpolator<'c, 'a> {
    ctx: &'c DynamicContext<'a>,
}

impl TokenHandler for Interpolator<'_, '_> {
    type Error = BuildError;

    fn handle_token(&mut self, content: &str) -> Result<String, BuildError> {
        let config = self.ctx.config();
        let value = config
            .evaluator()
            .evaluate(content, self.ctx)
            .map_err(|e| BuildError::expression(NodeKind::Text, content, e))?;
        let text = value.to_sql_text();
        if let Some(filter) = config.injection_filter()
            && !filter(text.as_str())
        {
            return Err(BuildError::InjectionRejected {
                expression: content.to_string(),
                value: text,
            });
        }
        Ok(text)
    }
}
