//! SqlSource：从节点树与参数对象构建 BoundSql。

use crate::accumulator::Accumulator;
use crate::bound_sql::BoundSql;
use crate::configuration::Configuration;
use crate::context::DynamicContext;
use crate::error::BuildError;
use crate::mapping::ParameterMapping;
use crate::node::SqlNode;
use crate::placeholder;
use crate::string_builder::shrink_whitespace;
use crate::value::{SqlValue, ValueMap};
use std::sync::Arc;
use tracing::debug;

pub trait SqlSource: Send + Sync {
    fn bound_sql<'p>(&self, parameter: &'p SqlValue) -> Result<BoundSql<'p>, BuildError>;
}

/// 对 `root` 做一次完整求值：节点遍历 → 可选空白压缩 → `#{}` 提取。
pub fn build_bound_sql<'p>(
    root: &SqlNode,
    parameter: &'p SqlValue,
    config: &Configuration,
) -> Result<BoundSql<'p>, BuildError> {
    let mut ctx = DynamicContext::new(config, parameter);
    let mut acc = Accumulator::new();
    root.apply(&mut ctx, &mut acc)?;

    let (sql, mappings) = parse_sql(&acc.into_sql(), config)?;
    debug!(
        sql_len = sql.len(),
        mappings = mappings.len(),
        flavor = %config.flavor,
        "dynamic sql bound"
    );
    Ok(BoundSql::new(sql, mappings, parameter, ctx.into_bindings()))
}

fn parse_sql(sql: &str, config: &Configuration) -> Result<(String, Vec<ParameterMapping>), BuildError> {
    if config.shrink_whitespaces_in_sql {
        placeholder::extract(&shrink_whitespace(sql), config)
    } else {
        placeholder::extract(sql, config)
    }
}

/// 每次调用都重新求值节点树。
#[derive(Debug, Clone)]
pub struct DynamicSqlSource {
    config: Arc<Configuration>,
    root: SqlNode,
}

impl DynamicSqlSource {
    pub fn new(config: impl Into<Arc<Configuration>>, root: SqlNode) -> Self {
        Self {
            config: config.into(),
            root,
        }
    }

    pub fn root(&self) -> &SqlNode {
        &self.root
    }
}

impl SqlSource for DynamicSqlSource {
    fn bound_sql<'p>(&self, parameter: &'p SqlValue) -> Result<BoundSql<'p>, BuildError> {
        build_bound_sql(&self.root, parameter, &self.config)
    }
}

/// 不含动态内容的节点树：构建时解析一次，之后每次调用复用 SQL 与映射。
#[derive(Debug, Clone, PartialEq)]
pub struct RawSqlSource {
    sql: String,
    parameter_mappings: Vec<ParameterMapping>,
}

impl RawSqlSource {
    pub fn new(root: &SqlNode, config: &Configuration) -> Result<Self, BuildError> {
        let parameter = SqlValue::Null;
        let mut ctx = DynamicContext::new(config, &parameter);
        let mut acc = Accumulator::new();
        root.apply(&mut ctx, &mut acc)?;
        let (sql, parameter_mappings) = parse_sql(&acc.into_sql(), config)?;
        Ok(Self {
            sql,
            parameter_mappings,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl SqlSource for RawSqlSource {
    fn bound_sql<'p>(&self, parameter: &'p SqlValue) -> Result<BoundSql<'p>, BuildError> {
        Ok(BoundSql::new(
            self.sql.clone(),
            self.parameter_mappings.clone(),
            parameter,
            ValueMap::new(),
        ))
    }
}

/// 按节点树是否动态选择 `DynamicSqlSource` 或 `RawSqlSource`。
pub fn create_sql_source(
    config: impl Into<Arc<Configuration>>,
    root: SqlNode,
) -> Result<Box<dyn SqlSource>, BuildError> {
    let config = config.into();
    if root.is_dynamic(&config) {
        return Ok(Box::new(DynamicSqlSource::new(config, root)));
    }
    Ok(Box::new(RawSqlSource::new(&root, &config)?))
}
