//! halo-dynamic-sql：动态 SQL 模板求值与参数映射引擎。
//!
//! 节点树（text / if / choose / trim / where / set / foreach / bind）在配置阶段构建一次，
//! 每次调用按参数对象求值，得到最终 SQL 与按顺序排列的参数映射。

pub mod accumulator;
pub mod bound_sql;
pub mod configuration;
pub mod context;
#[cfg(test)]
mod context_tests;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod flavor;
pub mod foreach;
pub mod macros;
#[cfg(test)]
mod macros_tests;
pub mod mapping;
pub mod node;
#[cfg(test)]
mod node_tests;
pub mod placeholder;
#[cfg(test)]
mod placeholder_tests;
pub mod property;
pub mod sql_source;
mod string_builder;
pub mod structs;
mod token_parser;
#[cfg(test)]
mod token_parser_tests;
pub mod trim;
pub mod type_handler;
pub mod value;

pub use crate::accumulator::{Accumulator, SqlAccumulator};
pub use crate::bound_sql::BoundSql;
pub use crate::configuration::{Configuration, InjectionFilter, TokenSyntax};
pub use crate::context::{DATABASE_ID_KEY, DynamicContext, ITEM_PREFIX, PARAMETER_OBJECT_KEY};
pub use crate::error::{BuildError, NodeKind};
pub use crate::evaluator::{DefaultEvaluator, EvalError, ExpressionEvaluator, Scope, truthy};
pub use crate::flavor::Flavor;
pub use crate::foreach::ForEachNode;
pub use crate::mapping::{JdbcType, ParameterMapping, ParameterMode};
pub use crate::node::SqlNode;
pub use crate::placeholder::ParameterExpression;
pub use crate::sql_source::{
    DynamicSqlSource, RawSqlSource, SqlSource, build_bound_sql, create_sql_source,
};
pub use crate::structs::ParamObject;
pub use crate::trim::TrimNode;
pub use crate::type_handler::{TypeHandlerId, TypeHandlerRegistry};
pub use crate::value::{SqlDateTime, SqlValue, ValueMap};

/// 便捷命名空间：允许 `use halo_dynsql::dynsql::{...}` 形式导入。
pub mod dynsql {
    pub use crate::*;
}
