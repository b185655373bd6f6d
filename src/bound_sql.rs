//! BoundSql：一次构建的不可变结果。

use crate::mapping::ParameterMapping;
use crate::property::{PathSegment, resolve_path, resolve_segments, root_name, split_path};
use crate::value::{SqlValue, ValueMap};

/// 最终 SQL、按顺序排列的参数映射，以及取值所需的参数对象与附加参数。
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSql<'p> {
    sql: String,
    parameter_mappings: Vec<ParameterMapping>,
    parameter_object: &'p SqlValue,
    additional_parameters: ValueMap,
}

impl<'p> BoundSql<'p> {
    pub fn new(
        sql: String,
        parameter_mappings: Vec<ParameterMapping>,
        parameter_object: &'p SqlValue,
        additional_parameters: ValueMap,
    ) -> Self {
        Self {
            sql,
            parameter_mappings,
            parameter_object,
            additional_parameters,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameter_mappings(&self) -> &[ParameterMapping] {
        &self.parameter_mappings
    }

    pub fn parameter_object(&self) -> &'p SqlValue {
        self.parameter_object
    }

    /// `_parameter`、`_databaseId`、`<bind>` 以及 foreach 生成的 `__frch_*` 绑定。
    pub fn additional_parameters(&self) -> &ValueMap {
        &self.additional_parameters
    }

    /// 按路径首段判断（`__frch_u_0.id` 看 `__frch_u_0`）。
    pub fn has_additional_parameter(&self, path: &str) -> bool {
        self.additional_parameters.contains_key(root_name(path))
    }

    pub fn additional_parameter(&self, path: &str) -> Option<&SqlValue> {
        let segments = split_path(path);
        let (PathSegment::Field(name), rest) = segments.split_first()? else {
            return None;
        };
        resolve_segments(self.additional_parameters.get(*name)?, rest)
    }

    /// 解析映射的 `property` 对应的值：先查附加参数；标量参数直接返回自身；
    /// 否则按路径访问参数对象。
    pub fn resolve_parameter(&self, property: &str) -> Option<&SqlValue> {
        if self.has_additional_parameter(property) {
            return self.additional_parameter(property);
        }
        match self.parameter_object {
            SqlValue::Null => None,
            SqlValue::List(_) => {
                let segments = split_path(property);
                match segments.split_first()? {
                    (PathSegment::Field("list" | "collection" | "array"), rest) => {
                        resolve_segments(self.parameter_object, rest)
                    }
                    _ => None,
                }
            }
            SqlValue::Map(_) => resolve_path(self.parameter_object, property),
            scalar => Some(scalar),
        }
    }

    /// 按映射顺序解析出全部参数值；无法解析的为 Null。
    pub fn parameter_values(&self) -> Vec<SqlValue> {
        self.parameter_mappings
            .iter()
            .map(|m| {
                self.resolve_parameter(&m.property)
                    .cloned()
                    .unwrap_or(SqlValue::Null)
            })
            .collect()
    }
}
