//! `#{...}` 占位符解析：把求值后的 SQL 文本中的占位符替换为位置标记，
//! 并按出现顺序生成 `ParameterMapping`。
//!
//! 语法：`#{ property [:JDBCTYPE] [, key=value]* }`。

use crate::configuration::Configuration;
use crate::error::BuildError;
use crate::mapping::{JdbcType, ParameterMapping, ParameterMode};
use crate::token_parser::TokenHandler;

const VALID_KEYS: &str =
    "javaType, jdbcType, mode, numericScale, resultMap, typeHandler, jdbcTypeName, property";

/// 占位符内容的初步切分结果。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterExpression {
    pub property: String,
    pub jdbc_type: Option<String>,
    /// `key=value` 属性，保持书写顺序。
    pub attributes: Vec<(String, String)>,
}

impl ParameterExpression {
    /// 解析占位符内容（不含 `#{` 与 `}`），失败时返回原因。
    pub fn parse(content: &str) -> Result<Self, String> {
        let body = content.trim_start();
        if body.starts_with('(') {
            return Err("expression based parameters are not supported".to_string());
        }

        let end = body.find([',', ':']).unwrap_or(body.len());
        let property = body[..end].trim();
        if property.is_empty() {
            return Err("missing property name".to_string());
        }
        let mut out = Self {
            property: property.to_string(),
            ..Self::default()
        };

        let mut rest = &body[end..];
        if let Some(after) = rest.strip_prefix(':') {
            let end = after.find(',').unwrap_or(after.len());
            let jdbc = after[..end].trim();
            if jdbc.is_empty() {
                return Err("missing jdbc type after `:`".to_string());
            }
            out.jdbc_type = Some(jdbc.to_string());
            rest = &after[end..];
        }

        while let Some(after) = rest.strip_prefix(',') {
            let end = after.find(',').unwrap_or(after.len());
            let option = &after[..end];
            rest = &after[end..];
            if option.trim().is_empty() {
                continue;
            }
            let Some((key, value)) = option.split_once('=') else {
                return Err(format!("missing `=` in option `{}`", option.trim()));
            };
            out.attributes
                .push((key.trim().to_string(), value.trim().to_string()));
        }
        Ok(out)
    }

    /// 转换为 ParameterMapping，并校验各属性及 typeHandler。
    pub fn into_mapping(self, content: &str, position: usize, config: &Configuration) -> Result<ParameterMapping, BuildError> {
        let mut mapping = ParameterMapping::new(self.property, position);
        if let Some(jdbc) = self.jdbc_type {
            mapping.jdbc_type = Some(
                jdbc.parse::<JdbcType>()
                    .map_err(|reason: String| BuildError::malformed(content, reason))?,
            );
        }

        for (key, value) in self.attributes {
            match key.as_str() {
                "javaType" => mapping.java_type = Some(value),
                "jdbcType" => {
                    mapping.jdbc_type = Some(
                        value
                            .parse::<JdbcType>()
                            .map_err(|reason: String| BuildError::malformed(content, reason))?,
                    );
                }
                "mode" => {
                    mapping.mode = value
                        .parse::<ParameterMode>()
                        .map_err(|reason: String| BuildError::malformed(content, reason))?;
                }
                "numericScale" => {
                    mapping.numeric_scale = Some(value.parse::<u32>().map_err(|_| {
                        BuildError::malformed(content, format!("invalid numericScale `{value}`"))
                    })?);
                }
                "resultMap" => mapping.result_map_id = Some(value),
                "typeHandler" => {
                    let id = config.type_handlers().resolve(&value).cloned().ok_or_else(|| {
                        BuildError::UnresolvedTypeHandler {
                            content: content.to_string(),
                            handler: value.clone(),
                        }
                    })?;
                    mapping.type_handler = Some(id);
                }
                "jdbcTypeName" => mapping.jdbc_type_name = Some(value),
                "property" => {}
                other => {
                    return Err(BuildError::malformed(
                        content,
                        format!("invalid property `{other}`, valid properties are {VALID_KEYS}"),
                    ));
                }
            }
        }
        Ok(mapping)
    }
}

struct PlaceholderHandler<'c> {
    config: &'c Configuration,
    mappings: Vec<ParameterMapping>,
}

impl TokenHandler for PlaceholderHandler<'_> {
    type Error = BuildError;

    fn handle_token(&mut self, content: &str) -> Result<String, BuildError> {
        let position = self.mappings.len();
        let mapping = ParameterExpression::parse(content)
            .map_err(|reason| BuildError::malformed(content, reason))?
            .into_mapping(content, position, self.config)?;
        self.mappings.push(mapping);
        Ok(self.config.flavor.marker(position + 1))
    }

    fn handle_unclosed(&mut self, rest: &str) -> Result<String, BuildError> {
        Err(BuildError::malformed(rest, "unclosed placeholder"))
    }
}

/// 扫描一次 SQL 文本，返回替换后的 SQL 与按顺序排列的映射。
pub(crate) fn extract(sql: &str, config: &Configuration) -> Result<(String, Vec<ParameterMapping>), BuildError> {
    let mut handler = PlaceholderHandler {
        config,
        mappings: Vec::new(),
    };
    let sql = config.placeholder.parser().parse(sql, &mut handler)?;
    Ok((sql, handler.mappings))
}
