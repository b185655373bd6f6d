//! ParameterMapping：占位符与参数属性之间的映射元数据。

use crate::type_handler::TypeHandlerId;
use std::fmt;
use std::str::FromStr;

/// 参数方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterMode {
    #[default]
    In,
    Out,
    InOut,
}

impl FromStr for ParameterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            "INOUT" => Ok(Self::InOut),
            other => Err(format!("unknown parameter mode `{other}`")),
        }
    }
}

macro_rules! jdbc_types {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// 驱动层类型提示。
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum JdbcType {
            $($variant,)+
        }

        impl JdbcType {
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for JdbcType {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(format!("unknown jdbcType `{other}`")),
                }
            }
        }
    };
}

jdbc_types! {
    Array => "ARRAY",
    Bit => "BIT",
    TinyInt => "TINYINT",
    SmallInt => "SMALLINT",
    Integer => "INTEGER",
    BigInt => "BIGINT",
    Float => "FLOAT",
    Real => "REAL",
    Double => "DOUBLE",
    Numeric => "NUMERIC",
    Decimal => "DECIMAL",
    Char => "CHAR",
    VarChar => "VARCHAR",
    LongVarChar => "LONGVARCHAR",
    Date => "DATE",
    Time => "TIME",
    Timestamp => "TIMESTAMP",
    Binary => "BINARY",
    VarBinary => "VARBINARY",
    LongVarBinary => "LONGVARBINARY",
    Null => "NULL",
    Other => "OTHER",
    Blob => "BLOB",
    Clob => "CLOB",
    Boolean => "BOOLEAN",
    Cursor => "CURSOR",
    Undefined => "UNDEFINED",
    NVarChar => "NVARCHAR",
    NChar => "NCHAR",
    NClob => "NCLOB",
    Struct => "STRUCT",
    JavaObject => "JAVA_OBJECT",
    Distinct => "DISTINCT",
    Ref => "REF",
    DataLink => "DATALINK",
    RowId => "ROWID",
    LongNVarChar => "LONGNVARCHAR",
    SqlXml => "SQLXML",
    DateTimeOffset => "DATETIMEOFFSET",
    TimeWithTimezone => "TIME_WITH_TIMEZONE",
    TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
}

impl fmt::Display for JdbcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一个 `#{...}` 占位符对应的映射；`position` 为其在 SQL 中的序号（从 0 开始）。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterMapping {
    pub property: String,
    pub mode: ParameterMode,
    pub java_type: Option<String>,
    pub jdbc_type: Option<JdbcType>,
    pub jdbc_type_name: Option<String>,
    pub numeric_scale: Option<u32>,
    pub result_map_id: Option<String>,
    pub type_handler: Option<TypeHandlerId>,
    pub position: usize,
}

impl ParameterMapping {
    pub fn new(property: impl Into<String>, position: usize) -> Self {
        Self {
            property: property.into(),
            position,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{JdbcType, ParameterMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn jdbc_type_names_are_exact() {
        assert_eq!("VARCHAR".parse::<JdbcType>(), Ok(JdbcType::VarChar));
        assert_eq!(JdbcType::TimestampWithTimezone.to_string(), "TIMESTAMP_WITH_TIMEZONE");
        assert!("varchar".parse::<JdbcType>().is_err());
    }

    #[test]
    fn mode_is_case_insensitive() {
        assert_eq!("inout".parse::<ParameterMode>(), Ok(ParameterMode::InOut));
        assert!("sideways".parse::<ParameterMode>().is_err());
    }
}
