//! 运行时参数值：参数对象、集合、映射与标量统一表示为 `SqlValue`。

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use time::format_description::FormatItem;
use time::macros::format_description;

/// 有序映射：结构化参数对象与 map 参数共用。
pub type ValueMap = BTreeMap<String, SqlValue>;

const DATETIME_FORMAT: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
);

/// 参数值。
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(Cow<'static, str>),
    Bytes(Vec<u8>),
    DateTime(SqlDateTime),
    List(Vec<SqlValue>),
    /// 结构化对象或 name/value 映射。
    Map(ValueMap),
}

/// 带可选时区缩写的时间值。
#[derive(Debug, Clone, PartialEq)]
pub struct SqlDateTime {
    pub dt: time::OffsetDateTime,
    pub tz_abbr: Option<Cow<'static, str>>,
}

impl SqlDateTime {
    pub fn new(dt: time::OffsetDateTime) -> Self {
        Self { dt, tz_abbr: None }
    }

    pub fn with_tz_abbr(mut self, abbr: impl Into<Cow<'static, str>>) -> Self {
        self.tz_abbr = Some(abbr.into());
        self
    }
}

impl SqlValue {
    /// 将 `Option<T>` 映射为 `SqlValue`：`None => Null`，`Some(v) => v.into()`。
    pub fn from_option<T: Into<SqlValue>>(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }

    /// 二进制值（`Vec<u8>` 的 `From` 被留给列表）。
    pub fn bytes(v: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(v.into())
    }

    /// 把任意可迭代值收集成 `List`。
    pub fn list<T: Into<SqlValue>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 标量：非 Null、非集合、非映射。
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Null | Self::List(_) | Self::Map(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::I64(_) | Self::U64(_) | Self::F64(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::I64(n) => Some(*n as f64),
            Self::U64(n) => Some(*n as f64),
            Self::F64(n) => Some(*n),
            _ => None,
        }
    }

    /// 整数视图；U64 超出 i64 时返回 None。
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(n) => Some(*n),
            Self::U64(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SqlValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// 取属性：Map 按 key 取值，其余类型没有属性。
    pub fn property(&self, name: &str) -> Option<&SqlValue> {
        self.as_map().and_then(|m| m.get(name))
    }

    /// `[key]` 访问：List 按下标，Map 按 key。
    pub fn index(&self, key: &str) -> Option<&SqlValue> {
        match self {
            Self::List(items) => key.trim().parse::<usize>().ok().and_then(|i| items.get(i)),
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// `${}` 插值使用的文本形式：Null 渲染为空串。
    pub fn to_sql_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// 类型名（用于错误信息）。
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I64(_) | Self::U64(_) => "integer",
            Self::F64(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::I64(n) => write!(f, "{n}"),
            Self::U64(n) => write!(f, "{n}"),
            // 整数值的浮点保留 `.0`，避免与整数混淆
            Self::F64(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{n:.1}"),
            Self::F64(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Self::DateTime(v) => {
                let s = v.dt.format(DATETIME_FORMAT).map_err(|_| fmt::Error)?;
                f.write_str(&s)?;
                if let Some(abbr) = &v.tz_abbr {
                    write!(f, " {abbr}")?;
                }
                Ok(())
            }
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<()> for SqlValue {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! from_signed {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                Self::I64(v as i64)
            }
        })+
    };
}

macro_rules! from_unsigned {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                Self::U64(v as u64)
            }
        })+
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::F64(v as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::String(Cow::Owned(v))
    }
}

impl From<&'static str> for SqlValue {
    fn from(v: &'static str) -> Self {
        Self::String(Cow::Borrowed(v))
    }
}

impl From<time::OffsetDateTime> for SqlValue {
    fn from(v: time::OffsetDateTime) -> Self {
        Self::DateTime(SqlDateTime::new(v))
    }
}

impl From<SqlDateTime> for SqlValue {
    fn from(v: SqlDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        Self::from_option(v)
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for SqlValue {
    fn from(v: Vec<T>) -> Self {
        Self::list(v)
    }
}

impl<T: Into<SqlValue>, const N: usize> From<[T; N]> for SqlValue {
    fn from(v: [T; N]) -> Self {
        Self::list(v)
    }
}

impl<T: Into<SqlValue>> From<BTreeMap<String, T>> for SqlValue {
    fn from(v: BTreeMap<String, T>) -> Self {
        Self::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<SqlValue>> From<HashMap<String, T>> for SqlValue {
    fn from(v: HashMap<String, T>) -> Self {
        Self::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{SqlDateTime, SqlValue};
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    #[test]
    fn from_option_none() {
        assert_eq!(SqlValue::from_option::<i64>(None), SqlValue::Null);
    }

    #[test]
    fn from_vec_is_list() {
        let v: SqlValue = vec!["one", "two"].into();
        assert_eq!(v, SqlValue::List(vec!["one".into(), "two".into()]));
    }

    #[test]
    fn sql_text_of_null_is_empty() {
        assert_eq!(SqlValue::Null.to_sql_text(), "");
        assert_eq!(SqlValue::I64(3).to_sql_text(), "3");
        assert_eq!(SqlValue::F64(2.0).to_sql_text(), "2.0");
        assert_eq!(SqlValue::F64(2.5).to_sql_text(), "2.5");
    }

    #[test]
    fn display_nested_values() {
        let v = SqlValue::list([SqlValue::from(1), SqlValue::list(["a", "b"])]);
        assert_eq!(v.to_string(), "[1, [a, b]]");
    }

    #[test]
    fn display_datetime_with_abbr() {
        let dt = SqlDateTime::new(datetime!(2024-03-01 08:30:00 UTC)).with_tz_abbr("UTC");
        assert_eq!(
            SqlValue::from(dt).to_string(),
            "2024-03-01 08:30:00.000000 UTC"
        );
    }

    #[test]
    fn index_on_list_and_map() {
        let list = SqlValue::list([10, 20]);
        assert_eq!(list.index("1"), Some(&SqlValue::I64(20)));
        assert_eq!(list.index("9"), None);

        let mut map = super::ValueMap::new();
        map.insert("k".to_string(), SqlValue::from("v"));
        let map = SqlValue::Map(map);
        assert_eq!(map.index("k"), Some(&SqlValue::from("v")));
        assert_eq!(map.property("k"), Some(&SqlValue::from("v")));
    }
}
