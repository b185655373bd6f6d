//! 宏集合：快速构造参数对象。
//!
//! - `params! { "id" => 1, "name" => "Steve" }` 生成 `SqlValue::Map`
//! - `impl_param_object!(Blog { id, title as "blogTitle" })` 为业务 struct 实现 `ParamObject`

/// 以 `key => value` 构造 `SqlValue::Map`；value 需实现 `Into<SqlValue>`。
#[macro_export]
macro_rules! params {
    () => {
        $crate::value::SqlValue::Map($crate::value::ValueMap::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::value::ValueMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::value::SqlValue::from($value));
        )+
        $crate::value::SqlValue::Map(map)
    }};
}

/// 为 struct 生成 `ParamObject` 与 `From<T> for SqlValue`。
///
/// 字段值通过 `clone()` 后 `Into<SqlValue>` 转换；`as "name"` 可指定参数名。
#[macro_export]
macro_rules! impl_param_object {
    ($ty:ty { $($field:ident $(as $name:literal)?),* $(,)? }) => {
        impl $crate::structs::ParamObject for $ty {
            const FIELDS: &'static [&'static str] = &[
                $($crate::__param_field_name!(stringify!($field) $(, $name)?)),*
            ];

            fn to_param(&self) -> $crate::value::SqlValue {
                let mut map = $crate::value::ValueMap::new();
                $(
                    map.insert(
                        ::std::string::String::from($crate::__param_field_name!(stringify!($field) $(, $name)?)),
                        $crate::value::SqlValue::from(self.$field.clone()),
                    );
                )*
                $crate::value::SqlValue::Map(map)
            }
        }

        impl ::std::convert::From<$ty> for $crate::value::SqlValue {
            fn from(v: $ty) -> Self {
                $crate::structs::ParamObject::to_param(&v)
            }
        }

        impl ::std::convert::From<&$ty> for $crate::value::SqlValue {
            fn from(v: &$ty) -> Self {
                $crate::structs::ParamObject::to_param(v)
            }
        }
    };
}

/// 宏内部 helper：支持 `as "name"` 的可选参数。
#[doc(hidden)]
#[macro_export]
macro_rules! __param_field_name {
    ($default:expr) => {
        $default
    };
    ($default:expr, $custom:expr) => {
        $custom
    };
}
