//! ParamObject：业务 struct 到参数对象的转换。
//!
//! Rust 无运行时反射；通过 `impl_param_object!` 为 struct 生成字段名与取值逻辑，
//! struct 以 `SqlValue::Map`（字段名 → 值）的形式参与求值与属性访问。

use crate::value::SqlValue;

/// 由 `impl_param_object!` 为你的业务 struct 实现。
pub trait ParamObject {
    /// 参数名（按声明顺序）。
    const FIELDS: &'static [&'static str];

    fn to_param(&self) -> SqlValue;
}
