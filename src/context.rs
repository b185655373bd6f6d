//! DynamicContext：一次求值的参数上下文。
//!
//! 作用域是一条链：`scopes[0]` 是全局作用域（`_parameter`、`_databaseId`、`<bind>`、
//! foreach 生成的 `__frch_*` 绑定），后续作用域由 foreach 每次迭代压入并在迭代结束后弹出。
//! 查找时从最内层向外，最后回落到参数对象本身。

use crate::configuration::Configuration;
use crate::evaluator::Scope;
use crate::value::{SqlValue, ValueMap};
use std::collections::HashMap;

/// 参数对象在上下文中的绑定名。
pub const PARAMETER_OBJECT_KEY: &str = "_parameter";
/// 当前数据库标识的绑定名。
pub const DATABASE_ID_KEY: &str = "_databaseId";
/// foreach 生成的合成绑定名前缀。
pub const ITEM_PREFIX: &str = "__frch_";

/// `__frch_<name>_<n>`
pub fn itemize(name: &str, n: usize) -> String {
    format!("{ITEM_PREFIX}{name}_{n}")
}

#[derive(Debug)]
pub struct DynamicContext<'a> {
    config: &'a Configuration,
    parameter: &'a SqlValue,
    scopes: Vec<HashMap<String, SqlValue>>,
    iterations: Vec<Iteration>,
    unique_number: usize,
}

/// 正在进行的一次 foreach 迭代：序号与迭代内 `<bind>` 产生的 (变量名, 合成名)。
#[derive(Debug)]
struct Iteration {
    n: usize,
    renames: Vec<(String, String)>,
}

impl<'a> DynamicContext<'a> {
    pub fn new(config: &'a Configuration, parameter: &'a SqlValue) -> Self {
        let mut global = HashMap::new();
        global.insert(PARAMETER_OBJECT_KEY.to_string(), parameter.clone());
        global.insert(
            DATABASE_ID_KEY.to_string(),
            SqlValue::from_option(config.database_id.clone()),
        );
        Self {
            config,
            parameter,
            scopes: vec![global],
            iterations: Vec::new(),
            unique_number: 0,
        }
    }

    pub fn config(&self) -> &'a Configuration {
        self.config
    }

    pub fn parameter(&self) -> &'a SqlValue {
        self.parameter
    }

    /// 绑定到当前最内层作用域。
    pub fn bind(&mut self, name: impl Into<String>, value: SqlValue) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// 绑定到全局作用域（随 BoundSql 一起导出）。
    pub fn bind_global(&mut self, name: impl Into<String>, value: SqlValue) {
        self.scopes[0].insert(name.into(), value);
    }

    /// `<bind>` 的绑定：写入当前作用域；处于 foreach 迭代中时，
    /// 同时在全局作用域导出 `__frch_<name>_<n>`，供占位符改写后解析。
    pub fn bind_variable(&mut self, name: &str, value: SqlValue) {
        let Some(n) = self.iterations.last().map(|it| it.n) else {
            self.bind(name, value);
            return;
        };
        let synthetic = itemize(name, n);
        self.bind(name, value.clone());
        self.bind_global(synthetic.clone(), value);
        if let Some(it) = self.iterations.last_mut() {
            it.renames.retain(|(bound, _)| bound != name);
            it.renames.push((name.to_string(), synthetic));
        }
    }

    /// 开始第 `n` 次 foreach 迭代，压入其子作用域。
    pub(crate) fn begin_iteration(&mut self, n: usize) {
        self.push_scope();
        self.iterations.push(Iteration {
            n,
            renames: Vec::new(),
        });
    }

    /// 结束当前迭代并弹出其作用域，返回迭代内 `<bind>` 的 (变量名, 合成名)。
    pub(crate) fn end_iteration(&mut self) -> Vec<(String, String)> {
        self.pop_scope();
        self.iterations
            .pop()
            .map(|it| it.renames)
            .unwrap_or_default()
    }

    /// 压入一个子作用域，其绑定会遮蔽外层同名绑定。
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// 弹出最内层子作用域；全局作用域不会被弹出。
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// 当前作用域深度（全局为 1）。
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// 每次调用返回一个新的序号，用于生成 `__frch_*` 名字。
    pub fn next_unique_number(&mut self) -> usize {
        let n = self.unique_number;
        self.unique_number += 1;
        n
    }

    /// 取走全局作用域，作为 BoundSql 的附加参数。
    pub(crate) fn into_bindings(mut self) -> ValueMap {
        self.scopes.swap_remove(0).into_iter().collect()
    }

    fn fallback(&self, name: &str) -> Option<&'a SqlValue> {
        match self.parameter {
            SqlValue::Null => None,
            SqlValue::Map(map) => map.get(name),
            SqlValue::List(_) => match name {
                "list" | "collection" | "array" => Some(self.parameter),
                _ => None,
            },
            // 标量参数：任意名字都解析为参数本身
            scalar => Some(scalar),
        }
    }
}

impl Scope for DynamicContext<'_> {
    fn lookup(&self, name: &str) -> Option<&SqlValue> {
        for scope in self.scopes.iter().rev() {
            if let Some(v) = scope.get(name) {
                return Some(v);
            }
        }
        self.fallback(name)
    }
}
