//! 表达式求值：`<if test>` / `<when test>` / `${}` / `<foreach collection>` / `<bind value>`
//! 都通过 `ExpressionEvaluator` 对上下文求值。
//!
//! 引擎只依赖 trait；`DefaultEvaluator` 是内置的小型解释器，可以替换成任意实现。
//!
//! 默认的 `DefaultEvaluator` 不持有可变状态，每次求值重新解析表达式。
//! `DefaultEvaluator::cached()` 额外启用按表达式文本的解析缓存（`RwLock`，clone 之间共享，
//! 不淘汰）；这是显式选择的共享状态，键的数量以节点树中出现的表达式为上限。

use crate::expr::{BinaryOp, Expr, UnaryOp};
use crate::value::SqlValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

static NULL: SqlValue = SqlValue::Null;

/// 求值错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("expression parse error at {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("expression unknown method `{method}` on {type_name}")]
    UnknownMethod {
        method: String,
        type_name: &'static str,
    },
    #[error("expression type error: {0}")]
    Type(String),
    #[error("expression division by zero")]
    DivisionByZero,
}

/// 求值时可见的命名值。
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<&SqlValue>;
}

impl Scope for HashMap<String, SqlValue> {
    fn lookup(&self, name: &str) -> Option<&SqlValue> {
        self.get(name)
    }
}

/// 表达式求值能力。
pub trait ExpressionEvaluator: dyn_clone::DynClone + fmt::Debug + Send + Sync {
    fn evaluate(&self, expression: &str, scope: &dyn Scope) -> Result<SqlValue, EvalError>;

    /// 求值并按 `truthy` 规则转换为 bool。
    fn evaluate_boolean(&self, expression: &str, scope: &dyn Scope) -> Result<bool, EvalError> {
        self.evaluate(expression, scope).map(|v| truthy(&v))
    }
}

dyn_clone::clone_trait_object!(ExpressionEvaluator);

/// 非 bool 结果的真值规则：Null 为假；数值为 0 时为假；其余（包括空字符串、空集合）为真。
pub fn truthy(v: &SqlValue) -> bool {
    match v {
        SqlValue::Bool(b) => *b,
        SqlValue::Null => false,
        SqlValue::I64(n) => *n != 0,
        SqlValue::U64(n) => *n != 0,
        SqlValue::F64(n) => *n != 0.0,
        _ => true,
    }
}

/// 内置解释器。
#[derive(Debug, Clone, Default)]
pub struct DefaultEvaluator {
    cache: Option<Arc<RwLock<HashMap<String, Arc<Expr>>>>>,
}

impl DefaultEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析结果按表达式文本缓存，clone 之间共享缓存。
    pub fn cached() -> Self {
        Self {
            cache: Some(Arc::default()),
        }
    }

    fn parsed(&self, expression: &str) -> Result<Arc<Expr>, EvalError> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(Expr::parse(expression)?));
        };
        if let Some(hit) = cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(expression)
        {
            return Ok(hit.clone());
        }
        let expr = Arc::new(Expr::parse(expression)?);
        cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(expression.to_string(), expr.clone());
        Ok(expr)
    }
}

impl ExpressionEvaluator for DefaultEvaluator {
    fn evaluate(&self, expression: &str, scope: &dyn Scope) -> Result<SqlValue, EvalError> {
        let expr = self.parsed(expression)?;
        eval(&expr, scope)
    }
}

fn eval(expr: &Expr, scope: &dyn Scope) -> Result<SqlValue, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Ident(name) => Ok(scope.lookup(name).cloned().unwrap_or(SqlValue::Null)),
        Expr::Property(target, name) => {
            let target = eval(target, scope)?;
            Ok(target.property(name).cloned().unwrap_or(SqlValue::Null))
        }
        Expr::Index(target, index) => {
            let target = eval(target, scope)?;
            let index = eval(index, scope)?;
            Ok(target
                .index(&index.to_sql_text())
                .cloned()
                .unwrap_or(SqlValue::Null))
        }
        Expr::Call {
            target,
            method,
            args,
        } => {
            let target = eval(target, scope)?;
            let args = args
                .iter()
                .map(|a| eval(a, scope))
                .collect::<Result<Vec<_>, _>>()?;
            call_method(&target, method, &args)
        }
        Expr::List(items) => Ok(SqlValue::List(
            items
                .iter()
                .map(|a| eval(a, scope))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Expr::Unary(UnaryOp::Not, inner) => Ok(SqlValue::Bool(!truthy(&eval(inner, scope)?))),
        Expr::Unary(UnaryOp::Neg, inner) => match eval(inner, scope)? {
            SqlValue::I64(n) => n
                .checked_neg()
                .map(SqlValue::I64)
                .ok_or_else(|| EvalError::Type("integer overflow".to_string())),
            SqlValue::U64(n) => Ok(i64::try_from(n)
                .map(|n| SqlValue::I64(-n))
                .unwrap_or(SqlValue::F64(-(n as f64)))),
            SqlValue::F64(n) => Ok(SqlValue::F64(-n)),
            other => Err(EvalError::Type(format!("cannot negate {}", other.type_name()))),
        },
        Expr::And(l, r) => {
            if !truthy(&eval(l, scope)?) {
                return Ok(SqlValue::Bool(false));
            }
            Ok(SqlValue::Bool(truthy(&eval(r, scope)?)))
        }
        Expr::Or(l, r) => {
            if truthy(&eval(l, scope)?) {
                return Ok(SqlValue::Bool(true));
            }
            Ok(SqlValue::Bool(truthy(&eval(r, scope)?)))
        }
        Expr::Conditional(cond, then, otherwise) => {
            if truthy(&eval(cond, scope)?) {
                eval(then, scope)
            } else {
                eval(otherwise, scope)
            }
        }
        Expr::Binary(op, l, r) => {
            let l = eval(l, scope)?;
            let r = eval(r, scope)?;
            binary(*op, &l, &r)
        }
    }
}

fn binary(op: BinaryOp, l: &SqlValue, r: &SqlValue) -> Result<SqlValue, EvalError> {
    let v = match op {
        BinaryOp::Eq => SqlValue::Bool(values_equal(l, r)),
        BinaryOp::Ne => SqlValue::Bool(!values_equal(l, r)),
        BinaryOp::Lt => SqlValue::Bool(compare(l, r)? == Some(Ordering::Less)),
        BinaryOp::Le => SqlValue::Bool(matches!(
            compare(l, r)?,
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => SqlValue::Bool(compare(l, r)? == Some(Ordering::Greater)),
        BinaryOp::Ge => SqlValue::Bool(matches!(
            compare(l, r)?,
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::In => SqlValue::Bool(contains(r, l)?),
        BinaryOp::NotIn => SqlValue::Bool(!contains(r, l)?),
        BinaryOp::Add => {
            if matches!(l, SqlValue::String(_)) || matches!(r, SqlValue::String(_)) {
                SqlValue::from(format!("{l}{r}"))
            } else {
                arithmetic(op, l, r)?
            }
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => arithmetic(op, l, r)?,
    };
    Ok(v)
}

fn arithmetic(op: BinaryOp, l: &SqlValue, r: &SqlValue) -> Result<SqlValue, EvalError> {
    if !l.is_number() || !r.is_number() {
        return Err(EvalError::Type(format!(
            "unsupported operands {} and {} for {op:?}",
            l.type_name(),
            r.type_name()
        )));
    }

    if let (Some(a), Some(b)) = (l.as_i64(), r.as_i64())
        && !matches!(l, SqlValue::F64(_))
        && !matches!(r, SqlValue::F64(_))
    {
        let out = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
            BinaryOp::Div => a.checked_div(b),
            BinaryOp::Rem => a.checked_rem(b),
            _ => None,
        };
        return out
            .map(SqlValue::I64)
            .ok_or_else(|| EvalError::Type("integer overflow".to_string()));
    }

    let (a, b) = (l.as_f64().unwrap_or_default(), r.as_f64().unwrap_or_default());
    let out = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        _ => return Err(EvalError::Type(format!("unsupported operator {op:?}"))),
    };
    Ok(SqlValue::F64(out))
}

/// 数值与数值、数值与数字字符串按数值比较，其余按值比较。
pub(crate) fn values_equal(l: &SqlValue, r: &SqlValue) -> bool {
    match (l, r) {
        (SqlValue::Null, SqlValue::Null) => true,
        (SqlValue::Null, _) | (_, SqlValue::Null) => false,
        _ if l.is_number() && r.is_number() => match (l.as_i64(), r.as_i64()) {
            (Some(a), Some(b)) if !matches!(l, SqlValue::F64(_)) && !matches!(r, SqlValue::F64(_)) => a == b,
            _ => l.as_f64() == r.as_f64(),
        },
        (n, SqlValue::String(s)) | (SqlValue::String(s), n) if n.is_number() => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        _ => l == r,
    }
}

/// 比较；任一侧为 Null 时返回 None（所有比较结果为假）。
fn compare(l: &SqlValue, r: &SqlValue) -> Result<Option<Ordering>, EvalError> {
    if l.is_null() || r.is_null() {
        return Ok(None);
    }
    if l.is_number() && r.is_number() {
        return Ok(l.as_f64().partial_cmp(&r.as_f64()));
    }
    match (l, r) {
        (SqlValue::String(a), SqlValue::String(b)) => Ok(Some(a.cmp(b))),
        (n, SqlValue::String(s)) if n.is_number() => Ok(s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|b| n.as_f64().and_then(|a| a.partial_cmp(&b)))),
        (SqlValue::String(s), n) if n.is_number() => Ok(s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|a| n.as_f64().and_then(|b| a.partial_cmp(&b)))),
        (SqlValue::DateTime(a), SqlValue::DateTime(b)) => Ok(Some(a.dt.cmp(&b.dt))),
        (SqlValue::Bool(a), SqlValue::Bool(b)) => Ok(Some(a.cmp(b))),
        _ => Err(EvalError::Type(format!(
            "cannot compare {} with {}",
            l.type_name(),
            r.type_name()
        ))),
    }
}

fn contains(container: &SqlValue, needle: &SqlValue) -> Result<bool, EvalError> {
    match container {
        SqlValue::Null => Ok(false),
        SqlValue::List(items) => Ok(items.iter().any(|v| values_equal(v, needle))),
        SqlValue::Map(map) => Ok(map.contains_key(&needle.to_sql_text())),
        other => Err(EvalError::Type(format!(
            "`in` requires a list or map, found {}",
            other.type_name()
        ))),
    }
}

fn arg_text(args: &[SqlValue], i: usize) -> String {
    args.get(i).map(SqlValue::to_sql_text).unwrap_or_default()
}

fn arg_index(args: &[SqlValue], i: usize) -> Result<usize, EvalError> {
    args.get(i)
        .and_then(SqlValue::as_i64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| EvalError::Type("expected a non-negative integer argument".to_string()))
}

fn call_method(target: &SqlValue, method: &str, args: &[SqlValue]) -> Result<SqlValue, EvalError> {
    // 对 null 调用任何方法都得到 null
    if target.is_null() {
        return Ok(SqlValue::Null);
    }

    match (target, method) {
        (_, "equals") => return Ok(SqlValue::Bool(values_equal(target, args.first().unwrap_or(&NULL)))),
        (_, "toString") => return Ok(SqlValue::from(target.to_string())),
        _ => {}
    }

    let v = match target {
        SqlValue::String(s) => match method {
            "length" => SqlValue::from(s.chars().count()),
            "isEmpty" => SqlValue::Bool(s.is_empty()),
            "trim" => SqlValue::from(s.trim().to_string()),
            "toUpperCase" => SqlValue::from(s.to_uppercase()),
            "toLowerCase" => SqlValue::from(s.to_lowercase()),
            "contains" => SqlValue::Bool(s.contains(arg_text(args, 0).as_str())),
            "startsWith" => SqlValue::Bool(s.starts_with(arg_text(args, 0).as_str())),
            "endsWith" => SqlValue::Bool(s.ends_with(arg_text(args, 0).as_str())),
            "equalsIgnoreCase" => SqlValue::Bool(s.to_lowercase() == arg_text(args, 0).to_lowercase()),
            "indexOf" => {
                let needle = arg_text(args, 0);
                match s.find(needle.as_str()) {
                    Some(byte) => SqlValue::from(s[..byte].chars().count()),
                    None => SqlValue::I64(-1),
                }
            }
            "substring" => {
                let chars: Vec<char> = s.chars().collect();
                let from = arg_index(args, 0)?;
                let to = if args.len() > 1 {
                    arg_index(args, 1)?
                } else {
                    chars.len()
                };
                if from > to || to > chars.len() {
                    return Err(EvalError::Type(format!(
                        "substring range {from}..{to} out of bounds"
                    )));
                }
                SqlValue::from(chars[from..to].iter().collect::<String>())
            }
            _ => return Err(unknown(method, target)),
        },
        SqlValue::List(items) => match method {
            "size" | "length" => SqlValue::from(items.len()),
            "isEmpty" => SqlValue::Bool(items.is_empty()),
            "contains" => SqlValue::Bool(contains(target, args.first().unwrap_or(&NULL))?),
            "get" => items.get(arg_index(args, 0)?).cloned().unwrap_or(SqlValue::Null),
            "indexOf" => {
                let needle = args.first().unwrap_or(&NULL);
                items
                    .iter()
                    .position(|v| values_equal(v, needle))
                    .map(SqlValue::from)
                    .unwrap_or(SqlValue::I64(-1))
            }
            _ => return Err(unknown(method, target)),
        },
        SqlValue::Map(map) => match method {
            "size" => SqlValue::from(map.len()),
            "isEmpty" => SqlValue::Bool(map.is_empty()),
            "containsKey" => SqlValue::Bool(map.contains_key(&arg_text(args, 0))),
            "get" => map.get(&arg_text(args, 0)).cloned().unwrap_or(SqlValue::Null),
            _ => return Err(unknown(method, target)),
        },
        SqlValue::Bytes(b) => match method {
            "length" | "size" => SqlValue::from(b.len()),
            "isEmpty" => SqlValue::Bool(b.is_empty()),
            _ => return Err(unknown(method, target)),
        },
        _ => return Err(unknown(method, target)),
    };
    Ok(v)
}

fn unknown(method: &str, target: &SqlValue) -> EvalError {
    EvalError::UnknownMethod {
        method: method.to_string(),
        type_name: target.type_name(),
    }
}
