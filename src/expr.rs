//! 表达式语法树与解析器（供内置求值器使用）。
//!
//! 支持：字面量、标识符、`.prop`、`[index]`、方法调用、`{a, b}` 列表、
//! 一元 `! not -`、算术 `* / % + -`、比较 `< <= > >= lt lte gt gte in not in`、
//! 相等 `== != eq neq`、逻辑 `&& and || or`、三元 `?:`。

use crate::evaluator::EvalError;
use crate::value::SqlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

/// 已解析的表达式。
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(SqlValue),
    Ident(String),
    Property(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call {
        target: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    List(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// 解析完整表达式；尾部有多余 token 视为错误。
    pub fn parse(src: &str) -> Result<Expr, EvalError> {
        let tokens = lex(src)?;
        let mut p = Parser { tokens, pos: 0 };
        let expr = p.conditional()?;
        match p.peek() {
            Tok::Eof => Ok(expr),
            other => Err(p.error(format!("unexpected token {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
    Eof,
}

#[derive(Debug)]
struct Spanned {
    tok: Tok,
    at: usize,
}

const PUNCTS: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "<", ">", "!", "+", "-", "*", "/", "%", "?", ":", ".",
    ",", "(", ")", "[", "]", "{", "}",
];

fn lex(src: &str) -> Result<Vec<Spanned>, EvalError> {
    let mut out = Vec::new();
    let bytes = src.as_bytes();
    let mut i = 0usize;

    'outer: while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let mut is_float = false;
            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                is_float = true;
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text = &src[start..i];
            // 数字后缀（1L / 1.5d）直接忽略
            if i < bytes.len() && matches!(bytes[i], b'L' | b'l' | b'D' | b'd' | b'F' | b'f') {
                is_float |= matches!(bytes[i], b'D' | b'd' | b'F' | b'f');
                i += 1;
            }
            let tok = if is_float {
                Tok::Float(text.parse().map_err(|_| parse_err(start, "invalid number"))?)
            } else {
                match text.parse::<i64>() {
                    Ok(n) => Tok::Int(n),
                    Err(_) => Tok::Float(text.parse().map_err(|_| parse_err(start, "invalid number"))?),
                }
            };
            out.push(Spanned { tok, at: start });
            continue;
        }

        if c == b'\'' || c == b'"' {
            let start = i;
            let quote = c as char;
            let mut s = String::new();
            let mut chars = src[i + 1..].char_indices();
            while let Some((off, ch)) = chars.next() {
                if ch == quote {
                    i = i + 1 + off + 1;
                    out.push(Spanned {
                        tok: Tok::Str(s),
                        at: start,
                    });
                    continue 'outer;
                }
                if ch == '\\' {
                    match chars.next() {
                        Some((_, 'n')) => s.push('\n'),
                        Some((_, 't')) => s.push('\t'),
                        Some((_, 'r')) => s.push('\r'),
                        Some((_, other)) => s.push(other),
                        None => break,
                    }
                    continue;
                }
                s.push(ch);
            }
            return Err(parse_err(start, "unterminated string literal"));
        }

        if c.is_ascii_alphabetic() || c == b'_' || c == b'$' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$') {
                i += 1;
            }
            out.push(Spanned {
                tok: Tok::Ident(src[start..i].to_string()),
                at: start,
            });
            continue;
        }

        for &p in PUNCTS {
            if src[i..].starts_with(p) {
                out.push(Spanned {
                    tok: Tok::Punct(p),
                    at: i,
                });
                i += p.len();
                continue 'outer;
            }
        }

        let ch = src[i..].chars().next().unwrap_or('?');
        return Err(parse_err(i, &format!("unexpected character '{ch}'")));
    }

    out.push(Spanned {
        tok: Tok::Eof,
        at: src.len(),
    });
    Ok(out)
}

fn parse_err(position: usize, message: &str) -> EvalError {
    EvalError::Parse {
        position,
        message: message.to_string(),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].tok
    }

    fn peek_at(&self, n: usize) -> &Tok {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].tok
    }

    fn bump(&mut self) -> Tok {
        let t = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn error(&self, message: String) -> EvalError {
        EvalError::Parse {
            position: self.tokens[self.pos.min(self.tokens.len() - 1)].at,
            message,
        }
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Tok::Punct(q) if *q == p)
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Tok::Ident(s) if s == w)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), EvalError> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{p}', found {:?}", self.peek())))
        }
    }

    fn conditional(&mut self) -> Result<Expr, EvalError> {
        let cond = self.or()?;
        if self.eat_punct("?") {
            let then = self.conditional()?;
            self.expect_punct(":")?;
            let otherwise = self.conditional()?;
            return Ok(Expr::Conditional(
                Box::new(cond),
                Box::new(then),
                Box::new(otherwise),
            ));
        }
        Ok(cond)
    }

    fn or(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.and()?;
        while self.is_punct("||") || self.is_word("or") {
            self.bump();
            let right = self.and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.equality()?;
        while self.is_punct("&&") || self.is_word("and") {
            self.bump();
            let right = self.equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.relational()?;
        loop {
            let op = if self.is_punct("==") || self.is_word("eq") {
                BinaryOp::Eq
            } else if self.is_punct("!=") || self.is_word("neq") {
                BinaryOp::Ne
            } else {
                return Ok(left);
            };
            self.bump();
            let right = self.relational()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn relational(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek().clone() {
                Tok::Punct("<") => BinaryOp::Lt,
                Tok::Punct("<=") => BinaryOp::Le,
                Tok::Punct(">") => BinaryOp::Gt,
                Tok::Punct(">=") => BinaryOp::Ge,
                Tok::Ident(w) => match w.as_str() {
                    "lt" => BinaryOp::Lt,
                    "lte" => BinaryOp::Le,
                    "gt" => BinaryOp::Gt,
                    "gte" => BinaryOp::Ge,
                    "in" => BinaryOp::In,
                    "not" if matches!(self.peek_at(1), Tok::Ident(n) if n == "in") => {
                        self.bump();
                        BinaryOp::NotIn
                    }
                    _ => return Ok(left),
                },
                _ => return Ok(left),
            };
            self.bump();
            let right = self.additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn additive(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = if self.is_punct("+") {
                BinaryOp::Add
            } else if self.is_punct("-") {
                BinaryOp::Sub
            } else {
                return Ok(left);
            };
            self.bump();
            let right = self.multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.unary()?;
        loop {
            let op = if self.is_punct("*") {
                BinaryOp::Mul
            } else if self.is_punct("/") {
                BinaryOp::Div
            } else if self.is_punct("%") {
                BinaryOp::Rem
            } else {
                return Ok(left);
            };
            self.bump();
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        if self.is_punct("!") || self.is_word("not") {
            self.bump();
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(self.unary()?)));
        }
        if self.eat_punct("-") {
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.unary()?)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.primary()?;
        loop {
            if self.eat_punct(".") {
                let name = match self.bump() {
                    Tok::Ident(name) => name,
                    other => return Err(self.error(format!("expected property name, found {other:?}"))),
                };
                if self.eat_punct("(") {
                    let args = self.arguments(")")?;
                    expr = Expr::Call {
                        target: Box::new(expr),
                        method: name,
                        args,
                    };
                } else {
                    expr = Expr::Property(Box::new(expr), name);
                }
            } else if self.eat_punct("[") {
                let index = self.conditional()?;
                self.expect_punct("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                return Ok(expr);
            }
        }
    }

    /// 逗号分隔的参数列表，已消费起始括号。
    fn arguments(&mut self, close: &str) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        if self.eat_punct(close) {
            return Ok(args);
        }
        loop {
            args.push(self.conditional()?);
            if self.eat_punct(close) {
                return Ok(args);
            }
            self.expect_punct(",")?;
        }
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.bump() {
            Tok::Int(n) => Ok(Expr::Literal(SqlValue::I64(n))),
            Tok::Float(n) => Ok(Expr::Literal(SqlValue::F64(n))),
            Tok::Str(s) => Ok(Expr::Literal(SqlValue::from(s))),
            Tok::Ident(w) => match w.as_str() {
                "true" => Ok(Expr::Literal(SqlValue::Bool(true))),
                "false" => Ok(Expr::Literal(SqlValue::Bool(false))),
                "null" => Ok(Expr::Literal(SqlValue::Null)),
                _ => {
                    if self.is_punct("(") {
                        return Err(self.error(format!("unsupported function call `{w}(...)`")));
                    }
                    Ok(Expr::Ident(w))
                }
            },
            Tok::Punct("(") => {
                let inner = self.conditional()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            Tok::Punct("{") => Ok(Expr::List(self.arguments("}")?)),
            Tok::Eof => Err(self.error("unexpected end of expression".to_string())),
            other => Err(self.error(format!("unexpected token {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryOp, Expr};
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_precedence() {
        let e = Expr::parse("a + 2 * 3 == 7 and !b").unwrap();
        let expected = Expr::And(
            Box::new(Expr::Binary(
                BinaryOp::Eq,
                Box::new(Expr::Binary(
                    BinaryOp::Add,
                    Box::new(Expr::Ident("a".into())),
                    Box::new(Expr::Binary(
                        BinaryOp::Mul,
                        Box::new(Expr::Literal(SqlValue::I64(2))),
                        Box::new(Expr::Literal(SqlValue::I64(3))),
                    )),
                )),
                Box::new(Expr::Literal(SqlValue::I64(7))),
            )),
            Box::new(Expr::Unary(
                super::UnaryOp::Not,
                Box::new(Expr::Ident("b".into())),
            )),
        );
        assert_eq!(e, expected);
    }

    #[test]
    fn parse_not_in() {
        let e = Expr::parse("x not in {1, 2}").unwrap();
        assert!(matches!(e, Expr::Binary(BinaryOp::NotIn, _, _)));
    }

    #[test]
    fn parse_errors_report_position() {
        let err = Expr::parse("a ==").unwrap_err();
        assert!(matches!(err, crate::EvalError::Parse { position: 4, .. }));
        assert!(Expr::parse("'open").is_err());
        assert!(Expr::parse("a b").is_err());
    }
}
