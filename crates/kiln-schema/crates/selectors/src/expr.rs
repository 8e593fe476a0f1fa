// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! The selector expression tree and its interpreter.
//!
//! Values follow python's rules for truthiness, equality and
//! arithmetic, since that is the language selectors are written in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::{EvalError, Namespace};

#[cfg(test)]
#[path = "./expr_test.rs"]
mod expr_test;

type EvalResult<T> = std::result::Result<T, EvalError>;

/// A value produced while evaluating a selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Seq(Vec<Value>),
    Map(BTreeMap<String, String>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "str",
            Self::Seq(_) => "tuple",
            Self::Map(_) => "dict",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Str(s) => !s.is_empty(),
            Self::Seq(s) => !s.is_empty(),
            Self::Map(m) => !m.is_empty(),
        }
    }

    /// The integer form of numeric values (bools count as 0 and 1)
    fn as_int(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn equals(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
            return a == b;
        }
        match (self, other) {
            (Self::Seq(a), Self::Seq(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.equals(b))
            }
            _ => self == other,
        }
    }

    fn order(&self, other: &Value, op: &'static str) -> EvalResult<Ordering> {
        if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
            return Ok(a.cmp(&b));
        }
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => Ok(a.cmp(b)),
            (Self::Seq(a), Self::Seq(b)) => {
                for (a, b) in a.iter().zip(b) {
                    if !a.equals(b) {
                        return a.order(b, op);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            _ => Err(self.unsupported(op, other)),
        }
    }

    fn contains(&self, item: &Value) -> EvalResult<bool> {
        match (self, item) {
            (Self::Str(haystack), Self::Str(needle)) => Ok(haystack.contains(needle.as_str())),
            (Self::Seq(items), _) => Ok(items.iter().any(|i| i.equals(item))),
            (Self::Map(map), Self::Str(key)) => Ok(map.contains_key(key)),
            (Self::Map(_), _) => Ok(false),
            _ => Err(item.unsupported("in", self)),
        }
    }

    fn unsupported(&self, op: &'static str, other: &Value) -> EvalError {
        EvalError::UnsupportedOperands {
            op,
            left: self.type_name(),
            right: other.type_name(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => i.fmt(f),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Seq(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str(")")
            }
            Self::Map(map) => write!(f, "{map:?}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
        }
    }

    fn apply(&self, left: &Value, right: &Value) -> EvalResult<bool> {
        let symbol = self.symbol();
        Ok(match self {
            Self::Eq => left.equals(right),
            Self::NotEq => !left.equals(right),
            Self::Lt => left.order(right, symbol)?.is_lt(),
            Self::LtE => left.order(right, symbol)?.is_le(),
            Self::Gt => left.order(right, symbol)?.is_gt(),
            Self::GtE => left.order(right, symbol)?.is_ge(),
            Self::In => right.contains(left)?,
            Self::NotIn => !right.contains(left)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    Mod,
}

/// The longest string that repetition (`'ab' * 3`) may produce
const MAX_REPEATED_LEN: usize = 64 * 1024;

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::FloorDiv => "//",
            Self::Mod => "%",
        }
    }

    fn apply(&self, left: Value, right: Value) -> EvalResult<Value> {
        if let (Some(a), Some(b)) = (left.as_int(), right.as_int()) {
            return self.apply_int(a, b).map(Value::Int);
        }
        match (self, left, right) {
            (Self::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
            (Self::Add, Value::Seq(mut a), Value::Seq(b)) => {
                a.extend(b);
                Ok(Value::Seq(a))
            }
            (Self::Mul, Value::Str(s), n) | (Self::Mul, n, Value::Str(s))
                if n.as_int().is_some() =>
            {
                let times = usize::try_from(n.as_int().unwrap_or_default()).unwrap_or(0);
                match s.len().checked_mul(times) {
                    Some(len) if len <= MAX_REPEATED_LEN => Ok(Value::Str(s.repeat(times))),
                    _ => Err(EvalError::Overflow),
                }
            }
            (_, left, right) => Err(left.unsupported(self.symbol(), &right)),
        }
    }

    fn apply_int(&self, a: i64, b: i64) -> EvalResult<i64> {
        match self {
            Self::Add => a.checked_add(b).ok_or(EvalError::Overflow),
            Self::Sub => a.checked_sub(b).ok_or(EvalError::Overflow),
            Self::Mul => a.checked_mul(b).ok_or(EvalError::Overflow),
            Self::FloorDiv | Self::Mod if b == 0 => Err(EvalError::DivisionByZero),
            Self::FloorDiv => {
                let quotient = a.checked_div(b).ok_or(EvalError::Overflow)?;
                // python rounds towards negative infinity
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    Ok(quotient - 1)
                } else {
                    Ok(quotient)
                }
            }
            Self::Mod => {
                let remainder = a.checked_rem(b).ok_or(EvalError::Overflow)?;
                // the result takes the sign of the divisor
                if remainder != 0 && ((remainder < 0) != (b < 0)) {
                    Ok(remainder + b)
                } else {
                    Ok(remainder)
                }
            }
        }
    }
}

/// A parsed selector expression
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Literal(Value),
    Name(String),
    Tuple(Vec<Expr>),
    Not(Box<Expr>),
    Neg(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    /// A chain of comparisons, eg `a < b <= c`
    Compare(Box<Expr>, Vec<(CompareOp, Expr)>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Subscript(Box<Expr>, Box<Expr>),
    Method {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Evaluate this expression, looking up names only in the given namespace
    pub fn eval(&self, namespace: &Namespace) -> EvalResult<Value> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Name(name) => namespace
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedName(name.clone())),
            Self::Tuple(items) => items
                .iter()
                .map(|i| i.eval(namespace))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::Seq),
            Self::Not(inner) => Ok(Value::Bool(!inner.eval(namespace)?.is_truthy())),
            Self::Neg(inner) => match inner.eval(namespace)? {
                value @ (Value::Int(_) | Value::Bool(_)) => value
                    .as_int()
                    .and_then(i64::checked_neg)
                    .map(Value::Int)
                    .ok_or(EvalError::Overflow),
                other => Err(EvalError::UnsupportedOperand {
                    op: "unary -",
                    operand: other.type_name(),
                }),
            },
            Self::And(left, right) => {
                let left = left.eval(namespace)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                right.eval(namespace)
            }
            Self::Or(left, right) => {
                let left = left.eval(namespace)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                right.eval(namespace)
            }
            Self::Compare(first, chain) => {
                let mut left = first.eval(namespace)?;
                for (op, right) in chain {
                    let right = right.eval(namespace)?;
                    if !op.apply(&left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Self::Binary(op, left, right) => {
                let left = left.eval(namespace)?;
                let right = right.eval(namespace)?;
                op.apply(left, right)
            }
            Self::Subscript(target, index) => {
                subscript(target.eval(namespace)?, index.eval(namespace)?)
            }
            Self::Method { target, name, args } => {
                let target = target.eval(namespace)?;
                let args = args
                    .iter()
                    .map(|a| a.eval(namespace))
                    .collect::<EvalResult<Vec<_>>>()?;
                call_method(target, name, args)
            }
        }
    }
}

fn subscript(target: Value, index: Value) -> EvalResult<Value> {
    let not_subscriptable = EvalError::NotSubscriptable {
        target: target.type_name(),
        index: index.type_name(),
    };
    match (&target, &index) {
        (Value::Map(map), Value::Str(key)) => map
            .get(key)
            .cloned()
            .map(Value::Str)
            .ok_or_else(|| EvalError::KeyNotFound(key.clone())),
        (Value::Seq(items), _) => {
            let Some(i) = index.as_int() else {
                return Err(not_subscriptable);
            };
            position(i, items.len())
                .and_then(|i| items.get(i).cloned())
                .ok_or(EvalError::IndexOutOfRange(i))
        }
        (Value::Str(s), _) => {
            let Some(i) = index.as_int() else {
                return Err(not_subscriptable);
            };
            let chars = s.chars().collect::<Vec<_>>();
            position(i, chars.len())
                .and_then(|i| chars.get(i))
                .map(|c| Value::Str(c.to_string()))
                .ok_or(EvalError::IndexOutOfRange(i))
        }
        _ => Err(not_subscriptable),
    }
}

/// Resolve a possibly negative index into a position in a sequence
fn position(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    usize::try_from(index).ok()
}

fn call_method(target: Value, name: &str, mut args: Vec<Value>) -> EvalResult<Value> {
    match (&target, name) {
        (Value::Map(map), "get") => {
            if args.is_empty() || args.len() > 2 {
                return Err(EvalError::WrongArgumentCount {
                    method: "get",
                    expected: "1 or 2",
                    given: args.len(),
                });
            }
            let default = if args.len() == 2 {
                args.pop().unwrap_or(Value::None)
            } else {
                Value::None
            };
            match args.first() {
                Some(Value::Str(key)) => Ok(map.get(key).cloned().map(Value::Str).unwrap_or(default)),
                _ => Ok(default),
            }
        }
        (Value::Str(s), "startswith" | "endswith") => {
            let method = if name == "startswith" {
                "startswith"
            } else {
                "endswith"
            };
            let [arg] = args.as_slice() else {
                return Err(EvalError::WrongArgumentCount {
                    method,
                    expected: "1",
                    given: args.len(),
                });
            };
            let candidates = match arg {
                Value::Str(s) => vec![s.as_str()],
                Value::Seq(items) => items
                    .iter()
                    .map(|i| match i {
                        Value::Str(s) => Ok(s.as_str()),
                        other => Err(target.unsupported(method, other)),
                    })
                    .collect::<EvalResult<Vec<_>>>()?,
                other => return Err(target.unsupported(method, other)),
            };
            let found = candidates.into_iter().any(|c| {
                if method == "startswith" {
                    s.starts_with(c)
                } else {
                    s.ends_with(c)
                }
            });
            Ok(Value::Bool(found))
        }
        _ => Err(EvalError::UnknownMethod {
            target: target.type_name(),
            method: name.to_string(),
        }),
    }
}
