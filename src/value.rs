//! Helpers over [`serde_json::Value`], the value model of the language.
//!
//! An evaluation result is an `Option<Value>`: `None` is "no value" (for
//! example a path into a member that does not exist), `Some(Value::Null)` is a
//! JSON `null`. The two never compare equal.
//!
//! # Number Preservation
//!
//! JSON has a single number type, but results keep integers whenever that is
//! exact:
//! - integer arithmetic stays integer unless it overflows
//! - mixed and fractional arithmetic goes through [`Decimal`] so that
//!   `0.1 + 0.2` is `0.3` and `1.5 + 0.5` is the integer `2`
//! - operands or results `Decimal` cannot hold exactly (such as values below
//!   its 28 decimal places) fall back to `f64`

use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use serde_json::{Number, Value};

use crate::evaluator::EvalErrorKind;

/// Human-readable kind of a value, used in error messages.
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truthiness used by conditions, predicates, `and`, `or` and `$boolean`.
///
/// No value, `false`, `null`, `0`, `""`, `[]` and `{}` are false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(arr)) => !arr.is_empty(),
        Some(Value::Object(obj)) => !obj.is_empty(),
    }
}

/// A JSON number split into the integer and floating point cases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn from_value(v: &Value) -> Option<Num> {
        match v {
            Value::Number(n) => Num::from_number(n),
            _ => None,
        }
    }

    pub fn from_number(n: &Number) -> Option<Num> {
        n.as_i64()
            .map(Num::Int)
            .or_else(|| n.as_f64().map(Num::Float))
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(n) => n,
        }
    }

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    /// The same number as a [`Decimal`], or `None` if converting would change it.
    pub(crate) fn to_decimal(self) -> Option<Decimal> {
        match self {
            Num::Int(n) => Decimal::from_i64(n),
            Num::Float(n) => Decimal::from_f64(n).filter(|d| d.to_f64() == Some(n)),
        }
    }

    pub(crate) fn from_decimal(d: Decimal) -> Option<Num> {
        if d.is_integer()
            && let Some(n) = d.to_i64()
        {
            return Some(Num::Int(n));
        }
        d.to_f64().map(Num::Float)
    }

    /// Whole floats within `i64` range become integers.
    pub fn normalized(self) -> Num {
        match self {
            Num::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e18 => Num::Int(f as i64),
            n => n,
        }
    }

    pub fn into_value(self) -> Result<Value, EvalErrorKind> {
        match self {
            Num::Int(n) => Ok(Value::Number(n.into())),
            Num::Float(f) => Number::from_f64(f)
                .map(Value::Number)
                .ok_or(EvalErrorKind::NumberOutOfRange),
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arith {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

/// Applies `op`, trying exact integer arithmetic, then [`Decimal`], then `f64`.
pub fn arithmetic(op: Arith, a: Num, b: Num) -> Result<Num, EvalErrorKind> {
    if matches!(op, Arith::Divide | Arith::Modulo) && b.is_zero() {
        return Err(EvalErrorKind::DivisionByZero);
    }

    if let (Num::Int(x), Num::Int(y)) = (a, b) {
        let exact = match op {
            Arith::Add => x.checked_add(y),
            Arith::Subtract => x.checked_sub(y),
            Arith::Multiply => x.checked_mul(y),
            Arith::Divide => match x.checked_rem(y) {
                Some(0) => x.checked_div(y),
                _ => None,
            },
            Arith::Modulo => x.checked_rem(y),
        };
        if let Some(r) = exact {
            return Ok(Num::Int(r));
        }
    }

    let (x, y) = (a.as_f64(), b.as_f64());
    let approx = match op {
        Arith::Add => x + y,
        Arith::Subtract => x - y,
        Arith::Multiply => x * y,
        Arith::Divide => x / y,
        Arith::Modulo => x % y,
    };

    if let (Some(x), Some(y)) = (a.to_decimal(), b.to_decimal()) {
        let result = match op {
            Arith::Add => x.checked_add(y),
            Arith::Subtract => x.checked_sub(y),
            Arith::Multiply => x.checked_mul(y),
            Arith::Divide => x.checked_div(y),
            Arith::Modulo => x.checked_rem(y),
        };
        if let Some(r) = result
            && decimal_is_faithful(op, x, y, r, approx)
            && let Some(r) = Num::from_decimal(r)
        {
            return Ok(r);
        }
    }

    if approx.is_finite() {
        Ok(Num::Float(approx))
    } else {
        Err(EvalErrorKind::NumberOutOfRange)
    }
}

/// Relative difference from the `f64` result beyond which a [`Decimal`]
/// product or quotient is taken to have been rounded away.
const DECIMAL_TOLERANCE: f64 = 1e-12;

/// Whether `r`, the [`Decimal`] result of `x op y`, kept its precision.
///
/// Sums and remainders of exact operands are exact. Products and quotients
/// are rounded to 28 decimal places, which can lose digits or reach zero.
fn decimal_is_faithful(op: Arith, x: Decimal, y: Decimal, r: Decimal, approx: f64) -> bool {
    let underflow = match op {
        Arith::Multiply => !x.is_zero() && !y.is_zero(),
        Arith::Divide => !x.is_zero(),
        Arith::Add | Arith::Subtract | Arith::Modulo => return true,
    };
    if r.is_zero() {
        return !underflow;
    }
    r.to_f64()
        .is_some_and(|d| (d - approx).abs() <= approx.abs() * DECIMAL_TOLERANCE)
}

/// Deep equality; numbers compare by value, so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (Num::from_number(x), Num::from_number(y)) {
            (Some(Num::Int(x)), Some(Num::Int(y))) => x == y,
            (Some(x), Some(y)) => x.as_f64() == y.as_f64(),
            _ => false,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => a == b,
    }
}

/// Ordering of two numbers or two strings; `None` for anything else.
pub fn partial_order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => {
            match (Num::from_value(a)?, Num::from_value(b)?) {
                (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
                (x, y) => x.as_f64().partial_cmp(&y.as_f64()),
            }
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// String form used by `&` and `$string`: strings as-is, no value as `""`,
/// everything else as compact JSON.
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

const DESCRIBE_LIMIT: usize = 60;

/// Compact JSON rendering for error messages, truncated when long.
pub fn describe(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= DESCRIBE_LIMIT {
        return text;
    }
    let mut short: String = text.chars().take(DESCRIBE_LIMIT).collect();
    short.push_str("...");
    short
}
