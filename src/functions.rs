//! Function invocation protocol and the built-in library.
//!
//! Every callable, built-in or registered by the caller, implements
//! [`Function`]: it declares an [`Arity`] and receives its already evaluated
//! arguments. An argument that evaluated to no value is passed as `None`;
//! most built-ins return no value when their main argument is missing.

use std::{collections::HashMap, fmt, sync::Arc};

use once_cell::sync::Lazy;
use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::value::{
    Arith, Num, arithmetic, is_truthy, partial_order, stringify, type_name, values_equal,
};

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Arity {
            min: n,
            max: Some(n),
        }
    }

    pub const fn range(min: usize, max: usize) -> Self {
        Arity {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Arity { min, max: None }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Failure reported by a function body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FunctionError {
    pub message: String,
}

impl FunctionError {
    pub fn new(message: impl Into<String>) -> Self {
        FunctionError {
            message: message.into(),
        }
    }
}

pub type FunctionResult = Result<Option<Value>, FunctionError>;

/// A callable the evaluator can invoke by name.
pub trait Function: Send + Sync {
    fn arity(&self) -> Arity;
    fn call(&self, args: &[Option<Value>]) -> FunctionResult;
}

pub type Builtin = fn(args: &[Option<Value>]) -> FunctionResult;

struct Native {
    arity: Arity,
    func: Builtin,
}

impl Function for Native {
    fn arity(&self) -> Arity {
        self.arity
    }

    fn call(&self, args: &[Option<Value>]) -> FunctionResult {
        (self.func)(args)
    }
}

struct Closure<F> {
    arity: Arity,
    func: F,
}

impl<F> Function for Closure<F>
where
    F: Fn(&[Option<Value>]) -> FunctionResult + Send + Sync,
{
    fn arity(&self) -> Arity {
        self.arity
    }

    fn call(&self, args: &[Option<Value>]) -> FunctionResult {
        (self.func)(args)
    }
}

/// Functions by name, without the leading `$`.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in library.
    pub fn builtins() -> Self {
        let mut registry = Self::new();
        for &(name, arity, func) in BUILTIN_TABLE {
            registry.register(name, Arc::new(Native { arity, func }));
        }
        registry
    }

    /// Registers `function`, returning the one it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        function: Arc<dyn Function>,
    ) -> Option<Arc<dyn Function>> {
        self.functions.insert(name.into(), function)
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, arity: Arity, func: F)
    where
        F: Fn(&[Option<Value>]) -> FunctionResult + Send + Sync + 'static,
    {
        self.register(name, Arc::new(Closure { arity, func }));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Function>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// The built-in library, shared by every evaluation.
pub static BUILTINS: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::builtins);

const BUILTIN_TABLE: &[(&str, Arity, Builtin)] = &[
    // Strings
    ("string", Arity::exactly(1), fn_string),
    ("length", Arity::exactly(1), fn_length),
    ("substring", Arity::range(2, 3), fn_substring),
    ("substringBefore", Arity::exactly(2), fn_substring_before),
    ("substringAfter", Arity::exactly(2), fn_substring_after),
    ("uppercase", Arity::exactly(1), fn_uppercase),
    ("lowercase", Arity::exactly(1), fn_lowercase),
    ("trim", Arity::exactly(1), fn_trim),
    ("contains", Arity::exactly(2), fn_contains),
    ("split", Arity::range(2, 3), fn_split),
    ("join", Arity::range(1, 2), fn_join),
    ("replace", Arity::range(3, 4), fn_replace),
    // Numbers
    ("number", Arity::exactly(1), fn_number),
    ("abs", Arity::exactly(1), fn_abs),
    ("floor", Arity::exactly(1), fn_floor),
    ("ceil", Arity::exactly(1), fn_ceil),
    ("round", Arity::range(1, 2), fn_round),
    ("sqrt", Arity::exactly(1), fn_sqrt),
    ("power", Arity::exactly(2), fn_power),
    // Aggregates
    ("sum", Arity::exactly(1), fn_sum),
    ("max", Arity::exactly(1), fn_max),
    ("min", Arity::exactly(1), fn_min),
    ("average", Arity::exactly(1), fn_average),
    ("count", Arity::exactly(1), fn_count),
    // Booleans
    ("boolean", Arity::exactly(1), fn_boolean),
    ("not", Arity::exactly(1), fn_not),
    ("exists", Arity::exactly(1), fn_exists),
    // Arrays
    ("append", Arity::exactly(2), fn_append),
    ("reverse", Arity::exactly(1), fn_reverse),
    ("sort", Arity::exactly(1), fn_sort),
    ("distinct", Arity::exactly(1), fn_distinct),
    // Objects
    ("keys", Arity::exactly(1), fn_keys),
    ("lookup", Arity::exactly(2), fn_lookup),
    ("merge", Arity::exactly(1), fn_merge),
    ("type", Arity::exactly(1), fn_type),
];

// ============================================================================
// Argument helpers
// ============================================================================

fn arg(args: &[Option<Value>], index: usize) -> Option<&Value> {
    args.get(index).and_then(Option::as_ref)
}

fn wrong_type(name: &str, index: usize, expected: &str, found: &Value) -> FunctionError {
    FunctionError::new(format!(
        "argument {} of ${} must be {}, got {}",
        index + 1,
        name,
        expected,
        type_name(found)
    ))
}

fn string_arg<'v>(
    name: &str,
    args: &'v [Option<Value>],
    index: usize,
) -> Result<Option<&'v str>, FunctionError> {
    match arg(args, index) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(wrong_type(name, index, "a string", other)),
    }
}

fn number_arg(
    name: &str,
    args: &[Option<Value>],
    index: usize,
) -> Result<Option<Num>, FunctionError> {
    match arg(args, index) {
        None => Ok(None),
        Some(v) => Num::from_value(v)
            .map(Some)
            .ok_or_else(|| wrong_type(name, index, "a number", v)),
    }
}

fn integer_arg(
    name: &str,
    args: &[Option<Value>],
    index: usize,
) -> Result<Option<i64>, FunctionError> {
    Ok(number_arg(name, args, index)?.map(|n| match n {
        Num::Int(i) => i,
        Num::Float(f) => f.floor() as i64,
    }))
}

/// Arrays as their items, anything else as a single item.
fn items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(arr) => arr.iter().collect(),
        other => vec![other],
    }
}

fn numbers(name: &str, value: &Value) -> Result<Vec<Num>, FunctionError> {
    items(value)
        .into_iter()
        .map(|v| {
            Num::from_value(v).ok_or_else(|| {
                FunctionError::new(format!(
                    "${} expects an array of numbers, found {}",
                    name,
                    type_name(v)
                ))
            })
        })
        .collect()
}

fn number_value(n: Num) -> FunctionResult {
    n.into_value()
        .map(Some)
        .map_err(|e| FunctionError::new(e.to_string()))
}

fn string_value(s: impl Into<String>) -> FunctionResult {
    Ok(Some(Value::String(s.into())))
}

/// No value for an empty list, the item for one, an array otherwise.
fn collapse(mut values: Vec<Value>) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Value::Array(values)),
    }
}

// ============================================================================
// Strings
// ============================================================================

fn fn_string(args: &[Option<Value>]) -> FunctionResult {
    Ok(arg(args, 0).map(|v| Value::String(stringify(Some(v)))))
}

fn fn_length(args: &[Option<Value>]) -> FunctionResult {
    let Some(s) = string_arg("length", args, 0)? else {
        return Ok(None);
    };
    Ok(Some(Value::from(s.chars().count())))
}

fn fn_substring(args: &[Option<Value>]) -> FunctionResult {
    let Some(s) = string_arg("substring", args, 0)? else {
        return Ok(None);
    };
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;

    let start = integer_arg("substring", args, 1)?.unwrap_or(0);
    let start = if start < 0 {
        (len + start).max(0)
    } else {
        start.min(len)
    };
    let end = match integer_arg("substring", args, 2)? {
        Some(n) if n <= 0 => start,
        Some(n) => start.saturating_add(n).min(len),
        None => len,
    };

    string_value(chars[start as usize..end as usize].iter().collect::<String>())
}

fn fn_substring_before(args: &[Option<Value>]) -> FunctionResult {
    let Some(s) = string_arg("substringBefore", args, 0)? else {
        return Ok(None);
    };
    let Some(chars) = string_arg("substringBefore", args, 1)? else {
        return string_value(s);
    };
    string_value(s.find(chars).map_or(s, |at| &s[..at]))
}

fn fn_substring_after(args: &[Option<Value>]) -> FunctionResult {
    let Some(s) = string_arg("substringAfter", args, 0)? else {
        return Ok(None);
    };
    let Some(chars) = string_arg("substringAfter", args, 1)? else {
        return string_value(s);
    };
    string_value(s.find(chars).map_or(s, |at| &s[at + chars.len()..]))
}

fn fn_uppercase(args: &[Option<Value>]) -> FunctionResult {
    Ok(string_arg("uppercase", args, 0)?.map(|s| Value::String(s.to_uppercase())))
}

fn fn_lowercase(args: &[Option<Value>]) -> FunctionResult {
    Ok(string_arg("lowercase", args, 0)?.map(|s| Value::String(s.to_lowercase())))
}

/// Trims both ends and collapses inner whitespace runs to one space.
fn fn_trim(args: &[Option<Value>]) -> FunctionResult {
    Ok(string_arg("trim", args, 0)?
        .map(|s| Value::String(s.split_whitespace().collect::<Vec<_>>().join(" "))))
}

fn fn_contains(args: &[Option<Value>]) -> FunctionResult {
    let Some(s) = string_arg("contains", args, 0)? else {
        return Ok(None);
    };
    let pattern = string_arg("contains", args, 1)?.unwrap_or("");
    Ok(Some(Value::Bool(s.contains(pattern))))
}

fn fn_split(args: &[Option<Value>]) -> FunctionResult {
    let Some(s) = string_arg("split", args, 0)? else {
        return Ok(None);
    };
    let separator = string_arg("split", args, 1)?.unwrap_or("");
    let limit = match integer_arg("split", args, 2)? {
        Some(n) if n < 0 => {
            return Err(FunctionError::new("the limit of $split cannot be negative"));
        }
        Some(n) => n as usize,
        None => usize::MAX,
    };

    let parts: Vec<Value> = if separator.is_empty() {
        s.chars()
            .take(limit)
            .map(|c| Value::String(c.to_string()))
            .collect()
    } else {
        s.split(separator)
            .take(limit)
            .map(|p| Value::String(p.to_string()))
            .collect()
    };
    Ok(Some(Value::Array(parts)))
}

fn fn_join(args: &[Option<Value>]) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };
    let separator = string_arg("join", args, 1)?.unwrap_or("");

    let mut parts = Vec::new();
    for item in items(value) {
        match item {
            Value::String(s) => parts.push(s.as_str()),
            other => return Err(wrong_type("join", 0, "an array of strings", other)),
        }
    }
    string_value(parts.join(separator))
}

fn fn_replace(args: &[Option<Value>]) -> FunctionResult {
    let Some(s) = string_arg("replace", args, 0)? else {
        return Ok(None);
    };
    let pattern = string_arg("replace", args, 1)?.unwrap_or("");
    if pattern.is_empty() {
        return Err(FunctionError::new("the pattern of $replace cannot be empty"));
    }
    let replacement = string_arg("replace", args, 2)?.unwrap_or("");

    match integer_arg("replace", args, 3)? {
        Some(n) if n < 0 => Err(FunctionError::new("the limit of $replace cannot be negative")),
        Some(n) => string_value(s.replacen(pattern, replacement, n as usize)),
        None => string_value(s.replace(pattern, replacement)),
    }
}

// ============================================================================
// Numbers
// ============================================================================

fn fn_number(args: &[Option<Value>]) -> FunctionResult {
    match arg(args, 0) {
        None => Ok(None),
        Some(v @ Value::Number(_)) => Ok(Some(v.clone())),
        Some(Value::Bool(b)) => Ok(Some(Value::from(i64::from(*b)))),
        Some(Value::String(s)) => {
            let text = s.trim();
            if let Ok(n) = text.parse::<i64>() {
                return number_value(Num::Int(n));
            }
            match text.parse::<f64>() {
                Ok(f) if f.is_finite() => number_value(Num::Float(f)),
                _ => Err(FunctionError::new(format!(
                    "unable to cast \"{}\" to a number",
                    s
                ))),
            }
        }
        Some(other) => Err(wrong_type("number", 0, "a number, string or boolean", other)),
    }
}

fn fn_abs(args: &[Option<Value>]) -> FunctionResult {
    match number_arg("abs", args, 0)? {
        None => Ok(None),
        Some(Num::Int(n)) => match n.checked_abs() {
            Some(a) => number_value(Num::Int(a)),
            None => number_value(Num::Float((n as f64).abs())),
        },
        Some(Num::Float(f)) => number_value(Num::Float(f.abs())),
    }
}

fn fn_floor(args: &[Option<Value>]) -> FunctionResult {
    match number_arg("floor", args, 0)? {
        None => Ok(None),
        Some(Num::Float(f)) => number_value(Num::Float(f.floor()).normalized()),
        Some(n) => number_value(n),
    }
}

fn fn_ceil(args: &[Option<Value>]) -> FunctionResult {
    match number_arg("ceil", args, 0)? {
        None => Ok(None),
        Some(Num::Float(f)) => number_value(Num::Float(f.ceil()).normalized()),
        Some(n) => number_value(n),
    }
}

/// Rounds half to even, optionally to `precision` decimal places.
fn fn_round(args: &[Option<Value>]) -> FunctionResult {
    let Some(n) = number_arg("round", args, 0)? else {
        return Ok(None);
    };
    let precision = integer_arg("round", args, 1)?.unwrap_or(0);
    if !(-28..=28).contains(&precision) {
        return Err(FunctionError::new("the precision of $round must be between -28 and 28"));
    }
    // Rounding tolerates the nearest decimal when the exact one does not fit
    let Some(d) = n.to_decimal().or_else(|| Decimal::from_f64(n.as_f64())) else {
        return number_value(Num::Float(n.as_f64().round()).normalized());
    };

    let rounded = if precision >= 0 {
        Some(d.round_dp_with_strategy(precision as u32, RoundingStrategy::MidpointNearestEven))
    } else {
        round_to_multiple(d, Decimal::from_i128_with_scale(10_i128.pow((-precision) as u32), 0))
    };

    match rounded.and_then(Num::from_decimal) {
        Some(r) => number_value(r),
        None => Err(FunctionError::new("result of $round is out of range")),
    }
}

fn fn_sqrt(args: &[Option<Value>]) -> FunctionResult {
    let Some(n) = number_arg("sqrt", args, 0)? else {
        return Ok(None);
    };
    let f = n.as_f64();
    if f < 0.0 {
        return Err(FunctionError::new("$sqrt cannot be applied to a negative number"));
    }
    number_value(Num::Float(f.sqrt()).normalized())
}

fn fn_power(args: &[Option<Value>]) -> FunctionResult {
    let base = number_arg("power", args, 0)?;
    let exponent = number_arg("power", args, 1)?;
    let (Some(base), Some(exponent)) = (base, exponent) else {
        return Ok(None);
    };
    let result = base.as_f64().powf(exponent.as_f64());
    if !result.is_finite() {
        return Err(FunctionError::new("result of $power is out of range"));
    }
    number_value(Num::Float(result).normalized())
}

/// Rounds `d` half to even to a multiple of `unit`.
fn round_to_multiple(d: Decimal, unit: Decimal) -> Option<Decimal> {
    d.checked_div(unit)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .checked_mul(unit)
}

// ============================================================================
// Aggregates
// ============================================================================

fn total(name: &str, values: &[Num]) -> Result<Num, FunctionError> {
    values.iter().try_fold(Num::Int(0), |acc, n| {
        arithmetic(Arith::Add, acc, *n).map_err(|e| FunctionError::new(format!("${}: {}", name, e)))
    })
}

fn fn_sum(args: &[Option<Value>]) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };
    number_value(total("sum", &numbers("sum", value)?)?)
}

fn extreme(name: &str, args: &[Option<Value>], pick_greater: bool) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };
    let mut best: Option<Num> = None;
    for n in numbers(name, value)? {
        let better = match best {
            None => true,
            Some(b) if pick_greater => n.as_f64() > b.as_f64(),
            Some(b) => n.as_f64() < b.as_f64(),
        };
        if better {
            best = Some(n);
        }
    }
    best.map_or(Ok(None), number_value)
}

fn fn_max(args: &[Option<Value>]) -> FunctionResult {
    extreme("max", args, true)
}

fn fn_min(args: &[Option<Value>]) -> FunctionResult {
    extreme("min", args, false)
}

fn fn_average(args: &[Option<Value>]) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };
    let values = numbers("average", value)?;
    if values.is_empty() {
        return Ok(None);
    }
    let sum = total("average", &values)?;
    let count = Num::Int(values.len() as i64);
    arithmetic(Arith::Divide, sum, count)
        .map_err(|e| FunctionError::new(format!("$average: {}", e)))
        .and_then(number_value)
}

fn fn_count(args: &[Option<Value>]) -> FunctionResult {
    let count = match arg(args, 0) {
        None => 0,
        Some(Value::Array(arr)) => arr.len(),
        Some(_) => 1,
    };
    Ok(Some(Value::from(count)))
}

// ============================================================================
// Booleans
// ============================================================================

fn fn_boolean(args: &[Option<Value>]) -> FunctionResult {
    Ok(arg(args, 0).map(|v| Value::Bool(is_truthy(Some(v)))))
}

fn fn_not(args: &[Option<Value>]) -> FunctionResult {
    Ok(arg(args, 0).map(|v| Value::Bool(!is_truthy(Some(v)))))
}

fn fn_exists(args: &[Option<Value>]) -> FunctionResult {
    Ok(Some(Value::Bool(arg(args, 0).is_some())))
}

// ============================================================================
// Arrays
// ============================================================================

fn fn_append(args: &[Option<Value>]) -> FunctionResult {
    match (arg(args, 0), arg(args, 1)) {
        (None, other) | (other, None) => Ok(other.cloned()),
        (Some(a), Some(b)) => {
            let mut out: Vec<Value> = items(a).into_iter().cloned().collect();
            out.extend(items(b).into_iter().cloned());
            Ok(Some(Value::Array(out)))
        }
    }
}

fn fn_reverse(args: &[Option<Value>]) -> FunctionResult {
    Ok(arg(args, 0).map(|v| match v {
        Value::Array(arr) => Value::Array(arr.iter().rev().cloned().collect()),
        other => other.clone(),
    }))
}

fn fn_sort(args: &[Option<Value>]) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };
    let Value::Array(arr) = value else {
        return Ok(Some(value.clone()));
    };

    let all_numbers = arr.iter().all(Value::is_number);
    let all_strings = arr.iter().all(Value::is_string);
    if !all_numbers && !all_strings {
        return Err(FunctionError::new(
            "$sort can only sort arrays of all numbers or all strings",
        ));
    }

    let mut sorted = arr.clone();
    sorted.sort_by(|a, b| partial_order(a, b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Some(Value::Array(sorted)))
}

fn fn_distinct(args: &[Option<Value>]) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };
    let Value::Array(arr) = value else {
        return Ok(Some(value.clone()));
    };

    let mut seen: Vec<Value> = Vec::with_capacity(arr.len());
    for item in arr {
        if !seen.iter().any(|s| values_equal(s, item)) {
            seen.push(item.clone());
        }
    }
    Ok(Some(Value::Array(seen)))
}

// ============================================================================
// Objects
// ============================================================================

fn fn_keys(args: &[Option<Value>]) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };

    let mut keys: Vec<Value> = Vec::new();
    for item in items(value) {
        if let Value::Object(obj) = item {
            for key in obj.keys() {
                if !keys.iter().any(|k| k.as_str() == Some(key.as_str())) {
                    keys.push(Value::String(key.clone()));
                }
            }
        }
    }
    Ok(if keys.is_empty() {
        None
    } else {
        Some(Value::Array(keys))
    })
}

fn fn_lookup(args: &[Option<Value>]) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };
    let Some(key) = string_arg("lookup", args, 1)? else {
        return Ok(None);
    };

    let found = items(value)
        .into_iter()
        .filter_map(|item| item.as_object().and_then(|obj| obj.get(key)))
        .cloned()
        .collect();
    Ok(collapse(found))
}

fn fn_merge(args: &[Option<Value>]) -> FunctionResult {
    let Some(value) = arg(args, 0) else {
        return Ok(None);
    };

    let mut merged = Map::new();
    for item in items(value) {
        match item {
            Value::Object(obj) => {
                for (k, v) in obj {
                    merged.insert(k.clone(), v.clone());
                }
            }
            other => return Err(wrong_type("merge", 0, "an array of objects", other)),
        }
    }
    Ok(Some(Value::Object(merged)))
}

fn fn_type(args: &[Option<Value>]) -> FunctionResult {
    Ok(arg(args, 0).map(|v| Value::String(type_name(v).to_string())))
}
