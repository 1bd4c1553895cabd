use std::{cmp::Ordering, collections::HashMap, fmt, rc::Rc};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{BinOp, Expr, Node, Step, UnaryOp},
    functions::{Arity, BUILTINS},
    lexer::Position,
    options::{EvalOptions, Scope},
    value::{
        Arith, Num, arithmetic, describe, is_truthy, partial_order, stringify, type_name,
        values_equal,
    },
};

/// Largest number of items a range (`[a..b]`) may produce.
pub const MAX_RANGE_SIZE: u64 = 10_000_000;

/// How deeply evaluation may recurse through the syntax tree, lambda bodies
/// included.
pub const MAX_NESTING: usize = 200;

/// Which operand of an operator an error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Left,
    Right,
    Only,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Left => f.write_str("left operand"),
            Operand::Right => f.write_str("right operand"),
            Operand::Only => f.write_str("operand"),
        }
    }
}

/// What went wrong while evaluating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErrorKind {
    /// Operator applied to a value of the wrong kind
    #[error("operator '{op}' expects {expected} as its {side}, found {found}")]
    OperandType {
        op: &'static str,
        side: Operand,
        expected: &'static str,
        found: &'static str,
    },

    #[error("variable '${0}' is not defined")]
    UnresolvedVariable(String),

    /// A named scope the resolver has no value for
    #[error("scope '{0}' is not bound")]
    UnresolvedScope(Scope),

    #[error("function '${0}' is not defined")]
    UnresolvedFunction(String),

    #[error("function '${name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        found: usize,
    },

    /// A function body reported a failure
    #[error("function '${name}' failed: {message}")]
    Function { name: String, message: String },

    #[error("{0} is not a function")]
    NotAFunction(String),

    #[error("a function cannot be used as a value")]
    NotAValue,

    #[error("object keys must be strings, found {0}")]
    InvalidKey(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("number out of range")]
    NumberOutOfRange,

    #[error("range of {0} items exceeds the limit of {max}", max = MAX_RANGE_SIZE)]
    RangeTooLarge(u64),

    #[error("maximum evaluation depth of {0} exceeded")]
    DepthExceeded(usize),

    /// An error node left by the parser
    #[error("expression contains a syntax error at '{0}'")]
    Syntax(String),
}

/// An evaluation failure and, when known, where in the expression it happened.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}{}", at_suffix(.position))]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub position: Option<Position>,
}

fn at_suffix(position: &Option<Position>) -> String {
    position.map_or_else(String::new, |p| format!(" at {}", p))
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            position: None,
        }
    }

    /// Records `position` unless a more precise one is already known.
    pub fn at(mut self, position: Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }

    pub fn kind(&self) -> &EvalErrorKind {
        &self.kind
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

type EvalResult = Result<Option<Value>, EvalError>;

type Frame<'a> = HashMap<String, Binding<'a>>;

#[derive(Clone)]
enum Binding<'a> {
    Value(Option<Value>),
    Lambda(Rc<Closure<'a>>),
}

/// A lambda together with the bindings visible where it was defined.
struct Closure<'a> {
    params: &'a [String],
    body: &'a Node,
    captured: Frame<'a>,
}

/// Tree-walking evaluator.
///
/// An evaluator lives for a single evaluation: it borrows the root document,
/// the options and the syntax tree, and owns the variable bindings created
/// while evaluating.
pub struct Evaluator<'a> {
    root: Option<&'a Value>,
    options: &'a EvalOptions,
    frames: Vec<Frame<'a>>,
    depth: usize,
    nesting: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(root: Option<&'a Value>, options: &'a EvalOptions) -> Self {
        Evaluator {
            root,
            options,
            frames: vec![HashMap::new()],
            depth: 0,
            nesting: 0,
        }
    }

    /// Evaluates `node` with the root document as the focus.
    ///
    /// `Ok(None)` means the expression produced no value.
    pub fn evaluate(&mut self, node: &'a Node) -> EvalResult {
        let root = self.root;
        self.eval(node, root)
    }

    fn eval(&mut self, node: &'a Node, focus: Option<&Value>) -> EvalResult {
        if self.nesting >= MAX_NESTING {
            return Err(EvalError::new(EvalErrorKind::DepthExceeded(MAX_NESTING)).at(node.pos));
        }
        self.nesting += 1;
        let result = self.eval_expr(node, focus).map_err(|e| e.at(node.pos));
        self.nesting -= 1;
        result
    }

    fn eval_expr(&mut self, node: &'a Node, focus: Option<&Value>) -> EvalResult {
        match &node.expr {
            Expr::Float(n) => Ok(Some(Num::Float(*n).into_value()?)),
            Expr::Integer(n) => Ok(Some(Value::from(*n))),
            Expr::String(s) => Ok(Some(Value::String(s.clone()))),
            Expr::Boolean(b) => Ok(Some(Value::Bool(*b))),
            Expr::Null => Ok(Some(Value::Null)),

            Expr::Path(steps) => self.eval_path(steps, focus),
            Expr::Name(_) | Expr::Wildcard | Expr::Descendants => {
                let mut out = Vec::new();
                navigate(&node.expr, focus, &mut out);
                Ok(collapse(out))
            }

            Expr::Context => Ok(focus.cloned()),
            Expr::Root => Ok(self.root.cloned()),
            Expr::Variable(name) => self.lookup_variable(name),

            Expr::BinaryOp { op, left, right } => {
                let left_value = self.eval(left, focus)?;
                let right_value = self.eval(right, focus)?;
                // Operand errors point at the offending operand
                apply_binop(*op, left_value, right_value).map_err(|e| match e.kind {
                    EvalErrorKind::OperandType {
                        side: Operand::Left,
                        ..
                    } => e.at(left.pos),
                    EvalErrorKind::OperandType {
                        side: Operand::Right,
                        ..
                    } => e.at(right.pos),
                    _ => e,
                })
            }
            Expr::UnaryOp {
                op: UnaryOp::Negate,
                operand,
            } => match self.eval(operand, focus)? {
                None => Ok(None),
                Some(v) => {
                    let n = number_operand("-", Operand::Only, &v).map_err(|e| e.at(operand.pos))?;
                    Ok(Some(arithmetic(Arith::Subtract, Num::Int(0), n)?.into_value()?))
                }
            },

            Expr::Chain { left, right } => self.eval_chain(left, right, focus),
            Expr::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg, focus))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call_function(name, values, focus)
            }

            Expr::Object(pairs) => self.eval_object(pairs, focus),
            Expr::Array(items) => self.eval_array(items, focus),
            Expr::Range { from, to } => {
                let mut out = Vec::new();
                self.expand_range(from, to, focus, &mut out)?;
                Ok(Some(Value::Array(out)))
            }

            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.eval(condition, focus)?;
                if is_truthy(condition.as_ref()) {
                    self.eval(then, focus)
                } else if let Some(otherwise) = otherwise {
                    self.eval(otherwise, focus)
                } else {
                    Ok(None)
                }
            }
            Expr::Block(exprs) => {
                let base = self.frames.len();
                self.frames.push(HashMap::new());
                let mut result = Ok(None);
                for expr in exprs {
                    result = self.eval(expr, focus);
                    if result.is_err() {
                        break;
                    }
                }
                self.frames.truncate(base);
                result
            }
            Expr::Assign { name, value } => self.eval_assign(name, value, focus),

            Expr::Lambda { .. } => Err(EvalErrorKind::NotAValue.into()),
            Expr::Error(token) => Err(EvalErrorKind::Syntax(token.to_string()).into()),
        }
    }

    // ========================================
    // Paths
    // ========================================

    fn eval_path(&mut self, steps: &'a [Step], focus: Option<&Value>) -> EvalResult {
        let Some((first, rest)) = steps.split_first() else {
            return Ok(None);
        };

        let mut current = self.eval_step(first, focus, true)?;
        for step in rest {
            if current.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for item in &current {
                next.extend(self.eval_step(step, Some(item), false)?);
            }
            current = next;
        }
        Ok(collapse(current))
    }

    /// Output of one step for one input item, predicates applied.
    fn eval_step(
        &mut self,
        step: &'a Step,
        focus: Option<&Value>,
        first: bool,
    ) -> Result<Vec<Value>, EvalError> {
        let mut out = Vec::new();

        if step.node.expr.is_navigation() {
            navigate(&step.node.expr, focus, &mut out);
        } else {
            let keep_whole = !first && matches!(step.node.expr, Expr::Array(_));
            match self.eval(&step.node, focus)? {
                None => {}
                Some(Value::Array(arr)) if !keep_whole => out.extend(arr),
                Some(v) => out.push(v),
            }
        }

        for stage in &step.stages {
            out = self.apply_stage(stage, out)?;
        }
        Ok(out)
    }

    /// Filters `items` by a predicate, or selects from them by index.
    fn apply_stage(&mut self, stage: &'a Node, items: Vec<Value>) -> Result<Vec<Value>, EvalError> {
        let len = items.len();
        let mut kept = Vec::new();

        for (index, item) in items.into_iter().enumerate() {
            let verdict = self.eval(stage, Some(&item))?;
            let keep = match &verdict {
                Some(v @ Value::Number(_)) => {
                    Num::from_value(v).is_some_and(|n| index_matches(n, index, len))
                }
                other => is_truthy(other.as_ref()),
            };
            if keep {
                kept.push(item);
            }
        }
        Ok(kept)
    }

    // ========================================
    // Variables and bindings
    // ========================================

    fn lookup_binding(&self, name: &str) -> Option<&Binding<'a>> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    fn bind(&mut self, name: &str, binding: Binding<'a>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), binding);
        }
    }

    /// Environment first, then the named scopes, then caller variables.
    fn lookup_variable(&self, name: &str) -> EvalResult {
        if let Some(binding) = self.lookup_binding(name) {
            return match binding {
                Binding::Value(v) => Ok(v.clone()),
                Binding::Lambda(_) => Err(EvalErrorKind::NotAValue.into()),
            };
        }

        if let Some(scope) = Scope::from_name(name) {
            return match self.options.resolver.resolve(scope, self.root) {
                Some(value) => Ok(Some(value)),
                None => Err(EvalErrorKind::UnresolvedScope(scope).into()),
            };
        }

        match self.options.variables.get(name) {
            Some(value) => Ok(Some(value.clone())),
            None => Err(EvalErrorKind::UnresolvedVariable(name.to_string()).into()),
        }
    }

    fn eval_assign(&mut self, name: &str, value: &'a Node, focus: Option<&Value>) -> EvalResult {
        if let Expr::Lambda { params, body } = &value.expr {
            let closure = self.make_closure(params, body);
            self.bind(name, Binding::Lambda(closure));
            return Ok(None);
        }

        // `$g := $f` aliases a function
        if let Expr::Variable(source) = &value.expr
            && let Some(Binding::Lambda(closure)) = self.lookup_binding(source)
        {
            let closure = Rc::clone(closure);
            self.bind(name, Binding::Lambda(closure));
            return Ok(None);
        }

        let result = self.eval(value, focus)?;
        self.bind(name, Binding::Value(result.clone()));
        Ok(result)
    }

    // ========================================
    // Functions
    // ========================================

    fn make_closure(&self, params: &'a [String], body: &'a Node) -> Rc<Closure<'a>> {
        let mut captured = HashMap::new();
        for frame in &self.frames {
            for (name, binding) in frame {
                captured.insert(name.clone(), binding.clone());
            }
        }
        Rc::new(Closure {
            params,
            body,
            captured,
        })
    }

    fn eval_chain(&mut self, left: &'a Node, right: &'a Node, focus: Option<&Value>) -> EvalResult {
        let input = self.eval(left, focus)?;

        match &right.expr {
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len() + 1);
                values.push(input);
                for arg in args {
                    values.push(self.eval(arg, focus)?);
                }
                self.call_function(name, values, focus)
                    .map_err(|e| e.at(right.pos))
            }
            Expr::Variable(name) => self
                .call_function(name, vec![input], focus)
                .map_err(|e| e.at(right.pos)),
            Expr::Lambda { params, body } => {
                let closure = self.make_closure(params, body);
                self.invoke(&closure, "lambda", vec![input], focus)
                    .map_err(|e| e.at(right.pos))
            }
            other => Err(EvalError::new(EvalErrorKind::NotAFunction(
                expr_kind(other).to_string(),
            ))
            .at(right.pos)),
        }
    }

    /// Lambdas in the environment, then caller functions, then built-ins.
    fn call_function(
        &mut self,
        name: &str,
        args: Vec<Option<Value>>,
        focus: Option<&Value>,
    ) -> EvalResult {
        let closure = match self.lookup_binding(name) {
            Some(Binding::Lambda(closure)) => Some(Rc::clone(closure)),
            Some(Binding::Value(_)) => {
                return Err(EvalErrorKind::NotAFunction(format!("'${}'", name)).into());
            }
            None => None,
        };
        if let Some(closure) = closure {
            return self.invoke(&closure, name, args, focus);
        }

        let options = self.options;
        let function = options
            .functions
            .get(name)
            .or_else(|| BUILTINS.get(name))
            .ok_or_else(|| EvalErrorKind::UnresolvedFunction(name.to_string()))?;

        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(EvalErrorKind::ArityMismatch {
                name: name.to_string(),
                expected: arity,
                found: args.len(),
            }
            .into());
        }

        trace!(function = name, args = args.len(), "calling function");
        function.call(&args).map_err(|e| {
            EvalErrorKind::Function {
                name: name.to_string(),
                message: e.message,
            }
            .into()
        })
    }

    fn invoke(
        &mut self,
        closure: &Closure<'a>,
        name: &str,
        args: Vec<Option<Value>>,
        focus: Option<&Value>,
    ) -> EvalResult {
        if args.len() > closure.params.len() {
            return Err(EvalErrorKind::ArityMismatch {
                name: name.to_string(),
                expected: Arity::range(0, closure.params.len()),
                found: args.len(),
            }
            .into());
        }
        if self.depth >= self.options.max_depth {
            return Err(EvalErrorKind::DepthExceeded(self.options.max_depth).into());
        }

        let mut args = args.into_iter();
        let params: Frame<'a> = closure
            .params
            .iter()
            .map(|param| (param.clone(), Binding::Value(args.next().flatten())))
            .collect();

        let base = self.frames.len();
        self.frames.push(closure.captured.clone());
        self.frames.push(params);
        self.depth += 1;

        let result = self.eval(closure.body, focus);

        self.depth -= 1;
        self.frames.truncate(base);
        result
    }

    // ========================================
    // Constructors
    // ========================================

    fn eval_object(&mut self, pairs: &'a [(Node, Node)], focus: Option<&Value>) -> EvalResult {
        let mut object = Map::new();

        for (key_node, value_node) in pairs {
            let key = match self.eval(key_node, focus)? {
                Some(Value::String(key)) => key,
                other => {
                    let found = other.as_ref().map_or_else(|| "no value".to_string(), describe);
                    return Err(EvalError::new(EvalErrorKind::InvalidKey(found)).at(key_node.pos));
                }
            };
            // Inserting an existing key keeps its position
            if let Some(value) = self.eval(value_node, focus)? {
                object.insert(key, value);
            }
        }
        Ok(Some(Value::Object(object)))
    }

    fn eval_array(&mut self, items: &'a [Node], focus: Option<&Value>) -> EvalResult {
        let mut out = Vec::new();

        for item in items {
            match &item.expr {
                Expr::Range { from, to } => self
                    .expand_range(from, to, focus, &mut out)
                    .map_err(|e| e.at(item.pos))?,
                Expr::Array(_) => out.extend(self.eval(item, focus)?),
                _ => match self.eval(item, focus)? {
                    None => {}
                    Some(Value::Array(arr)) => out.extend(arr),
                    Some(v) => out.push(v),
                },
            }
        }
        Ok(Some(Value::Array(out)))
    }

    fn range_bound(
        &mut self,
        node: &'a Node,
        side: Operand,
        focus: Option<&Value>,
    ) -> Result<Option<i64>, EvalError> {
        let Some(value) = self.eval(node, focus)? else {
            return Ok(None);
        };
        match Num::from_value(&value).map(Num::normalized) {
            Some(Num::Int(n)) => Ok(Some(n)),
            _ => Err(EvalError::new(EvalErrorKind::OperandType {
                op: "..",
                side,
                expected: "an integer",
                found: type_name(&value),
            })
            .at(node.pos)),
        }
    }

    fn expand_range(
        &mut self,
        from: &'a Node,
        to: &'a Node,
        focus: Option<&Value>,
        out: &mut Vec<Value>,
    ) -> Result<(), EvalError> {
        let start = self.range_bound(from, Operand::Left, focus)?;
        let end = self.range_bound(to, Operand::Right, focus)?;
        let (Some(start), Some(end)) = (start, end) else {
            return Ok(());
        };
        if start > end {
            return Ok(());
        }

        let size = u64::try_from(i128::from(end) - i128::from(start) + 1).unwrap_or(u64::MAX);
        if size > MAX_RANGE_SIZE {
            return Err(EvalErrorKind::RangeTooLarge(size).into());
        }
        out.extend((start..=end).map(Value::from));
        Ok(())
    }
}

// ========================================
// Navigation
// ========================================

fn push_flattened(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(arr) => out.extend(arr.iter().cloned()),
        other => out.push(other.clone()),
    }
}

/// Applies a name, wildcard or descendant step to `focus`. Arrays are
/// sequences: the step applies to each of their items.
fn navigate(step: &Expr, focus: Option<&Value>, out: &mut Vec<Value>) {
    let Some(value) = focus else {
        return;
    };

    match (step, value) {
        (Expr::Descendants, _) => descendants(value, out),
        (_, Value::Array(arr)) => {
            for item in arr {
                navigate(step, Some(item), out);
            }
        }
        (Expr::Name(name), Value::Object(obj)) => {
            if let Some(member) = obj.get(name) {
                push_flattened(member, out);
            }
        }
        (Expr::Wildcard, Value::Object(obj)) => {
            for member in obj.values() {
                push_flattened(member, out);
            }
        }
        _ => {}
    }
}

/// `value` itself and everything nested below it.
fn descendants(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(arr) => {
            for item in arr {
                descendants(item, out);
            }
        }
        Value::Object(obj) => {
            out.push(value.clone());
            for member in obj.values() {
                descendants(member, out);
            }
        }
        other => out.push(other.clone()),
    }
}

fn index_matches(n: Num, index: usize, len: usize) -> bool {
    let mut wanted = n.as_f64().floor();
    if wanted < 0.0 {
        wanted += len as f64;
    }
    wanted == index as f64
}

/// Empty sequence is no value, a single item is itself, more is an array.
fn collapse(mut items: Vec<Value>) -> Option<Value> {
    match items.len() {
        0 => None,
        1 => items.pop(),
        _ => Some(Value::Array(items)),
    }
}

// ========================================
// Operators
// ========================================

fn number_operand(op: &'static str, side: Operand, value: &Value) -> Result<Num, EvalError> {
    Num::from_value(value).ok_or_else(|| {
        EvalErrorKind::OperandType {
            op,
            side,
            expected: "a number",
            found: type_name(value),
        }
        .into()
    })
}

fn apply_arithmetic(
    op: BinOp,
    arith: Arith,
    left: Option<Value>,
    right: Option<Value>,
) -> EvalResult {
    let (Some(left), Some(right)) = (left, right) else {
        return Ok(None);
    };
    let a = number_operand(op.symbol(), Operand::Left, &left)?;
    let b = number_operand(op.symbol(), Operand::Right, &right)?;
    Ok(Some(arithmetic(arith, a, b)?.into_value()?))
}

fn apply_comparison(
    op: BinOp,
    left: Option<Value>,
    right: Option<Value>,
    test: fn(Ordering) -> bool,
) -> EvalResult {
    let (Some(left), Some(right)) = (left, right) else {
        return Ok(Some(Value::Bool(false)));
    };

    let expected = match &left {
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        other => {
            return Err(EvalErrorKind::OperandType {
                op: op.symbol(),
                side: Operand::Left,
                expected: "a number or a string",
                found: type_name(other),
            }
            .into());
        }
    };
    match partial_order(&left, &right) {
        Some(ordering) => Ok(Some(Value::Bool(test(ordering)))),
        None => Err(EvalErrorKind::OperandType {
            op: op.symbol(),
            side: Operand::Right,
            expected,
            found: type_name(&right),
        }
        .into()),
    }
}

fn apply_binop(op: BinOp, left: Option<Value>, right: Option<Value>) -> EvalResult {
    match op {
        BinOp::Add => apply_arithmetic(op, Arith::Add, left, right),
        BinOp::Subtract => apply_arithmetic(op, Arith::Subtract, left, right),
        BinOp::Multiply => apply_arithmetic(op, Arith::Multiply, left, right),
        BinOp::Divide => apply_arithmetic(op, Arith::Divide, left, right),
        BinOp::Modulo => apply_arithmetic(op, Arith::Modulo, left, right),

        BinOp::Concat => {
            let mut s = stringify(left.as_ref());
            s.push_str(&stringify(right.as_ref()));
            Ok(Some(Value::String(s)))
        }

        BinOp::Equal => Ok(Some(Value::Bool(match (&left, &right) {
            (Some(a), Some(b)) => values_equal(a, b),
            _ => false,
        }))),
        BinOp::NotEqual => Ok(Some(Value::Bool(match (&left, &right) {
            (Some(a), Some(b)) => !values_equal(a, b),
            _ => false,
        }))),
        BinOp::LessThan => apply_comparison(op, left, right, Ordering::is_lt),
        BinOp::LessEqual => apply_comparison(op, left, right, Ordering::is_le),
        BinOp::GreaterThan => apply_comparison(op, left, right, Ordering::is_gt),
        BinOp::GreaterEqual => apply_comparison(op, left, right, Ordering::is_ge),

        BinOp::In => Ok(Some(Value::Bool(match (&left, &right) {
            (Some(needle), Some(Value::Array(arr))) => arr.iter().any(|v| values_equal(needle, v)),
            (Some(needle), Some(other)) => values_equal(needle, other),
            _ => false,
        }))),

        BinOp::And => Ok(Some(Value::Bool(
            is_truthy(left.as_ref()) && is_truthy(right.as_ref()),
        ))),
        BinOp::Or => Ok(Some(Value::Bool(
            is_truthy(left.as_ref()) || is_truthy(right.as_ref()),
        ))),
    }
}

/// How an expression that cannot be called is named in errors.
fn expr_kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::Float(_) | Expr::Integer(_) => "a number",
        Expr::String(_) => "a string",
        Expr::Boolean(_) => "a boolean",
        Expr::Null => "null",
        Expr::Path(_) | Expr::Name(_) | Expr::Wildcard | Expr::Descendants => "a path",
        Expr::Context | Expr::Root => "a context reference",
        Expr::Variable(_) => "a variable",
        Expr::BinaryOp { .. } | Expr::UnaryOp { .. } => "an operator expression",
        Expr::Chain { .. } => "a chain",
        Expr::Call { .. } => "a function call",
        Expr::Object(_) => "an object constructor",
        Expr::Array(_) | Expr::Range { .. } => "an array constructor",
        Expr::Conditional { .. } => "a conditional",
        Expr::Block(_) => "a block",
        Expr::Assign { .. } => "an assignment",
        Expr::Lambda { .. } => "a lambda",
        Expr::Error(_) => "an invalid expression",
    }
}
