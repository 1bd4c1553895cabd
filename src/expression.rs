use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{Expr, Node, Token},
    diagnostics::{BufferingErrorListener, SyntaxDiagnostic, join_diagnostics},
    evaluator::{EvalError, Evaluator},
    options::EvalOptions,
    parser::tokenize_and_parse,
};

/// Why an expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Every diagnostic reported while tokenizing and parsing, in order
    #[error("{}", join_diagnostics(.0))]
    Syntax(Vec<SyntaxDiagnostic>),

    /// The expression starts with `~>` and has nothing to chain from
    #[error("the function chain operator '~>' cannot be used as a unary operator")]
    ChainNotUnary,
}

impl ParseError {
    /// Diagnostics behind a syntax error; empty for [`ParseError::ChainNotUnary`].
    pub fn diagnostics(&self) -> &[SyntaxDiagnostic] {
        match self {
            ParseError::Syntax(diagnostics) => diagnostics,
            ParseError::ChainNotUnary => &[],
        }
    }
}

static DEFAULT_OPTIONS: Lazy<EvalOptions> = Lazy::new(EvalOptions::default);

/// A parsed expression, ready to be evaluated any number of times.
///
/// Holds only the source text and its syntax tree; evaluation state lives in
/// a fresh [`Evaluator`] per call, so one `Expression` can be shared between
/// threads and evaluated concurrently.
///
/// # Examples
///
/// ```
/// use mapexpr::Expression;
/// use serde_json::json;
///
/// let expr = Expression::parse("$state.price * $event.quantity").unwrap();
/// let context = json!({"state": {"price": 2.5}, "event": {"quantity": 4}});
///
/// assert_eq!(expr.evaluate(Some(&context)).unwrap(), Some(json!(10)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Node,
}

impl Expression {
    /// Parses `text`.
    ///
    /// All syntax problems are collected before failing. Empty or blank text
    /// is a syntax error.
    pub fn parse(text: &str) -> Result<Expression, ParseError> {
        trace!(expression = text, "parsing");
        let mut listener = BufferingErrorListener::new();
        let ast = tokenize_and_parse(text, &mut listener);

        if listener.heard_errors() {
            let error = match ast.expr {
                Expr::Error(Token::Chain) => ParseError::ChainNotUnary,
                _ => ParseError::Syntax(listener.into_diagnostics()),
            };
            debug!(expression = text, %error, "parse failed");
            return Err(error);
        }

        Ok(Expression {
            source: text.to_string(),
            ast,
        })
    }

    /// Evaluates against `root` with default options.
    ///
    /// `Ok(None)` means the expression produced no value, which is different
    /// from `Ok(Some(Value::Null))`.
    pub fn evaluate(&self, root: Option<&Value>) -> Result<Option<Value>, EvalError> {
        self.evaluate_with(root, &DEFAULT_OPTIONS)
    }

    pub fn evaluate_with(
        &self,
        root: Option<&Value>,
        options: &EvalOptions,
    ) -> Result<Option<Value>, EvalError> {
        trace!(expression = %self.source, "evaluating");
        Evaluator::new(root, options)
            .evaluate(&self.ast)
            .inspect_err(|error| debug!(expression = %self.source, %error, "evaluation failed"))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Node {
        &self.ast
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::parse(s)
    }
}

/// Shortcut for [`Expression::parse`].
pub fn parse(text: &str) -> Result<Expression, ParseError> {
    Expression::parse(text)
}

/// Parses `text` and evaluates it once against `root`.
pub fn evaluate(text: &str, root: Option<&Value>) -> Result<Option<Value>, crate::Error> {
    Ok(Expression::parse(text)?.evaluate(root)?)
}
