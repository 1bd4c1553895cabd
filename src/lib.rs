//! Parser and evaluator for a JSONata-family mapping expression language.
//!
//! ```
//! use mapexpr::Expression;
//! use serde_json::json;
//!
//! let expr = Expression::parse(r#"($state.name ~> $uppercase) & "!""#).unwrap();
//! let context = json!({"state": {"name": "ada"}});
//! assert_eq!(expr.evaluate(Some(&context)).unwrap(), Some(json!("ADA!")));
//! ```
pub mod ast;
pub mod diagnostics;
pub mod evaluator;
pub mod expression;
pub mod functions;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod refs;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, Node, Token, UnaryOp};
pub use diagnostics::{BufferingErrorListener, ErrorListener, SyntaxDiagnostic};
pub use evaluator::{EvalError, EvalErrorKind, Evaluator};
pub use expression::{Expression, ParseError, evaluate, parse};
pub use functions::{Arity, Function, FunctionError, FunctionRegistry};
pub use lexer::{Lexer, Position};
pub use options::{EvalOptions, RootMembers, Scope, ScopeBindings, ScopeResolver};
pub use parser::{Parser, tokenize_and_parse};
pub use refs::refs_in_expression;

/// Either kind of failure, for callers that parse and evaluate in one go.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
