//! Parse expressions and evaluate them against JSON input

use serde_json::Value;
use tracing::debug;

use super::CliError;
use crate::Expression;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON input string, the root document of the evaluation
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// The expression produced a value
    Success(Value),
    /// The expression evaluated without producing a value
    NoValue,
}

impl CheckResult {
    /// Text for stdout; `None` when there is nothing to print.
    pub fn render(&self, pretty: bool) -> Result<Option<String>, CliError> {
        match self {
            CheckResult::SyntaxValid => Ok(Some("Syntax is valid".to_string())),
            CheckResult::Success(value) if pretty => Ok(Some(serde_json::to_string_pretty(value)?)),
            CheckResult::Success(value) => Ok(Some(serde_json::to_string(value)?)),
            CheckResult::NoValue => Ok(None),
        }
    }
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let expression = Expression::parse(&options.expression)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let root: Value = serde_json::from_str(json_str)?;
    debug!(input_bytes = json_str.len(), "input parsed");

    Ok(match expression.evaluate(Some(&root))? {
        Some(value) => CheckResult::Success(value),
        None => CheckResult::NoValue,
    })
}
