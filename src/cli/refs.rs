//! List the scope references an expression contains

use super::CliError;
use crate::refs::{refs_in_expression, scope_ref_pattern};

/// Paths referenced under `$<scope>.` in `expression`, in order of appearance.
pub fn execute_refs(scope: &str, expression: &str) -> Result<Vec<String>, CliError> {
    let scope = scope.trim_start_matches('$');
    let pattern = scope_ref_pattern(scope)?;
    Ok(refs_in_expression(&pattern, expression))
}
