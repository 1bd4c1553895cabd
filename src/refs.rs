//! Regex scan for the data an expression refers to.
//!
//! This is a textual scan, not a parse: matches inside string literals and
//! comments are reported too.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::options::Scope;

/// `$state.` references, capturing the dotted path after the scope.
pub static STATE_REFS: Lazy<Regex> =
    Lazy::new(|| scope_ref_pattern(Scope::State.name()).expect("valid scope pattern"));

/// `$event.` references, capturing the dotted path after the scope.
pub static EVENT_REFS: Lazy<Regex> =
    Lazy::new(|| scope_ref_pattern(Scope::Event.name()).expect("valid scope pattern"));

/// Pattern matching `$<scope>.a.b.c` and capturing `a.b.c`.
pub fn scope_ref_pattern(scope: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"\${}\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)",
        regex::escape(scope)
    ))
}

/// Capture group 1 of every match of `pattern` in `text`, left to right.
///
/// Duplicates are kept. Matches where group 1 did not take part add nothing.
///
/// # Examples
///
/// ```
/// use mapexpr::refs::{STATE_REFS, refs_in_expression};
///
/// let refs = refs_in_expression(&STATE_REFS, "$state.x.y + $event.a + ($state.c/2)");
/// assert_eq!(refs, vec!["x.y", "c"]);
/// ```
pub fn refs_in_expression(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
