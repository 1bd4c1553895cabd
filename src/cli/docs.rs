//! Documentation content for the mapexpr CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Scopes,
    Functions,
    Errors,
}

impl DocCategory {
    pub const ALL: [DocCategory; 5] = [
        DocCategory::Syntax,
        DocCategory::Operators,
        DocCategory::Scopes,
        DocCategory::Functions,
        DocCategory::Errors,
    ];

    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "syntax" | "paths" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "scopes" | "scope" | "variables" => Some(Self::Scopes),
            "functions" | "function" | "builtins" => Some(Self::Functions),
            "errors" | "error" => Some(Self::Errors),
            _ => None,
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            DocCategory::Syntax => SYNTAX_DOC,
            DocCategory::Operators => OPERATORS_DOC,
            DocCategory::Scopes => SCOPES_DOC,
            DocCategory::Functions => FUNCTIONS_DOC,
            DocCategory::Errors => ERRORS_DOC,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"MAPEXPR DOCUMENTATION

mapexpr evaluates JSONata-style mapping expressions against a JSON document.
Expressions read values from the document and the named scopes ($state,
$event, $instance) and build new values from them.

DOCUMENTATION CATEGORIES

  syntax       Paths, predicates, literals and constructors
  operators    Arithmetic, comparison, logical, concatenation and chaining
  scopes       $$, $, the named scopes, variables, blocks and lambdas
  functions    The built-in function library
  errors       Syntax errors and evaluation errors

QUICK REFERENCE

  $$                     Root document
  $state.orders          Member of a named scope
  orders[total > 10]     Predicate filter
  items[-1]              Last item
  {"k": v}  [a, b]       Object and array constructors
  x ~> $f(y)             Same as $f(x, y)

Run 'mapexpr doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    DocCategory::from_name(name)
        .map(DocCategory::content)
        .ok_or_else(|| CliError::UnknownCategory(name.to_string()))
}

const SYNTAX_DOC: &str = r#"SYNTAX - Paths, Predicates and Constructors

PATHS
  name.other.deeper
    Navigate object members from the current value. A member that does not
    exist produces no value, which is different from a stored null.

    Example:
      Input:  {"user": {"name": "Alice"}}
      Expr:   user.name
      Output: "Alice"

  `odd name`
    Backticks quote member names that are not identifiers.

  *      Values of all members
  **     The value and everything nested below it

SEQUENCES
  A step applied to an array applies to each item, and array results are
  flattened into one sequence:

    Input:  {"orders": [{"items": [1, 2]}, {"items": [3]}]}
    Expr:   orders.items
    Output: [1, 2, 3]

  An empty sequence is no value, a single item is returned as itself.

PREDICATES
  orders[total > 100]    Keep items for which the predicate is truthy
  orders[0]              Select by index, zero based
  orders[-1]             Negative indices count from the end

LITERALS
  42  3.14  1e3  "text"  'text'  true  false  null

CONSTRUCTORS
  {"id": id, "total": price * qty}
    Keys must evaluate to strings. Entries whose value is missing are left
    out. A repeated key keeps its first position and its last value.

  [1, 2, [3, 4], 5..7]
    Nested array constructors stay nested, other arrays are flattened in.
    a..b is an integer range.

COMMENTS
  /* ... */
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - From Lowest to Highest Precedence

  :=                 Bind a variable (right associative)
  ? :                Conditional (right associative)
  or
  and
  = != < <= > >= in  Comparison, membership
  ~>                 Function chaining (same level as comparison)
  + - &              Addition, subtraction, string concatenation
  * / %              Multiplication, division, remainder
  -                  Negation

ARITHMETIC
  Numbers only. A missing operand makes the result missing; any other
  non-number, null included, is an error. Integer results stay integers,
  mixed arithmetic is exact in decimal (0.1 + 0.2 = 0.3).

COMPARISON
  = and != compare deeply, 1 equals 1.0. Ordering operators need two
  numbers or two strings. A missing operand makes any comparison false.

CONCATENATION
  "a" & 1 & true   gives "a1true". Missing operands count as "".

LOGICAL
  and / or use truthiness: false, null, 0, "", [], {} and missing values
  are false, everything else is true.

CHAINING
  $state.name ~> $trim ~> $uppercase
  $event.text ~> $substring(0, 3)       Same as $substring($event.text, 0, 3)
"#;

const SCOPES_DOC: &str = r#"SCOPES - Contexts, Variables, Blocks and Lambdas

CONTEXTS
  $$          The root document of the evaluation
  $           The current value (the root at the top level, the item inside
              a predicate or a later path step)

NAMED SCOPES
  $state  $event  $instance
    By default each is the member of the root document with the same name.
    Embedders can bind them explicitly instead. Using a scope that has no
    value is an error, not a missing value.

VARIABLES
  ($total := $sum(items.price); $total * 1.2)
    Blocks evaluate expressions in order and return the last one. Variables
    bound inside a block are not visible outside of it.

LAMBDAS
  ($double := function($x) { $x * 2 }; $double(21))
  $event.count ~> function($n) { $n + 1 }
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Built-in Library

Most functions return no value when their first argument is missing.

STRINGS
  $string(v)  $length(s)  $substring(s, start, len?)
  $substringBefore(s, chars)  $substringAfter(s, chars)
  $uppercase(s)  $lowercase(s)  $trim(s)  $contains(s, part)
  $split(s, separator, limit?)  $join(array, separator?)
  $replace(s, pattern, replacement, limit?)

NUMBERS
  $number(v)  $abs(n)  $floor(n)  $ceil(n)  $round(n, precision?)
  $sqrt(n)  $power(base, exponent)

AGGREGATES
  $sum(a)  $max(a)  $min(a)  $average(a)  $count(a)

BOOLEANS
  $boolean(v)  $not(v)  $exists(v)

ARRAYS
  $append(a, b)  $reverse(a)  $sort(a)  $distinct(a)

OBJECTS
  $keys(o)  $lookup(o, key)  $merge(array)

TYPES
  $type(v)    "null", "boolean", "number", "string", "array" or "object"
"#;

const ERRORS_DOC: &str = r#"ERRORS - Parse Errors and Evaluation Errors

PARSE ERRORS
  All problems in the text are reported together, one per line:

    line 1:4 mismatched input '<EOF>' expecting an expression

  An expression that starts with ~> has nothing to chain from and gets a
  dedicated message:

    the function chain operator '~>' cannot be used as a unary operator

  Expressions nested more than 100 levels deep stop at the first level too
  many with "expression nested too deeply".

EVALUATION ERRORS
  Reported with the position of the innermost failing part:

    operator '+' expects a number as its right operand, found string at line 1, column 4

  Other failures: undefined variables and functions, unbound scopes, wrong
  argument counts, non-string object keys, division by zero, oversized
  ranges and too deeply nested calls or sub-expressions.

NO VALUE
  An expression that produces nothing, like a path to a missing member, is
  not an error. The CLI prints "(no value)" on stderr and nothing on stdout.
"#;
