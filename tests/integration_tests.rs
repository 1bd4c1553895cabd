use mapexpr::evaluator::Operand;
use mapexpr::{
    Arity, EvalError, EvalErrorKind, EvalOptions, Expression, FunctionError, Position, Scope,
};
use serde_json::{Value, json};

fn eval(text: &str, root: Value) -> Option<Value> {
    let expr = Expression::parse(text).unwrap_or_else(|e| panic!("parse {:?}: {}", text, e));
    expr.evaluate(Some(&root))
        .unwrap_or_else(|e| panic!("evaluate {:?}: {}", text, e))
}

fn eval_err(text: &str, root: Value) -> EvalError {
    let expr = Expression::parse(text).unwrap_or_else(|e| panic!("parse {:?}: {}", text, e));
    match expr.evaluate(Some(&root)) {
        Ok(value) => panic!("expected {:?} to fail, got {:?}", text, value),
        Err(e) => e,
    }
}

fn orders() -> Value {
    json!({
        "orders": [
            {
                "id": "a",
                "total": 50,
                "items": [{"sku": "x", "price": 5}, {"sku": "y", "price": 15}]
            },
            {"id": "b", "total": 150, "items": [{"sku": "z", "price": 30}]},
            {"id": "c", "total": 250, "items": []}
        ],
        "threshold": 100
    })
}

// ============================================================================
// Literals and Contexts
// ============================================================================

#[test]
fn test_literals() {
    assert_eq!(eval("42", json!({})), Some(json!(42)));
    assert_eq!(eval("2.5", json!({})), Some(json!(2.5)));
    assert_eq!(eval("'text'", json!({})), Some(json!("text")));
    assert_eq!(eval("true", json!({})), Some(json!(true)));
    assert_eq!(eval("null", json!({})), Some(json!(null)));
}

#[test]
fn test_root_and_context() {
    let root = json!({"a": 1});
    assert_eq!(eval("$", root.clone()), Some(root.clone()));
    assert_eq!(eval("$$", root.clone()), Some(root));
}

#[test]
fn test_absent_root() {
    let expr = Expression::parse("$$").unwrap();
    assert_eq!(expr.evaluate(None), Ok(None));
    let expr = Expression::parse("a.b").unwrap();
    assert_eq!(expr.evaluate(None), Ok(None));
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_simple_field_access() {
    let root = json!({"name": "John", "age": 30});
    assert_eq!(eval("name", root.clone()), Some(json!("John")));
    assert_eq!(eval("age", root), Some(json!(30)));
}

#[test]
fn test_nested_access() {
    let root = json!({"user": {"name": "Alice", "email": "alice@example.com"}});
    assert_eq!(eval("user.name", root), Some(json!("Alice")));
}

#[test]
fn test_missing_member_is_no_value() {
    let root = json!({"user": {"name": "Alice"}});
    assert_eq!(eval("user.age", root.clone()), None);
    assert_eq!(eval("nope.deeper.still", root.clone()), None);
    assert_eq!(eval("user.name.first", root), None);
}

#[test]
fn test_path_over_array_maps_and_flattens() {
    assert_eq!(eval("orders.id", orders()), Some(json!(["a", "b", "c"])));
    assert_eq!(eval("orders.items.sku", orders()), Some(json!(["x", "y", "z"])));
}

#[test]
fn test_wildcard() {
    let root = json!({"a": 1, "b": [2, 3], "c": {"d": 4}});
    assert_eq!(eval("*", root), Some(json!([1, 2, 3, {"d": 4}])));
}

#[test]
fn test_descendants_include_scalars() {
    let root = json!({"a": {"b": 1}, "c": [2, {"d": 3}]});
    assert_eq!(eval("**.d", root.clone()), Some(json!(3)));
    assert_eq!(
        eval("**", root.clone()),
        Some(json!([root.clone(), {"b": 1}, 1, 2, {"d": 3}, 3]))
    );
}

#[test]
fn test_quoted_names() {
    let root = json!({"first name": "Ada", "a": {"b c": 1}});
    assert_eq!(eval("`first name`", root.clone()), Some(json!("Ada")));
    assert_eq!(eval(r#"a."b c""#, root), Some(json!(1)));
}

#[test]
fn test_computed_steps() {
    assert_eq!(
        eval("orders.(total * 2)", orders()),
        Some(json!([100, 300, 500]))
    );
    assert_eq!(
        eval(r#"orders.{"id": id}"#, orders()),
        Some(json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]))
    );
}

#[test]
fn test_array_constructor_step_stays_whole() {
    let root = json!({"pairs": [{"k": "a", "v": 1}, {"k": "b", "v": 2}]});
    assert_eq!(
        eval("pairs.[k, v]", root),
        Some(json!([["a", 1], ["b", 2]]))
    );
}

#[test]
fn test_root_inside_predicate() {
    assert_eq!(
        eval("orders[total > $$.threshold].id", orders()),
        Some(json!(["b", "c"]))
    );
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn test_filter_predicate() {
    assert_eq!(eval("orders[total > 100].id", orders()), Some(json!(["b", "c"])));
    assert_eq!(eval("orders[total > 200].id", orders()), Some(json!("c")));
    assert_eq!(eval("orders[total > 1000].id", orders()), None);
}

#[test]
fn test_index_predicates() {
    let root = json!({"xs": [10, 20, 30]});
    assert_eq!(eval("xs[0]", root.clone()), Some(json!(10)));
    assert_eq!(eval("xs[-1]", root.clone()), Some(json!(30)));
    assert_eq!(eval("xs[-3]", root.clone()), Some(json!(10)));
    assert_eq!(eval("xs[0.9]", root.clone()), Some(json!(10)));
    assert_eq!(eval("xs[3]", root.clone()), None);
    assert_eq!(eval("xs[-4]", root), None);
}

#[test]
fn test_predicate_applies_per_input_item() {
    assert_eq!(eval("orders.items[0].sku", orders()), Some(json!(["x", "z"])));
    assert_eq!(eval("orders.items.sku[0]", orders()), Some(json!(["x", "y", "z"])));
}

#[test]
fn test_chained_predicates() {
    assert_eq!(eval("orders[total > 100][0].id", orders()), Some(json!("b")));
    assert_eq!(eval("orders[0][id = 'b']", orders()), None);
}

#[test]
fn test_context_in_predicate() {
    let root = json!({"nums": [1, 2, 3, 4]});
    assert_eq!(eval("nums[$ > 2]", root.clone()), Some(json!([3, 4])));
    assert_eq!(eval("nums[$ % 2 = 0]", root), Some(json!([2, 4])));
}

#[test]
fn test_predicate_truthiness() {
    let root = json!({
        "rows": [{"tag": ""}, {"tag": "x"}, {"tag": null}, {}, {"tag": {"k": 1}}, {"tag": false}]
    });
    assert_eq!(eval("rows[tag].tag", root), Some(json!(["x", {"k": 1}])));
}

#[test]
fn test_predicate_on_scalar() {
    let root = json!({"x": 5});
    assert_eq!(eval("x[0]", root.clone()), Some(json!(5)));
    assert_eq!(eval("x[$ > 10]", root), None);
}

// ============================================================================
// Null vs. No Value
// ============================================================================

#[test]
fn test_null_member_is_null() {
    let root = json!({"a": null});
    assert_eq!(eval("a", root.clone()), Some(Value::Null));
    assert_eq!(eval("b", root), None);
}

#[test]
fn test_null_is_kept_in_sequences() {
    let root = json!({"rows": [{"v": null}, {"v": 1}, {}]});
    assert_eq!(eval("rows.v", root), Some(json!([null, 1])));
}

// ============================================================================
// Scopes and Variables
// ============================================================================

#[test]
fn test_scopes_resolve_from_root() {
    let root = json!({
        "state": {"count": 2},
        "event": {"type": "click"},
        "instance": {"id": "i-1"}
    });
    assert_eq!(eval("$state.count", root.clone()), Some(json!(2)));
    assert_eq!(eval("$event.type", root.clone()), Some(json!("click")));
    assert_eq!(eval("$instance.id", root), Some(json!("i-1")));
}

#[test]
fn test_unbound_scope_fails() {
    let err = eval_err("$event.type", json!({"state": {}}));
    assert_eq!(err.kind, EvalErrorKind::UnresolvedScope(Scope::Event));
    assert_eq!(err.to_string(), "scope '$event' is not bound at line 1, column 0");

    let expr = Expression::parse("$state").unwrap();
    assert_eq!(
        expr.evaluate(None).unwrap_err().kind,
        EvalErrorKind::UnresolvedScope(Scope::State)
    );
}

#[test]
fn test_null_scope_is_bound() {
    assert_eq!(eval("$state", json!({"state": null})), Some(Value::Null));
    assert_eq!(eval("$state.a", json!({"state": null})), None);
}

#[test]
fn test_unresolved_variable() {
    let err = eval_err("$missing + 1", json!({}));
    assert_eq!(err.kind, EvalErrorKind::UnresolvedVariable("missing".to_string()));
    assert_eq!(err.to_string(), "variable '$missing' is not defined at line 1, column 0");
}

#[test]
fn test_block_and_assignment() {
    assert_eq!(eval("($a := 2; $b := $a * 3; $a + $b)", json!({})), Some(json!(8)));
    assert_eq!(eval("$x := 5", json!({})), Some(json!(5)));
    assert_eq!(eval("()", json!({})), None);
}

#[test]
fn test_block_bindings_do_not_leak() {
    let err = eval_err("(($inner := 1;); $inner)", json!({}));
    assert_eq!(err.kind, EvalErrorKind::UnresolvedVariable("inner".to_string()));
}

#[test]
fn test_shadowing() {
    assert_eq!(
        eval("($x := 1; ($x := 2; $x) + $x)", json!({})),
        Some(json!(3))
    );
}

#[test]
fn test_variables_shadow_scopes() {
    let root = json!({"state": {"v": 1}});
    assert_eq!(eval("($state := {'v': 2}; $state.v)", root), Some(json!(2)));
}

#[test]
fn test_bound_variables_from_options() {
    let options = EvalOptions::new().bind_variable("rate", json!(0.5));
    let expr = Expression::parse("total * $rate").unwrap();
    let root = json!({"total": 80});
    assert_eq!(expr.evaluate_with(Some(&root), &options), Ok(Some(json!(40))));
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_arithmetic() {
    let root = json!({});
    assert_eq!(eval("1 + 2 * 3", root.clone()), Some(json!(7)));
    assert_eq!(eval("(1 + 2) * 3", root.clone()), Some(json!(9)));
    assert_eq!(eval("10 - 4 - 3", root.clone()), Some(json!(3)));
    assert_eq!(eval("7 % 3", root.clone()), Some(json!(1)));
    assert_eq!(eval("-7 % 3", root.clone()), Some(json!(-1)));
    assert_eq!(eval("8 / 2", root.clone()), Some(json!(4)));
    assert_eq!(eval("7 / 2", root.clone()), Some(json!(3.5)));
    assert_eq!(eval("-2 * 3", root), Some(json!(-6)));
}

#[test]
fn test_decimal_arithmetic() {
    let root = json!({});
    assert_eq!(eval("0.1 + 0.2", root.clone()), Some(json!(0.3)));
    assert_eq!(eval("1.5 + 0.5", root.clone()), Some(json!(2)));
    assert_eq!(eval("2.5 * 4", root.clone()), Some(json!(10)));
    assert_eq!(eval("1 / 4", root), Some(json!(0.25)));
}

#[test]
fn test_tiny_numbers_are_not_rounded_away() {
    let root = json!({});
    let close = |text: &str, expected: f64| {
        let result = eval(text, root.clone()).and_then(|v| v.as_f64());
        assert!(
            result.is_some_and(|f| (f - expected).abs() <= expected * 1e-12),
            "{} gave {:?}",
            text,
            result
        );
    };

    close("0.00000000000000000001 * 0.00000000000000000001", 1e-40);
    close("0.000000000000000000000000000001 + 0", 1e-30);
    close("1e-30 * 3", 3e-30);
    close("0.00000000000000000001 / 300000", 1e-20 / 3e5);
    assert_eq!(eval("1e-30 - 1e-30", root), Some(json!(0.0)));
}

#[test]
fn test_integer_overflow_falls_back_to_float() {
    let result = eval("9223372036854775807 * 10", json!({})).unwrap();
    assert!(result.is_f64(), "{}", result);
    assert_eq!(result.as_f64(), Some(9.223372036854775807e19));
}

#[test]
fn test_arithmetic_with_absent_operand() {
    let root = json!({"a": 1});
    assert_eq!(eval("a + nope", root.clone()), None);
    assert_eq!(eval("nope * 2", root.clone()), None);
    assert_eq!(eval("-nope", root), None);
}

#[test]
fn test_arithmetic_type_errors() {
    let err = eval_err("a + 1", json!({"a": null}));
    assert_eq!(
        err.kind,
        EvalErrorKind::OperandType {
            op: "+",
            side: Operand::Left,
            expected: "a number",
            found: "null",
        }
    );

    let err = eval_err("2 * 'x'", json!({}));
    assert_eq!(
        err.to_string(),
        "operator '*' expects a number as its right operand, found string at line 1, column 4"
    );

    let err = eval_err("-'x'", json!({}));
    assert_eq!(
        err.kind,
        EvalErrorKind::OperandType {
            op: "-",
            side: Operand::Only,
            expected: "a number",
            found: "string",
        }
    );
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval_err("1 / 0", json!({})).kind, EvalErrorKind::DivisionByZero);
    assert_eq!(eval_err("1 % 0.0", json!({})).kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn test_error_position_is_innermost() {
    let err = eval_err("(\n  $x := 1;\n  $x + 'a'\n)", json!({}));
    assert_eq!(err.position, Some(Position::new(20, 3, 7)));
    assert_eq!(
        err.to_string(),
        "operator '+' expects a number as its right operand, found string at line 3, column 7"
    );
}

#[test]
fn test_operand_error_points_at_operand() {
    let err = eval_err("1 +
 \"a\"", json!({}));
    assert_eq!(err.position, Some(Position::new(5, 2, 1)));

    let err = eval_err("a * 2", json!({"a": "x"}));
    assert_eq!(err.position, Some(Position::new(0, 1, 0)));

    let err = eval_err("1 < $x", json!({}));
    assert!(matches!(err.kind, EvalErrorKind::UnresolvedVariable(_)));
    assert_eq!(err.position, Some(Position::new(4, 1, 4)));

    let err = eval_err("- \"x\"", json!({}));
    assert_eq!(err.position, Some(Position::new(2, 1, 2)));
}

// ============================================================================
// Comparison, Logic and Concatenation
// ============================================================================

#[test]
fn test_equality() {
    let root = json!({"a": {"x": [1, 2]}, "n": null});
    assert_eq!(eval("1 = 1.0", root.clone()), Some(json!(true)));
    assert_eq!(eval("'a' = 'a'", root.clone()), Some(json!(true)));
    assert_eq!(eval("a = {'x': [1, 2.0]}", root.clone()), Some(json!(true)));
    assert_eq!(eval("1 != '1'", root.clone()), Some(json!(true)));
    assert_eq!(eval("n = null", root.clone()), Some(json!(true)));
    assert_eq!(eval("missing = null", root.clone()), Some(json!(false)));
    assert_eq!(eval("missing != null", root), Some(json!(false)));
}

#[test]
fn test_ordering() {
    let root = json!({});
    assert_eq!(eval("1 < 2", root.clone()), Some(json!(true)));
    assert_eq!(eval("2 <= 2.0", root.clone()), Some(json!(true)));
    assert_eq!(eval("'b' > 'a'", root.clone()), Some(json!(true)));
    assert_eq!(eval("'a' >= 'b'", root.clone()), Some(json!(false)));
    assert_eq!(eval("missing < 1", root), Some(json!(false)));
}

#[test]
fn test_ordering_type_errors() {
    let err = eval_err("1 < 'b'", json!({}));
    assert_eq!(
        err.kind,
        EvalErrorKind::OperandType {
            op: "<",
            side: Operand::Right,
            expected: "a number",
            found: "string",
        }
    );

    let err = eval_err("true > 1", json!({}));
    assert_eq!(
        err.kind,
        EvalErrorKind::OperandType {
            op: ">",
            side: Operand::Left,
            expected: "a number or a string",
            found: "boolean",
        }
    );
}

#[test]
fn test_logical_operators() {
    let root = json!({"empty": [], "full": [0]});
    assert_eq!(eval("true and false", root.clone()), Some(json!(false)));
    assert_eq!(eval("0 or ''", root.clone()), Some(json!(false)));
    assert_eq!(eval("1 and 'x'", root.clone()), Some(json!(true)));
    assert_eq!(eval("empty or full", root.clone()), Some(json!(true)));
    assert_eq!(eval("missing or false", root.clone()), Some(json!(false)));
    assert_eq!(eval("true or false and false", root), Some(json!(true)));
}

#[test]
fn test_membership() {
    let root = json!({"tags": ["a", "b"], "tag": "a"});
    assert_eq!(eval("'b' in tags", root.clone()), Some(json!(true)));
    assert_eq!(eval("'c' in tags", root.clone()), Some(json!(false)));
    assert_eq!(eval("'a' in tag", root.clone()), Some(json!(true)));
    assert_eq!(eval("2 in [1, 2.0]", root.clone()), Some(json!(true)));
    assert_eq!(eval("missing in tags", root), Some(json!(false)));
}

#[test]
fn test_concatenation() {
    let root = json!({"obj": {"a": 1}});
    assert_eq!(eval("'a' & 1 & true & null", root.clone()), Some(json!("a1truenull")));
    assert_eq!(eval("missing & 'x'", root.clone()), Some(json!("x")));
    assert_eq!(eval("'o=' & obj", root.clone()), Some(json!(r#"o={"a":1}"#)));
    assert_eq!(eval("'' & [1, 'b']", root), Some(json!(r#"[1,"b"]"#)));
}

#[test]
fn test_comparisons_share_one_level() {
    // (1 < 2) = true
    assert_eq!(eval("1 < 2 = true", json!({})), Some(json!(true)));
    assert_eq!(eval("1 + 1 = 2 ? 'y' : 'n'", json!({})), Some(json!("y")));
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_conditional() {
    let root = json!({"n": 5});
    assert_eq!(eval("n > 3 ? 'big' : 'small'", root.clone()), Some(json!("big")));
    assert_eq!(eval("n > 9 ? 'big' : 'small'", root.clone()), Some(json!("small")));
    assert_eq!(eval("n > 9 ? 'big'", root.clone()), None);
    assert_eq!(eval("missing ? 1 : 2", root.clone()), Some(json!(2)));
    assert_eq!(eval("n = 5 ? 'five' : n = 6 ? 'six' : 'other'", root), Some(json!("five")));
}

#[test]
fn test_conditional_evaluates_one_branch() {
    assert_eq!(eval("true ? 1 : 1 / 0", json!({})), Some(json!(1)));
    assert_eq!(eval("false ? $nope : 2", json!({})), Some(json!(2)));
}

// ============================================================================
// Constructors
// ============================================================================

#[test]
fn test_object_constructor() {
    let root = json!({"price": 4, "qty": 3});
    assert_eq!(
        eval(r#"{"total": price * qty, "note": missing, "tag": null}"#, root),
        Some(json!({"total": 12, "tag": null}))
    );
}

#[test]
fn test_object_keys_keep_source_order() {
    let result = eval(r#"{"z": 1, "a": 2, "m": 3}"#, json!({})).unwrap();
    let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_computed_object_keys() {
    let root = json!({"k": "name", "v": "Ada"});
    assert_eq!(eval("{k: v, k & '2': v}", root), Some(json!({"name": "Ada", "name2": "Ada"})));
}

#[test]
fn test_object_key_must_be_string() {
    let err = eval_err("[1, 2, {3: 4}]", json!({}));
    assert_eq!(err.kind, EvalErrorKind::InvalidKey("3".to_string()));
    assert_eq!(err.position, Some(Position::new(8, 1, 8)));

    let err = eval_err("{missing: 1}", json!({}));
    assert_eq!(err.kind, EvalErrorKind::InvalidKey("no value".to_string()));
}

#[test]
fn test_array_constructor() {
    let root = json!({"xs": [1, 2]});
    assert_eq!(eval("[xs, 3]", root.clone()), Some(json!([1, 2, 3])));
    assert_eq!(eval("[[xs], 3]", root.clone()), Some(json!([[1, 2], 3])));
    assert_eq!(eval("[missing, 1, null]", root.clone()), Some(json!([1, null])));
    assert_eq!(eval("[]", root), Some(json!([])));
}

#[test]
fn test_ranges() {
    let root = json!({"n": 3});
    assert_eq!(eval("[1..4]", root.clone()), Some(json!([1, 2, 3, 4])));
    assert_eq!(eval("[0, n..5, [9]]", root.clone()), Some(json!([0, 3, 4, 5, [9]])));
    assert_eq!(eval("[5..1]", root.clone()), Some(json!([])));
    assert_eq!(eval("[2.0..3]", root.clone()), Some(json!([2, 3])));
    assert_eq!(eval("[missing..3]", root), Some(json!([])));
}

#[test]
fn test_range_errors() {
    let err = eval_err("[1.5..3]", json!({}));
    assert_eq!(
        err.kind,
        EvalErrorKind::OperandType {
            op: "..",
            side: Operand::Left,
            expected: "an integer",
            found: "number",
        }
    );

    let err = eval_err("[1..20000000]", json!({}));
    assert_eq!(err.kind, EvalErrorKind::RangeTooLarge(20_000_000));
    assert_eq!(
        err.kind.to_string(),
        "range of 20000000 items exceeds the limit of 10000000"
    );
}

// ============================================================================
// Functions, Chains and Lambdas
// ============================================================================

#[test]
fn test_builtin_calls() {
    let root = json!({"name": "  ada  lovelace ", "xs": [3, 1, 2]});
    assert_eq!(eval("$uppercase($trim(name))", root.clone()), Some(json!("ADA LOVELACE")));
    assert_eq!(eval("$sum(xs)", root.clone()), Some(json!(6)));
    assert_eq!(eval("$count(xs[$ > 1])", root), Some(json!(2)));
}

#[test]
fn test_chain() {
    let root = json!({"name": "  hello "});
    assert_eq!(eval("name ~> $trim ~> $uppercase", root.clone()), Some(json!("HELLO")));
    assert_eq!(eval("name ~> $trim ~> $substring(1, 3)", root.clone()), Some(json!("ell")));
    assert_eq!(eval("(name ~> $trim) & '!'", root), Some(json!("hello!")));
}

#[test]
fn test_chain_into_lambda() {
    assert_eq!(eval("5 ~> function($n) { $n + 1 }", json!({})), Some(json!(6)));
    assert_eq!(
        eval("($inc := function($n) { $n + 1 }; 5 ~> $inc ~> $inc)", json!({})),
        Some(json!(7))
    );
}

#[test]
fn test_chain_into_non_function() {
    let err = eval_err("1 ~> 2", json!({}));
    assert_eq!(err.kind, EvalErrorKind::NotAFunction("a number".to_string()));
    assert_eq!(err.position, Some(Position::new(5, 1, 5)));

    let err = eval_err("($v := 1; 2 ~> $v)", json!({}));
    assert_eq!(err.kind, EvalErrorKind::NotAFunction("'$v'".to_string()));
}

#[test]
fn test_unknown_function() {
    let err = eval_err("$frobnicate(1)", json!({}));
    assert_eq!(err.kind, EvalErrorKind::UnresolvedFunction("frobnicate".to_string()));
    assert_eq!(err.to_string(), "function '$frobnicate' is not defined at line 1, column 0");
}

#[test]
fn test_builtin_arity_mismatch() {
    let err = eval_err("$uppercase('a', 'b')", json!({}));
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "uppercase".to_string(),
            expected: Arity::exactly(1),
            found: 2,
        }
    );
    assert_eq!(
        err.kind.to_string(),
        "function '$uppercase' expects 1 argument(s), got 2"
    );
}

#[test]
fn test_builtin_failure() {
    let err = eval_err("$sqrt(-1)", json!({}));
    assert_eq!(
        err.kind,
        EvalErrorKind::Function {
            name: "sqrt".to_string(),
            message: "$sqrt cannot be applied to a negative number".to_string(),
        }
    );
}

#[test]
fn test_lambda_call() {
    assert_eq!(
        eval("($double := function($x) { $x * 2 }; $double(21))", json!({})),
        Some(json!(42))
    );
}

#[test]
fn test_lambda_missing_arguments_are_absent() {
    assert_eq!(
        eval("($f := function($x, $y) { $exists($y) }; $f(1))", json!({})),
        Some(json!(false))
    );
}

#[test]
fn test_lambda_too_many_arguments() {
    let err = eval_err("($f := function($x) { $x }; $f(1, 2))", json!({}));
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "f".to_string(),
            expected: Arity::range(0, 1),
            found: 2,
        }
    );
}

#[test]
fn test_lambda_captures_definition_environment() {
    assert_eq!(
        eval("($k := 10; $add := function($x) { $x + $k }; $k := 1; $add(5))", json!({})),
        Some(json!(15))
    );
}

#[test]
fn test_lambda_body_sees_focus() {
    let root = json!({"base": 100});
    assert_eq!(
        eval("($f := function($x) { base + $x }; $f(1))", root),
        Some(json!(101))
    );
}

#[test]
fn test_recursion() {
    assert_eq!(
        eval(
            "($fact := function($n) { $n <= 1 ? 1 : $n * $fact($n - 1) }; $fact(5))",
            json!({})
        ),
        Some(json!(120))
    );
}

#[test]
fn test_function_alias() {
    assert_eq!(
        eval("($f := function($x) { $x & '!' }; $g := $f; $g('hi'))", json!({})),
        Some(json!("hi!"))
    );
}

#[test]
fn test_depth_limit() {
    let options = EvalOptions::new().with_max_depth(20);
    let expr = Expression::parse("($loop := function($n) { $loop($n + 1) }; $loop(0))").unwrap();
    let err = expr.evaluate_with(Some(&json!({})), &options).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DepthExceeded(20));
}

#[test]
fn test_lambda_is_not_a_value() {
    assert_eq!(eval_err("function($x) { $x }", json!({})).kind, EvalErrorKind::NotAValue);
    assert_eq!(
        eval_err("($f := function($x) { $x }; $f + 1)", json!({})).kind,
        EvalErrorKind::NotAValue
    );
}

#[test]
fn test_registered_functions() {
    let options = EvalOptions::new()
        .register_fn("double", Arity::exactly(1), |args| {
            Ok(args[0].as_ref().and_then(Value::as_i64).map(|n| json!(n * 2)))
        })
        .register_fn("uppercase", Arity::exactly(1), |_| Ok(Some(json!("shadowed"))))
        .register_fn("fail", Arity::exactly(0), |_| Err(FunctionError::new("nope")));

    let root = json!({"n": 4});
    let run = |text: &str| {
        Expression::parse(text)
            .unwrap()
            .evaluate_with(Some(&root), &options)
    };

    assert_eq!(run("$double(n)"), Ok(Some(json!(8))));
    assert_eq!(run("n ~> $double"), Ok(Some(json!(8))));
    assert_eq!(run("$uppercase('a')"), Ok(Some(json!("shadowed"))));
    assert_eq!(
        run("$fail()").unwrap_err().kind,
        EvalErrorKind::Function {
            name: "fail".to_string(),
            message: "nope".to_string(),
        }
    );
}

#[test]
fn test_lambda_shadows_builtin() {
    assert_eq!(
        eval("($uppercase := function($s) { 'mine' }; $uppercase('a'))", json!({})),
        Some(json!("mine"))
    );
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_mapping_document() {
    let root = json!({
        "state": {
            "customer": {"first": "ada", "last": "lovelace"},
            "cart": [
                {"sku": "A1", "price": 9.99, "qty": 2},
                {"sku": "B2", "price": 0.01, "qty": 1}
            ]
        },
        "event": {"coupon": "HALF"}
    });

    let text = r#"(
        $lines := $state.cart.{"sku": sku, "amount": price * qty};
        {
            "name": $uppercase($state.customer.first) & " " & $state.customer.last,
            "lines": $lines,
            "total": $sum($lines.amount),
            "discounted": $event.coupon = "HALF" ? $sum($lines.amount) / 2 : $sum($lines.amount)
        }
    )"#;

    assert_eq!(
        eval(text, root),
        Some(json!({
            "name": "ADA lovelace",
            "lines": [{"sku": "A1", "amount": 19.98}, {"sku": "B2", "amount": 0.01}],
            "total": 19.99,
            "discounted": 9.995
        }))
    );
}
