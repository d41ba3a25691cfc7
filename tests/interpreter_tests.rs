use gauge_lang::{
    words, AggregateFunction, DataExpr, EvalError, Interpreter, Query, Stack, StackValue,
    TimeSeriesExpr,
};

fn interp() -> Interpreter {
    Interpreter::new(words::compose_math().expect("standard set composes"))
}

fn eval(program: &str) -> Result<Stack, EvalError> {
    interp().execute(program)
}

fn sum_of(key: &str, value: &str) -> TimeSeriesExpr {
    TimeSeriesExpr::Data(DataExpr::Aggregate(AggregateFunction::Sum(Query::equal(
        key, value,
    ))))
}

#[test]
fn literal_tokens_push_strings() {
    let stack = eval("name,sps").unwrap();
    assert_eq!(
        stack,
        vec![
            StackValue::Str("name".to_string()),
            StackValue::Str("sps".to_string()),
        ]
    );
}

#[test]
fn eq_builds_a_query() {
    let stack = eval("name,sps,:eq").unwrap();
    assert_eq!(stack, vec![StackValue::Query(Query::equal("name", "sps"))]);
}

#[test]
fn numeric_tag_values_stay_strings() {
    let stack = eval("status,404,:eq").unwrap();
    assert_eq!(stack, vec![StackValue::Query(Query::equal("status", "404"))]);
}

#[test]
fn sum_aggregates_a_query() {
    let stack = eval("name,sps,:eq,:sum").unwrap();
    assert_eq!(stack, vec![StackValue::Expr(sum_of("name", "sps"))]);
}

#[test]
fn list_tokens_collect_between_parens() {
    let stack = eval("(,nf.cluster,nf.zone,)").unwrap();
    assert_eq!(
        stack,
        vec![StackValue::StringList(vec![
            "nf.cluster".to_string(),
            "nf.zone".to_string(),
        ])]
    );
}

#[test]
fn empty_list_is_allowed() {
    let stack = eval("(,)").unwrap();
    assert_eq!(stack, vec![StackValue::StringList(vec![])]);
}

#[test]
fn binary_words_preserve_operand_order() {
    // A B :sub must yield Subtract(A, B): operand order is push order.
    let stack = eval("name,a,:eq,:sum,name,b,:eq,:sum,:sub").unwrap();
    assert_eq!(
        stack,
        vec![StackValue::Expr(TimeSeriesExpr::Subtract(
            Box::new(sum_of("name", "a")),
            Box::new(sum_of("name", "b")),
        ))]
    );
}

#[test]
fn const_parses_a_number() {
    let stack = eval("42,:const").unwrap();
    assert_eq!(stack, vec![StackValue::Number(42.0)]);
}

#[test]
fn numbers_lift_to_constants_in_math() {
    let stack = eval("name,a,:eq,:sum,2,:const,:div").unwrap();
    assert_eq!(
        stack,
        vec![StackValue::Expr(TimeSeriesExpr::Divide(
            Box::new(sum_of("name", "a")),
            Box::new(TimeSeriesExpr::Constant(2.0)),
        ))]
    );
}

#[test]
fn unknown_word_is_fatal() {
    let err = eval("name,sps,:eq,:frobnicate").unwrap_err();
    match err {
        EvalError::UnknownWord { token, position } => {
            assert_eq!(token, "frobnicate");
            assert_eq!(position, 3);
        }
        other => panic!("expected UnknownWord, got {:?}", other),
    }
}

#[test]
fn match_error_reports_word_signature_and_stack() {
    // :sub needs two expressions; a lone query does not match.
    let err = eval("name,sps,:eq,:sub").unwrap_err();
    match err {
        EvalError::Match {
            word,
            signature,
            stack,
            ..
        } => {
            assert_eq!(word, "sub");
            assert!(signature.contains("TimeSeriesExpr"));
            assert!(stack.contains("Query"));
        }
        other => panic!("expected Match, got {:?}", other),
    }
}

#[test]
fn match_error_on_empty_stack() {
    let err = eval(":sum").unwrap_err();
    assert!(matches!(err, EvalError::Match { .. }));
}

#[test]
fn bad_number_literal_is_a_literal_error() {
    let err = eval("oops,:const").unwrap_err();
    match err {
        EvalError::Literal { token, target } => {
            assert_eq!(token, "oops");
            assert_eq!(target, "number");
        }
        other => panic!("expected Literal, got {:?}", other),
    }
}

#[test]
fn bad_time_field_is_a_literal_error() {
    let err = eval("fortnightOfYear,:time").unwrap_err();
    assert!(matches!(err, EvalError::Literal { target: "time field", .. }));
}

#[test]
fn unbalanced_open_paren_is_fatal() {
    let err = eval("(,nf.cluster").unwrap_err();
    assert!(matches!(err, EvalError::UnbalancedList { position: 0 }));
}

#[test]
fn stray_close_paren_is_fatal() {
    let err = eval("nf.cluster,)").unwrap_err();
    assert!(matches!(err, EvalError::UnbalancedList { position: 1 }));
}

#[test]
fn stack_words_shuffle_operands() {
    let stack = eval("a,b,:swap").unwrap();
    assert_eq!(
        stack,
        vec![
            StackValue::Str("b".to_string()),
            StackValue::Str("a".to_string()),
        ]
    );

    let stack = eval("a,b,c,:rot").unwrap();
    assert_eq!(
        stack,
        vec![
            StackValue::Str("b".to_string()),
            StackValue::Str("c".to_string()),
            StackValue::Str("a".to_string()),
        ]
    );

    let stack = eval("a,b,:over").unwrap();
    assert_eq!(stack.len(), 3);
    assert_eq!(stack[2], StackValue::Str("a".to_string()));

    assert_eq!(eval("a,b,c,:clear").unwrap(), vec![]);
}

#[test]
fn and_dispatches_on_operand_type() {
    // Two queries combine into a query...
    let stack = eval("name,sps,:eq,nf.app,www,:eq,:and").unwrap();
    assert_eq!(
        stack,
        vec![StackValue::Query(Query::and(
            Query::equal("name", "sps"),
            Query::equal("nf.app", "www"),
        ))]
    );

    // ...two expressions into an expression.
    let stack = eval("name,a,:eq,:sum,name,b,:eq,:sum,:and").unwrap();
    assert_eq!(
        stack,
        vec![StackValue::Expr(TimeSeriesExpr::And(
            Box::new(sum_of("name", "a")),
            Box::new(sum_of("name", "b")),
        ))]
    );

    // A query and an expression do not match.
    let err = eval("name,a,:eq,:sum,nf.app,www,:eq,:and").unwrap_err();
    assert!(matches!(err, EvalError::Match { .. }));
}

#[test]
fn expression_display_round_trips_through_the_interpreter() {
    let program = "name,sps,:eq,:sum,(,nf.cluster,),:by,nf.app,www,:eq,:cq";
    let stack = eval(program).unwrap();
    let rendered = match &stack[0] {
        StackValue::Expr(t) => t.to_string(),
        other => panic!("expected expression, got {:?}", other),
    };
    assert_eq!(eval(&rendered).unwrap(), stack);
}

#[test]
fn evaluations_are_independent() {
    let interp = interp();
    let a = interp.execute("name,sps,:eq,:sum").unwrap();
    let b = interp.execute("name,rps,:eq,:max").unwrap();
    assert_ne!(a, b);
    assert_eq!(a, interp.execute("name,sps,:eq,:sum").unwrap());
}
