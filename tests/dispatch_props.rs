//! Property checks for the word-dispatch contract: for every word, the
//! capability check and the transformation must agree on every stack, and
//! both must be pure functions of the stack.

use gauge_lang::{
    words, AggregateFunction, DataExpr, Definition, Query, Stack, StackValue, TimeSeriesExpr,
};
use proptest::prelude::*;

fn expr_strategy() -> impl Strategy<Value = TimeSeriesExpr> {
    prop_oneof![
        (-100.0f64..100.0).prop_map(TimeSeriesExpr::Constant),
        ("[a-z]{1,4}", "[a-z]{1,4}").prop_map(|(k, v)| TimeSeriesExpr::Data(
            DataExpr::Aggregate(AggregateFunction::Sum(Query::equal(k, v)))
        )),
        ("[a-z]{1,4}", "[a-z]{1,4}")
            .prop_map(|(k, v)| TimeSeriesExpr::Data(DataExpr::All(Query::equal(k, v)))),
        ("[a-z]{1,4}", "[a-z]{1,4}", "[a-z.]{1,8}").prop_map(|(k, v, key)| {
            TimeSeriesExpr::Data(DataExpr::GroupBy {
                af: AggregateFunction::Max(Query::equal(k, v)),
                keys: vec![key],
            })
        }),
    ]
}

fn value_strategy() -> impl Strategy<Value = StackValue> {
    prop_oneof![
        "[a-z0-9.]{1,8}".prop_map(StackValue::Str),
        (-1.0e6f64..1.0e6).prop_map(StackValue::Number),
        prop::collection::vec("[a-z.]{1,6}", 0..3).prop_map(StackValue::StringList),
        ("[a-z]{1,4}", "[a-z]{1,4}")
            .prop_map(|(k, v)| StackValue::Query(Query::equal(k, v))),
        expr_strategy().prop_map(StackValue::Expr),
    ]
}

fn stack_strategy() -> impl Strategy<Value = Stack> {
    prop::collection::vec(value_strategy(), 0..6)
}

proptest! {
    /// The two phases of the dispatch contract can never diverge: a word
    /// matches a stack exactly when its transformation is defined for it.
    #[test]
    fn capability_check_iff_transform_defined(stack in stack_strategy()) {
        let dict = words::compose_math().unwrap();
        for def in dict.definitions() {
            if let Definition::Word(word) = def {
                let outcome = word.run(&stack);
                prop_assert_eq!(
                    word.matches(&stack),
                    outcome.is_some(),
                    "word :{} diverged",
                    word.name()
                );
            }
        }
    }

    /// Words are pure: the same stack always produces the same outcome.
    #[test]
    fn words_are_deterministic(stack in stack_strategy()) {
        let dict = words::compose_math().unwrap();
        for def in dict.definitions() {
            if let Definition::Word(word) = def {
                let first = word.run(&stack);
                let second = word.run(&stack);
                match (first, second) {
                    (None, None) => {}
                    (Some(Ok(a)), Some(Ok(b))) => prop_assert_eq!(a, b),
                    (Some(Err(_)), Some(Err(_))) => {}
                    _ => prop_assert!(false, "word :{} is nondeterministic", word.name()),
                }
            }
        }
    }

    /// Two resolved expressions always satisfy the binary math words.
    #[test]
    fn binary_math_words_accept_expression_pairs(
        a in expr_strategy(),
        b in expr_strategy(),
        below in stack_strategy(),
    ) {
        let dict = words::compose_math().unwrap();
        let mut stack = below;
        stack.push(StackValue::Expr(a));
        stack.push(StackValue::Expr(b));

        for name in ["add", "sub", "mul", "div", "fadd", "fsub", "fmul", "fdiv",
                     "gt", "ge", "lt", "le", "and", "or"] {
            match dict.lookup(name) {
                Some(Definition::Word(word)) => {
                    prop_assert!(word.matches(&stack), "word :{} rejected exprs", name);
                    if let Some(Ok(next)) = word.run(&stack) {
                        prop_assert_eq!(next.len(), stack.len() - 1);
                    }
                }
                _ => prop_assert!(false, "missing word :{}", name),
            }
        }
    }
}
