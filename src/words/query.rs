//! Predicate words.
//!
//! The `query` vocabulary builds [`Query`] trees from literal tokens.
//! `:and` and `:or` also carry the expression arms: a composed
//! dictionary holds one definition per name, so the words that make
//! sense for both hierarchies dispatch on operand type instead of being
//! defined twice.

use crate::model::{Query, TimeSeriesExpr};
use crate::value::{Stack, StackValue};
use crate::word::{Definition, Word, WordResult};
use crate::words::without_top;

fn run_eq(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., k, v] => {
            let (k, v) = (k.as_key()?, v.as_key()?);
            let mut next = without_top(stack, 2);
            next.push(StackValue::Query(Query::Equal(k, v)));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_re(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., k, p] => {
            let (k, p) = (k.as_key()?, p.as_key()?);
            let mut next = without_top(stack, 2);
            next.push(StackValue::Query(Query::Regex(k, p)));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_in(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., k, StackValue::StringList(vs)] => {
            let k = k.as_key()?;
            let vs = vs.clone();
            let mut next = without_top(stack, 2);
            next.push(StackValue::Query(Query::In(k, vs)));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_not(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., StackValue::Query(q)] => {
            let q = q.clone();
            let mut next = without_top(stack, 1);
            next.push(StackValue::Query(Query::not(q)));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_and(stack: &Stack) -> WordResult {
    binary_logical(stack, Query::and, TimeSeriesExpr::And)
}

fn run_or(stack: &Stack) -> WordResult {
    binary_logical(stack, Query::or, TimeSeriesExpr::Or)
}

/// Combine two queries or two expressions, by operand type.
fn binary_logical(
    stack: &Stack,
    on_query: fn(Query, Query) -> Query,
    on_expr: fn(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>) -> TimeSeriesExpr,
) -> WordResult {
    match stack.as_slice() {
        [.., StackValue::Query(a), StackValue::Query(b)] => {
            let (a, b) = (a.clone(), b.clone());
            let mut next = without_top(stack, 2);
            next.push(StackValue::Query(on_query(a, b)));
            Some(Ok(next))
        }
        [.., StackValue::Expr(a), StackValue::Expr(b)] => {
            let (a, b) = (a.clone(), b.clone());
            let mut next = without_top(stack, 2);
            next.push(StackValue::Expr(on_expr(Box::new(a), Box::new(b))));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_true(stack: &Stack) -> WordResult {
    let mut next = stack.clone();
    next.push(StackValue::Query(Query::True));
    Some(Ok(next))
}

fn run_false(stack: &Stack) -> WordResult {
    let mut next = stack.clone();
    next.push(StackValue::Query(Query::False));
    Some(Ok(next))
}

pub fn definitions() -> Vec<Definition> {
    vec![
        Definition::Word(Word::new(
            "eq",
            "k v -- Query",
            "Predicate matching streams whose tag k equals v.",
            &["name,sps,:eq"],
            run_eq,
        )),
        Definition::Word(Word::new(
            "re",
            "k pattern -- Query",
            "Predicate matching streams whose tag k matches the pattern, \
             anchored at the start of the value.",
            &["nf.cluster,^www-,:re"],
            run_re,
        )),
        Definition::Word(Word::new(
            "in",
            "k (vs) -- Query",
            "Predicate matching streams whose tag k is one of the listed values.",
            &["statistic,(,totalAmount,totalTime,),:in"],
            run_in,
        )),
        Definition::Word(Word::new(
            "not",
            "Query -- Query",
            "Invert a predicate.",
            &["nf.cluster,www,:eq,:not"],
            run_not,
        )),
        Definition::Word(Word::new(
            "and",
            "Query Query -- Query | TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Both predicates hold; on expressions, both signals are nonzero.",
            &["name,sps,:eq,nf.cluster,www,:eq,:and"],
            run_and,
        )),
        Definition::Word(Word::new(
            "or",
            "Query Query -- Query | TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Either predicate holds; on expressions, either signal is nonzero.",
            &["name,sps,:eq,name,rps,:eq,:or"],
            run_or,
        )),
        Definition::Word(Word::new(
            "true",
            "-- Query",
            "Predicate matching every stream.",
            &[":true,:sum"],
            run_true,
        )),
        Definition::Word(Word::new(
            "false",
            "-- Query",
            "Predicate matching nothing.",
            &[":false,:sum"],
            run_false,
        )),
    ]
}
