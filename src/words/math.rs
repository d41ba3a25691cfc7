//! Math words and macros.
//!
//! The `math` vocabulary: aggregation of raw selections, arithmetic and
//! comparison over resolved expressions, the rewrite words `:by` and
//! `:cq`, and the distilled-statistics macros.

use crate::interpreter::EvalError;
use crate::model::{AggregateFunction, DataExpr, Query, TimeField, TimeSeriesExpr};
use crate::value::{Stack, StackValue};
use crate::word::{Definition, Macro, Word, WordResult};
use crate::words::without_top;

/// Which aggregate a word names, for the collapsing rules.
#[derive(Clone, Copy, PartialEq)]
enum AggrKind {
    Sum,
    Min,
    Max,
    Count,
}

impl AggrKind {
    fn data(self, q: Query) -> AggregateFunction {
        match self {
            AggrKind::Sum => AggregateFunction::Sum(q),
            AggrKind::Min => AggregateFunction::Min(q),
            AggrKind::Max => AggregateFunction::Max(q),
            AggrKind::Count => AggregateFunction::Count(q),
        }
    }

    fn wrap(self, t: TimeSeriesExpr) -> TimeSeriesExpr {
        let t = Box::new(t);
        match self {
            AggrKind::Sum => TimeSeriesExpr::Sum(t),
            AggrKind::Min => TimeSeriesExpr::Min(t),
            AggrKind::Max => TimeSeriesExpr::Max(t),
            AggrKind::Count => TimeSeriesExpr::Count(t),
        }
    }

    fn matches(self, af: &AggregateFunction) -> bool {
        matches!(
            (self, af),
            (AggrKind::Sum, AggregateFunction::Sum(_))
                | (AggrKind::Min, AggregateFunction::Min(_))
                | (AggrKind::Max, AggregateFunction::Max(_))
        )
    }
}

/// Apply an aggregate word to an already-resolved expression.
///
/// Precedence-ordered collapsing, evaluated in this fixed order:
/// 1. a grouped aggregate of the same kind collapses to its inner
///    aggregate (regrouping a grouped sum with `:sum` is redundant);
/// 2. any other aggregate leaf is returned unchanged, except for
///    `:count`, since repeated counting is not a single count;
/// 3. everything else is wrapped in the word's cross-series variant.
fn collapse(kind: AggrKind, t: &TimeSeriesExpr) -> TimeSeriesExpr {
    match t {
        TimeSeriesExpr::Data(DataExpr::GroupBy { af, .. }) if kind.matches(af) => {
            TimeSeriesExpr::Data(DataExpr::Aggregate(af.clone()))
        }
        TimeSeriesExpr::Data(DataExpr::Aggregate(_)) | TimeSeriesExpr::Data(DataExpr::GroupBy { .. })
            if kind != AggrKind::Count =>
        {
            t.clone()
        }
        _ => kind.wrap(t.clone()),
    }
}

fn run_aggregate(stack: &Stack, kind: AggrKind) -> WordResult {
    match stack.as_slice() {
        [.., StackValue::Query(q)] => {
            let q = q.clone();
            let mut next = without_top(stack, 1);
            next.push(StackValue::Expr(TimeSeriesExpr::Data(DataExpr::Aggregate(
                kind.data(q),
            ))));
            Some(Ok(next))
        }
        [.., StackValue::Expr(t)] => {
            let collapsed = collapse(kind, t);
            let mut next = without_top(stack, 1);
            next.push(StackValue::Expr(collapsed));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_sum(stack: &Stack) -> WordResult {
    run_aggregate(stack, AggrKind::Sum)
}

fn run_min(stack: &Stack) -> WordResult {
    run_aggregate(stack, AggrKind::Min)
}

fn run_max(stack: &Stack) -> WordResult {
    run_aggregate(stack, AggrKind::Max)
}

fn run_count(stack: &Stack) -> WordResult {
    run_aggregate(stack, AggrKind::Count)
}

fn run_all(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., StackValue::Query(q)] => {
            let q = q.clone();
            let mut next = without_top(stack, 1);
            next.push(StackValue::Expr(TimeSeriesExpr::Data(DataExpr::All(q))));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_by(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., StackValue::Expr(t), StackValue::StringList(keys)] => {
            // A non-aggregate leaf fails the capability check rather than
            // producing a surprising partial rewrite.
            let grouped = t.group_by(keys)?;
            let mut next = without_top(stack, 2);
            next.push(StackValue::Expr(grouped));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_cq(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., StackValue::Expr(t), StackValue::Query(q)] => {
            let rewritten = t.common_query(q);
            let mut next = without_top(stack, 2);
            next.push(StackValue::Expr(rewritten));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_const(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., StackValue::Str(s)] => {
            let parsed = s.parse::<f64>().map_err(|_| EvalError::Literal {
                token: s.clone(),
                target: "number",
            });
            Some(parsed.map(|v| {
                let mut next = without_top(stack, 1);
                next.push(StackValue::Number(v));
                next
            }))
        }
        _ => None,
    }
}

fn run_random(stack: &Stack) -> WordResult {
    let mut next = stack.clone();
    next.push(StackValue::Expr(TimeSeriesExpr::Random));
    Some(Ok(next))
}

fn run_time(stack: &Stack) -> WordResult {
    match stack.as_slice() {
        [.., StackValue::Str(s)] => {
            let parsed = TimeField::parse(s).ok_or_else(|| EvalError::Literal {
                token: s.clone(),
                target: "time field",
            });
            Some(parsed.map(|field| {
                let mut next = without_top(stack, 1);
                next.push(StackValue::Expr(TimeSeriesExpr::Time(field)));
                next
            }))
        }
        _ => None,
    }
}

fn run_unary(stack: &Stack, wrap: fn(Box<TimeSeriesExpr>) -> TimeSeriesExpr) -> WordResult {
    match stack.as_slice() {
        [.., v] => {
            let t = v.as_expr()?;
            let mut next = without_top(stack, 1);
            next.push(StackValue::Expr(wrap(Box::new(t))));
            Some(Ok(next))
        }
        [] => None,
    }
}

fn run_abs(stack: &Stack) -> WordResult {
    run_unary(stack, TimeSeriesExpr::Abs)
}

fn run_neg(stack: &Stack) -> WordResult {
    run_unary(stack, TimeSeriesExpr::Negate)
}

fn run_sqrt(stack: &Stack) -> WordResult {
    run_unary(stack, TimeSeriesExpr::Sqrt)
}

fn run_per_step(stack: &Stack) -> WordResult {
    run_unary(stack, TimeSeriesExpr::PerStep)
}

/// Binary math shape shared by arithmetic and comparison words: pop the
/// second-from-top as the left operand and the top as the right, push the
/// combining node. Operand order is push order. `Number` operands are
/// lifted to constants.
fn run_binary(
    stack: &Stack,
    wrap: fn(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>) -> TimeSeriesExpr,
) -> WordResult {
    match stack.as_slice() {
        [.., a, b] => {
            let (a, b) = (a.as_expr()?, b.as_expr()?);
            let mut next = without_top(stack, 2);
            next.push(StackValue::Expr(wrap(Box::new(a), Box::new(b))));
            Some(Ok(next))
        }
        _ => None,
    }
}

fn run_add(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::Add)
}

fn run_sub(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::Subtract)
}

fn run_mul(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::Multiply)
}

fn run_div(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::Divide)
}

fn run_fadd(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::FAdd)
}

fn run_fsub(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::FSubtract)
}

fn run_fmul(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::FMultiply)
}

fn run_fdiv(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::FDivide)
}

fn run_gt(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::GreaterThan)
}

fn run_ge(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::GreaterThanEqual)
}

fn run_lt(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::LessThan)
}

fn run_le(stack: &Stack) -> WordResult {
    run_binary(stack, TimeSeriesExpr::LessThanEqual)
}

pub fn definitions() -> Vec<Definition> {
    let mut defs = vec![
        Definition::Word(Word::new(
            "all",
            "Query -- TimeSeriesExpr",
            "Select every matching stream without aggregating.",
            &["name,sps,:eq,:all"],
            run_all,
        )),
        Definition::Word(Word::new(
            "sum",
            "Query -- TimeSeriesExpr | TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval sum. On a query, selects and sums the matching \
             streams; on an expression, sums across its output series. A \
             grouped sum collapses to its inner sum; other aggregate leaves \
             pass through unchanged.",
            &["name,sps,:eq,:sum"],
            run_sum,
        )),
        Definition::Word(Word::new(
            "count",
            "Query -- TimeSeriesExpr | TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval count of series reporting a value. Never collapses: \
             counting a count is a different measurement.",
            &["name,sps,:eq,:count"],
            run_count,
        )),
        Definition::Word(Word::new(
            "min",
            "Query -- TimeSeriesExpr | TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval minimum, with the same collapsing as :sum.",
            &["name,sps,:eq,:min"],
            run_min,
        )),
        Definition::Word(Word::new(
            "max",
            "Query -- TimeSeriesExpr | TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval maximum, with the same collapsing as :sum.",
            &["name,sps,:eq,:max"],
            run_max,
        )),
        Definition::Word(Word::new(
            "by",
            "TimeSeriesExpr (keys) -- TimeSeriesExpr",
            "Group every aggregate leaf by the listed tag keys. Fails to \
             match when the expression contains an unaggregated or \
             already-grouped leaf.",
            &["name,sps,:eq,:sum,(,nf.cluster,),:by"],
            run_by,
        )),
        Definition::Word(Word::new(
            "cq",
            "TimeSeriesExpr Query -- TimeSeriesExpr",
            "AND a common predicate into every data leaf. Applying the same \
             predicate twice nests it twice.",
            &["name,sps,:eq,:sum,nf.app,www,:eq,:cq"],
            run_cq,
        )),
        Definition::Word(Word::new(
            "const",
            "v -- Number",
            "Parse a literal token as a number.",
            &["42,:const"],
            run_const,
        )),
        Definition::Word(Word::new(
            "random",
            "-- TimeSeriesExpr",
            "Uniform noise in [0, 1), deterministic per interval.",
            &[":random"],
            run_random,
        )),
        Definition::Word(Word::new(
            "time",
            "field -- TimeSeriesExpr",
            "A calendar field of the interval timestamp (UTC).",
            &["hourOfDay,:time"],
            run_time,
        )),
        Definition::Word(Word::new(
            "abs",
            "TimeSeriesExpr -- TimeSeriesExpr",
            "Absolute value per interval.",
            &["name,sps,:eq,:sum,:abs"],
            run_abs,
        )),
        Definition::Word(Word::new(
            "neg",
            "TimeSeriesExpr -- TimeSeriesExpr",
            "Negate per interval.",
            &["name,sps,:eq,:sum,:neg"],
            run_neg,
        )),
        Definition::Word(Word::new(
            "sqrt",
            "TimeSeriesExpr -- TimeSeriesExpr",
            "Square root per interval.",
            &["name,sps,:eq,:sum,:sqrt"],
            run_sqrt,
        )),
        Definition::Word(Word::new(
            "per-step",
            "TimeSeriesExpr -- TimeSeriesExpr",
            "Divide by the step size in seconds, turning per-interval totals \
             into per-second rates.",
            &["name,sps,:eq,:sum,:per-step"],
            run_per_step,
        )),
        Definition::Word(Word::new(
            "add",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval sum of two signals. A NaN operand is treated as \
             absent: NaN + b is b.",
            &["name,a,:eq,:sum,name,b,:eq,:sum,:add"],
            run_add,
        )),
        Definition::Word(Word::new(
            "sub",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval difference. A NaN operand is treated as absent: \
             NaN - b is -b, a - NaN is a.",
            &["name,a,:eq,:sum,name,b,:eq,:sum,:sub"],
            run_sub,
        )),
        Definition::Word(Word::new(
            "mul",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval product. A NaN operand is treated as absent: \
             a * NaN is a.",
            &["name,a,:eq,:sum,name,b,:eq,:sum,:mul"],
            run_mul,
        )),
        Definition::Word(Word::new(
            "div",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval quotient with rate semantics: 0/0 is 0, any other \
             division by zero is NaN.",
            &["name,a,:eq,:sum,name,b,:eq,:sum,:div"],
            run_div,
        )),
        Definition::Word(Word::new(
            "fadd",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval sum with IEEE semantics; NaN propagates.",
            &["name,a,:eq,:sum,name,b,:eq,:sum,:fadd"],
            run_fadd,
        )),
        Definition::Word(Word::new(
            "fsub",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval difference with IEEE semantics; NaN propagates.",
            &["name,a,:eq,:sum,name,b,:eq,:sum,:fsub"],
            run_fsub,
        )),
        Definition::Word(Word::new(
            "fmul",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval product with IEEE semantics; NaN propagates.",
            &["name,a,:eq,:sum,name,b,:eq,:sum,:fmul"],
            run_fmul,
        )),
        Definition::Word(Word::new(
            "fdiv",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "Per-interval quotient with IEEE semantics: any division by \
             zero is NaN, including 0/0.",
            &["name,a,:eq,:sum,name,b,:eq,:sum,:fdiv"],
            run_fdiv,
        )),
        Definition::Word(Word::new(
            "gt",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "1.0 where left > right, else 0.0; NaN where either side is NaN.",
            &["name,a,:eq,:sum,100,:const,:gt"],
            run_gt,
        )),
        Definition::Word(Word::new(
            "ge",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "1.0 where left >= right, else 0.0; NaN where either side is NaN.",
            &["name,a,:eq,:sum,100,:const,:ge"],
            run_ge,
        )),
        Definition::Word(Word::new(
            "lt",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "1.0 where left < right, else 0.0; NaN where either side is NaN.",
            &["name,a,:eq,:sum,100,:const,:lt"],
            run_lt,
        )),
        Definition::Word(Word::new(
            "le",
            "TimeSeriesExpr TimeSeriesExpr -- TimeSeriesExpr",
            "1.0 where left <= right, else 0.0; NaN where either side is NaN.",
            &["name,a,:eq,:sum,100,:const,:le"],
            run_le,
        )),
    ];
    defs.extend(macros());
    defs
}

fn macros() -> Vec<Definition> {
    vec![
        Definition::Macro(Macro::new(
            "avg",
            "Average of the context query's streams, grouped by the context \
             key list.",
            &[":swap", ":dup", ":sum", ":swap", ":count", ":div", ":swap", ":by"],
            &["name", "sps", ":eq", "(", "nf.cluster", ")"],
            &["name,sps,:eq,(,nf.cluster,),:avg", ":avg"],
        )),
        Definition::Macro(Macro::new(
            "dist-avg",
            "Average recorded value of a timer or distribution-summary \
             context query: total amount over count.",
            &[
                ":dup",
                "statistic",
                "(",
                "totalAmount",
                "totalTime",
                ")",
                ":in",
                ":and",
                ":sum",
                ":swap",
                "statistic",
                "count",
                ":eq",
                ":and",
                ":sum",
                ":div",
            ],
            &["name", "requestLatency", ":eq"],
            &["name,requestLatency,:eq,:dist-avg"],
        )),
        Definition::Macro(Macro::new(
            "dist-max",
            "Maximum recorded value of a timer or distribution-summary \
             context query.",
            &["statistic", "max", ":eq", ":and", ":max"],
            &["name", "requestLatency", ":eq"],
            &["name,requestLatency,:eq,:dist-max"],
        )),
        Definition::Macro(Macro::new(
            "dist-stddev",
            "Population standard deviation of a timer or \
             distribution-summary context query: sqrt(E[x^2] - E[x]^2) from \
             the count, totalOfSquares, and total statistics.",
            &[
                ":dup",
                "statistic",
                "(",
                "totalAmount",
                "totalTime",
                ")",
                ":in",
                ":and",
                ":sum",
                ":over",
                "statistic",
                "count",
                ":eq",
                ":and",
                ":sum",
                ":rot",
                "statistic",
                "totalOfSquares",
                ":eq",
                ":and",
                ":sum",
                ":over",
                ":fdiv",
                ":rot",
                ":rot",
                ":fdiv",
                ":dup",
                ":fmul",
                ":fsub",
                ":sqrt",
            ],
            &["name", "requestLatency", ":eq"],
            &["name,requestLatency,:eq,:dist-stddev"],
        )),
    ]
}
