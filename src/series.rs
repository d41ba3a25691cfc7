//! Numeric evaluation of resolved expressions.
//!
//! The storage layer is an external collaborator: callers fetch samples
//! for each data-expression leaf and hand them in through an
//! [`EvalContext`]. Evaluation then runs the math layer over the samples
//! with the per-interval semantics the word documentation promises
//! (NaN-tolerant vs floating variants, rate-style division, cross-series
//! folds).

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::interpreter::EvalError;
use crate::model::{DataExpr, TimeField, TimeSeriesExpr};

/// A labeled series of per-interval samples. NaN marks a missing sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub label: String,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> TimeSeries {
        TimeSeries {
            label: label.into(),
            values,
        }
    }
}

/// Inputs for one evaluation: the interval grid, the RNG seed, and the
/// samples fetched for each data-expression leaf.
#[derive(Debug, Clone)]
pub struct EvalContext {
    start_ms: i64,
    step_ms: i64,
    intervals: usize,
    seed: u64,
    data: HashMap<DataExpr, Vec<TimeSeries>>,
}

impl EvalContext {
    pub fn new(start_ms: i64, step_ms: i64, intervals: usize) -> EvalContext {
        EvalContext {
            start_ms,
            step_ms,
            intervals,
            seed: 0,
            data: HashMap::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> EvalContext {
        self.seed = seed;
        self
    }

    /// Supply the fetched series for one data-expression leaf.
    pub fn with_data(mut self, expr: DataExpr, series: Vec<TimeSeries>) -> EvalContext {
        self.data.insert(expr, series);
        self
    }

    pub fn step_ms(&self) -> i64 {
        self.step_ms
    }

    pub fn intervals(&self) -> usize {
        self.intervals
    }

    fn timestamp(&self, interval: usize) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_ms + self.step_ms * interval as i64)
    }
}

/// Resolve an expression to its output series.
///
/// A leaf with no supplied data evaluates to a single all-NaN series;
/// in this domain absence of data is a value, not a fault. The only
/// error is a series-arity clash between binary operands.
pub fn evaluate(expr: &TimeSeriesExpr, ctx: &EvalContext) -> Result<Vec<TimeSeries>, EvalError> {
    use TimeSeriesExpr::*;
    match expr {
        Data(d) => Ok(ctx.data.get(d).cloned().unwrap_or_else(|| {
            vec![TimeSeries::new(
                d.to_string(),
                vec![f64::NAN; ctx.intervals],
            )]
        })),
        Constant(v) => Ok(vec![TimeSeries::new(
            v.to_string(),
            vec![*v; ctx.intervals],
        )]),
        Random => Ok(vec![TimeSeries::new(
            "random",
            (0..ctx.intervals)
                .map(|i| {
                    // One small RNG per interval keeps the value a pure
                    // function of (seed, interval) under re-evaluation.
                    let mut rng = SmallRng::seed_from_u64(
                        ctx.seed ^ (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15),
                    );
                    rng.gen::<f64>()
                })
                .collect(),
        )]),
        Time(field) => Ok(vec![TimeSeries::new(
            field.name(),
            (0..ctx.intervals)
                .map(|i| match ctx.timestamp(i) {
                    Some(t) => time_field(*field, &t),
                    None => f64::NAN,
                })
                .collect(),
        )]),

        Add(a, b) => binary(expr, a, b, ctx, add_nan),
        Subtract(a, b) => binary(expr, a, b, ctx, subtract_nan),
        Multiply(a, b) => binary(expr, a, b, ctx, multiply_nan),
        Divide(a, b) => binary(expr, a, b, ctx, divide_rate),
        FAdd(a, b) => binary(expr, a, b, ctx, |x, y| x + y),
        FSubtract(a, b) => binary(expr, a, b, ctx, |x, y| x - y),
        FMultiply(a, b) => binary(expr, a, b, ctx, |x, y| x * y),
        FDivide(a, b) => binary(expr, a, b, ctx, divide_float),
        GreaterThan(a, b) => binary(expr, a, b, ctx, |x, y| compare(x, y, |o| o > 0.0)),
        GreaterThanEqual(a, b) => binary(expr, a, b, ctx, |x, y| compare(x, y, |o| o >= 0.0)),
        LessThan(a, b) => binary(expr, a, b, ctx, |x, y| compare(x, y, |o| o < 0.0)),
        LessThanEqual(a, b) => binary(expr, a, b, ctx, |x, y| compare(x, y, |o| o <= 0.0)),
        And(a, b) => binary(expr, a, b, ctx, |x, y| bool_signal(truthy(x) && truthy(y))),
        Or(a, b) => binary(expr, a, b, ctx, |x, y| bool_signal(truthy(x) || truthy(y))),

        Abs(t) => unary(t, ctx, f64::abs),
        Negate(t) => unary(t, ctx, |v| -v),
        Sqrt(t) => unary(t, ctx, f64::sqrt),
        PerStep(t) => {
            let seconds = ctx.step_ms as f64 / 1000.0;
            unary(t, ctx, move |v| v / seconds)
        }

        Sum(t) => fold(expr, t, ctx, FoldKind::Sum),
        Count(t) => fold(expr, t, ctx, FoldKind::Count),
        Min(t) => fold(expr, t, ctx, FoldKind::Min),
        Max(t) => fold(expr, t, ctx, FoldKind::Max),
    }
}

fn unary(
    inner: &TimeSeriesExpr,
    ctx: &EvalContext,
    op: impl Fn(f64) -> f64,
) -> Result<Vec<TimeSeries>, EvalError> {
    let series = evaluate(inner, ctx)?;
    Ok(series
        .into_iter()
        .map(|s| TimeSeries {
            label: s.label,
            values: s.values.into_iter().map(&op).collect(),
        })
        .collect())
}

/// Pairwise combination. A single series broadcasts against many; equal
/// counts zip in order (keeping the left labels); anything else is an
/// arity clash.
fn binary(
    whole: &TimeSeriesExpr,
    left: &TimeSeriesExpr,
    right: &TimeSeriesExpr,
    ctx: &EvalContext,
    op: impl Fn(f64, f64) -> f64 + Copy,
) -> Result<Vec<TimeSeries>, EvalError> {
    let ls = evaluate(left, ctx)?;
    let rs = evaluate(right, ctx)?;
    let combine = |a: &TimeSeries, b: &TimeSeries, label: String| TimeSeries {
        label,
        values: a
            .values
            .iter()
            .zip(&b.values)
            .map(|(x, y)| op(*x, *y))
            .collect(),
    };

    match (ls.len(), rs.len()) {
        (1, 1) => Ok(vec![combine(&ls[0], &rs[0], whole.to_string())]),
        (1, _) => Ok(rs.iter().map(|b| combine(&ls[0], b, b.label.clone())).collect()),
        (_, 1) => Ok(ls.iter().map(|a| combine(a, &rs[0], a.label.clone())).collect()),
        (n, m) if n == m => Ok(ls
            .iter()
            .zip(&rs)
            .map(|(a, b)| combine(a, b, a.label.clone()))
            .collect()),
        (n, m) => Err(EvalError::DataMismatch { left: n, right: m }),
    }
}

enum FoldKind {
    Sum,
    Count,
    Min,
    Max,
}

/// Collapse all series of the inner expression into one, per interval.
/// NaN samples do not contribute; an interval with no contributions is
/// NaN, except for a count, which is 0.
fn fold(
    whole: &TimeSeriesExpr,
    inner: &TimeSeriesExpr,
    ctx: &EvalContext,
    kind: FoldKind,
) -> Result<Vec<TimeSeries>, EvalError> {
    let series = evaluate(inner, ctx)?;
    let len = series.iter().map(|s| s.values.len()).max().unwrap_or(0);
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        let samples = series
            .iter()
            .filter_map(|s| s.values.get(i).copied())
            .filter(|v| !v.is_nan());
        let value = match kind {
            FoldKind::Sum => samples.fold(f64::NAN, add_nan),
            FoldKind::Min => samples.fold(f64::NAN, min_nan),
            FoldKind::Max => samples.fold(f64::NAN, max_nan),
            FoldKind::Count => samples.count() as f64,
        };
        values.push(value);
    }
    Ok(vec![TimeSeries::new(whole.to_string(), values)])
}

fn time_field(field: TimeField, t: &DateTime<Utc>) -> f64 {
    match field {
        TimeField::SecondOfMinute => t.second() as f64,
        TimeField::MinuteOfHour => t.minute() as f64,
        TimeField::HourOfDay => t.hour() as f64,
        TimeField::DayOfWeek => t.weekday().num_days_from_monday() as f64,
        TimeField::DayOfMonth => t.day() as f64,
        TimeField::MonthOfYear => t.month() as f64,
    }
}

/// NaN treated as absent: the present operand wins.
fn add_nan(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        b
    } else if b.is_nan() {
        a
    } else {
        a + b
    }
}

/// NaN treated as absent: a missing minuend yields the negated
/// subtrahend, a missing subtrahend yields the minuend.
fn subtract_nan(a: f64, b: f64) -> f64 {
    if a.is_nan() && b.is_nan() {
        f64::NAN
    } else if a.is_nan() {
        -b
    } else if b.is_nan() {
        a
    } else {
        a - b
    }
}

/// NaN treated as absent: the present operand passes through.
fn multiply_nan(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        b
    } else if b.is_nan() {
        a
    } else {
        a * b
    }
}

/// Rate-style division: 0/0 is 0 (no activity), any other division by
/// zero is NaN. NaN operands stay NaN; the zero rules apply to present
/// samples only.
fn divide_rate(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if b == 0.0 {
        if a == 0.0 {
            0.0
        } else {
            f64::NAN
        }
    } else {
        a / b
    }
}

/// Floating division: any division by zero is NaN, including 0/0.
fn divide_float(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        f64::NAN
    } else {
        a / b
    }
}

fn compare(a: f64, b: f64, ord: impl Fn(f64) -> bool) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        bool_signal(ord(a - b))
    }
}

fn truthy(v: f64) -> bool {
    !v.is_nan() && v != 0.0
}

fn bool_signal(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn min_nan(acc: f64, v: f64) -> f64 {
    if acc.is_nan() {
        v
    } else {
        acc.min(v)
    }
}

fn max_nan(acc: f64, v: f64) -> f64 {
    if acc.is_nan() {
        v
    } else {
        acc.max(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtract_treats_missing_as_absent() {
        assert_eq!(subtract_nan(f64::NAN, 5.0), -5.0);
        assert_eq!(subtract_nan(5.0, f64::NAN), 5.0);
        assert!(subtract_nan(f64::NAN, f64::NAN).is_nan());
    }

    #[test]
    fn rate_division_zero_rules() {
        assert_eq!(divide_rate(0.0, 0.0), 0.0);
        assert!(divide_rate(5.0, 0.0).is_nan());
        assert_eq!(divide_rate(6.0, 3.0), 2.0);
    }
}
