use gauge_lang::{
    evaluate, words, AggregateFunction, DataExpr, EvalContext, EvalError, Interpreter, Query,
    StackValue, TimeSeries, TimeSeriesExpr,
};

const STEP_MS: i64 = 60_000;

fn eval_expr(program: &str) -> TimeSeriesExpr {
    let interp = Interpreter::new(words::compose_math().unwrap());
    let stack = interp.execute(program).unwrap();
    match stack.into_iter().next().unwrap() {
        StackValue::Expr(t) => t,
        other => panic!("expected expression, got {:?}", other),
    }
}

fn sum_leaf(key: &str, value: &str) -> DataExpr {
    DataExpr::Aggregate(AggregateFunction::Sum(Query::equal(key, value)))
}

fn ctx(intervals: usize) -> EvalContext {
    EvalContext::new(0, STEP_MS, intervals)
}

fn series(values: Vec<f64>) -> Vec<TimeSeries> {
    vec![TimeSeries::new("test", values)]
}

/// NaN-aware sample comparison.
fn assert_values(actual: &[TimeSeries], expected: &[f64]) {
    assert_eq!(actual.len(), 1, "expected a single output series");
    let got = &actual[0].values;
    assert_eq!(got.len(), expected.len());
    for (i, (g, e)) in got.iter().zip(expected).enumerate() {
        let same = (g.is_nan() && e.is_nan()) || (g - e).abs() < 1e-9;
        assert!(same, "interval {}: got {}, expected {}", i, g, e);
    }
}

// ============================================================================
// Division semantics
// ============================================================================

#[test]
fn div_has_rate_semantics() {
    let expr = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:div");
    let ctx = ctx(3)
        .with_data(sum_leaf("name", "a"), series(vec![0.0, 5.0, 6.0]))
        .with_data(sum_leaf("name", "b"), series(vec![0.0, 0.0, 3.0]));

    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[0.0, f64::NAN, 2.0]);
}

#[test]
fn fdiv_has_floating_semantics() {
    let expr = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:fdiv");
    let ctx = ctx(3)
        .with_data(sum_leaf("name", "a"), series(vec![0.0, 5.0, 6.0]))
        .with_data(sum_leaf("name", "b"), series(vec![0.0, 0.0, 3.0]));

    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[f64::NAN, f64::NAN, 2.0]);
}

// ============================================================================
// NaN handling per pair
// ============================================================================

#[test]
fn add_treats_nan_as_absent() {
    let expr = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:add");
    let ctx = ctx(4)
        .with_data(sum_leaf("name", "a"), series(vec![f64::NAN, 1.0, f64::NAN, 2.0]))
        .with_data(sum_leaf("name", "b"), series(vec![3.0, f64::NAN, f64::NAN, 4.0]));

    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[3.0, 1.0, f64::NAN, 6.0]);
}

#[test]
fn sub_treats_nan_as_absent() {
    let expr = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:sub");
    let ctx = ctx(4)
        .with_data(sum_leaf("name", "a"), series(vec![f64::NAN, 5.0, f64::NAN, 7.0]))
        .with_data(sum_leaf("name", "b"), series(vec![3.0, f64::NAN, f64::NAN, 4.0]));

    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[-3.0, 5.0, f64::NAN, 3.0]);
}

#[test]
fn mul_treats_nan_as_absent() {
    let expr = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:mul");
    let ctx = ctx(4)
        .with_data(sum_leaf("name", "a"), series(vec![f64::NAN, 3.0, f64::NAN, 2.0]))
        .with_data(sum_leaf("name", "b"), series(vec![4.0, f64::NAN, f64::NAN, 5.0]));

    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[4.0, 3.0, f64::NAN, 10.0]);
}

#[test]
fn floating_variants_propagate_nan() {
    let a = series(vec![f64::NAN, 1.0]);
    let b = series(vec![2.0, f64::NAN]);
    for word in [":fadd", ":fsub", ":fmul"] {
        let expr = eval_expr(&format!("name,a,:eq,:sum,name,b,:eq,:sum,{}", word));
        let ctx = ctx(2)
            .with_data(sum_leaf("name", "a"), a.clone())
            .with_data(sum_leaf("name", "b"), b.clone());
        let out = evaluate(&expr, &ctx).unwrap();
        assert_values(&out, &[f64::NAN, f64::NAN]);
    }
}

// ============================================================================
// Comparison and boolean signals
// ============================================================================

#[test]
fn comparisons_yield_unit_signals() {
    let ctx = ctx(3)
        .with_data(sum_leaf("name", "a"), series(vec![1.0, 5.0, f64::NAN]))
        .with_data(sum_leaf("name", "b"), series(vec![2.0, 2.0, 1.0]));

    let gt = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:gt");
    assert_values(&evaluate(&gt, &ctx).unwrap(), &[0.0, 1.0, f64::NAN]);

    let le = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:le");
    assert_values(&evaluate(&le, &ctx).unwrap(), &[1.0, 0.0, f64::NAN]);
}

#[test]
fn boolean_words_treat_nan_as_false() {
    let ctx = ctx(3)
        .with_data(sum_leaf("name", "a"), series(vec![1.0, 0.0, f64::NAN]))
        .with_data(sum_leaf("name", "b"), series(vec![1.0, 1.0, 1.0]));

    let and = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:and");
    assert_values(&evaluate(&and, &ctx).unwrap(), &[1.0, 0.0, 0.0]);

    let or = eval_expr("name,a,:eq,:sum,name,b,:eq,:sum,:or");
    assert_values(&evaluate(&or, &ctx).unwrap(), &[1.0, 1.0, 1.0]);
}

// ============================================================================
// Unary transforms and sources
// ============================================================================

#[test]
fn per_step_divides_by_step_seconds() {
    let expr = eval_expr("name,a,:eq,:sum,:per-step");
    let ctx = ctx(2).with_data(sum_leaf("name", "a"), series(vec![120.0, 30.0]));

    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[2.0, 0.5]);
}

#[test]
fn unary_transforms_apply_per_interval() {
    let ctx = ctx(2).with_data(sum_leaf("name", "a"), series(vec![-4.0, 9.0]));

    let abs = eval_expr("name,a,:eq,:sum,:abs");
    assert_values(&evaluate(&abs, &ctx).unwrap(), &[4.0, 9.0]);

    let neg = eval_expr("name,a,:eq,:sum,:neg");
    assert_values(&evaluate(&neg, &ctx).unwrap(), &[4.0, -9.0]);

    let sqrt = eval_expr("name,a,:eq,:sum,:abs,:sqrt");
    assert_values(&evaluate(&sqrt, &ctx).unwrap(), &[2.0, 3.0]);
}

#[test]
fn constants_fill_every_interval() {
    let expr = eval_expr("name,a,:eq,:sum,2,:const,:fmul");
    let ctx = ctx(3).with_data(sum_leaf("name", "a"), series(vec![1.0, 2.0, 3.0]));

    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[2.0, 4.0, 6.0]);
}

#[test]
fn time_fields_follow_the_interval_grid() {
    // Epoch start is 1970-01-01T00:00Z, a Thursday.
    let expr = eval_expr("hourOfDay,:time");
    let hours = EvalContext::new(0, 3_600_000, 3);
    assert_values(&evaluate(&expr, &hours).unwrap(), &[0.0, 1.0, 2.0]);

    let expr = eval_expr("dayOfWeek,:time");
    let days = EvalContext::new(0, 86_400_000, 2);
    assert_values(&evaluate(&expr, &days).unwrap(), &[3.0, 4.0]);
}

#[test]
fn random_is_deterministic_per_context() {
    let expr = eval_expr(":random");
    let seeded = ctx(8).with_seed(7);

    let a = evaluate(&expr, &seeded).unwrap();
    let b = evaluate(&expr, &seeded).unwrap();
    assert_eq!(a, b);
    assert!(a[0].values.iter().all(|v| (0.0..1.0).contains(v)));

    let other = evaluate(&expr, &ctx(8).with_seed(8)).unwrap();
    assert_ne!(a, other);
}

// ============================================================================
// Cross-series folds
// ============================================================================

#[test]
fn folds_skip_missing_samples() {
    let leaf = DataExpr::All(Query::equal("name", "a"));
    let data = vec![
        TimeSeries::new("one", vec![1.0, f64::NAN, f64::NAN]),
        TimeSeries::new("two", vec![2.0, 3.0, f64::NAN]),
    ];

    let sum = eval_expr("name,a,:eq,:all,:sum");
    let ctx_sum = ctx(3).with_data(leaf.clone(), data.clone());
    assert_values(&evaluate(&sum, &ctx_sum).unwrap(), &[3.0, 3.0, f64::NAN]);

    let count = eval_expr("name,a,:eq,:all,:count");
    let ctx_count = ctx(3).with_data(leaf.clone(), data.clone());
    assert_values(&evaluate(&count, &ctx_count).unwrap(), &[2.0, 1.0, 0.0]);

    let min = eval_expr("name,a,:eq,:all,:min");
    let ctx_min = ctx(3).with_data(leaf, data);
    assert_values(&evaluate(&min, &ctx_min).unwrap(), &[1.0, 3.0, f64::NAN]);
}

#[test]
fn single_series_broadcasts_against_many() {
    let leaf = DataExpr::All(Query::equal("name", "a"));
    let data = vec![
        TimeSeries::new("one", vec![2.0, 4.0]),
        TimeSeries::new("two", vec![6.0, 8.0]),
    ];
    let expr = eval_expr("name,a,:eq,:all,2,:const,:fdiv");
    let out = evaluate(&expr, &ctx(2).with_data(leaf, data)).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].values, vec![1.0, 2.0]);
    assert_eq!(out[1].values, vec![3.0, 4.0]);
}

#[test]
fn mismatched_series_counts_are_an_error() {
    let a = DataExpr::All(Query::equal("name", "a"));
    let b = DataExpr::All(Query::equal("name", "b"));
    let expr = eval_expr("name,a,:eq,:all,name,b,:eq,:all,:add");
    let ctx = ctx(1)
        .with_data(
            a,
            vec![
                TimeSeries::new("a1", vec![1.0]),
                TimeSeries::new("a2", vec![2.0]),
            ],
        )
        .with_data(
            b,
            vec![
                TimeSeries::new("b1", vec![1.0]),
                TimeSeries::new("b2", vec![2.0]),
                TimeSeries::new("b3", vec![3.0]),
            ],
        );

    let err = evaluate(&expr, &ctx).unwrap_err();
    assert!(matches!(err, EvalError::DataMismatch { left: 2, right: 3 }));
}

#[test]
fn missing_leaf_data_evaluates_to_nan() {
    let context = ctx(3);
    assert_eq!(context.intervals(), 3);
    assert_eq!(context.step_ms(), STEP_MS);

    let expr = eval_expr("name,a,:eq,:sum");
    let out = evaluate(&expr, &context).unwrap();
    assert_values(&out, &[f64::NAN, f64::NAN, f64::NAN]);
}

// ============================================================================
// Distilled statistics macros
// ============================================================================

fn dist_leaf(metric: &str, statistic_query: Query) -> DataExpr {
    DataExpr::Aggregate(AggregateFunction::Sum(Query::and(
        Query::equal("name", metric),
        statistic_query,
    )))
}

fn total_query() -> Query {
    Query::in_values(
        "statistic",
        vec!["totalAmount".to_string(), "totalTime".to_string()],
    )
}

#[test]
fn dist_avg_is_total_over_count() {
    let expr = eval_expr("name,requestLatency,:eq,:dist-avg");
    let ctx = ctx(2)
        .with_data(
            dist_leaf("requestLatency", total_query()),
            series(vec![40.0, 0.0]),
        )
        .with_data(
            dist_leaf("requestLatency", Query::equal("statistic", "count")),
            series(vec![8.0, 0.0]),
        );

    // 0/0 from the rate-style division marks an idle interval as 0.
    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[5.0, 0.0]);
}

#[test]
fn dist_stddev_reproduces_the_population_formula() {
    // Samples per interval 0: {2,4,4,4,5,5,7,9} -> mean 5, stddev 2.
    // Samples per interval 1: {2,3,4} -> mean 3, variance 2/3.
    let expr = eval_expr("name,requestLatency,:eq,:dist-stddev");
    let ctx = ctx(2)
        .with_data(
            dist_leaf("requestLatency", Query::equal("statistic", "count")),
            series(vec![8.0, 3.0]),
        )
        .with_data(
            dist_leaf(
                "requestLatency",
                Query::equal("statistic", "totalOfSquares"),
            ),
            series(vec![232.0, 29.0]),
        )
        .with_data(
            dist_leaf("requestLatency", total_query()),
            series(vec![40.0, 9.0]),
        );

    let out = evaluate(&expr, &ctx).unwrap();
    assert_values(&out, &[2.0, (2.0f64 / 3.0).sqrt()]);
}

#[test]
fn dist_stddev_uses_its_default_context_when_bare() {
    let bare = eval_expr(":dist-stddev");
    let explicit = eval_expr("name,requestLatency,:eq,:dist-stddev");
    assert_eq!(bare, explicit);
}
