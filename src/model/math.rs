use crate::model::DataExpr;

/// Calendar field derived from an interval's UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeField {
    SecondOfMinute,
    MinuteOfHour,
    HourOfDay,
    DayOfWeek,
    DayOfMonth,
    MonthOfYear,
}

impl TimeField {
    /// Token form accepted by `:time`, e.g. `hourOfDay`.
    pub fn parse(token: &str) -> Option<TimeField> {
        match token {
            "secondOfMinute" => Some(TimeField::SecondOfMinute),
            "minuteOfHour" => Some(TimeField::MinuteOfHour),
            "hourOfDay" => Some(TimeField::HourOfDay),
            "dayOfWeek" => Some(TimeField::DayOfWeek),
            "dayOfMonth" => Some(TimeField::DayOfMonth),
            "monthOfYear" => Some(TimeField::MonthOfYear),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimeField::SecondOfMinute => "secondOfMinute",
            TimeField::MinuteOfHour => "minuteOfHour",
            TimeField::HourOfDay => "hourOfDay",
            TimeField::DayOfWeek => "dayOfWeek",
            TimeField::DayOfMonth => "dayOfMonth",
            TimeField::MonthOfYear => "monthOfYear",
        }
    }
}

/// An expression evaluating to one or more time series.
///
/// The math layer of the model: data selections combined arithmetically,
/// compared, transformed, or re-aggregated across series. Binary variants
/// keep operand order as pushed: `A,B,:sub` is `Subtract(A, B)`.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSeriesExpr {
    /// A resolved data selection (the tree's leaves)
    Data(DataExpr),

    /// The same value at every interval
    ///
    /// # Example
    /// ```text
    /// 42,:const
    /// ```
    Constant(f64),

    /// Uniform noise in `[0, 1)`, deterministic per interval
    Random,

    /// A calendar field of the interval timestamp
    ///
    /// # Example
    /// ```text
    /// hourOfDay,:time
    /// ```
    Time(TimeField),

    // Arithmetic, NaN-tolerant (a missing sample acts as the identity)
    Add(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    Subtract(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    Multiply(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    Divide(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),

    // Arithmetic, IEEE floating semantics (NaN propagates)
    FAdd(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    FSubtract(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    FMultiply(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    FDivide(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),

    // Comparison, yielding 1.0 / 0.0 signals
    GreaterThan(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    GreaterThanEqual(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    LessThan(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    LessThanEqual(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),

    // Boolean combination of 1.0 / 0.0 signals
    And(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),
    Or(Box<TimeSeriesExpr>, Box<TimeSeriesExpr>),

    // Unary transforms
    Abs(Box<TimeSeriesExpr>),
    Negate(Box<TimeSeriesExpr>),
    Sqrt(Box<TimeSeriesExpr>),

    /// Value divided by the step size in seconds (per-second rate)
    PerStep(Box<TimeSeriesExpr>),

    // Aggregation across the inner expression's output series
    Sum(Box<TimeSeriesExpr>),
    Count(Box<TimeSeriesExpr>),
    Min(Box<TimeSeriesExpr>),
    Max(Box<TimeSeriesExpr>),
}

impl TimeSeriesExpr {
    /// All data-expression leaves, in left-to-right order.
    pub fn data_exprs(&self) -> Vec<&DataExpr> {
        let mut out = Vec::new();
        self.collect_data_exprs(&mut out);
        out
    }

    fn collect_data_exprs<'a>(&'a self, out: &mut Vec<&'a DataExpr>) {
        use TimeSeriesExpr::*;
        match self {
            Data(d) => out.push(d),
            Constant(_) | Random | Time(_) => {}
            Add(a, b) | Subtract(a, b) | Multiply(a, b) | Divide(a, b) | FAdd(a, b)
            | FSubtract(a, b) | FMultiply(a, b) | FDivide(a, b) | GreaterThan(a, b)
            | GreaterThanEqual(a, b) | LessThan(a, b) | LessThanEqual(a, b) | And(a, b)
            | Or(a, b) => {
                a.collect_data_exprs(out);
                b.collect_data_exprs(out);
            }
            Abs(t) | Negate(t) | Sqrt(t) | PerStep(t) | Sum(t) | Count(t) | Min(t) | Max(t) => {
                t.collect_data_exprs(out)
            }
        }
    }
}

impl From<DataExpr> for TimeSeriesExpr {
    fn from(d: DataExpr) -> TimeSeriesExpr {
        TimeSeriesExpr::Data(d)
    }
}

impl std::fmt::Display for TimeSeriesExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TimeSeriesExpr::*;
        match self {
            Data(d) => write!(f, "{}", d),
            Constant(v) => write!(f, "{},:const", v),
            Random => write!(f, ":random"),
            Time(field) => write!(f, "{},:time", field.name()),
            Add(a, b) => write!(f, "{},{},:add", a, b),
            Subtract(a, b) => write!(f, "{},{},:sub", a, b),
            Multiply(a, b) => write!(f, "{},{},:mul", a, b),
            Divide(a, b) => write!(f, "{},{},:div", a, b),
            FAdd(a, b) => write!(f, "{},{},:fadd", a, b),
            FSubtract(a, b) => write!(f, "{},{},:fsub", a, b),
            FMultiply(a, b) => write!(f, "{},{},:fmul", a, b),
            FDivide(a, b) => write!(f, "{},{},:fdiv", a, b),
            GreaterThan(a, b) => write!(f, "{},{},:gt", a, b),
            GreaterThanEqual(a, b) => write!(f, "{},{},:ge", a, b),
            LessThan(a, b) => write!(f, "{},{},:lt", a, b),
            LessThanEqual(a, b) => write!(f, "{},{},:le", a, b),
            And(a, b) => write!(f, "{},{},:and", a, b),
            Or(a, b) => write!(f, "{},{},:or", a, b),
            Abs(t) => write!(f, "{},:abs", t),
            Negate(t) => write!(f, "{},:neg", t),
            Sqrt(t) => write!(f, "{},:sqrt", t),
            PerStep(t) => write!(f, "{},:per-step", t),
            Sum(t) => write!(f, "{},:sum", t),
            Count(t) => write!(f, "{},:count", t),
            Min(t) => write!(f, "{},:min", t),
            Max(t) => write!(f, "{},:max", t),
        }
    }
}
