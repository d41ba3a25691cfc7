use crate::model::Query;

/// An aggregation applied to the streams a query selects.
///
/// This is the only thing `GroupBy` may wrap, encoding the invariant that
/// grouping always applies to an aggregate, never to a raw selection or a
/// composite math expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    /// Per-interval sum of all matching streams
    Sum(Query),

    /// Per-interval minimum across matching streams
    Min(Query),

    /// Per-interval maximum across matching streams
    Max(Query),

    /// Per-interval count of streams reporting a value
    Count(Query),
}

impl AggregateFunction {
    /// The predicate selecting this aggregate's input streams.
    pub fn query(&self) -> &Query {
        match self {
            AggregateFunction::Sum(q)
            | AggregateFunction::Min(q)
            | AggregateFunction::Max(q)
            | AggregateFunction::Count(q) => q,
        }
    }

    /// Rebuild with a different predicate, keeping the aggregate kind.
    pub fn with_query(&self, q: Query) -> AggregateFunction {
        match self {
            AggregateFunction::Sum(_) => AggregateFunction::Sum(q),
            AggregateFunction::Min(_) => AggregateFunction::Min(q),
            AggregateFunction::Max(_) => AggregateFunction::Max(q),
            AggregateFunction::Count(_) => AggregateFunction::Count(q),
        }
    }
}

impl std::fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateFunction::Sum(q) => write!(f, "{},:sum", q),
            AggregateFunction::Min(q) => write!(f, "{},:min", q),
            AggregateFunction::Max(q) => write!(f, "{},:max", q),
            AggregateFunction::Count(q) => write!(f, "{},:count", q),
        }
    }
}

/// A selection of raw time series, optionally reduced and grouped.
///
/// Data expressions are the leaves of every [`TimeSeriesExpr`]; they are
/// what the storage layer resolves into actual samples.
///
/// [`TimeSeriesExpr`]: crate::model::TimeSeriesExpr
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataExpr {
    /// Every matching stream, unaggregated
    ///
    /// The one non-aggregate leaf. `:by` refuses expressions containing it.
    ///
    /// # Example
    /// ```text
    /// name,sps,:eq,:all
    /// ```
    All(Query),

    /// A single aggregate over the matching streams
    ///
    /// # Example
    /// ```text
    /// name,sps,:eq,:sum
    /// ```
    Aggregate(AggregateFunction),

    /// An aggregate computed separately per distinct value of each key
    ///
    /// # Example
    /// ```text
    /// name,sps,:eq,:sum,(,nf.cluster,),:by
    /// ```
    GroupBy {
        af: AggregateFunction,
        keys: Vec<String>,
    },
}

impl DataExpr {
    /// The predicate selecting this expression's input streams.
    pub fn query(&self) -> &Query {
        match self {
            DataExpr::All(q) => q,
            DataExpr::Aggregate(af) => af.query(),
            DataExpr::GroupBy { af, .. } => af.query(),
        }
    }

    /// Rebuild with a different predicate, keeping aggregation and grouping.
    pub fn with_query(&self, q: Query) -> DataExpr {
        match self {
            DataExpr::All(_) => DataExpr::All(q),
            DataExpr::Aggregate(af) => DataExpr::Aggregate(af.with_query(q)),
            DataExpr::GroupBy { af, keys } => DataExpr::GroupBy {
                af: af.with_query(q),
                keys: keys.clone(),
            },
        }
    }

    /// True for leaves `:by` may regroup (a plain aggregate).
    pub fn is_aggregate(&self) -> bool {
        matches!(self, DataExpr::Aggregate(_))
    }
}

impl std::fmt::Display for DataExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataExpr::All(q) => write!(f, "{},:all", q),
            DataExpr::Aggregate(af) => write!(f, "{}", af),
            DataExpr::GroupBy { af, keys } => {
                write!(f, "{},(,{},),:by", af, keys.join(","))
            }
        }
    }
}
