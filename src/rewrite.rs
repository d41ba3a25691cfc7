use crate::model::{DataExpr, Query, TimeSeriesExpr};

/// Structural rewriting over the two expression hierarchies.
///
/// Both functions share one contract: walk the tree top-down; a node the
/// substitution matches is replaced by its image and not re-entered;
/// every other node is rebuilt with its children rewritten. No node is
/// skipped, and the input tree is never mutated; the result is always a
/// fresh tree.
///
/// Neither of the shipped rewrites (`:by`, `:cq`) nests a matching node
/// inside another match, so traversal order is not observable from the
/// vocabulary; it is fixed here so richer substitutions added later see
/// one consistent behavior.
impl Query {
    /// Rewrite matched predicate nodes, rebuilding the rest.
    pub fn rewrite<F>(&self, subst: &F) -> Query
    where
        F: Fn(&Query) -> Option<Query>,
    {
        if let Some(image) = subst(self) {
            return image;
        }
        match self {
            Query::And(l, r) => Query::and(l.rewrite(subst), r.rewrite(subst)),
            Query::Or(l, r) => Query::or(l.rewrite(subst), r.rewrite(subst)),
            Query::Not(q) => Query::not(q.rewrite(subst)),
            Query::Equal(..) | Query::Regex(..) | Query::In(..) | Query::True | Query::False => {
                self.clone()
            }
        }
    }
}

impl TimeSeriesExpr {
    /// Rewrite matched expression nodes, rebuilding the rest.
    pub fn rewrite<F>(&self, subst: &F) -> TimeSeriesExpr
    where
        F: Fn(&TimeSeriesExpr) -> Option<TimeSeriesExpr>,
    {
        use TimeSeriesExpr::*;
        if let Some(image) = subst(self) {
            return image;
        }
        let go = |t: &TimeSeriesExpr| Box::new(t.rewrite(subst));
        match self {
            Data(_) | Constant(_) | Random | Time(_) => self.clone(),
            Add(a, b) => Add(go(a), go(b)),
            Subtract(a, b) => Subtract(go(a), go(b)),
            Multiply(a, b) => Multiply(go(a), go(b)),
            Divide(a, b) => Divide(go(a), go(b)),
            FAdd(a, b) => FAdd(go(a), go(b)),
            FSubtract(a, b) => FSubtract(go(a), go(b)),
            FMultiply(a, b) => FMultiply(go(a), go(b)),
            FDivide(a, b) => FDivide(go(a), go(b)),
            GreaterThan(a, b) => GreaterThan(go(a), go(b)),
            GreaterThanEqual(a, b) => GreaterThanEqual(go(a), go(b)),
            LessThan(a, b) => LessThan(go(a), go(b)),
            LessThanEqual(a, b) => LessThanEqual(go(a), go(b)),
            And(a, b) => And(go(a), go(b)),
            Or(a, b) => Or(go(a), go(b)),
            Abs(t) => Abs(go(t)),
            Negate(t) => Negate(go(t)),
            Sqrt(t) => Sqrt(go(t)),
            PerStep(t) => PerStep(go(t)),
            Sum(t) => Sum(go(t)),
            Count(t) => Count(go(t)),
            Min(t) => Min(go(t)),
            Max(t) => Max(go(t)),
        }
    }

    /// Push grouping keys into every aggregate leaf.
    ///
    /// Returns `None` when any data leaf is not a plain aggregate: an
    /// unaggregated `:all` selection or an already-grouped leaf cannot be
    /// regrouped, and `:by` reports that as a failed capability check
    /// rather than producing a surprising tree.
    pub fn group_by(&self, keys: &[String]) -> Option<TimeSeriesExpr> {
        if !self.data_exprs().iter().all(|d| d.is_aggregate()) {
            return None;
        }
        Some(self.rewrite(&|node| match node {
            TimeSeriesExpr::Data(DataExpr::Aggregate(af)) => {
                Some(TimeSeriesExpr::Data(DataExpr::GroupBy {
                    af: af.clone(),
                    keys: keys.to_vec(),
                }))
            }
            _ => None,
        }))
    }

    /// AND a common predicate into every data leaf's query.
    ///
    /// Deliberately not idempotent: applying the same predicate twice
    /// nests two `And`s. Deduplicating here would silently change the
    /// meaning of programs that repeat a restriction on purpose.
    pub fn common_query(&self, common: &Query) -> TimeSeriesExpr {
        self.rewrite(&|node| match node {
            TimeSeriesExpr::Data(d) => {
                let combined = Query::and(d.query().clone(), common.clone());
                Some(TimeSeriesExpr::Data(d.with_query(combined)))
            }
            _ => None,
        })
    }
}
