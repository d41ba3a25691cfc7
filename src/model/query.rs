/// A predicate tree over metric tag key/value pairs.
///
/// Queries select raw time-series streams by their tags. They are the
/// leaves of every data expression and the operand of the `:cq` word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    /// Exact tag match
    ///
    /// # Example
    /// ```text
    /// name,sps,:eq
    /// ```
    Equal(String, String),

    /// Regular-expression tag match
    ///
    /// The pattern is anchored at the start of the value, matching the
    /// behavior of the surrounding platform's index.
    ///
    /// # Example
    /// ```text
    /// nf.cluster,^www-,:re
    /// ```
    Regex(String, String),

    /// Tag value is one of a list of candidates
    ///
    /// # Example
    /// ```text
    /// statistic,(,totalAmount,totalTime,),:in
    /// ```
    In(String, Vec<String>),

    /// Both sub-predicates hold
    And(Box<Query>, Box<Query>),

    /// Either sub-predicate holds
    Or(Box<Query>, Box<Query>),

    /// The sub-predicate does not hold
    Not(Box<Query>),

    /// Matches every stream
    True,

    /// Matches nothing
    False,
}

impl Query {
    pub fn equal(key: impl Into<String>, value: impl Into<String>) -> Query {
        Query::Equal(key.into(), value.into())
    }

    pub fn regex(key: impl Into<String>, pattern: impl Into<String>) -> Query {
        Query::Regex(key.into(), pattern.into())
    }

    pub fn in_values(key: impl Into<String>, values: Vec<String>) -> Query {
        Query::In(key.into(), values)
    }

    pub fn and(left: Query, right: Query) -> Query {
        Query::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Query, right: Query) -> Query {
        Query::Or(Box::new(left), Box::new(right))
    }

    pub fn not(q: Query) -> Query {
        Query::Not(Box::new(q))
    }

    /// Whether a set of tags satisfies this predicate.
    ///
    /// `Regex` compiles on each call; callers matching large batches should
    /// resolve queries through the platform index instead.
    pub fn matches(&self, tags: &std::collections::BTreeMap<String, String>) -> bool {
        match self {
            Query::Equal(k, v) => tags.get(k).map(|t| t == v).unwrap_or(false),
            Query::Regex(k, pattern) => match (tags.get(k), regex::Regex::new(pattern)) {
                (Some(t), Ok(re)) => re.find(t).map(|m| m.start() == 0).unwrap_or(false),
                _ => false,
            },
            Query::In(k, vs) => tags.get(k).map(|t| vs.contains(t)).unwrap_or(false),
            Query::And(l, r) => l.matches(tags) && r.matches(tags),
            Query::Or(l, r) => l.matches(tags) || r.matches(tags),
            Query::Not(q) => !q.matches(tags),
            Query::True => true,
            Query::False => false,
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Equal(k, v) => write!(f, "{},{},:eq", k, v),
            Query::Regex(k, p) => write!(f, "{},{},:re", k, p),
            Query::In(k, vs) => write!(f, "{},(,{},),:in", k, vs.join(",")),
            Query::And(l, r) => write!(f, "{},{},:and", l, r),
            Query::Or(l, r) => write!(f, "{},{},:or", l, r),
            Query::Not(q) => write!(f, "{},:not", q),
            Query::True => write!(f, ":true"),
            Query::False => write!(f, ":false"),
        }
    }
}
