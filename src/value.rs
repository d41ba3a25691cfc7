use crate::model::{Query, TimeSeriesExpr};

/// An operand value on the interpreter stack.
///
/// Word execution is the only thing that produces or consumes stack values,
/// and every value is immutable once pushed; words that "modify" an
/// expression always push a freshly built tree.
///
/// # Type-directed dispatch
///
/// A word's capability check pattern-matches on the variant kinds at the top
/// of the stack, so the same token can mean different things for different
/// operand types (`:and` combines two queries or two expressions, `:sum`
/// aggregates a query or collapses an expression).
///
/// # Examples
///
/// ```
/// use gauge_lang::{StackValue, Query};
///
/// // What the program `name,sps,:eq` leaves behind:
/// let v = StackValue::Query(Query::equal("name", "sps"));
/// assert_eq!(v.kind(), "Query");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum StackValue {
    /// A literal token, pushed verbatim by the interpreter
    ///
    /// # Examples
    /// ```text
    /// name
    /// sps
    /// 42
    /// ```
    Str(String),

    /// A parsed numeric value
    ///
    /// Produced by `:const`; lifted to a constant expression by math words.
    Number(f64),

    /// A list of tokens collected between `(` and `)`
    ///
    /// # Examples
    /// ```text
    /// (,nf.cluster,nf.zone,)
    /// ```
    StringList(Vec<String>),

    /// A tag predicate tree
    Query(Query),

    /// A time-series expression
    ///
    /// Raw selections (`DataExpr`) appear here wrapped in
    /// [`TimeSeriesExpr::Data`].
    Expr(TimeSeriesExpr),
}

impl StackValue {
    /// Variant kind name used in `MatchError` diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            StackValue::Str(_) => "String",
            StackValue::Number(_) => "Number",
            StackValue::StringList(_) => "StringList",
            StackValue::Query(_) => "Query",
            StackValue::Expr(_) => "TimeSeriesExpr",
        }
    }

    /// Get as an expression, lifting numbers to constants
    pub fn as_expr(&self) -> Option<TimeSeriesExpr> {
        match self {
            StackValue::Expr(t) => Some(t.clone()),
            StackValue::Number(v) => Some(TimeSeriesExpr::Constant(*v)),
            _ => None,
        }
    }

    /// Get as a tag key or value string
    ///
    /// Numbers render without a trailing `.0` when integral, so a parsed
    /// `404` and the literal token `404` name the same tag value.
    pub fn as_key(&self) -> Option<String> {
        match self {
            StackValue::Str(s) => Some(s.clone()),
            StackValue::Number(v) if v.fract() == 0.0 && v.is_finite() => {
                Some(format!("{}", *v as i64))
            }
            StackValue::Number(v) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl std::fmt::Display for StackValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackValue::Str(s) => write!(f, "{}", s),
            StackValue::Number(v) => write!(f, "{}", v),
            StackValue::StringList(items) => write!(f, "(,{},)", items.join(",")),
            StackValue::Query(q) => write!(f, "{}", q),
            StackValue::Expr(t) => write!(f, "{}", t),
        }
    }
}

/// The operand stack. Top of stack is the last element.
pub type Stack = Vec<StackValue>;

/// Render the top-of-stack kinds for diagnostics, top first.
pub fn stack_kinds(stack: &Stack) -> String {
    let kinds: Vec<&str> = stack.iter().rev().take(4).map(|v| v.kind()).collect();
    if kinds.is_empty() {
        "<empty>".to_string()
    } else {
        kinds.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataExpr;

    #[test]
    fn keys_render_integral_numbers_without_a_fraction() {
        assert_eq!(StackValue::Number(404.0).as_key().unwrap(), "404");
        assert_eq!(StackValue::Number(1.5).as_key().unwrap(), "1.5");
        assert!(StackValue::StringList(vec![]).as_key().is_none());
    }

    #[test]
    fn values_display_as_their_token_form() {
        let e: TimeSeriesExpr = DataExpr::All(Query::equal("name", "sps")).into();
        assert_eq!(
            StackValue::Expr(e).to_string(),
            "name,sps,:eq,:all"
        );
        assert_eq!(
            StackValue::StringList(vec!["a".to_string(), "b".to_string()]).to_string(),
            "(,a,b,)"
        );
    }

    #[test]
    fn kinds_render_top_first() {
        let stack = vec![
            StackValue::Str("name".to_string()),
            StackValue::Query(Query::True),
        ];
        assert_eq!(stack_kinds(&stack), "Query, String");
        assert_eq!(stack_kinds(&Vec::new()), "<empty>");
    }
}
