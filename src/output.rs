//! JSON output for stack values.
//!
//! The CLI and embedding tools render evaluation results as JSON. Every
//! value serializes as a tagged object so consumers can tell a literal
//! string from a rendered expression; expressions and queries carry their
//! canonical token form, which feeds straight back into the interpreter.
//!
//! # Examples
//!
//! ```
//! use gauge_lang::{Query, StackValue};
//! use gauge_lang::output::to_json;
//!
//! let v = StackValue::Query(Query::equal("name", "sps"));
//! assert_eq!(
//!     to_json(&[v]),
//!     r#"[{"type":"Query","value":"name,sps,:eq"}]"#
//! );
//! ```

use serde_json::{json, Value as Json};

use crate::value::StackValue;

fn value_to_json(value: &StackValue) -> Json {
    let rendered = match value {
        StackValue::Str(s) => json!(s),
        StackValue::Number(v) if v.is_finite() => json!(v),
        // NaN / infinities have no JSON form
        StackValue::Number(v) => json!(v.to_string()),
        StackValue::StringList(items) => json!(items),
        StackValue::Query(q) => json!(q.to_string()),
        StackValue::Expr(t) => json!(t.to_string()),
    };
    json!({ "type": value.kind(), "value": rendered })
}

/// Compact JSON for a result stack, bottom first.
pub fn to_json(stack: &[StackValue]) -> String {
    Json::Array(stack.iter().map(value_to_json).collect()).to_string()
}

/// Pretty-printed JSON for a result stack, bottom first.
pub fn to_json_pretty(stack: &[StackValue]) -> String {
    let v = Json::Array(stack.iter().map(value_to_json).collect());
    serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
}
