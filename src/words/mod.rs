//! The shipped vocabularies and their composition.
//!
//! Three vocabularies cover the core language:
//!
//! - **std** - stack shuffling (`:dup`, `:swap`, ...)
//! - **query** - tag predicates (`:eq`, `:re`, `:in`, ...)
//! - **math** - aggregation, arithmetic, rewriting, macros; depends on
//!   the other two
//!
//! Platform vocabularies (filtering, presentation, ...) plug in the same
//! way: build a [`Vocabulary`] naming its dependencies and compose it
//! against the full set.

mod math;
mod query;
mod stack;

use std::sync::Arc;

use crate::value::{Stack, StackValue};
use crate::vocab::{compose, CompositionError, Dictionary, Vocabulary};

/// Clone a stack minus its top `n` operands.
pub(crate) fn without_top(stack: &Stack, n: usize) -> Vec<StackValue> {
    stack[..stack.len() - n].to_vec()
}

/// Stack-shuffling words.
pub fn std_vocabulary() -> Arc<Vocabulary> {
    Arc::new(Vocabulary::new("std", vec![], stack::definitions()))
}

/// Tag predicate words.
pub fn query_vocabulary() -> Arc<Vocabulary> {
    Arc::new(Vocabulary::new("query", vec![], query::definitions()))
}

/// Aggregation, arithmetic, rewriting, and the statistics macros.
pub fn math_vocabulary() -> Arc<Vocabulary> {
    Arc::new(Vocabulary::new(
        "math",
        vec!["std", "query"],
        math::definitions(),
    ))
}

/// Every vocabulary this crate ships.
pub fn standard_set() -> Vec<Arc<Vocabulary>> {
    vec![std_vocabulary(), query_vocabulary(), math_vocabulary()]
}

/// Compose the math vocabulary (and, transitively, everything it depends
/// on) into the dictionary most callers want.
pub fn compose_math() -> Result<Arc<Dictionary>, CompositionError> {
    let math = math_vocabulary();
    let set = vec![std_vocabulary(), query_vocabulary(), Arc::clone(&math)];
    Ok(Arc::new(compose(&math, &set)?))
}
