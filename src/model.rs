//! # Gauge Query Language - Expression Model
//!
//! This module defines the immutable expression trees a gauge program
//! builds: tag predicates, raw data selections, and the math layer that
//! combines them into full time-series expressions.
//!
//! ## Architecture Overview
//!
//! The model is organized into focused submodules:
//!
//! - **[query]** - Tag predicate trees (`Query`)
//! - **[data]** - Selection plus aggregation (`AggregateFunction`, `DataExpr`)
//! - **[math]** - Combinators over resolved series (`TimeSeriesExpr`, `TimeField`)
//!
//! ## Quick Start
//!
//! ```text
//! name,sps,:eq,:sum,(,nf.cluster,),:by
//! ```
//!
//! This program selects the `sps` metric, sums it, and regroups the sum by
//! cluster.
//!
//! ## Core Concepts
//!
//! ### Layering
//!
//! Every expression bottoms out in a `Query` describing which raw streams to
//! read. A `DataExpr` attaches an aggregation to that predicate, and
//! `TimeSeriesExpr` composes resolved selections arithmetically:
//!
//! ```text
//! Query  →  DataExpr  →  TimeSeriesExpr
//! ```
//!
//! ### Immutability
//!
//! Trees are never mutated in place. Rewriting words (`:by`, `:cq`) return a
//! new tree sharing nothing with the original, so resolved expressions can
//! be cached or shared across evaluations without synchronization.
//!
//! ### Canonical text form
//!
//! Every node renders back to the token program that would rebuild it via
//! `Display`, e.g. `GroupBy(Sum(Equal("name","sps")), ["nf.cluster"])`
//! prints as `name,sps,:eq,:sum,(,nf.cluster,),:by`.
pub mod data;
pub mod math;
pub mod query;

pub use data::{AggregateFunction, DataExpr};
pub use math::{TimeField, TimeSeriesExpr};
pub use query::Query;
