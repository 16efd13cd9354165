//! Pure transformations over loaded tables.
//!
//! Nothing here holds state: every call takes a table and a spec and returns
//! a new value, so calls may run concurrently against the shared tables.

pub mod aggregate;
pub mod filter;
pub mod stats;

pub use aggregate::{group_and_reduce, AggregateSpec, GroupKey, GroupSummary, Reduction, Target};
pub use filter::{filter, FilterSpec};
