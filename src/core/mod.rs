//! Core library functions
//!
//! Domain logic that sits between the HTTP handlers and the tables.

pub mod filter;
pub mod uploads;

pub use filter::{build_predicate, scope_for, CallerRole, ListingPredicate};
