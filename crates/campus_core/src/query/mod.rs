//! Explicit query builders behind the repository finders.
//!
//! # Responsibility
//! - Compose filter predicates into parametrized SQL `WHERE` fragments.
//! - Keep user input out of SQL text; every value travels as a bind.

pub mod predicate;

pub use predicate::{bind, Predicate, SqlBinds};
