//! Composable SQL predicates.
//!
//! # Invariants
//! - `render` emits `?` placeholders in the same order it pushes binds.
//! - `StartsWith` matches the prefix literally and case-sensitively;
//!   `Like` passes the pattern through untouched.
//! - `DateBetween` is inclusive on both ends (SQL `BETWEEN`); dates bind
//!   through rusqlite's `chrono` support as `YYYY-MM-DD` text, so lexical
//!   order equals chronological order.
//! - SQL `NULL` never satisfies a comparison, so rows with a null column
//!   drop out of that clause without failing the query.

use chrono::NaiveDate;
use rusqlite::ToSql;

/// Positional bind values in placeholder order.
pub type SqlBinds = Vec<Box<dyn ToSql>>;

/// Boxes one bind value.
pub fn bind(value: impl ToSql + 'static) -> Box<dyn ToSql> {
    Box::new(value)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    StartsWith {
        column: &'static str,
        prefix: String,
    },
    Like {
        column: &'static str,
        pattern: String,
    },
    DateBetween {
        column: &'static str,
        from: NaiveDate,
        to: NaiveDate,
    },
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn starts_with(column: &'static str, prefix: impl Into<String>) -> Self {
        Self::StartsWith {
            column,
            prefix: prefix.into(),
        }
    }

    pub fn like(column: &'static str, pattern: impl Into<String>) -> Self {
        Self::Like {
            column,
            pattern: pattern.into(),
        }
    }

    /// Date range on an ISO-8601 text column.
    pub fn date_between(column: &'static str, from: NaiveDate, to: NaiveDate) -> Self {
        Self::DateBetween { column, from, to }
    }

    pub fn or(self, other: Predicate) -> Self {
        match self {
            Self::Or(mut clauses) => {
                clauses.push(other);
                Self::Or(clauses)
            }
            clause => Self::Or(vec![clause, other]),
        }
    }

    /// Renders the predicate as a SQL fragment, appending bind values.
    pub fn render(&self, binds: &mut SqlBinds) -> String {
        match self {
            Self::StartsWith { column, prefix } => {
                binds.push(bind(prefix.clone()));
                format!("instr({column}, ?) = 1")
            }
            Self::Like { column, pattern } => {
                binds.push(bind(pattern.clone()));
                format!("{column} LIKE ?")
            }
            Self::DateBetween { column, from, to } => {
                binds.push(bind(*from));
                binds.push(bind(*to));
                format!("{column} BETWEEN ? AND ?")
            }
            Self::Or(clauses) => join(clauses, " OR ", "0", binds),
        }
    }
}

fn join(clauses: &[Predicate], separator: &str, empty: &str, binds: &mut SqlBinds) -> String {
    if clauses.is_empty() {
        return empty.to_string();
    }
    let rendered: Vec<String> = clauses
        .iter()
        .map(|clause| format!("({})", clause.render(binds)))
        .collect();
    rendered.join(separator)
}
