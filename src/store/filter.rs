//! Filter predicates
//!
//! Query parameters become a list of predicates joined with AND, rendered to
//! a parameterized SQL tail (`WHERE ... ORDER BY ... LIMIT ...`).

use std::collections::BTreeSet;

use rusqlite::types::Value as SqlValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Column value is one of the ids, bound as a single JSON array
    IdIn {
        column: &'static str,
        ids: BTreeSet<i64>,
    },
    /// Exact equality
    Equals { column: &'static str, value: SqlValue },
    /// Case-insensitive substring match
    Contains { column: &'static str, needle: String },
    /// `min_column <= value <= max_column`
    Covers {
        min_column: &'static str,
        max_column: &'static str,
        value: i64,
    },
    /// `start <= column <= end`
    Between {
        column: &'static str,
        start: SqlValue,
        end: SqlValue,
    },
}

/// Result ordering; ties always fall back to the id column in the same direction
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Order {
    /// Ascending id
    #[default]
    Insertion,
    Ascending(&'static str),
    Descending(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
    order: Order,
    limit: Option<u32>,
}

impl Filter {
    /// Filter matching everything, in insertion order
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Id-set membership; absent or empty sets leave the filter unchanged
    pub fn id_in(self, column: &'static str, ids: Option<Vec<i64>>) -> Self {
        match ids {
            Some(ids) if !ids.is_empty() => self.and(Predicate::IdIn {
                column,
                ids: ids.into_iter().collect(),
            }),
            _ => self,
        }
    }

    pub fn equals(self, column: &'static str, value: Option<impl Into<SqlValue>>) -> Self {
        match value {
            Some(value) => self.and(Predicate::Equals {
                column,
                value: value.into(),
            }),
            None => self,
        }
    }

    pub fn contains(self, column: &'static str, needle: Option<String>) -> Self {
        match needle {
            Some(needle) => self.and(Predicate::Contains { column, needle }),
            None => self,
        }
    }

    pub fn covers(self, min_column: &'static str, max_column: &'static str, value: Option<i64>) -> Self {
        match value {
            Some(value) => self.and(Predicate::Covers {
                min_column,
                max_column,
                value,
            }),
            None => self,
        }
    }

    pub fn between(self, column: &'static str, start: SqlValue, end: SqlValue) -> Self {
        self.and(Predicate::Between { column, start, end })
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the SQL tail and its positional parameters
    pub fn to_sql(&self, id_column: &str) -> (String, Vec<SqlValue>) {
        let mut clauses = Vec::with_capacity(self.predicates.len());
        let mut params = Vec::new();

        for predicate in &self.predicates {
            match predicate {
                Predicate::IdIn { column, ids } => {
                    clauses.push(format!("{} IN (SELECT value FROM json_each(?))", column));
                    let array = serde_json::Value::from_iter(ids.iter().copied());
                    params.push(SqlValue::Text(array.to_string()));
                }
                Predicate::Equals { column, value } => {
                    clauses.push(format!("{} = ?", column));
                    params.push(value.clone());
                }
                Predicate::Contains { column, needle } => {
                    clauses.push(format!("instr(lower({}), lower(?)) > 0", column));
                    params.push(SqlValue::Text(needle.clone()));
                }
                Predicate::Covers {
                    min_column,
                    max_column,
                    value,
                } => {
                    clauses.push(format!("{} <= ? AND {} >= ?", min_column, max_column));
                    params.push(SqlValue::Integer(*value));
                    params.push(SqlValue::Integer(*value));
                }
                Predicate::Between { column, start, end } => {
                    clauses.push(format!("{} >= ? AND {} <= ?", column, column));
                    params.push(start.clone());
                    params.push(end.clone());
                }
            }
        }

        let mut sql = String::new();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let order = match self.order {
            Order::Insertion => format!(" ORDER BY {} ASC", id_column),
            Order::Ascending(column) => format!(" ORDER BY {} ASC, {} ASC", column, id_column),
            Order::Descending(column) => format!(" ORDER BY {} DESC, {} DESC", column, id_column),
        };
        sql.push_str(&order);

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, params)
    }
}
