//! Generic keyed tables
//!
//! Every entity lives in one table with an autoincrement integer key. The
//! functions here implement insert/find/select/update/delete once for all of
//! them; entity-specific behavior is declared through [`Entity`].

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row};

use super::filter::Filter;
use crate::db::{DbError, DbResult};
use crate::validation::{FromJson, Patch, ValidationError};

/// Ordered column assignments for an insert or update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns(Vec<(&'static str, SqlValue)>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<SqlValue>) -> Self {
        self.0.push((name, value.into()));
        self
    }

    /// Add a column for a supplied patch value; absent values are skipped
    pub fn with_patch<T>(
        mut self,
        name: &'static str,
        patch: &Patch<T>,
        to_sql: impl FnOnce(&T) -> SqlValue,
    ) -> Self {
        match patch {
            Patch::Absent => {}
            Patch::Null => self.0.push((name, SqlValue::Null)),
            Patch::Set(value) => self.0.push((name, to_sql(value))),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(name, _)| *name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.0.iter().map(|(_, v)| v)
    }
}

/// Clone-and-convert helper for [`Columns::with_patch`]
pub fn sql<T: Clone + Into<SqlValue>>(value: &T) -> SqlValue {
    value.clone().into()
}

/// A row in another table that points at an entity through `column`
#[derive(Debug, Clone, Copy)]
pub struct Dependent {
    pub entity: &'static str,
    pub table: &'static str,
    pub column: &'static str,
}

/// A foreign key value that must resolve before a write
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    pub entity: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub id: i64,
}

impl Reference {
    pub fn to<E: Entity>(id: i64) -> Self {
        Self {
            entity: E::NAME,
            table: E::TABLE,
            id_column: E::ID_COLUMN,
            id,
        }
    }
}

/// Validated input that can be written to a table
pub trait Record {
    fn columns(&self) -> Columns;

    /// Foreign keys carried by this input
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// A stored entity type
pub trait Entity: Sized + Send + 'static {
    /// Human-readable name used in messages
    const NAME: &'static str;
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Relation that rows are read from; defaults to the table itself
    const SOURCE: &'static str = Self::TABLE;
    const CREATED_AT: Option<&'static str> = None;
    const UPDATED_AT: Option<&'static str> = None;
    /// Columns whose values must be unique
    const UNIQUE: &'static [&'static str] = &[];
    /// Rows deleted together with this entity
    const CASCADES: &'static [Dependent] = &[];
    /// Rows that block deleting this entity
    const RESTRICTS: &'static [Dependent] = &[];

    type Create: Record + FromJson + Send + 'static;
    type Update: Record + FromJson + Send + 'static;

    fn id(&self) -> i64;

    fn from_row(row: &Row) -> rusqlite::Result<Self>;

    /// Rules that span several stored fields, checked after every write
    fn check(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Insert a row and read it back
pub fn insert<E: Entity>(conn: &Connection, columns: &Columns) -> DbResult<E> {
    let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", E::TABLE)
    } else {
        let names = columns.names();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            names.join(", "),
            vec!["?"; names.len()].join(", ")
        )
    };
    conn.execute(&sql, params_from_iter(columns.values()))?;

    let id = conn.last_insert_rowid();
    find::<E>(conn, id)?.ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
}

/// Find a row by id
pub fn find<E: Entity>(conn: &Connection, id: i64) -> DbResult<Option<E>> {
    let sql = format!("SELECT * FROM {} WHERE {} = ?1", E::SOURCE, E::ID_COLUMN);
    let mut stmt = conn.prepare(&sql)?;

    match stmt.query_row([id], E::from_row) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Check whether a row exists in any table
pub fn exists(conn: &Connection, table: &str, id_column: &str, id: i64) -> DbResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)", table, id_column);
    Ok(conn.query_row(&sql, [id], |row| row.get(0))?)
}

/// Select rows matching a filter
pub fn select<E: Entity>(conn: &Connection, filter: &Filter) -> DbResult<Vec<E>> {
    let (tail, params) = filter.to_sql(E::ID_COLUMN);
    let sql = format!("SELECT * FROM {}{}", E::SOURCE, tail);
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(params_from_iter(params.iter()), E::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Apply column assignments to a row and read it back
pub fn update<E: Entity>(conn: &Connection, id: i64, columns: &Columns) -> DbResult<Option<E>> {
    if columns.is_empty() {
        return find::<E>(conn, id);
    }

    let assignments: Vec<String> = columns
        .names()
        .iter()
        .map(|name| format!("{} = ?", name))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        E::TABLE,
        assignments.join(", "),
        E::ID_COLUMN
    );

    let id_value = SqlValue::Integer(id);
    let params = columns.values().chain(std::iter::once(&id_value));
    let rows = conn.execute(&sql, params_from_iter(params))?;
    if rows == 0 {
        return Ok(None);
    }

    find::<E>(conn, id)
}

/// Delete a row by id
pub fn delete<E: Entity>(conn: &Connection, id: i64) -> DbResult<bool> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", E::TABLE, E::ID_COLUMN);
    let rows = conn.execute(&sql, [id])?;
    Ok(rows > 0)
}

/// Count rows of a dependent table pointing at `id`
pub fn count_dependents(conn: &Connection, dependent: &Dependent, id: i64) -> DbResult<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ?1",
        dependent.table, dependent.column
    );
    Ok(conn.query_row(&sql, [id], |row| row.get(0))?)
}

/// Delete rows of a dependent table pointing at `id`
pub fn delete_dependents(conn: &Connection, dependent: &Dependent, id: i64) -> DbResult<usize> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", dependent.table, dependent.column);
    Ok(conn.execute(&sql, [id])?)
}

/// Whether another row already holds `value` in a unique column
pub fn value_taken<E: Entity>(
    conn: &Connection,
    column: &str,
    value: &SqlValue,
    except_id: Option<i64>,
) -> DbResult<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1 AND {} != ?2)",
        E::TABLE,
        column,
        E::ID_COLUMN
    );
    // Ids start at 1, so 0 excludes nothing
    let except = SqlValue::Integer(except_id.unwrap_or(0));
    Ok(conn.query_row(&sql, [value, &except], |row| row.get(0))?)
}
