//! Entity store
//!
//! CRUD over every entity type with referential checks, uniqueness checks
//! and cascade rules. Each mutation runs in a single immediate transaction,
//! so a failed check leaves nothing behind.

mod error;
pub mod filter;
pub mod table;

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{migrations, Database};
use crate::models::time;

pub use error::{StoreError, StoreResult};
pub use filter::{Filter, Order, Predicate};
pub use table::{sql, Columns, Dependent, Entity, Record, Reference};

/// Process-wide handle to the backing database
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    /// Wrap an already-migrated database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (and migrate) a database file
    pub fn open<P: AsRef<Path>>(path: P, pool_size: u32) -> StoreResult<Self> {
        let db = Database::new(path, pool_size)?;
        db.with_conn(|conn| migrations::run_migrations(conn))?;
        Ok(Self::new(db))
    }

    /// Fresh, migrated in-memory store
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::in_memory()?;
        db.with_conn(|conn| migrations::run_migrations(conn))?;
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Insert a new record after resolving its references
    pub fn create<E: Entity>(&self, data: &E::Create) -> StoreResult<E> {
        let now = time::now();
        let columns = [E::CREATED_AT, E::UPDATED_AT]
            .into_iter()
            .flatten()
            .fold(data.columns(), |cols, stamp| cols.with(stamp, time::timestamp_sql(&now)));

        self.db.with_transaction(|tx| -> StoreResult<E> {
            check_references(tx, &data.references())?;
            check_unique::<E>(tx, &columns, None)?;

            let record: E = table::insert(tx, &columns)?;
            record.check()?;

            debug!(entity = E::NAME, id = record.id(), "Created record");
            Ok(record)
        })
    }

    /// Get a record by id
    pub fn get<E: Entity>(&self, id: i64) -> StoreResult<E> {
        self.db
            .with_conn(|conn| table::find::<E>(conn, id).map_err(StoreError::from))?
            .ok_or(StoreError::NotFound {
                entity: E::NAME,
                id,
            })
    }

    /// Fail with NotFound unless a record with this id exists
    pub fn ensure_exists<E: Entity>(&self, id: i64) -> StoreResult<()> {
        let found = self.db.with_conn(|conn| table::exists(conn, E::TABLE, E::ID_COLUMN, id))?;
        if !found {
            return Err(StoreError::NotFound {
                entity: E::NAME,
                id,
            });
        }
        Ok(())
    }

    /// Records matching a filter, in the filter's order
    pub fn list<E: Entity>(&self, filter: &Filter) -> StoreResult<Vec<E>> {
        self.db
            .with_conn(|conn| table::select::<E>(conn, filter).map_err(StoreError::from))
    }

    /// First record matching a filter, if any
    pub fn first<E: Entity>(&self, filter: &Filter) -> StoreResult<Option<E>> {
        let filter = filter.clone().limit(1);
        Ok(self.list::<E>(&filter)?.into_iter().next())
    }

    /// Apply a partial update; an empty patch returns the record unchanged
    pub fn update<E: Entity>(&self, id: i64, patch: &E::Update) -> StoreResult<E> {
        let mut columns = patch.columns();
        if !columns.is_empty() {
            if let Some(stamp) = E::UPDATED_AT {
                columns = columns.with(stamp, time::timestamp_sql(&time::now()));
            }
        }

        self.db.with_transaction(|tx| {
            if !table::exists(tx, E::TABLE, E::ID_COLUMN, id)? {
                return Err(StoreError::NotFound {
                    entity: E::NAME,
                    id,
                });
            }
            check_references(tx, &patch.references())?;
            check_unique::<E>(tx, &columns, Some(id))?;

            let record: E = table::update(tx, id, &columns)?.ok_or(StoreError::NotFound {
                entity: E::NAME,
                id,
            })?;
            record.check()?;

            if !columns.is_empty() {
                debug!(entity = E::NAME, id, fields = ?columns.names(), "Updated record");
            }
            Ok(record)
        })
    }

    /// Delete a record, removing cascaded dependents first
    pub fn delete<E: Entity>(&self, id: i64) -> StoreResult<()> {
        self.db.with_transaction(|tx| {
            if !table::exists(tx, E::TABLE, E::ID_COLUMN, id)? {
                return Err(StoreError::NotFound {
                    entity: E::NAME,
                    id,
                });
            }

            for dependent in E::RESTRICTS {
                let count = table::count_dependents(tx, dependent, id)?;
                if count > 0 {
                    return Err(StoreError::Conflict(format!(
                        "{} {} is still referenced by {} {} record(s)",
                        E::NAME,
                        id,
                        count,
                        dependent.entity
                    )));
                }
            }

            for dependent in E::CASCADES {
                let removed = table::delete_dependents(tx, dependent, id)?;
                if removed > 0 {
                    info!(
                        entity = E::NAME,
                        id,
                        dependent = dependent.entity,
                        removed,
                        "Cascaded delete"
                    );
                }
            }

            table::delete::<E>(tx, id)?;
            debug!(entity = E::NAME, id, "Deleted record");
            Ok(())
        })
    }
}

/// Every reference must resolve before anything is written
fn check_references(conn: &Connection, references: &[Reference]) -> StoreResult<()> {
    for reference in references {
        if !table::exists(conn, reference.table, reference.id_column, reference.id)? {
            return Err(StoreError::NotFound {
                entity: reference.entity,
                id: reference.id,
            });
        }
    }
    Ok(())
}

fn check_unique<E: Entity>(conn: &Connection, columns: &Columns, except_id: Option<i64>) -> StoreResult<()> {
    for &column in E::UNIQUE {
        let Some(value) = columns.get(column) else {
            continue;
        };
        if table::value_taken::<E>(conn, column, value, except_id)? {
            let shown = match value {
                rusqlite::types::Value::Text(text) => text.clone(),
                other => format!("{:?}", other),
            };
            return Err(StoreError::Conflict(format!(
                "{} with {} '{}' already exists",
                E::NAME,
                column,
                shown
            )));
        }
    }
    Ok(())
}
