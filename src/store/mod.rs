//! SQLite-backed persistence
//!
//! One [`Store`] wraps one connection. Writes go through
//! [`Store::transaction`], which begins an IMMEDIATE transaction so that a
//! second writer waits on the busy timeout instead of failing midway.

pub mod records;
mod schema;
pub mod scope;
pub mod serialize;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::core::entity::Entity;
use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::EntityId;
use crate::core::tenant::CompanyFilter;

pub use records::Record;
pub use scope::ScopedQuery;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if needed) the database file and apply the schema
    pub fn open(path: impl AsRef<Path>) -> ShopResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        let store = Self::init(conn, Some(path))?;
        tracing::debug!(path = ?store.path, "opened database");
        Ok(store)
    }

    /// A private database that lives as long as the value
    pub fn open_in_memory() -> ShopResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> ShopResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        install_schema(&conn)?;
        Ok(Self { conn, path })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Begin a write transaction. Dropping it without commit rolls back.
    pub fn transaction(&mut self) -> ShopResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

fn install_schema(conn: &Connection) -> ShopResult<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version > schema::SCHEMA_VERSION {
        return Err(ShopError::Corrupt(format!(
            "database schema version {} is newer than supported version {}",
            version,
            schema::SCHEMA_VERSION
        )));
    }
    conn.execute_batch(schema::SQL)?;
    if version < schema::SCHEMA_VERSION {
        conn.execute_batch(&format!(
            "PRAGMA user_version = {};",
            schema::SCHEMA_VERSION
        ))?;
    }
    Ok(())
}

/// Load one row by id, restricted to the caller's tenant scope
///
/// Missing rows and rows owned by another company both yield `None`.
pub fn find_scoped<T: Record + Entity>(
    conn: &Connection,
    filter: &CompanyFilter,
    id: &EntityId,
) -> ShopResult<Option<T>> {
    ScopedQuery::new(T::select())
        .and_eq("t.id", id)
        .scoped(filter, "t.company_id")
        .fetch_optional(conn, T::from_row)
}

/// Like [`find_scoped`], failing with NotFound
pub fn get_scoped<T: Record + Entity>(
    conn: &Connection,
    filter: &CompanyFilter,
    id: &EntityId,
) -> ShopResult<T> {
    find_scoped(conn, filter, id)?.ok_or_else(|| ShopError::not_found(T::NAME, id))
}

/// Number of rows in `table` visible through `filter`
pub fn count_scoped(conn: &Connection, table: &str, filter: &CompanyFilter) -> ShopResult<u64> {
    let count: Option<i64> = ScopedQuery::new(format!("SELECT COUNT(*) FROM {} t", table))
        .scoped(filter, "t.company_id")
        .fetch_optional(conn, |row| row.get(0))?;
    Ok(count.unwrap_or(0).max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory_applies_schema() {
        let store = Store::open_in_memory().unwrap();
        let tables: i64 = store
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 9);
    }

    #[test]
    fn test_open_file_twice() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("hunter.db");
        drop(Store::open(&path).unwrap());
        let store = Store::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let store = Store::open_in_memory().unwrap();
        let on: i64 = store
            .conn()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(on, 1);
    }

    #[test]
    fn test_newer_schema_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("hunter.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        }
        let err = Store::open(&path).unwrap_err();
        assert!(matches!(err, ShopError::Corrupt(_)));
    }
}
