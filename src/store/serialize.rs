//! SQLite serialization for typed values
//!
//! Ids and enums are stored as their display strings. Decimals are stored as
//! TEXT through [`SqlDecimal`].

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;

use crate::core::entity::Priority;
use crate::core::identity::EntityId;
use crate::core::tenant::Role;
use crate::core::workflow::{EstimateStatus, TaskStatus, WorkOrderStatus};
use crate::entities::estimate::ItemType;

fn invalid_data(message: String) -> FromSqlError {
    FromSqlError::Other(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

/// ToSql/FromSql through `Display` and `FromStr`
macro_rules! text_column {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.to_string()))
                }
            }

            impl FromSql for $ty {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    let s = value.as_str()?;
                    s.parse::<$ty>().map_err(|e| invalid_data(e.to_string()))
                }
            }
        )+
    };
}

text_column!(
    EntityId,
    Role,
    Priority,
    EstimateStatus,
    WorkOrderStatus,
    TaskStatus,
    ItemType,
);

// =========================================================================
// Decimal - stored as TEXT
// =========================================================================

/// A decimal column value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlDecimal(pub Decimal);

impl ToSql for SqlDecimal {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for SqlDecimal {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(_) => {
                let s = value.as_str()?;
                s.parse::<Decimal>()
                    .map(SqlDecimal)
                    .map_err(|e| invalid_data(format!("invalid decimal '{}': {}", s, e)))
            }
            ValueRef::Integer(i) => Ok(SqlDecimal(Decimal::from(i))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// Wrap a decimal for binding
pub fn dec(value: Decimal) -> SqlDecimal {
    SqlDecimal(value)
}

pub fn dec_opt(value: Option<Decimal>) -> Option<SqlDecimal> {
    value.map(SqlDecimal)
}

/// Read a decimal column
pub fn get_dec(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    row.get::<_, SqlDecimal>(idx).map(|d| d.0)
}

pub fn get_dec_opt(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    row.get::<_, Option<SqlDecimal>>(idx)
        .map(|d| d.map(|d| d.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use rusqlite::Connection;

    #[test]
    fn test_estimate_status_roundtrip() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE test (status TEXT)", []).unwrap();

        for status in EstimateStatus::ALL {
            conn.execute("DELETE FROM test", []).unwrap();
            conn.execute("INSERT INTO test (status) VALUES (?1)", [&status])
                .unwrap();

            let raw: String = conn
                .query_row("SELECT status FROM test", [], |row| row.get(0))
                .unwrap();
            assert_eq!(raw, status.as_str());

            let retrieved: EstimateStatus = conn
                .query_row("SELECT status FROM test", [], |row| row.get(0))
                .unwrap();
            assert_eq!(retrieved, status);
        }
    }

    #[test]
    fn test_entity_id_roundtrip() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE test (id TEXT)", []).unwrap();

        let id = EntityId::new(EntityPrefix::Estm);
        conn.execute("INSERT INTO test (id) VALUES (?1)", [&id])
            .unwrap();
        let retrieved: EntityId = conn
            .query_row("SELECT id FROM test", [], |row| row.get(0))
            .unwrap();
        assert_eq!(retrieved, id);
    }

    #[test]
    fn test_decimal_keeps_scale() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE test (amount TEXT)", []).unwrap();

        let amount: Decimal = "145.00".parse().unwrap();
        conn.execute("INSERT INTO test (amount) VALUES (?1)", [&dec(amount)])
            .unwrap();

        let raw: String = conn
            .query_row("SELECT amount FROM test", [], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, "145.00");

        let back = conn
            .query_row("SELECT amount FROM test", [], |row| get_dec(row, 0))
            .unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_null_decimal_is_none() {
        let conn = Connection::open_in_memory().unwrap();
        let value = conn
            .query_row("SELECT NULL", [], |row| get_dec_opt(row, 0))
            .unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_invalid_status_fails() {
        let conn = Connection::open_in_memory().unwrap();
        let result: rusqlite::Result<WorkOrderStatus> =
            conn.query_row("SELECT 'FINISHED'", [], |row| row.get(0));
        assert!(result.is_err());
    }
}
