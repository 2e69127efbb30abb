//! Tenant-scoped query builder
//!
//! Every read, update and delete by id and every list goes through
//! [`ScopedQuery::scoped`], which turns a [`CompanyFilter`] into a
//! `company_id = ?` predicate (or nothing, for a global super-admin view).
//! Filter values are bound as text parameters, never spliced into SQL.

use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

use crate::core::error::ShopResult;
use crate::core::tenant::CompanyFilter;

#[derive(Debug, Clone)]
pub struct ScopedQuery {
    sql: String,
    has_where: bool,
    params: Vec<String>,
    order: Option<String>,
}

impl ScopedQuery {
    /// Start from a `SELECT ... FROM ...` (or `UPDATE`/`DELETE`) without a
    /// WHERE clause
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            sql: base.into(),
            has_where: false,
            params: Vec::new(),
            order: None,
        }
    }

    fn push_condition(&mut self, condition: &str) {
        self.sql.push_str(if self.has_where { " AND " } else { " WHERE " });
        self.sql.push_str(condition);
        self.has_where = true;
    }

    /// Restrict to rows the filter allows
    pub fn scoped(mut self, filter: &CompanyFilter, column: &str) -> Self {
        if let CompanyFilter::Company(id) = filter {
            self.push_condition(&format!("{} = ?", column));
            self.params.push(id.to_string());
        }
        self
    }

    pub fn and_eq(mut self, column: &str, value: impl ToString) -> Self {
        self.push_condition(&format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// `and_eq` when a value is given, no-op otherwise
    pub fn and_eq_opt<T: ToString>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.and_eq(column, v),
            None => self,
        }
    }

    /// Column value is one of `values`; an empty set matches nothing
    pub fn and_in<T: ToString>(mut self, column: &str, values: &[T]) -> Self {
        if values.is_empty() {
            self.push_condition("0");
            return self;
        }
        let marks = vec!["?"; values.len()].join(", ");
        self.push_condition(&format!("{} IN ({})", column, marks));
        self.params.extend(values.iter().map(ToString::to_string));
        self
    }

    /// Case-insensitive substring match against any of `columns`
    pub fn and_search(mut self, columns: &[&str], term: Option<&str>) -> Self {
        let term = match term.map(str::trim) {
            Some(t) if !t.is_empty() && !columns.is_empty() => t,
            _ => return self,
        };
        let pattern = format!("%{}%", term.to_lowercase());
        let clause = columns
            .iter()
            .map(|c| format!("LOWER({}) LIKE ?", c))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.push_condition(&format!("({})", clause));
        for _ in columns {
            self.params.push(pattern.clone());
        }
        self
    }

    pub fn order_by(mut self, clause: &str) -> Self {
        self.order = Some(clause.to_string());
        self
    }

    pub fn sql(&self) -> String {
        match &self.order {
            Some(order) => format!("{} ORDER BY {}", self.sql, order),
            None => self.sql.clone(),
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn fetch_all<T, F>(&self, conn: &Connection, map: F) -> ShopResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = conn.prepare(&self.sql())?;
        let rows = stmt.query_map(params_from_iter(self.params.iter()), map)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn fetch_optional<T, F>(&self, conn: &Connection, map: F) -> ShopResult<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        Ok(conn
            .query_row(&self.sql(), params_from_iter(self.params.iter()), map)
            .optional()?)
    }

    /// Run as a statement; returns the number of rows changed
    pub fn execute(&self, conn: &Connection) -> ShopResult<usize> {
        Ok(conn.execute(&self.sql(), params_from_iter(self.params.iter()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{EntityId, EntityPrefix};

    #[test]
    fn test_company_filter_adds_predicate() {
        let company = EntityId::new(EntityPrefix::Cmpy);
        let q = ScopedQuery::new("SELECT t.id FROM customers t")
            .scoped(&CompanyFilter::Company(company.clone()), "t.company_id");
        assert_eq!(q.sql(), "SELECT t.id FROM customers t WHERE t.company_id = ?");
        assert_eq!(q.params(), &[company.to_string()]);
    }

    #[test]
    fn test_global_filter_adds_nothing() {
        let q = ScopedQuery::new("SELECT t.id FROM customers t")
            .scoped(&CompanyFilter::All, "t.company_id")
            .and_eq("t.id", "CUST-1");
        assert_eq!(q.sql(), "SELECT t.id FROM customers t WHERE t.id = ?");
    }

    #[test]
    fn test_conditions_chain_with_and() {
        let q = ScopedQuery::new("SELECT t.id FROM estimates t")
            .and_eq("t.id", "X")
            .and_in("t.status", &["DRAFT", "SENT"])
            .order_by("t.created DESC");
        assert_eq!(
            q.sql(),
            "SELECT t.id FROM estimates t WHERE t.id = ? AND t.status IN (?, ?) ORDER BY t.created DESC"
        );
        assert_eq!(q.params().len(), 3);
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        let q = ScopedQuery::new("SELECT 1").and_in::<String>("x", &[]);
        assert_eq!(q.sql(), "SELECT 1 WHERE 0");
    }

    #[test]
    fn test_search_binds_one_pattern_per_column() {
        let q = ScopedQuery::new("SELECT t.id FROM vehicles t")
            .and_search(&["t.make", "t.vin"], Some(" Toy "));
        assert_eq!(
            q.sql(),
            "SELECT t.id FROM vehicles t WHERE (LOWER(t.make) LIKE ? OR LOWER(t.vin) LIKE ?)"
        );
        assert_eq!(q.params(), &["%toy%".to_string(), "%toy%".to_string()]);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let q = ScopedQuery::new("SELECT 1").and_search(&["a"], Some("  "));
        assert_eq!(q.sql(), "SELECT 1");
    }
}
