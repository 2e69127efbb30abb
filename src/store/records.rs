//! Row mappings and writes for every stored entity
//!
//! Column lists are qualified with the alias `t`; queries select from
//! `<table> t` so that joins can append extra columns after
//! [`Record::WIDTH`].

use rusqlite::{params, Connection, Row};

use crate::core::error::ShopResult;
use crate::core::identity::EntityId;
use crate::entities::company::{Company, User};
use crate::entities::customer::Customer;
use crate::entities::estimate::{Estimate, EstimateItem};
use crate::entities::settings::ShopSettings;
use crate::entities::vehicle::Vehicle;
use crate::entities::work_order::{WorkOrder, WorkTask};

use super::serialize::{dec, dec_opt, get_dec, get_dec_opt};

/// A type stored as one row of one table
pub trait Record: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static str;
    /// Number of entries in `COLUMNS`
    const WIDTH: usize;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn select() -> String {
        format!("SELECT {} FROM {} t", Self::COLUMNS, Self::TABLE)
    }
}

// =========================================================================
// Company / User
// =========================================================================

impl Record for Company {
    const TABLE: &'static str = "companies";
    const COLUMNS: &'static str = "t.id, t.name, t.slug, t.is_active, t.created";
    const WIDTH: usize = 5;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            is_active: row.get(3)?,
            created: row.get(4)?,
        })
    }
}

pub fn insert_company(conn: &Connection, company: &Company) -> ShopResult<()> {
    conn.execute(
        "INSERT INTO companies (id, name, slug, is_active, created) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            company.id,
            company.name,
            company.slug,
            company.is_active,
            company.created
        ],
    )?;
    Ok(())
}

pub fn update_company(conn: &Connection, company: &Company) -> ShopResult<()> {
    conn.execute(
        "UPDATE companies SET name = ?2, slug = ?3, is_active = ?4 WHERE id = ?1",
        params![company.id, company.name, company.slug, company.is_active],
    )?;
    Ok(())
}

impl Record for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str =
        "t.id, t.company_id, t.name, t.email, t.role, t.is_active, t.created";
    const WIDTH: usize = 7;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            company_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            role: row.get(4)?,
            is_active: row.get(5)?,
            created: row.get(6)?,
        })
    }
}

pub fn insert_user(conn: &Connection, user: &User, password_hash: &str) -> ShopResult<()> {
    conn.execute(
        "INSERT INTO users (id, company_id, name, email, password_hash, role, is_active, created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id,
            user.company_id,
            user.name,
            user.email,
            password_hash,
            user.role,
            user.is_active,
            user.created
        ],
    )?;
    Ok(())
}

// =========================================================================
// Customer / Vehicle
// =========================================================================

impl Record for Customer {
    const TABLE: &'static str = "customers";
    const COLUMNS: &'static str = "t.id, t.company_id, t.first_name, t.last_name, t.email, \
         t.phone, t.phone2, t.address, t.city, t.state, t.zip_code, t.notes, t.created";
    const WIDTH: usize = 13;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            company_id: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
            phone2: row.get(6)?,
            address: row.get(7)?,
            city: row.get(8)?,
            state: row.get(9)?,
            zip_code: row.get(10)?,
            notes: row.get(11)?,
            created: row.get(12)?,
        })
    }
}

pub fn insert_customer(conn: &Connection, c: &Customer) -> ShopResult<()> {
    conn.execute(
        "INSERT INTO customers (id, company_id, first_name, last_name, email, phone, phone2,
             address, city, state, zip_code, notes, created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            c.id,
            c.company_id,
            c.first_name,
            c.last_name,
            c.email,
            c.phone,
            c.phone2,
            c.address,
            c.city,
            c.state,
            c.zip_code,
            c.notes,
            c.created
        ],
    )?;
    Ok(())
}

pub fn update_customer(conn: &Connection, c: &Customer) -> ShopResult<()> {
    conn.execute(
        "UPDATE customers SET first_name = ?2, last_name = ?3, email = ?4, phone = ?5,
             phone2 = ?6, address = ?7, city = ?8, state = ?9, zip_code = ?10, notes = ?11
         WHERE id = ?1",
        params![
            c.id,
            c.first_name,
            c.last_name,
            c.email,
            c.phone,
            c.phone2,
            c.address,
            c.city,
            c.state,
            c.zip_code,
            c.notes
        ],
    )?;
    Ok(())
}

impl Record for Vehicle {
    const TABLE: &'static str = "vehicles";
    const COLUMNS: &'static str = "t.id, t.company_id, t.customer_id, t.year, t.make, t.model, \
         t.trim, t.color, t.vin, t.license_plate, t.mileage, t.engine_type, t.transmission, \
         t.notes, t.created";
    const WIDTH: usize = 15;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            company_id: row.get(1)?,
            customer_id: row.get(2)?,
            year: row.get(3)?,
            make: row.get(4)?,
            model: row.get(5)?,
            trim: row.get(6)?,
            color: row.get(7)?,
            vin: row.get(8)?,
            license_plate: row.get(9)?,
            mileage: row.get(10)?,
            engine_type: row.get(11)?,
            transmission: row.get(12)?,
            notes: row.get(13)?,
            created: row.get(14)?,
        })
    }
}

pub fn insert_vehicle(conn: &Connection, v: &Vehicle) -> ShopResult<()> {
    conn.execute(
        "INSERT INTO vehicles (id, company_id, customer_id, year, make, model, trim, color, vin,
             license_plate, mileage, engine_type, transmission, notes, created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            v.id,
            v.company_id,
            v.customer_id,
            v.year,
            v.make,
            v.model,
            v.trim,
            v.color,
            v.vin,
            v.license_plate,
            v.mileage,
            v.engine_type,
            v.transmission,
            v.notes,
            v.created
        ],
    )?;
    Ok(())
}

pub fn update_vehicle(conn: &Connection, v: &Vehicle) -> ShopResult<()> {
    conn.execute(
        "UPDATE vehicles SET customer_id = ?2, year = ?3, make = ?4, model = ?5, trim = ?6,
             color = ?7, vin = ?8, license_plate = ?9, mileage = ?10, engine_type = ?11,
             transmission = ?12, notes = ?13
         WHERE id = ?1",
        params![
            v.id,
            v.customer_id,
            v.year,
            v.make,
            v.model,
            v.trim,
            v.color,
            v.vin,
            v.license_plate,
            v.mileage,
            v.engine_type,
            v.transmission,
            v.notes
        ],
    )?;
    Ok(())
}

// =========================================================================
// Estimate / EstimateItem
// =========================================================================

impl Record for Estimate {
    const TABLE: &'static str = "estimates";
    const COLUMNS: &'static str = "t.id, t.company_id, t.customer_id, t.vehicle_id, \
         t.estimate_number, t.status, t.description, t.diagnostic_notes, t.customer_notes, \
         t.internal_notes, t.tax_rate, t.subtotal, t.tax_amount, t.discount, t.total, \
         t.approved_date, t.completed_date, t.created, t.updated";
    const WIDTH: usize = 19;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            company_id: row.get(1)?,
            customer_id: row.get(2)?,
            vehicle_id: row.get(3)?,
            estimate_number: row.get(4)?,
            status: row.get(5)?,
            description: row.get(6)?,
            diagnostic_notes: row.get(7)?,
            customer_notes: row.get(8)?,
            internal_notes: row.get(9)?,
            tax_rate: get_dec(row, 10)?,
            subtotal: get_dec(row, 11)?,
            tax_amount: get_dec(row, 12)?,
            discount: get_dec(row, 13)?,
            total: get_dec(row, 14)?,
            approved_date: row.get(15)?,
            completed_date: row.get(16)?,
            created: row.get(17)?,
            updated: row.get(18)?,
        })
    }
}

pub fn insert_estimate(conn: &Connection, e: &Estimate) -> ShopResult<()> {
    conn.execute(
        "INSERT INTO estimates (id, company_id, customer_id, vehicle_id, estimate_number, status,
             description, diagnostic_notes, customer_notes, internal_notes, tax_rate, subtotal,
             tax_amount, discount, total, approved_date, completed_date, created, updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
             ?18, ?19)",
        params![
            e.id,
            e.company_id,
            e.customer_id,
            e.vehicle_id,
            e.estimate_number,
            e.status,
            e.description,
            e.diagnostic_notes,
            e.customer_notes,
            e.internal_notes,
            dec(e.tax_rate),
            dec(e.subtotal),
            dec(e.tax_amount),
            dec(e.discount),
            dec(e.total),
            e.approved_date,
            e.completed_date,
            e.created,
            e.updated
        ],
    )?;
    Ok(())
}

/// Write every mutable estimate column
pub fn update_estimate(conn: &Connection, e: &Estimate) -> ShopResult<()> {
    conn.execute(
        "UPDATE estimates SET status = ?2, description = ?3, diagnostic_notes = ?4,
             customer_notes = ?5, internal_notes = ?6, tax_rate = ?7, subtotal = ?8,
             tax_amount = ?9, discount = ?10, total = ?11, approved_date = ?12,
             completed_date = ?13, updated = ?14
         WHERE id = ?1",
        params![
            e.id,
            e.status,
            e.description,
            e.diagnostic_notes,
            e.customer_notes,
            e.internal_notes,
            dec(e.tax_rate),
            dec(e.subtotal),
            dec(e.tax_amount),
            dec(e.discount),
            dec(e.total),
            e.approved_date,
            e.completed_date,
            e.updated
        ],
    )?;
    Ok(())
}

impl Record for EstimateItem {
    const TABLE: &'static str = "estimate_items";
    const COLUMNS: &'static str = "t.id, t.estimate_id, t.item_type, t.description, \
         t.part_number, t.brand, t.supplier, t.quantity, t.unit_price, t.cost, t.taxable, \
         t.amount, t.hours, t.labor_rate, t.notes, t.sort_order";
    const WIDTH: usize = 16;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            estimate_id: row.get(1)?,
            item_type: row.get(2)?,
            description: row.get(3)?,
            part_number: row.get(4)?,
            brand: row.get(5)?,
            supplier: row.get(6)?,
            quantity: get_dec(row, 7)?,
            unit_price: get_dec(row, 8)?,
            cost: get_dec(row, 9)?,
            taxable: row.get(10)?,
            amount: get_dec(row, 11)?,
            hours: get_dec_opt(row, 12)?,
            labor_rate: get_dec_opt(row, 13)?,
            notes: row.get(14)?,
            sort_order: row.get(15)?,
        })
    }
}

/// Items of one estimate in display order
pub fn items_for(conn: &Connection, estimate_id: &EntityId) -> ShopResult<Vec<EstimateItem>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE t.estimate_id = ?1 ORDER BY t.sort_order, t.id",
        EstimateItem::select()
    ))?;
    let rows = stmt.query_map([estimate_id], EstimateItem::from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Delete every item of the estimate and insert `items` in their place
pub fn replace_items(
    conn: &Connection,
    estimate_id: &EntityId,
    items: &[EstimateItem],
) -> ShopResult<()> {
    conn.execute(
        "DELETE FROM estimate_items WHERE estimate_id = ?1",
        [estimate_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO estimate_items (id, estimate_id, item_type, description, part_number, brand,
             supplier, quantity, unit_price, cost, taxable, amount, hours, labor_rate, notes,
             sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )?;
    for item in items {
        stmt.execute(params![
            item.id,
            item.estimate_id,
            item.item_type,
            item.description,
            item.part_number,
            item.brand,
            item.supplier,
            dec(item.quantity),
            dec(item.unit_price),
            dec(item.cost),
            item.taxable,
            dec(item.amount),
            dec_opt(item.hours),
            dec_opt(item.labor_rate),
            item.notes,
            item.sort_order
        ])?;
    }
    Ok(())
}

// =========================================================================
// WorkOrder / WorkTask
// =========================================================================

impl Record for WorkOrder {
    const TABLE: &'static str = "work_orders";
    const COLUMNS: &'static str = "t.id, t.company_id, t.work_order_number, t.estimate_id, \
         t.status, t.priority, t.assigned_to, t.bay, t.start_date, t.estimated_completion, \
         t.completed_date, t.delivered_date, t.tech_notes, t.created, t.updated";
    const WIDTH: usize = 15;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            company_id: row.get(1)?,
            work_order_number: row.get(2)?,
            estimate_id: row.get(3)?,
            status: row.get(4)?,
            priority: row.get(5)?,
            assigned_to: row.get(6)?,
            bay: row.get(7)?,
            start_date: row.get(8)?,
            estimated_completion: row.get(9)?,
            completed_date: row.get(10)?,
            delivered_date: row.get(11)?,
            tech_notes: row.get(12)?,
            created: row.get(13)?,
            updated: row.get(14)?,
        })
    }
}

pub fn insert_work_order(conn: &Connection, w: &WorkOrder) -> ShopResult<()> {
    conn.execute(
        "INSERT INTO work_orders (id, company_id, work_order_number, estimate_id, status,
             priority, assigned_to, bay, start_date, estimated_completion, completed_date,
             delivered_date, tech_notes, created, updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            w.id,
            w.company_id,
            w.work_order_number,
            w.estimate_id,
            w.status,
            w.priority,
            w.assigned_to,
            w.bay,
            w.start_date,
            w.estimated_completion,
            w.completed_date,
            w.delivered_date,
            w.tech_notes,
            w.created,
            w.updated
        ],
    )?;
    Ok(())
}

pub fn update_work_order(conn: &Connection, w: &WorkOrder) -> ShopResult<()> {
    conn.execute(
        "UPDATE work_orders SET status = ?2, priority = ?3, assigned_to = ?4, bay = ?5,
             start_date = ?6, estimated_completion = ?7, completed_date = ?8,
             delivered_date = ?9, tech_notes = ?10, updated = ?11
         WHERE id = ?1",
        params![
            w.id,
            w.status,
            w.priority,
            w.assigned_to,
            w.bay,
            w.start_date,
            w.estimated_completion,
            w.completed_date,
            w.delivered_date,
            w.tech_notes,
            w.updated
        ],
    )?;
    Ok(())
}

/// The work order of an estimate, if one was created
pub fn work_order_for_estimate(
    conn: &Connection,
    estimate_id: &EntityId,
) -> ShopResult<Option<WorkOrder>> {
    use rusqlite::OptionalExtension;
    Ok(conn
        .query_row(
            &format!("{} WHERE t.estimate_id = ?1", WorkOrder::select()),
            [estimate_id],
            WorkOrder::from_row,
        )
        .optional()?)
}

impl Record for WorkTask {
    const TABLE: &'static str = "work_tasks";
    const COLUMNS: &'static str = "t.id, t.work_order_id, t.description, t.status, \
         t.assigned_to, t.time_spent, t.notes, t.completed_at, t.sort_order";
    const WIDTH: usize = 9;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            work_order_id: row.get(1)?,
            description: row.get(2)?,
            status: row.get(3)?,
            assigned_to: row.get(4)?,
            time_spent: get_dec_opt(row, 5)?,
            notes: row.get(6)?,
            completed_at: row.get(7)?,
            sort_order: row.get(8)?,
        })
    }
}

pub fn tasks_for(conn: &Connection, work_order_id: &EntityId) -> ShopResult<Vec<WorkTask>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE t.work_order_id = ?1 ORDER BY t.sort_order, t.id",
        WorkTask::select()
    ))?;
    let rows = stmt.query_map([work_order_id], WorkTask::from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn replace_tasks(
    conn: &Connection,
    work_order_id: &EntityId,
    tasks: &[WorkTask],
) -> ShopResult<()> {
    conn.execute(
        "DELETE FROM work_tasks WHERE work_order_id = ?1",
        [work_order_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO work_tasks (id, work_order_id, description, status, assigned_to,
             time_spent, notes, completed_at, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for task in tasks {
        stmt.execute(params![
            task.id,
            task.work_order_id,
            task.description,
            task.status,
            task.assigned_to,
            dec_opt(task.time_spent),
            task.notes,
            task.completed_at,
            task.sort_order
        ])?;
    }
    Ok(())
}

// =========================================================================
// ShopSettings
// =========================================================================

impl Record for ShopSettings {
    const TABLE: &'static str = "shop_settings";
    const COLUMNS: &'static str = "t.id, t.company_id, t.shop_name, t.address, t.city, \
         t.state, t.zip_code, t.phone, t.email, t.website, t.tax_rate, t.labor_rate";
    const WIDTH: usize = 12;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            company_id: row.get(1)?,
            shop_name: row.get(2)?,
            address: row.get(3)?,
            city: row.get(4)?,
            state: row.get(5)?,
            zip_code: row.get(6)?,
            phone: row.get(7)?,
            email: row.get(8)?,
            website: row.get(9)?,
            tax_rate: get_dec(row, 10)?,
            labor_rate: get_dec(row, 11)?,
        })
    }
}

/// Insert or replace the company's settings row
pub fn upsert_settings(conn: &Connection, s: &ShopSettings) -> ShopResult<()> {
    conn.execute(
        "INSERT INTO shop_settings (id, company_id, shop_name, address, city, state, zip_code,
             phone, email, website, tax_rate, labor_rate)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(company_id) DO UPDATE SET
             shop_name = excluded.shop_name, address = excluded.address,
             city = excluded.city, state = excluded.state, zip_code = excluded.zip_code,
             phone = excluded.phone, email = excluded.email, website = excluded.website,
             tax_rate = excluded.tax_rate, labor_rate = excluded.labor_rate",
        params![
            s.id,
            s.company_id,
            s.shop_name,
            s.address,
            s.city,
            s.state,
            s.zip_code,
            s.phone,
            s.email,
            s.website,
            dec(s.tax_rate),
            dec(s.labor_rate)
        ],
    )?;
    Ok(())
}

pub fn settings_for(conn: &Connection, company_id: &EntityId) -> ShopResult<Option<ShopSettings>> {
    use rusqlite::OptionalExtension;
    Ok(conn
        .query_row(
            &format!("{} WHERE t.company_id = ?1", ShopSettings::select()),
            [company_id],
            ShopSettings::from_row,
        )
        .optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width(columns: &str) -> usize {
        columns.split(',').count()
    }

    #[test]
    fn test_widths_match_column_lists() {
        assert_eq!(width(Company::COLUMNS), Company::WIDTH);
        assert_eq!(width(User::COLUMNS), User::WIDTH);
        assert_eq!(width(Customer::COLUMNS), Customer::WIDTH);
        assert_eq!(width(Vehicle::COLUMNS), Vehicle::WIDTH);
        assert_eq!(width(Estimate::COLUMNS), Estimate::WIDTH);
        assert_eq!(width(EstimateItem::COLUMNS), EstimateItem::WIDTH);
        assert_eq!(width(WorkOrder::COLUMNS), WorkOrder::WIDTH);
        assert_eq!(width(WorkTask::COLUMNS), WorkTask::WIDTH);
        assert_eq!(width(ShopSettings::COLUMNS), ShopSettings::WIDTH);
    }
}
