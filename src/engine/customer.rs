//! Customer records

use chrono::Utc;
use tracing::info;

use crate::core::error::ShopResult;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::tenant::{CompanyFilter, RequestContext};
use crate::engine::company::ensure_company;
use crate::engine::{non_blank, require_fields};
use crate::entities::customer::{Customer, CustomerDetail, CustomerInput, CustomerSummary};
use crate::entities::estimate::Estimate;
use crate::entities::vehicle::Vehicle;
use crate::store::records::{self, Record};
use crate::store::{get_scoped, ScopedQuery, Store};

fn validate(input: &CustomerInput) -> ShopResult<()> {
    require_fields(&[
        ("firstName", &input.first_name),
        ("lastName", &input.last_name),
        ("phone", &input.phone),
    ])
}

fn apply(customer: &mut Customer, input: CustomerInput) {
    customer.first_name = input.first_name.trim().to_string();
    customer.last_name = input.last_name.trim().to_string();
    customer.phone = input.phone.trim().to_string();
    customer.email = non_blank(input.email);
    customer.phone2 = non_blank(input.phone2);
    customer.address = non_blank(input.address);
    customer.city = non_blank(input.city);
    customer.state = non_blank(input.state);
    customer.zip_code = non_blank(input.zip_code);
    customer.notes = non_blank(input.notes);
}

/// Customers with vehicle and estimate counts, newest first
pub fn list(
    store: &Store,
    ctx: &RequestContext,
    search: Option<&str>,
) -> ShopResult<Vec<CustomerSummary>> {
    let sql = format!(
        "SELECT {}, \
             (SELECT COUNT(*) FROM vehicles v WHERE v.customer_id = t.id), \
             (SELECT COUNT(*) FROM estimates e WHERE e.customer_id = t.id) \
         FROM customers t",
        Customer::COLUMNS
    );
    ScopedQuery::new(sql)
        .scoped(&ctx.company_filter(), "t.company_id")
        .and_search(
            &["t.first_name", "t.last_name", "t.email", "t.phone"],
            search,
        )
        .order_by("t.created DESC")
        .fetch_all(store.conn(), |row| {
            Ok(CustomerSummary {
                customer: Customer::from_row(row)?,
                vehicle_count: row.get::<_, i64>(Customer::WIDTH)?.max(0) as u64,
                estimate_count: row.get::<_, i64>(Customer::WIDTH + 1)?.max(0) as u64,
            })
        })
}

/// Customer with vehicles and estimates, newest first
pub fn get(store: &Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<CustomerDetail> {
    let conn = store.conn();
    let customer = get_scoped::<Customer>(conn, &ctx.company_filter(), id)?;
    let vehicles = ScopedQuery::new(Vehicle::select())
        .and_eq("t.customer_id", id)
        .order_by("t.created DESC")
        .fetch_all(conn, Vehicle::from_row)?;
    let estimates = ScopedQuery::new(Estimate::select())
        .and_eq("t.customer_id", id)
        .order_by("t.created DESC")
        .fetch_all(conn, Estimate::from_row)?;
    Ok(CustomerDetail {
        customer,
        vehicles,
        estimates,
    })
}

pub fn create(store: &mut Store, ctx: &RequestContext, input: CustomerInput) -> ShopResult<Customer> {
    validate(&input)?;
    let company_id = ctx.company_id();
    let tx = store.transaction()?;
    ensure_company(&tx, &company_id)?;
    let mut customer = Customer {
        id: EntityId::new(EntityPrefix::Cust),
        company_id,
        first_name: String::new(),
        last_name: String::new(),
        email: None,
        phone: String::new(),
        phone2: None,
        address: None,
        city: None,
        state: None,
        zip_code: None,
        notes: None,
        created: Utc::now(),
    };
    apply(&mut customer, input);
    records::insert_customer(&tx, &customer)?;
    tx.commit()?;
    info!(customer = %customer.id, company = %customer.company_id, "created customer");
    Ok(customer)
}

pub fn update(
    store: &mut Store,
    ctx: &RequestContext,
    id: &EntityId,
    input: CustomerInput,
) -> ShopResult<Customer> {
    validate(&input)?;
    let tx = store.transaction()?;
    let mut customer = get_scoped::<Customer>(&tx, &ctx.company_filter(), id)?;
    apply(&mut customer, input);
    records::update_customer(&tx, &customer)?;
    tx.commit()?;
    info!(customer = %customer.id, "updated customer");
    Ok(customer)
}

/// Delete a customer with their vehicles, estimates and work orders
pub fn delete(store: &mut Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<()> {
    let tx = store.transaction()?;
    get_scoped::<Customer>(&tx, &ctx.company_filter(), id)?;
    tx.execute("DELETE FROM customers WHERE id = ?1", [id])?;
    tx.commit()?;
    info!(customer = %id, "deleted customer");
    Ok(())
}

/// Load a customer the caller may reference from a new row
pub(crate) fn owned_by(
    conn: &rusqlite::Connection,
    company_id: &EntityId,
    id: &EntityId,
) -> ShopResult<Customer> {
    get_scoped::<Customer>(conn, &CompanyFilter::Company(company_id.clone()), id)
}
