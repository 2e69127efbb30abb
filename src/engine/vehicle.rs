//! Vehicle records

use chrono::Utc;
use tracing::info;

use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::tenant::{CompanyFilter, RequestContext};
use crate::engine::{customer, non_blank, require_fields};
use crate::entities::customer::Customer;
use crate::entities::estimate::Estimate;
use crate::entities::vehicle::{Vehicle, VehicleDetail, VehicleInput, VehicleSummary};
use crate::store::records::{self, Record};
use crate::store::{get_scoped, ScopedQuery, Store};

/// Oldest model year accepted
const MIN_YEAR: i32 = 1886;

struct Validated {
    customer_id: EntityId,
    year: i32,
}

fn validate(input: &VehicleInput) -> ShopResult<Validated> {
    require_fields(&[("make", &input.make), ("model", &input.model)])?;
    let customer_id = input
        .customer_id
        .clone()
        .ok_or_else(|| ShopError::validation("required: customerId"))?;
    let year = input
        .year
        .ok_or_else(|| ShopError::validation("required: year"))?;
    let max_year = chrono::Datelike::year(&Utc::now()) + 2;
    if !(MIN_YEAR..=max_year).contains(&year) {
        return Err(ShopError::validation(format!(
            "year {} is outside {}..={}",
            year, MIN_YEAR, max_year
        )));
    }
    if input.mileage.is_some_and(|m| m < 0) {
        return Err(ShopError::validation("mileage cannot be negative"));
    }
    Ok(Validated { customer_id, year })
}

fn apply(vehicle: &mut Vehicle, valid: Validated, input: VehicleInput) {
    vehicle.customer_id = valid.customer_id;
    vehicle.year = valid.year;
    vehicle.make = input.make.trim().to_string();
    vehicle.model = input.model.trim().to_string();
    vehicle.trim = non_blank(input.trim);
    vehicle.color = non_blank(input.color);
    vehicle.vin = non_blank(input.vin).map(|v| v.to_uppercase());
    vehicle.license_plate = non_blank(input.license_plate).map(|p| p.to_uppercase());
    vehicle.mileage = input.mileage;
    vehicle.engine_type = non_blank(input.engine_type);
    vehicle.transmission = non_blank(input.transmission);
    vehicle.notes = non_blank(input.notes);
}

/// Vehicles with owner name and estimate count, newest first
pub fn list(
    store: &Store,
    ctx: &RequestContext,
    customer_id: Option<&EntityId>,
    search: Option<&str>,
) -> ShopResult<Vec<VehicleSummary>> {
    let sql = format!(
        "SELECT {}, c.first_name || ' ' || c.last_name, \
             (SELECT COUNT(*) FROM estimates e WHERE e.vehicle_id = t.id) \
         FROM vehicles t JOIN customers c ON c.id = t.customer_id",
        Vehicle::COLUMNS
    );
    ScopedQuery::new(sql)
        .scoped(&ctx.company_filter(), "t.company_id")
        .and_eq_opt("t.customer_id", customer_id)
        .and_search(&["t.make", "t.model", "t.vin", "t.license_plate"], search)
        .order_by("t.created DESC")
        .fetch_all(store.conn(), |row| {
            Ok(VehicleSummary {
                vehicle: Vehicle::from_row(row)?,
                customer_name: row.get(Vehicle::WIDTH)?,
                estimate_count: row.get::<_, i64>(Vehicle::WIDTH + 1)?.max(0) as u64,
            })
        })
}

pub fn get(store: &Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<VehicleDetail> {
    let conn = store.conn();
    let vehicle = get_scoped::<Vehicle>(conn, &ctx.company_filter(), id)?;
    let customer = get_scoped::<Customer>(
        conn,
        &CompanyFilter::Company(vehicle.company_id.clone()),
        &vehicle.customer_id,
    )?;
    let estimates = ScopedQuery::new(Estimate::select())
        .and_eq("t.vehicle_id", id)
        .order_by("t.created DESC")
        .fetch_all(conn, Estimate::from_row)?;
    Ok(VehicleDetail {
        vehicle,
        customer,
        estimates,
    })
}

pub fn create(store: &mut Store, ctx: &RequestContext, input: VehicleInput) -> ShopResult<Vehicle> {
    let valid = validate(&input)?;
    let company_id = ctx.company_id();
    let tx = store.transaction()?;
    customer::owned_by(&tx, &company_id, &valid.customer_id)?;
    let mut vehicle = Vehicle {
        id: EntityId::new(EntityPrefix::Vehi),
        company_id,
        customer_id: valid.customer_id.clone(),
        year: valid.year,
        make: String::new(),
        model: String::new(),
        trim: None,
        color: None,
        vin: None,
        license_plate: None,
        mileage: None,
        engine_type: None,
        transmission: None,
        notes: None,
        created: Utc::now(),
    };
    apply(&mut vehicle, valid, input);
    records::insert_vehicle(&tx, &vehicle)?;
    tx.commit()?;
    info!(vehicle = %vehicle.id, customer = %vehicle.customer_id, "created vehicle");
    Ok(vehicle)
}

/// Full update; the owner may change to another customer of the same company
pub fn update(
    store: &mut Store,
    ctx: &RequestContext,
    id: &EntityId,
    input: VehicleInput,
) -> ShopResult<Vehicle> {
    let valid = validate(&input)?;
    let tx = store.transaction()?;
    let mut vehicle = get_scoped::<Vehicle>(&tx, &ctx.company_filter(), id)?;
    customer::owned_by(&tx, &vehicle.company_id, &valid.customer_id)?;
    apply(&mut vehicle, valid, input);
    records::update_vehicle(&tx, &vehicle)?;
    tx.commit()?;
    info!(vehicle = %vehicle.id, "updated vehicle");
    Ok(vehicle)
}

/// Delete a vehicle with its estimates and work orders
pub fn delete(store: &mut Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<()> {
    let tx = store.transaction()?;
    get_scoped::<Vehicle>(&tx, &ctx.company_filter(), id)?;
    tx.execute("DELETE FROM vehicles WHERE id = ?1", [id])?;
    tx.commit()?;
    info!(vehicle = %id, "deleted vehicle");
    Ok(())
}

/// Load a vehicle the caller may reference from a new row
pub(crate) fn owned_by(
    conn: &rusqlite::Connection,
    company_id: &EntityId,
    id: &EntityId,
) -> ShopResult<Vehicle> {
    get_scoped::<Vehicle>(conn, &CompanyFilter::Company(company_id.clone()), id)
}
