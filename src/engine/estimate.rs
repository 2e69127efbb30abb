//! Estimate lifecycle
//!
//! An update is one transaction: optional wholesale item replacement,
//! recompute of the cached totals from the persisted items, the status
//! change with its date stamps, and work order creation on approval.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::{estimate_number, work_order_number, EntityId, EntityPrefix};
use crate::core::pricing::{Totals, DEFAULT_TAX_RATE};
use crate::core::tenant::{CompanyFilter, RequestContext};
use crate::core::workflow::{check_transition, EstimateStatus};
use crate::engine::{customer, non_blank, vehicle};
use crate::entities::customer::Customer;
use crate::entities::estimate::{
    Estimate, EstimateDetail, EstimateFilter, EstimateItem, EstimatePatch, EstimateSummary,
    NewEstimate, WorkOrderRef,
};
use crate::entities::vehicle::Vehicle;
use crate::entities::work_order::{WorkOrder, WorkOrderTasks};
use crate::store::records::{self, Record};
use crate::store::{get_scoped, ScopedQuery, Store};

fn check_rate(rate: Decimal) -> ShopResult<Decimal> {
    if rate.is_sign_negative() {
        return Err(ShopError::validation(format!(
            "tax rate cannot be negative: {}",
            rate
        )));
    }
    Ok(rate)
}

/// Estimate with customer, vehicle, ordered items and the work order
pub(crate) fn load_detail(conn: &Connection, estimate: Estimate) -> ShopResult<EstimateDetail> {
    let owner = CompanyFilter::Company(estimate.company_id.clone());
    let customer = get_scoped::<Customer>(conn, &owner, &estimate.customer_id)?;
    let vehicle = get_scoped::<Vehicle>(conn, &owner, &estimate.vehicle_id)?;
    let items = records::items_for(conn, &estimate.id)?;
    let work_order = match records::work_order_for_estimate(conn, &estimate.id)? {
        Some(work_order) => {
            let tasks = records::tasks_for(conn, &work_order.id)?;
            Some(WorkOrderTasks { work_order, tasks })
        }
        None => None,
    };
    Ok(EstimateDetail {
        estimate,
        customer,
        vehicle,
        items,
        work_order,
    })
}

/// Refresh the cached totals from `items`
fn apply_totals(
    estimate: &mut Estimate,
    items: &[EstimateItem],
    discount: Decimal,
) -> ShopResult<()> {
    let totals = Totals::compute(items, estimate.tax_rate, discount)?;
    debug!(
        estimate = %estimate.id,
        subtotal = %totals.subtotal,
        taxable = %totals.taxable_amount,
        tax = %totals.tax_amount,
        total = %totals.total,
        "recomputed totals"
    );
    estimate.subtotal = totals.subtotal;
    estimate.tax_amount = totals.tax_amount;
    estimate.discount = totals.discount;
    estimate.total = totals.total;
    Ok(())
}

/// Create a fresh work order for an approved estimate
pub(crate) fn open_work_order(
    conn: &Connection,
    estimate: &Estimate,
    now: DateTime<Utc>,
) -> ShopResult<WorkOrder> {
    let work_order = WorkOrder::for_estimate(estimate, work_order_number(), now);
    records::insert_work_order(conn, &work_order)?;
    info!(
        estimate = %estimate.id,
        work_order = %work_order.id,
        number = %work_order.work_order_number,
        "opened work order"
    );
    Ok(work_order)
}

/// Open a DRAFT estimate with no items
pub fn create(store: &mut Store, ctx: &RequestContext, input: NewEstimate) -> ShopResult<EstimateDetail> {
    let customer_id = input
        .customer_id
        .ok_or_else(|| ShopError::validation("required: customerId"))?;
    let vehicle_id = input
        .vehicle_id
        .ok_or_else(|| ShopError::validation("required: vehicleId"))?;
    let company_id = ctx.company_id();

    let tx = store.transaction()?;
    customer::owned_by(&tx, &company_id, &customer_id)?;
    let vehicle = vehicle::owned_by(&tx, &company_id, &vehicle_id)?;
    if vehicle.customer_id != customer_id {
        return Err(ShopError::validation(format!(
            "vehicle {} does not belong to customer {}",
            vehicle_id, customer_id
        )));
    }

    let tax_rate = match input.tax_rate {
        Some(rate) => check_rate(rate)?,
        None => records::settings_for(&tx, &company_id)?
            .map(|s| s.tax_rate)
            .unwrap_or(DEFAULT_TAX_RATE),
    };

    let now = Utc::now();
    let estimate = Estimate {
        id: EntityId::new(EntityPrefix::Estm),
        company_id,
        customer_id,
        vehicle_id,
        estimate_number: estimate_number(),
        status: EstimateStatus::Draft,
        description: non_blank(input.description),
        diagnostic_notes: non_blank(input.diagnostic_notes),
        customer_notes: non_blank(input.customer_notes),
        internal_notes: non_blank(input.internal_notes),
        tax_rate,
        subtotal: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        discount: Decimal::ZERO,
        total: Decimal::ZERO,
        approved_date: None,
        completed_date: None,
        created: now,
        updated: now,
    };
    records::insert_estimate(&tx, &estimate)?;
    let detail = load_detail(&tx, estimate)?;
    tx.commit()?;
    info!(
        estimate = %detail.estimate.id,
        number = %detail.estimate.estimate_number,
        company = %detail.estimate.company_id,
        "created estimate"
    );
    Ok(detail)
}

/// Apply a patch; see the module docs for what happens in the transaction
pub fn update(
    store: &mut Store,
    ctx: &RequestContext,
    id: &EntityId,
    patch: EstimatePatch,
) -> ShopResult<EstimateDetail> {
    let tx = store.transaction()?;
    let mut estimate = get_scoped::<Estimate>(&tx, &ctx.company_filter(), id)?;
    let from = estimate.status;
    if let Some(to) = patch.status {
        check_transition(from, to)?;
    }
    if let Some(rate) = patch.tax_rate {
        estimate.tax_rate = check_rate(rate)?;
    }

    if let Some(inputs) = patch.items {
        let items: Vec<EstimateItem> = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| input.into_item(&estimate.id, index as i64))
            .collect::<ShopResult<_>>()?;
        records::replace_items(&tx, &estimate.id, &items)?;
        debug!(estimate = %estimate.id, count = items.len(), "replaced items");
    }
    let items = records::items_for(&tx, &estimate.id)?;
    apply_totals(
        &mut estimate,
        &items,
        patch.discount.unwrap_or(Decimal::ZERO),
    )?;

    if let Some(v) = patch.description {
        estimate.description = non_blank(Some(v));
    }
    if let Some(v) = patch.diagnostic_notes {
        estimate.diagnostic_notes = non_blank(Some(v));
    }
    if let Some(v) = patch.customer_notes {
        estimate.customer_notes = non_blank(Some(v));
    }
    if let Some(v) = patch.internal_notes {
        estimate.internal_notes = non_blank(Some(v));
    }

    let now = Utc::now();
    if let Some(to) = patch.status {
        if to != from {
            match to {
                EstimateStatus::Approved => estimate.approved_date = Some(now),
                EstimateStatus::Completed => estimate.completed_date = Some(now),
                _ => {}
            }
            info!(estimate = %estimate.id, from = %from, to = %to, "estimate status changed");
        }
        estimate.status = to;
    }
    estimate.updated = now;
    records::update_estimate(&tx, &estimate)?;

    if patch.status == Some(EstimateStatus::Approved)
        && records::work_order_for_estimate(&tx, &estimate.id)?.is_none()
    {
        open_work_order(&tx, &estimate, now)?;
    }

    let detail = load_detail(&tx, estimate)?;
    tx.commit()?;
    Ok(detail)
}

/// Delete an estimate, its work order and everything below them
pub fn delete(store: &mut Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<()> {
    let tx = store.transaction()?;
    get_scoped::<Estimate>(&tx, &ctx.company_filter(), id)?;
    let work_orders = tx.execute("DELETE FROM work_orders WHERE estimate_id = ?1", [id])?;
    tx.execute("DELETE FROM estimates WHERE id = ?1", [id])?;
    tx.commit()?;
    info!(estimate = %id, work_orders, "deleted estimate");
    Ok(())
}

pub fn get(store: &Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<EstimateDetail> {
    let estimate = get_scoped::<Estimate>(store.conn(), &ctx.company_filter(), id)?;
    load_detail(store.conn(), estimate)
}

/// Estimates with display context, newest first
pub fn list(
    store: &Store,
    ctx: &RequestContext,
    filter: &EstimateFilter,
) -> ShopResult<Vec<EstimateSummary>> {
    let sql = format!(
        "SELECT {}, c.first_name || ' ' || c.last_name, \
             v.year || ' ' || v.make || ' ' || v.model, co.name, \
             (SELECT COUNT(*) FROM estimate_items i WHERE i.estimate_id = t.id), \
             w.id, w.work_order_number, w.status \
         FROM estimates t \
         JOIN customers c ON c.id = t.customer_id \
         JOIN vehicles v ON v.id = t.vehicle_id \
         JOIN companies co ON co.id = t.company_id \
         LEFT JOIN work_orders w ON w.estimate_id = t.id",
        Estimate::COLUMNS
    );
    let mut query = ScopedQuery::new(sql).scoped(&ctx.company_filter(), "t.company_id");
    if let Some(status) = &filter.status {
        query = query.and_in("t.status", &status.statuses());
    }
    let w = Estimate::WIDTH;
    query
        .and_eq_opt("t.customer_id", filter.customer_id.as_ref())
        .and_eq_opt("t.vehicle_id", filter.vehicle_id.as_ref())
        .order_by("t.created DESC, t.id DESC")
        .fetch_all(store.conn(), |row| {
            let work_order_id: Option<EntityId> = row.get(w + 4)?;
            let work_order = match work_order_id {
                Some(id) => Some(WorkOrderRef {
                    id,
                    work_order_number: row.get(w + 5)?,
                    status: row.get(w + 6)?,
                }),
                None => None,
            };
            Ok(EstimateSummary {
                estimate: Estimate::from_row(row)?,
                customer_name: row.get(w)?,
                vehicle_label: row.get(w + 1)?,
                company_name: row.get(w + 2)?,
                item_count: row.get::<_, i64>(w + 3)?.max(0) as u64,
                work_order,
            })
        })
}
