//! Work order lifecycle
//!
//! Completing a work order completes its estimate in the same transaction,
//! with one timestamp for both rows.

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::core::error::{ShopError, ShopResult};
use crate::core::identity::EntityId;
use crate::core::tenant::{CompanyFilter, RequestContext};
use crate::core::workflow::{check_transition, EstimateStatus, TaskStatus, WorkOrderStatus};
use crate::engine::estimate::{load_detail, open_work_order};
use crate::engine::non_blank;
use crate::entities::estimate::Estimate;
use crate::entities::work_order::{
    WorkOrder, WorkOrderDetail, WorkOrderFilter, WorkOrderPatch, WorkOrderSummary, WorkTask,
};
use crate::store::records::{self, Record};
use crate::store::{get_scoped, ScopedQuery, Store};

fn load(conn: &Connection, work_order: WorkOrder) -> ShopResult<WorkOrderDetail> {
    let owner = CompanyFilter::Company(work_order.company_id.clone());
    let estimate = get_scoped::<Estimate>(conn, &owner, &work_order.estimate_id)?;
    let parent = load_detail(conn, estimate)?;
    let tasks = records::tasks_for(conn, &work_order.id)?;
    Ok(WorkOrderDetail {
        work_order,
        estimate: parent.estimate,
        customer: parent.customer,
        vehicle: parent.vehicle,
        items: parent.items,
        tasks,
    })
}

/// Apply a patch: task replacement, field updates, status stamps and the
/// completion cascade
pub fn update(
    store: &mut Store,
    ctx: &RequestContext,
    id: &EntityId,
    patch: WorkOrderPatch,
) -> ShopResult<WorkOrderDetail> {
    let tx = store.transaction()?;
    let mut work_order = get_scoped::<WorkOrder>(&tx, &ctx.company_filter(), id)?;
    let from = work_order.status;
    if let Some(to) = patch.status {
        check_transition(from, to)?;
    }

    let now = Utc::now();
    if let Some(inputs) = patch.tasks {
        let tasks: Vec<WorkTask> = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| input.into_task(&work_order.id, index as i64, now))
            .collect();
        records::replace_tasks(&tx, &work_order.id, &tasks)?;
        debug!(work_order = %work_order.id, count = tasks.len(), "replaced tasks");
    }

    if let Some(v) = patch.assigned_to {
        work_order.assigned_to = non_blank(Some(v));
    }
    if let Some(v) = patch.bay {
        work_order.bay = non_blank(Some(v));
    }
    if let Some(priority) = patch.priority {
        work_order.priority = priority;
    }
    if let Some(date) = patch.start_date {
        work_order.start_date = Some(date);
    }
    if let Some(date) = patch.estimated_completion {
        work_order.estimated_completion = Some(date);
    }
    if let Some(v) = patch.tech_notes {
        work_order.tech_notes = non_blank(Some(v));
    }

    let mut completed = false;
    if let Some(to) = patch.status {
        if to != from {
            match to {
                WorkOrderStatus::Completed => {
                    work_order.completed_date = Some(now);
                    completed = true;
                }
                WorkOrderStatus::Delivered => work_order.delivered_date = Some(now),
                _ => {}
            }
            info!(work_order = %work_order.id, from = %from, to = %to, "work order status changed");
        }
        work_order.status = to;
    }
    work_order.updated = now;
    records::update_work_order(&tx, &work_order)?;

    if completed {
        let changed = tx.execute(
            "UPDATE estimates SET status = ?2, completed_date = ?3, updated = ?3 WHERE id = ?1",
            rusqlite::params![work_order.estimate_id, EstimateStatus::Completed, now],
        )?;
        if changed == 0 {
            return Err(ShopError::Corrupt(format!(
                "work order {} points at missing estimate {}",
                work_order.id, work_order.estimate_id
            )));
        }
        info!(estimate = %work_order.estimate_id, "estimate completed with work order");
    }

    let detail = load(&tx, work_order)?;
    tx.commit()?;
    Ok(detail)
}

/// Open the work order of an approved estimate by hand
pub fn create_for_estimate(
    store: &mut Store,
    ctx: &RequestContext,
    estimate_id: &EntityId,
) -> ShopResult<WorkOrderDetail> {
    let tx = store.transaction()?;
    let estimate = get_scoped::<Estimate>(&tx, &ctx.company_filter(), estimate_id)?;
    if !matches!(
        estimate.status,
        EstimateStatus::Approved | EstimateStatus::InProgress
    ) {
        return Err(ShopError::validation(format!(
            "estimate {} is {}; only APPROVED or IN_PROGRESS estimates get a work order",
            estimate.estimate_number, estimate.status
        )));
    }
    if let Some(existing) = records::work_order_for_estimate(&tx, &estimate.id)? {
        return Err(ShopError::Conflict(format!(
            "estimate {} already has work order {}",
            estimate.estimate_number, existing.work_order_number
        )));
    }
    let work_order = open_work_order(&tx, &estimate, Utc::now())?;
    let detail = load(&tx, work_order)?;
    tx.commit()?;
    Ok(detail)
}

pub fn get(store: &Store, ctx: &RequestContext, id: &EntityId) -> ShopResult<WorkOrderDetail> {
    let work_order = get_scoped::<WorkOrder>(store.conn(), &ctx.company_filter(), id)?;
    load(store.conn(), work_order)
}

/// Work orders with display context, newest first
pub fn list(
    store: &Store,
    ctx: &RequestContext,
    filter: &WorkOrderFilter,
) -> ShopResult<Vec<WorkOrderSummary>> {
    let sql = format!(
        "SELECT {}, e.estimate_number, c.first_name || ' ' || c.last_name, \
             v.year || ' ' || v.make || ' ' || v.model, co.name, \
             (SELECT COUNT(*) FROM work_tasks k WHERE k.work_order_id = t.id), \
             (SELECT COUNT(*) FROM work_tasks k WHERE k.work_order_id = t.id AND k.status = '{}') \
         FROM work_orders t \
         JOIN estimates e ON e.id = t.estimate_id \
         JOIN customers c ON c.id = e.customer_id \
         JOIN vehicles v ON v.id = e.vehicle_id \
         JOIN companies co ON co.id = t.company_id",
        WorkOrder::COLUMNS,
        TaskStatus::Completed
    );
    let mut query = ScopedQuery::new(sql).scoped(&ctx.company_filter(), "t.company_id");
    if let Some(status) = &filter.status {
        query = query.and_in("t.status", &status.statuses());
    }
    let w = WorkOrder::WIDTH;
    query
        .order_by("t.created DESC, t.id DESC")
        .fetch_all(store.conn(), |row| {
            Ok(WorkOrderSummary {
                work_order: WorkOrder::from_row(row)?,
                estimate_number: row.get(w)?,
                customer_name: row.get(w + 1)?,
                vehicle_label: row.get(w + 2)?,
                company_name: row.get(w + 3)?,
                task_count: row.get::<_, i64>(w + 4)?.max(0) as u64,
                tasks_completed: row.get::<_, i64>(w + 5)?.max(0) as u64,
            })
        })
}
