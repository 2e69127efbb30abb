//! Business summary rollups over estimates and work orders

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::core::error::ShopResult;
use crate::core::pricing::{checked_add, checked_mul, margin, margin_pct, round_money};
use crate::core::tenant::RequestContext;
use crate::core::workflow::{EstimateStatus, WorkOrderStatus};
use crate::store::serialize::get_dec;
use crate::store::{count_scoped, ScopedQuery, Store};

/// Figures for the reports screen; money values are owner-only
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopReport {
    pub total_estimates: u64,
    /// APPROVED, IN_PROGRESS or COMPLETED
    pub approved_count: u64,
    pub rejected_count: u64,
    /// DRAFT or SENT
    pub pending_count: u64,
    /// Percent of decided estimates that were won, one decimal
    pub approval_rate: Decimal,
    pub total_quoted: Decimal,
    pub total_approved: Decimal,
    pub total_completed: Decimal,
    pub avg_estimate: Decimal,
    /// Internal cost of the items on won estimates
    pub total_cost: Decimal,
    pub total_margin: Decimal,
    pub margin_pct: Decimal,
    pub active_work_orders: u64,
    pub completed_work_orders: u64,
    pub customers: u64,
    pub vehicles: u64,
}

fn won_statuses() -> Vec<EstimateStatus> {
    EstimateStatus::ALL
        .iter()
        .copied()
        .filter(EstimateStatus::is_won)
        .collect()
}

/// Approval rate as a percentage; undecided estimates do not count
pub fn approval_rate(won: u64, rejected: u64) -> Decimal {
    let decided = (won + rejected).max(1);
    (Decimal::from(won) / Decimal::from(decided) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Summary of everything visible to the request
pub fn summary(store: &Store, ctx: &RequestContext) -> ShopResult<ShopReport> {
    let conn = store.conn();
    let filter = ctx.company_filter();

    let estimates = ScopedQuery::new("SELECT t.status, t.total FROM estimates t")
        .scoped(&filter, "t.company_id")
        .fetch_all(conn, |row| {
            Ok((row.get::<_, EstimateStatus>(0)?, get_dec(row, 1)?))
        })?;

    let costs = ScopedQuery::new(
        "SELECT i.cost, i.quantity FROM estimate_items i JOIN estimates t ON t.id = i.estimate_id",
    )
    .scoped(&filter, "t.company_id")
    .and_in("t.status", &won_statuses())
    .fetch_all(conn, |row| Ok((get_dec(row, 0)?, get_dec(row, 1)?)))?;
    let total_cost = costs
        .iter()
        .try_fold(Decimal::ZERO, |acc, &(cost, qty)| checked_add(acc, checked_mul(cost, qty)?))?;

    let work_orders = ScopedQuery::new("SELECT t.status FROM work_orders t")
        .scoped(&filter, "t.company_id")
        .fetch_all(conn, |row| row.get::<_, WorkOrderStatus>(0))?;

    let mut report = ShopReport {
        total_estimates: estimates.len() as u64,
        approved_count: 0,
        rejected_count: 0,
        pending_count: 0,
        approval_rate: Decimal::ZERO,
        total_quoted: Decimal::ZERO,
        total_approved: Decimal::ZERO,
        total_completed: Decimal::ZERO,
        avg_estimate: Decimal::ZERO,
        total_cost,
        total_margin: Decimal::ZERO,
        margin_pct: Decimal::ZERO,
        active_work_orders: work_orders.iter().filter(|s| s.is_open()).count() as u64,
        completed_work_orders: work_orders.iter().filter(|s| !s.is_open()).count() as u64,
        customers: count_scoped(conn, "customers", &filter)?,
        vehicles: count_scoped(conn, "vehicles", &filter)?,
    };

    for (status, total) in &estimates {
        report.total_quoted = checked_add(report.total_quoted, *total)?;
        if status.is_won() {
            report.approved_count += 1;
            report.total_approved = checked_add(report.total_approved, *total)?;
        }
        match status {
            EstimateStatus::Rejected => report.rejected_count += 1,
            EstimateStatus::Draft | EstimateStatus::Sent => report.pending_count += 1,
            EstimateStatus::Completed => {
                report.total_completed = checked_add(report.total_completed, *total)?
            }
            _ => {}
        }
    }

    if report.total_estimates > 0 {
        report.approval_rate = approval_rate(report.approved_count, report.rejected_count);
        report.avg_estimate =
            round_money(report.total_quoted / Decimal::from(report.total_estimates));
    }
    report.total_margin = margin(report.total_approved, report.total_cost)?;
    report.margin_pct = margin_pct(report.total_approved, report.total_cost)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_rate() {
        assert_eq!(approval_rate(3, 1), "75.0".parse::<Decimal>().unwrap());
        assert_eq!(approval_rate(2, 1), "66.7".parse::<Decimal>().unwrap());
        assert_eq!(approval_rate(0, 0), Decimal::ZERO);
        assert_eq!(approval_rate(4, 0), "100.0".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_won_statuses() {
        assert_eq!(
            won_statuses(),
            vec![
                EstimateStatus::Approved,
                EstimateStatus::InProgress,
                EstimateStatus::Completed
            ]
        );
    }
}
