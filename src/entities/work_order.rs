//! Work order entity type - shop-floor execution of an approved estimate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, Priority};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::workflow::{TaskStatus, WorkOrderStatus};
use crate::entities::customer::Customer;
use crate::entities::estimate::{Estimate, EstimateItem};
use crate::entities::vehicle::Vehicle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: EntityId,
    pub company_id: EntityId,
    /// Printed number, `WO-YYYY-NNNN`
    pub work_order_number: String,
    pub estimate_id: EntityId,
    pub status: WorkOrderStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_notes: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Entity for WorkOrder {
    const PREFIX: EntityPrefix = EntityPrefix::Word;
    const NAME: &'static str = "work order";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn company_id(&self) -> &EntityId {
        &self.company_id
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl WorkOrder {
    /// A fresh PENDING/NORMAL work order for `estimate`, owned by the
    /// estimate's company
    pub fn for_estimate(estimate: &Estimate, number: String, now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Word),
            company_id: estimate.company_id.clone(),
            work_order_number: number,
            estimate_id: estimate.id.clone(),
            status: WorkOrderStatus::Pending,
            priority: Priority::Normal,
            assigned_to: None,
            bay: None,
            start_date: None,
            estimated_completion: None,
            completed_date: None,
            delivered_date: None,
            tech_notes: None,
            created: now,
            updated: now,
        }
    }
}

/// Checklist item on a work order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTask {
    pub id: EntityId,
    pub work_order_id: EntityId,
    pub description: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub description: String,
    /// Defaults to PENDING
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub time_spent: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TaskInput {
    /// Materialize as the row stored at position `sort_order`; a completed
    /// task is stamped with `now`
    pub fn into_task(self, work_order_id: &EntityId, sort_order: i64, now: DateTime<Utc>) -> WorkTask {
        let status = self.status.unwrap_or_default();
        WorkTask {
            id: EntityId::new(EntityPrefix::Task),
            work_order_id: work_order_id.clone(),
            description: self.description,
            status,
            assigned_to: self.assigned_to,
            time_spent: self.time_spent,
            notes: self.notes,
            completed_at: (status == TaskStatus::Completed).then_some(now),
            sort_order,
        }
    }
}

impl From<&WorkTask> for TaskInput {
    fn from(task: &WorkTask) -> Self {
        Self {
            description: task.description.clone(),
            status: Some(task.status),
            assigned_to: task.assigned_to.clone(),
            time_spent: task.time_spent,
            notes: task.notes.clone(),
        }
    }
}

/// Partial update; `None` leaves a field alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderPatch {
    /// Replaces every existing task when present
    pub tasks: Option<Vec<TaskInput>>,
    pub status: Option<WorkOrderStatus>,
    pub assigned_to: Option<String>,
    pub bay: Option<String>,
    pub priority: Option<Priority>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub tech_notes: Option<String>,
}

/// Status selector for work order lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOrderStatusFilter {
    Exact(WorkOrderStatus),
    /// Anything not yet completed or delivered
    Active,
}

impl WorkOrderStatusFilter {
    pub fn statuses(&self) -> Vec<WorkOrderStatus> {
        match self {
            WorkOrderStatusFilter::Exact(s) => vec![*s],
            WorkOrderStatusFilter::Active => WorkOrderStatus::ALL
                .iter()
                .copied()
                .filter(WorkOrderStatus::is_open)
                .collect(),
        }
    }
}

impl std::str::FromStr for WorkOrderStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("active") {
            Ok(WorkOrderStatusFilter::Active)
        } else {
            s.parse().map(WorkOrderStatusFilter::Exact)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatusFilter>,
}

/// List row with display context
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderSummary {
    #[serde(flatten)]
    pub work_order: WorkOrder,
    pub estimate_number: String,
    pub customer_name: String,
    pub vehicle_label: String,
    pub company_name: String,
    pub task_count: u64,
    pub tasks_completed: u64,
}

/// Work order with its ordered tasks, as embedded in an estimate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderTasks {
    #[serde(flatten)]
    pub work_order: WorkOrder,
    pub tasks: Vec<WorkTask>,
}

/// Work order with its estimate context and tasks
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderDetail {
    #[serde(flatten)]
    pub work_order: WorkOrder,
    pub estimate: Estimate,
    pub customer: Customer,
    pub vehicle: Vehicle,
    pub items: Vec<EstimateItem>,
    pub tasks: Vec<WorkTask>,
}

impl WorkOrderDetail {
    /// `(completed, total)` task counts
    pub fn progress(&self) -> (usize, usize) {
        let done = self
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        (done, self.tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_input_defaults_to_pending() {
        let now = Utc::now();
        let task = TaskInput {
            description: "Bleed brakes".to_string(),
            ..Default::default()
        }
        .into_task(&EntityId::new(EntityPrefix::Word), 0, now);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
        assert!(task.id.to_string().starts_with("TASK-"));
    }

    #[test]
    fn test_completed_task_is_stamped() {
        let now = Utc::now();
        let task = TaskInput {
            description: "Road test".to_string(),
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
        .into_task(&EntityId::new(EntityPrefix::Word), 4, now);
        assert_eq!(task.completed_at, Some(now));
        assert_eq!(task.sort_order, 4);
    }

    #[test]
    fn test_active_filter_excludes_finished() {
        let active = WorkOrderStatusFilter::Active.statuses();
        assert_eq!(
            active,
            vec![
                WorkOrderStatus::Pending,
                WorkOrderStatus::InProgress,
                WorkOrderStatus::WaitingParts,
                WorkOrderStatus::OnHold,
            ]
        );
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!(
            "Active".parse::<WorkOrderStatusFilter>().unwrap(),
            WorkOrderStatusFilter::Active
        );
        assert_eq!(
            "waiting_parts".parse::<WorkOrderStatusFilter>().unwrap(),
            WorkOrderStatusFilter::Exact(WorkOrderStatus::WaitingParts)
        );
        assert!("done".parse::<WorkOrderStatusFilter>().is_err());
    }

    #[test]
    fn test_tasks_from_yaml() {
        let yaml = r#"
- description: Replace pads
  status: COMPLETED
  timeSpent: 1.5
- description: Road test
"#;
        let tasks: Vec<TaskInput> = serde_yml::from_str(yaml).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, Some(TaskStatus::Completed));
        assert!(tasks[1].status.is_none());
    }
}
