//! Filter and choice enums for CLI arguments

use clap::ValueEnum;

use crate::core::entity::Priority;
use crate::core::workflow::{EstimateStatus, WorkOrderStatus};
use crate::entities::estimate::EstimateStatusFilter;
use crate::entities::work_order::WorkOrderStatusFilter;

/// Status filter for `estimate list`
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum EstimateStatusArg {
    Draft,
    Sent,
    Approved,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
    /// Draft or sent
    Pending,
    /// Approved or in progress
    Active,
    /// Every status - default
    #[default]
    All,
}

impl EstimateStatusArg {
    pub fn to_filter(self) -> Option<EstimateStatusFilter> {
        use EstimateStatusFilter::Exact;
        match self {
            EstimateStatusArg::Draft => Some(Exact(EstimateStatus::Draft)),
            EstimateStatusArg::Sent => Some(Exact(EstimateStatus::Sent)),
            EstimateStatusArg::Approved => Some(Exact(EstimateStatus::Approved)),
            EstimateStatusArg::Rejected => Some(Exact(EstimateStatus::Rejected)),
            EstimateStatusArg::InProgress => Some(Exact(EstimateStatus::InProgress)),
            EstimateStatusArg::Completed => Some(Exact(EstimateStatus::Completed)),
            EstimateStatusArg::Cancelled => Some(Exact(EstimateStatus::Cancelled)),
            EstimateStatusArg::Pending => Some(EstimateStatusFilter::Pending),
            EstimateStatusArg::Active => Some(EstimateStatusFilter::Active),
            EstimateStatusArg::All => None,
        }
    }
}

/// Status filter for `wo list`
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum WorkOrderStatusArg {
    Pending,
    InProgress,
    WaitingParts,
    OnHold,
    Completed,
    Delivered,
    /// Not yet completed or delivered
    Active,
    /// Every status - default
    #[default]
    All,
}

impl WorkOrderStatusArg {
    pub fn to_filter(self) -> Option<WorkOrderStatusFilter> {
        use WorkOrderStatusFilter::Exact;
        match self {
            WorkOrderStatusArg::Pending => Some(Exact(WorkOrderStatus::Pending)),
            WorkOrderStatusArg::InProgress => Some(Exact(WorkOrderStatus::InProgress)),
            WorkOrderStatusArg::WaitingParts => Some(Exact(WorkOrderStatus::WaitingParts)),
            WorkOrderStatusArg::OnHold => Some(Exact(WorkOrderStatus::OnHold)),
            WorkOrderStatusArg::Completed => Some(Exact(WorkOrderStatus::Completed)),
            WorkOrderStatusArg::Delivered => Some(Exact(WorkOrderStatus::Delivered)),
            WorkOrderStatusArg::Active => Some(WorkOrderStatusFilter::Active),
            WorkOrderStatusArg::All => None,
        }
    }
}

/// Work order priority choice
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PriorityArg {
    Low,
    Normal,
    High,
    Urgent,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Normal => Priority::Normal,
            PriorityArg::High => Priority::High,
            PriorityArg::Urgent => Priority::Urgent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_status_arg_groups() {
        assert_eq!(EstimateStatusArg::All.to_filter(), None);
        assert_eq!(
            EstimateStatusArg::Pending.to_filter(),
            Some(EstimateStatusFilter::Pending)
        );
        assert_eq!(
            EstimateStatusArg::InProgress.to_filter(),
            Some(EstimateStatusFilter::Exact(EstimateStatus::InProgress))
        );
    }

    #[test]
    fn test_work_order_status_arg() {
        assert_eq!(
            WorkOrderStatusArg::Active.to_filter(),
            Some(WorkOrderStatusFilter::Active)
        );
        assert_eq!(
            WorkOrderStatusArg::WaitingParts.to_filter(),
            Some(WorkOrderStatusFilter::Exact(WorkOrderStatus::WaitingParts))
        );
    }

    #[test]
    fn test_value_enum_names() {
        let arg = EstimateStatusArg::from_str("in-progress", true).unwrap();
        assert_eq!(arg, EstimateStatusArg::InProgress);
        let arg = WorkOrderStatusArg::from_str("waiting-parts", true).unwrap();
        assert_eq!(arg, WorkOrderStatusArg::WaitingParts);
    }

    #[test]
    fn test_priority_arg() {
        assert_eq!(Priority::from(PriorityArg::Urgent), Priority::Urgent);
    }
}
