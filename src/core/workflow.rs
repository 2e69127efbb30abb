//! Status state machines for estimates, work orders and tasks
//!
//! Estimates: `DRAFT -> SENT -> {APPROVED, REJECTED}`, `APPROVED -> IN_PROGRESS
//! -> COMPLETED`, and any non-terminal state may be `CANCELLED`.
//!
//! Work orders: `PENDING -> IN_PROGRESS`, `IN_PROGRESS <-> WAITING_PARTS`,
//! `IN_PROGRESS <-> ON_HOLD`, `{IN_PROGRESS, WAITING_PARTS, ON_HOLD} ->
//! COMPLETED -> DELIVERED`.
//!
//! Requesting the current status again is always accepted.

use serde::{Deserialize, Serialize};

use crate::core::error::ShopError;

/// A status enum with a fixed transition table
pub trait Lifecycle: Copy + Eq + std::fmt::Display + 'static {
    /// Statuses reachable in one step, excluding `self`
    fn allowed_transitions(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    fn can_transition_to(self, to: Self) -> bool {
        self == to || self.allowed_transitions().contains(&to)
    }
}

/// Reject a status change the state machine does not allow
pub fn check_transition<S: Lifecycle>(from: S, to: S) -> Result<(), ShopError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ShopError::ValidationFailed(format!(
            "invalid status transition: {} -> {}",
            from, to
        )))
    }
}

/// Estimate status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum EstimateStatus {
    #[default]
    Draft,
    Sent,
    Approved,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
}

impl EstimateStatus {
    pub const ALL: [EstimateStatus; 7] = [
        EstimateStatus::Draft,
        EstimateStatus::Sent,
        EstimateStatus::Approved,
        EstimateStatus::Rejected,
        EstimateStatus::InProgress,
        EstimateStatus::Completed,
        EstimateStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateStatus::Draft => "DRAFT",
            EstimateStatus::Sent => "SENT",
            EstimateStatus::Approved => "APPROVED",
            EstimateStatus::Rejected => "REJECTED",
            EstimateStatus::InProgress => "IN_PROGRESS",
            EstimateStatus::Completed => "COMPLETED",
            EstimateStatus::Cancelled => "CANCELLED",
        }
    }

    /// Approved, in progress or completed: the customer said yes
    pub fn is_won(&self) -> bool {
        matches!(
            self,
            EstimateStatus::Approved | EstimateStatus::InProgress | EstimateStatus::Completed
        )
    }
}

impl Lifecycle for EstimateStatus {
    fn allowed_transitions(self) -> &'static [Self] {
        use EstimateStatus::*;
        match self {
            Draft => &[Sent, Cancelled],
            Sent => &[Approved, Rejected, Cancelled],
            Approved => &[InProgress, Cancelled],
            InProgress => &[Completed, Cancelled],
            Rejected | Completed | Cancelled => &[],
        }
    }
}

impl std::fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EstimateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_uppercase().replace('-', "_");
        EstimateStatus::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| format!(
                "Invalid estimate status: {}. Use DRAFT, SENT, APPROVED, REJECTED, IN_PROGRESS, COMPLETED, or CANCELLED",
                s
            ))
    }
}

/// Work order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum WorkOrderStatus {
    #[default]
    Pending,
    InProgress,
    WaitingParts,
    OnHold,
    Completed,
    Delivered,
}

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 6] = [
        WorkOrderStatus::Pending,
        WorkOrderStatus::InProgress,
        WorkOrderStatus::WaitingParts,
        WorkOrderStatus::OnHold,
        WorkOrderStatus::Completed,
        WorkOrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "PENDING",
            WorkOrderStatus::InProgress => "IN_PROGRESS",
            WorkOrderStatus::WaitingParts => "WAITING_PARTS",
            WorkOrderStatus::OnHold => "ON_HOLD",
            WorkOrderStatus::Completed => "COMPLETED",
            WorkOrderStatus::Delivered => "DELIVERED",
        }
    }

    /// Still in the shop (not completed or delivered)
    pub fn is_open(&self) -> bool {
        !matches!(self, WorkOrderStatus::Completed | WorkOrderStatus::Delivered)
    }
}

impl Lifecycle for WorkOrderStatus {
    fn allowed_transitions(self) -> &'static [Self] {
        use WorkOrderStatus::*;
        match self {
            Pending => &[InProgress],
            InProgress => &[WaitingParts, OnHold, Completed],
            WaitingParts => &[InProgress, Completed],
            OnHold => &[InProgress, Completed],
            Completed => &[Delivered],
            Delivered => &[],
        }
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_uppercase().replace('-', "_");
        WorkOrderStatus::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| format!(
                "Invalid work order status: {}. Use PENDING, IN_PROGRESS, WAITING_PARTS, ON_HOLD, COMPLETED, or DELIVERED",
                s
            ))
    }
}

/// Work task status. Tasks are either open or done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(TaskStatus::Pending),
            "COMPLETED" => Ok(TaskStatus::Completed),
            _ => Err(format!("Invalid task status: {}. Use PENDING or COMPLETED", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_forward_path() {
        use EstimateStatus::*;
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Approved));
        assert!(Sent.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn test_estimate_invalid_transitions() {
        use EstimateStatus::*;
        assert!(!Draft.can_transition_to(Approved));
        assert!(!Draft.can_transition_to(Completed));
        assert!(!Approved.can_transition_to(Draft));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(check_transition(Completed, InProgress).is_err());
    }

    #[test]
    fn test_estimate_cancel_from_any_open_state() {
        use EstimateStatus::*;
        for from in [Draft, Sent, Approved, InProgress] {
            assert!(from.can_transition_to(Cancelled), "{} -> CANCELLED", from);
        }
        for from in [Rejected, Completed, Cancelled] {
            assert!(from.is_terminal());
            assert!(!from.can_transition_to(Draft));
        }
        assert!(!Rejected.can_transition_to(Cancelled));
    }

    #[test]
    fn test_same_status_is_accepted() {
        for status in EstimateStatus::ALL {
            assert!(check_transition(status, status).is_ok());
        }
        for status in WorkOrderStatus::ALL {
            assert!(check_transition(status, status).is_ok());
        }
    }

    #[test]
    fn test_work_order_transitions() {
        use WorkOrderStatus::*;
        assert!(Pending.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(WaitingParts));
        assert!(WaitingParts.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(OnHold));
        assert!(OnHold.can_transition_to(InProgress));
        for from in [InProgress, WaitingParts, OnHold] {
            assert!(from.can_transition_to(Completed));
        }
        assert!(Completed.can_transition_to(Delivered));
        assert!(Delivered.is_terminal());

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Delivered.can_transition_to(InProgress));
        assert!(!WaitingParts.can_transition_to(OnHold));
    }

    #[test]
    fn test_transition_error_message() {
        let err = check_transition(WorkOrderStatus::Pending, WorkOrderStatus::Delivered)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: invalid status transition: PENDING -> DELIVERED"
        );
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "in_progress".parse::<EstimateStatus>().unwrap(),
            EstimateStatus::InProgress
        );
        assert_eq!(
            "waiting-parts".parse::<WorkOrderStatus>().unwrap(),
            WorkOrderStatus::WaitingParts
        );
        assert!("open".parse::<EstimateStatus>().is_err());
        assert_eq!("completed".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&WorkOrderStatus::WaitingParts).unwrap(),
            "\"WAITING_PARTS\""
        );
        assert_eq!(
            serde_json::to_string(&EstimateStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn test_open_and_won() {
        assert!(WorkOrderStatus::OnHold.is_open());
        assert!(!WorkOrderStatus::Delivered.is_open());
        assert!(EstimateStatus::Completed.is_won());
        assert!(!EstimateStatus::Sent.is_won());
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
    }
}
