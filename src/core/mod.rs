//! Core module - fundamental types and pure business rules

pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod logging;
pub mod pricing;
pub mod tenant;
pub mod workflow;

pub use config::Config;
pub use entity::{Entity, Priority};
pub use error::{ShopError, ShopResult};
pub use identity::{estimate_number, work_order_number, EntityId, EntityPrefix, IdParseError};
pub use pricing::{Margin, PricedLine, Totals, DEFAULT_LABOR_RATE, DEFAULT_TAX_RATE};
pub use tenant::{
    require_role, resolve_company_filter, resolve_company_id, CompanyFilter, Identity,
    RequestContext, Role,
};
pub use workflow::{check_transition, EstimateStatus, Lifecycle, TaskStatus, WorkOrderStatus};
