//! Business operations
//!
//! Every entry point takes the [`Store`](crate::store::Store) and a
//! [`RequestContext`](crate::core::RequestContext); tenant scope is resolved
//! from the context, never from the request payload.

pub mod company;
pub mod customer;
pub mod estimate;
pub mod report;
pub mod settings;
pub mod vehicle;
pub mod work_order;

use crate::core::error::{ShopError, ShopResult};

/// Fail with ValidationFailed when any listed field is blank
pub(crate) fn require_fields(fields: &[(&str, &str)]) -> ShopResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ShopError::validation(format!(
            "required: {}",
            missing.join(", ")
        )))
    }
}

/// Empty strings are stored as NULL
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
