//! Vehicle entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::customer::Customer;
use crate::entities::estimate::Estimate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: EntityId,
    pub company_id: EntityId,
    pub customer_id: EntityId,
    pub year: i32,
    pub make: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created: DateTime<Utc>,
}

impl Entity for Vehicle {
    const PREFIX: EntityPrefix = EntityPrefix::Vehi;
    const NAME: &'static str = "vehicle";

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

impl Vehicle {
    /// "2019 Toyota Corolla"
    pub fn label(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub customer_id: Option<EntityId>,
    pub year: Option<i32>,
    pub make: String,
    pub model: String,
    pub trim: Option<String>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub mileage: Option<i64>,
    pub engine_type: Option<String>,
    pub transmission: Option<String>,
    pub notes: Option<String>,
}

/// List row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub customer_name: String,
    pub estimate_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub customer: Customer,
    pub estimates: Vec<Estimate>,
}
