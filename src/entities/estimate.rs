//! Estimate entity type - customer quotes and their line items

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::error::ShopResult;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::pricing::{self, line_amount, Margin, PricedLine};
use crate::core::workflow::{EstimateStatus, WorkOrderStatus};
use crate::entities::customer::Customer;
use crate::entities::vehicle::Vehicle;
use crate::entities::work_order::WorkOrderTasks;

/// Kind of line on an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum ItemType {
    #[default]
    Part,
    Labor,
    Sublet,
    Fee,
    Discount,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Part => "PART",
            ItemType::Labor => "LABOR",
            ItemType::Sublet => "SUBLET",
            ItemType::Fee => "FEE",
            ItemType::Discount => "DISCOUNT",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PART" => Ok(ItemType::Part),
            "LABOR" => Ok(ItemType::Labor),
            "SUBLET" => Ok(ItemType::Sublet),
            "FEE" => Ok(ItemType::Fee),
            "DISCOUNT" => Ok(ItemType::Discount),
            _ => Err(format!(
                "Invalid item type: {}. Use PART, LABOR, SUBLET, FEE, or DISCOUNT",
                s
            )),
        }
    }
}

/// A quote for work on one customer's vehicle
///
/// `subtotal`, `tax_amount` and `total` are cached results of the last
/// recompute, not independent inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub id: EntityId,
    pub company_id: EntityId,
    pub customer_id: EntityId,
    pub vehicle_id: EntityId,
    /// Printed number, `EST-YYYY-NNNN`
    pub estimate_number: String,
    pub status: EstimateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_notes: Option<String>,
    /// Percent, e.g. 11.5
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Entity for Estimate {
    const PREFIX: EntityPrefix = EntityPrefix::Estm;
    const NAME: &'static str = "estimate";

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

/// Persisted line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateItem {
    pub id: EntityId,
    pub estimate_id: EntityId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Internal unit cost, never shown to the customer
    pub cost: Decimal,
    pub taxable: bool,
    /// `quantity x unit_price` at the time of the last write
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub sort_order: i64,
}

impl PricedLine for EstimateItem {
    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    fn cost(&self) -> Decimal {
        self.cost
    }

    fn is_taxable(&self) -> bool {
        self.taxable
    }

    /// The stored amount, exactly as last written
    fn amount(&self) -> ShopResult<Decimal> {
        Ok(self.amount)
    }
}

/// Line item as submitted; missing numbers take their defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    pub description: String,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    /// Defaults to 1; zero also counts as 1
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// Defaults to 0
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    /// Defaults to 0
    #[serde(default)]
    pub cost: Option<Decimal>,
    /// Defaults to true; only an explicit `false` makes a line tax exempt
    #[serde(default)]
    pub taxable: Option<bool>,
    #[serde(default)]
    pub hours: Option<Decimal>,
    #[serde(default)]
    pub labor_rate: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PricedLine for ItemInput {
    fn quantity(&self) -> Decimal {
        self.quantity
            .filter(|q| !q.is_zero())
            .unwrap_or(Decimal::ONE)
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price.unwrap_or(Decimal::ZERO)
    }

    fn cost(&self) -> Decimal {
        self.cost.unwrap_or(Decimal::ZERO)
    }

    fn is_taxable(&self) -> bool {
        self.taxable != Some(false)
    }
}

impl ItemInput {
    /// Materialize as the row stored at position `sort_order`
    pub fn into_item(self, estimate_id: &EntityId, sort_order: i64) -> ShopResult<EstimateItem> {
        let quantity = PricedLine::quantity(&self);
        let unit_price = PricedLine::unit_price(&self);
        Ok(EstimateItem {
            id: EntityId::new(EntityPrefix::Item),
            estimate_id: estimate_id.clone(),
            item_type: self.item_type,
            description: self.description.clone(),
            cost: PricedLine::cost(&self),
            taxable: self.is_taxable(),
            amount: line_amount(quantity, unit_price)?,
            quantity,
            unit_price,
            part_number: self.part_number,
            brand: self.brand,
            supplier: self.supplier,
            hours: self.hours,
            labor_rate: self.labor_rate,
            notes: self.notes,
            sort_order,
        })
    }
}

impl From<&EstimateItem> for ItemInput {
    fn from(item: &EstimateItem) -> Self {
        Self {
            item_type: item.item_type,
            description: item.description.clone(),
            part_number: item.part_number.clone(),
            brand: item.brand.clone(),
            supplier: item.supplier.clone(),
            quantity: Some(item.quantity),
            unit_price: Some(item.unit_price),
            cost: Some(item.cost),
            taxable: Some(item.taxable),
            hours: item.hours,
            labor_rate: item.labor_rate,
            notes: item.notes.clone(),
        }
    }
}

/// Request to open a new estimate
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEstimate {
    pub customer_id: Option<EntityId>,
    pub vehicle_id: Option<EntityId>,
    pub description: Option<String>,
    pub diagnostic_notes: Option<String>,
    /// Falls back to shop settings, then the built-in default
    pub tax_rate: Option<Decimal>,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
}

/// Partial update; `None` leaves a field alone except `discount`, which
/// resets to zero when omitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatePatch {
    /// Replaces every existing item when present
    pub items: Option<Vec<ItemInput>>,
    pub status: Option<EstimateStatus>,
    pub tax_rate: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub description: Option<String>,
    pub diagnostic_notes: Option<String>,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
}

/// Status selector for estimate lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateStatusFilter {
    Exact(EstimateStatus),
    /// DRAFT or SENT
    Pending,
    /// APPROVED or IN_PROGRESS
    Active,
}

impl EstimateStatusFilter {
    pub fn statuses(&self) -> Vec<EstimateStatus> {
        match self {
            EstimateStatusFilter::Exact(s) => vec![*s],
            EstimateStatusFilter::Pending => vec![EstimateStatus::Draft, EstimateStatus::Sent],
            EstimateStatusFilter::Active => {
                vec![EstimateStatus::Approved, EstimateStatus::InProgress]
            }
        }
    }
}

impl std::str::FromStr for EstimateStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EstimateStatusFilter::Pending),
            "active" => Ok(EstimateStatusFilter::Active),
            _ => s.parse().map(EstimateStatusFilter::Exact),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EstimateFilter {
    pub status: Option<EstimateStatusFilter>,
    pub customer_id: Option<EntityId>,
    pub vehicle_id: Option<EntityId>,
}

/// Work order identification carried on estimate list rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderRef {
    pub id: EntityId,
    pub work_order_number: String,
    pub status: WorkOrderStatus,
}

/// List row with display context
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSummary {
    #[serde(flatten)]
    pub estimate: Estimate,
    pub customer_name: String,
    pub vehicle_label: String,
    pub company_name: String,
    pub item_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_order: Option<WorkOrderRef>,
}

/// Estimate with everything it owns
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateDetail {
    #[serde(flatten)]
    pub estimate: Estimate,
    pub customer: Customer,
    pub vehicle: Vehicle,
    pub items: Vec<EstimateItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_order: Option<WorkOrderTasks>,
}

impl EstimateDetail {
    /// Owner-only cost and margin of the current items
    pub fn margin(&self) -> ShopResult<Margin> {
        Margin::from_parts(self.estimate.subtotal, pricing::cost(&self.items)?)
    }
}
