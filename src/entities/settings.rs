//! Per-company shop settings

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::pricing::{DEFAULT_LABOR_RATE, DEFAULT_TAX_RATE};

/// Shop letterhead and billing defaults; one row per company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSettings {
    pub id: EntityId,
    pub company_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub tax_rate: Decimal,
    pub labor_rate: Decimal,
}

impl ShopSettings {
    pub fn defaults_for(company_id: &EntityId, shop_name: Option<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Shop),
            company_id: company_id.clone(),
            shop_name,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            phone: None,
            email: None,
            website: None,
            tax_rate: DEFAULT_TAX_RATE,
            labor_rate: DEFAULT_LABOR_RATE,
        }
    }
}

/// Full replacement of the settings row; absent rates reset to defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    pub shop_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub labor_rate: Option<Decimal>,
}

impl SettingsInput {
    pub fn apply(self, settings: &mut ShopSettings) {
        settings.shop_name = self.shop_name;
        settings.address = self.address;
        settings.city = self.city;
        settings.state = self.state;
        settings.zip_code = self.zip_code;
        settings.phone = self.phone;
        settings.email = self.email;
        settings.website = self.website;
        settings.tax_rate = self.tax_rate.unwrap_or(DEFAULT_TAX_RATE);
        settings.labor_rate = self.labor_rate.unwrap_or(DEFAULT_LABOR_RATE);
    }
}
