//! Shop settings, one row per company

use rusqlite::Connection;
use tracing::{debug, info};

use crate::core::error::ShopResult;
use crate::core::identity::EntityId;
use crate::core::tenant::{RequestContext, Role};
use crate::engine::company::ensure_company;
use crate::entities::settings::{SettingsInput, ShopSettings};
use crate::store::records;
use crate::store::Store;

/// Settings row for `company_id`, inserting defaults on first access
pub(crate) fn load_or_init(conn: &Connection, company_id: &EntityId) -> ShopResult<ShopSettings> {
    if let Some(settings) = records::settings_for(conn, company_id)? {
        return Ok(settings);
    }
    ensure_company(conn, company_id)?;
    let settings = ShopSettings::defaults_for(company_id, None);
    records::upsert_settings(conn, &settings)?;
    debug!(company = %company_id, "created default shop settings");
    Ok(settings)
}

/// Settings of the request's company
pub fn get(store: &mut Store, ctx: &RequestContext) -> ShopResult<ShopSettings> {
    let tx = store.transaction()?;
    let settings = load_or_init(&tx, &ctx.company_id())?;
    tx.commit()?;
    Ok(settings)
}

/// Replace the settings of the request's company (admin)
pub fn update(
    store: &mut Store,
    ctx: &RequestContext,
    input: SettingsInput,
) -> ShopResult<ShopSettings> {
    ctx.require_role(Role::Admin)?;
    let tx = store.transaction()?;
    let mut settings = load_or_init(&tx, &ctx.company_id())?;
    input.apply(&mut settings);
    records::upsert_settings(&tx, &settings)?;
    tx.commit()?;
    info!(company = %settings.company_id, tax_rate = %settings.tax_rate, "updated shop settings");
    Ok(settings)
}
