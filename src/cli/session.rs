//! Per-invocation state: configuration, the open store and the caller

use miette::Result;
use tracing::debug;

use crate::cli::helpers::parse_id_opt;
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::error::ShopError;
use crate::core::tenant::RequestContext;
use crate::engine::company;
use crate::store::Store;

/// Configuration with the command-line overrides applied
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(db) = &global.db {
        config.database = db.clone();
    }
    Ok(config)
}

/// Log filter from `-v` flags, falling back to the configured level
pub fn log_filter(global: &GlobalOpts, config: &Config) -> String {
    match global.verbose {
        0 => config.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

pub fn open_store(config: &Config) -> Result<Store> {
    debug!(path = %config.database.display(), "opening store");
    Ok(Store::open(&config.database)?)
}

/// An authenticated caller with an open store
pub struct Session {
    pub store: Store,
    pub ctx: RequestContext,
}

impl Session {
    pub fn open(global: &GlobalOpts, config: &Config) -> Result<Self> {
        let store = open_store(config)?;
        let (email, password) = match (&global.as_user, &global.password) {
            (Some(email), Some(password)) => (email, password),
            _ => return Err(ShopError::NotAuthenticated.into()),
        };
        let identity = company::authenticate(store.conn(), email, password)?;
        let company_override = parse_id_opt(global.company.as_deref())?;
        debug!(user = %identity.user_id, role = %identity.role, "authenticated");
        let ctx = RequestContext::new(identity).with_override(company_override);
        Ok(Self { store, ctx })
    }
}
