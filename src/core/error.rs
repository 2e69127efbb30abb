//! Error taxonomy shared by every core entry point

use miette::Diagnostic;
use thiserror::Error;

use crate::core::tenant::Role;

#[derive(Debug, Error, Diagnostic)]
pub enum ShopError {
    #[error("Not authenticated")]
    #[diagnostic(
        code(hunter::not_authenticated),
        help("pass --as <email> and --password, or set HUNTER_USER and HUNTER_PASSWORD")
    )]
    NotAuthenticated,

    #[error("Forbidden: this operation requires role {required}")]
    #[diagnostic(code(hunter::forbidden))]
    Forbidden { required: Role },

    /// Missing rows and other tenants' rows alike
    #[error("{entity} not found: {id}")]
    #[diagnostic(code(hunter::not_found))]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    #[diagnostic(code(hunter::validation))]
    ValidationFailed(String),

    #[error("Conflict: {0}")]
    #[diagnostic(code(hunter::conflict))]
    Conflict(String),

    #[error("Database error: {0}")]
    #[diagnostic(code(hunter::database))]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt stored value: {0}")]
    #[diagnostic(code(hunter::corrupt))]
    Corrupt(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(hunter::config))]
    Config(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(hunter::io))]
    Io(#[from] std::io::Error),
}

impl ShopError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ShopError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ShopError::ValidationFailed(message.into())
    }
}

pub type ShopResult<T> = Result<T, ShopError>;
