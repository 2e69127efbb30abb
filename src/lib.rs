//! Hunter: multi-tenant desk for auto repair shops
//!
//! Customers, their vehicles, priced estimates and the work orders that
//! follow approval, kept in one SQLite file and partitioned by company.

pub mod cli;
pub mod core;
pub mod engine;
pub mod entities;
pub mod store;
