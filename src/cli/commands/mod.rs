//! CLI command implementations

pub mod company;
pub mod completions;
pub mod customer;
pub mod estimate;
pub mod init;
pub mod report;
pub mod settings;
pub mod user;
pub mod vehicle;
pub mod wo;
