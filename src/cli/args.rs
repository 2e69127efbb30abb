//! Top-level argument definitions

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    company::CompanyCommands, customer::CustomerCommands, estimate::EstimateCommands,
    init::InitArgs, report::ReportArgs, settings::SettingsCommands, user::UserCommands,
    vehicle::VehicleCommands, wo::WoCommands,
};

#[derive(Parser, Debug)]
#[command(name = "hunter")]
#[command(author, version, about = "Auto shop desk: customers, vehicles, estimates and work orders")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Database file (overrides HUNTER_DB and the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Email of the user to act as
    #[arg(long = "as", global = true, env = "HUNTER_USER", value_name = "EMAIL")]
    pub as_user: Option<String>,

    /// Password of that user
    #[arg(long, global = true, env = "HUNTER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Work inside another company (super admins only; ignored otherwise)
    #[arg(long, global = true, value_name = "COMPANY_ID")]
    pub company: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Table for lists, details view for single records
    #[default]
    Auto,
    Table,
    Json,
    Yaml,
    Csv,
    /// IDs only, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and the first super admin
    Init(InitArgs),

    /// Tenant administration (super admin)
    #[command(subcommand)]
    Company(CompanyCommands),

    /// User administration (super admin)
    #[command(subcommand)]
    User(UserCommands),

    #[command(subcommand)]
    Customer(CustomerCommands),

    #[command(subcommand)]
    Vehicle(VehicleCommands),

    #[command(subcommand)]
    Estimate(EstimateCommands),

    /// Work orders
    #[command(subcommand)]
    Wo(WoCommands),

    /// Shop settings of the current company
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Business summary
    Report(ReportArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
