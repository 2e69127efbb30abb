//! `hunter init` - create the database and the first super admin

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::session::open_store;
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::engine::company;
use crate::entities::company::NewCompany;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Name of the operator company
    #[arg(long, default_value = "System")]
    pub name: String,

    /// URL-safe company identifier
    #[arg(long, default_value = "system")]
    pub slug: String,

    /// Super admin email
    #[arg(long)]
    pub email: String,

    /// Super admin display name (defaults to the company name)
    #[arg(long)]
    pub admin_name: Option<String>,

    /// Super admin password (prompted when omitted)
    #[arg(long = "admin-password", env = "HUNTER_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

pub fn run(args: InitArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut store = open_store(config)?;

    let password = match args.admin_password {
        Some(p) => p,
        None => dialoguer::Password::new()
            .with_prompt("Super admin password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()
            .into_diagnostic()?,
    };

    let created = company::bootstrap(
        &mut store,
        NewCompany {
            name: args.name,
            slug: args.slug,
            admin_name: args.admin_name,
            admin_email: args.email,
            admin_password: password,
        },
    )?;

    match created {
        Some(user) => {
            if global.format == crate::cli::OutputFormat::Id {
                println!("{}", user.id);
                return Ok(());
            }
            println!(
                "{} Initialized {}",
                style("✓").green(),
                style(config.database.display()).cyan()
            );
            println!("   Super admin: {} ({})", style(&user.email).yellow(), user.id);
        }
        None => {
            println!(
                "{} {} already has users; nothing to do",
                style("•").dim(),
                config.database.display()
            );
        }
    }
    Ok(())
}
