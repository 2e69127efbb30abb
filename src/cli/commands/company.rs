//! `hunter company` - tenant administration

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, format_date, format_opt, parse_id};
use crate::cli::output::{emit_list, emit_one, field, heading};
use crate::cli::{GlobalOpts, Session};
use crate::core::config::Config;
use crate::engine::company;
use crate::entities::company::{CompanyDetail, CompanyPatch, NewCompany};

#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    /// List every company
    List,

    /// Show a company with its users
    Show {
        id: String,
    },

    /// Create a company and its first admin
    New(NewCompanyArgs),

    /// Rename, re-slug or (de)activate a company
    Edit(EditCompanyArgs),

    /// Delete a company and everything it owns
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct NewCompanyArgs {
    #[arg(long)]
    pub name: String,

    /// Lowercase letters, digits and dashes
    #[arg(long)]
    pub slug: String,

    #[arg(long)]
    pub admin_email: String,

    #[arg(long, env = "HUNTER_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,

    /// Defaults to the company name
    #[arg(long)]
    pub admin_name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditCompanyArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub slug: Option<String>,

    /// Allow logins again
    #[arg(long, conflicts_with = "deactivate")]
    pub activate: bool,

    /// Block every login of the company
    #[arg(long)]
    pub deactivate: bool,
}

pub fn run(cmd: CompanyCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut session = Session::open(global, config)?;
    match cmd {
        CompanyCommands::List => {
            let companies = company::list(&session.store, &session.ctx)?;
            emit_list(
                &companies,
                global.format,
                &["ID", "NAME", "SLUG", "ACTIVE", "USERS", "ESTIMATES", "CREATED"],
                "No companies found.",
                |c| {
                    vec![
                        c.company.id.to_string(),
                        c.company.name.clone(),
                        c.company.slug.clone(),
                        if c.company.is_active { "yes" } else { "no" }.to_string(),
                        c.counts.users.to_string(),
                        c.counts.estimates.to_string(),
                        format_date(&c.company.created),
                    ]
                },
                |c| c.company.id.to_string(),
            )
        }
        CompanyCommands::Show { id } => {
            let detail = company::get(&session.store, &session.ctx, &parse_id(&id)?)?;
            emit_one(&detail, global.format, &id, || print_company(&detail))
        }
        CompanyCommands::New(args) => {
            let detail = company::create(
                &mut session.store,
                &session.ctx,
                NewCompany {
                    name: args.name,
                    slug: args.slug,
                    admin_name: args.admin_name,
                    admin_email: args.admin_email,
                    admin_password: args.admin_password,
                },
            )?;
            let id = detail.company.id.to_string();
            emit_one(&detail, global.format, &id, || {
                println!(
                    "{} Created company {} ({})",
                    style("✓").green(),
                    style(&detail.company.name).cyan(),
                    detail.company.id
                );
            })
        }
        CompanyCommands::Edit(args) => {
            let is_active = match (args.activate, args.deactivate) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let updated = company::update(
                &mut session.store,
                &session.ctx,
                &parse_id(&args.id)?,
                CompanyPatch {
                    name: args.name,
                    slug: args.slug,
                    is_active,
                },
            )?;
            emit_one(&updated, global.format, &args.id, || {
                println!("{} Updated company {}", style("✓").green(), style(&updated.name).cyan());
            })
        }
        CompanyCommands::Delete { id, yes } => {
            let company_id = parse_id(&id)?;
            if !confirm(&format!("delete company {} and all of its data", id), yes)? {
                return Ok(());
            }
            company::delete(&mut session.store, &session.ctx, &company_id)?;
            println!("{} Deleted company {}", style("✓").green(), id);
            Ok(())
        }
    }
}

fn print_company(detail: &CompanyDetail) {
    heading(&detail.company.name);
    field("ID", &detail.company.id);
    field("Slug", &detail.company.slug);
    field("Shop name", format_opt(detail.shop_name.as_deref()));
    field("Active", if detail.company.is_active { "yes" } else { "no" });
    field("Created", format_date(&detail.company.created));
    field(
        "Counts",
        format!(
            "{} customers, {} vehicles, {} estimates, {} work orders",
            detail.counts.customers,
            detail.counts.vehicles,
            detail.counts.estimates,
            detail.counts.work_orders
        ),
    );
    println!();
    println!("{}", style(format!("Users ({})", detail.users.len())).bold());
    for user in &detail.users {
        let marker = if user.is_active { "•" } else { "x" };
        println!(
            "  {} {:<24} {:<28} {}",
            marker,
            user.name,
            user.email,
            style(user.role).yellow()
        );
    }
}
