//! `hunter user` - logins of a company

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_date, parse_id};
use crate::cli::output::{emit_list, emit_one};
use crate::cli::{GlobalOpts, Session};
use crate::core::config::Config;
use crate::core::tenant::Role;
use crate::engine::company;
use crate::entities::company::NewUser;

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List the users of a company
    List {
        company_id: String,
    },

    /// Add a login to a company
    Add(AddUserArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddUserArgs {
    pub company_id: String,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long = "user-password", env = "HUNTER_NEW_USER_PASSWORD", hide_env_values = true)]
    pub user_password: String,

    /// SUPER_ADMIN, ADMIN, MANAGER or TECH
    #[arg(long, default_value = "ADMIN")]
    pub role: Role,
}

pub fn run(cmd: UserCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut session = Session::open(global, config)?;
    match cmd {
        UserCommands::List { company_id } => {
            let detail = company::get(&session.store, &session.ctx, &parse_id(&company_id)?)?;
            emit_list(
                &detail.users,
                global.format,
                &["ID", "NAME", "EMAIL", "ROLE", "ACTIVE", "CREATED"],
                "No users found.",
                |u| {
                    vec![
                        u.id.to_string(),
                        u.name.clone(),
                        u.email.clone(),
                        u.role.to_string(),
                        if u.is_active { "yes" } else { "no" }.to_string(),
                        format_date(&u.created),
                    ]
                },
                |u| u.id.to_string(),
            )
        }
        UserCommands::Add(args) => {
            let user = company::add_user(
                &mut session.store,
                &session.ctx,
                &parse_id(&args.company_id)?,
                NewUser {
                    name: args.name,
                    email: args.email,
                    password: args.user_password,
                    role: Some(args.role),
                },
            )?;
            let id = user.id.to_string();
            emit_one(&user, global.format, &id, || {
                println!(
                    "{} Added {} as {}",
                    style("✓").green(),
                    style(&user.email).cyan(),
                    style(user.role).yellow()
                );
            })
        }
    }
}
