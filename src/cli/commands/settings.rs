//! `hunter settings` - shop profile and rates

use clap::Subcommand;
use console::style;
use miette::Result;
use rust_decimal::Decimal;

use crate::cli::helpers::{format_money, format_opt};
use crate::cli::output::{emit_one, field, heading};
use crate::cli::{GlobalOpts, Session};
use crate::core::config::Config;
use crate::engine::settings;
use crate::entities::settings::{SettingsInput, ShopSettings};

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the shop settings
    Show,

    /// Change settings; omitted flags keep their current value
    Set(SettingsArgs),
}

#[derive(clap::Args, Debug)]
pub struct SettingsArgs {
    #[arg(long)]
    pub shop_name: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zip_code: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    /// Percent applied to taxable lines of new estimates
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Hourly rate used to price labor given in hours
    #[arg(long)]
    pub labor_rate: Option<Decimal>,
}

impl SettingsArgs {
    /// Full replacement: the flags given over the current settings
    fn over(self, current: &ShopSettings) -> SettingsInput {
        let keep = |flag: Option<String>, value: &Option<String>| flag.or_else(|| value.clone());
        SettingsInput {
            shop_name: keep(self.shop_name, &current.shop_name),
            address: keep(self.address, &current.address),
            city: keep(self.city, &current.city),
            state: keep(self.state, &current.state),
            zip_code: keep(self.zip_code, &current.zip_code),
            phone: keep(self.phone, &current.phone),
            email: keep(self.email, &current.email),
            website: keep(self.website, &current.website),
            tax_rate: Some(self.tax_rate.unwrap_or(current.tax_rate)),
            labor_rate: Some(self.labor_rate.unwrap_or(current.labor_rate)),
        }
    }
}

pub fn run(cmd: SettingsCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut session = Session::open(global, config)?;
    let current = settings::get(&mut session.store, &session.ctx)?;
    match cmd {
        SettingsCommands::Show => {
            let id = current.id.to_string();
            emit_one(&current, global.format, &id, || print_settings(&current))
        }
        SettingsCommands::Set(args) => {
            let input = args.over(&current);
            let updated = settings::update(&mut session.store, &session.ctx, input)?;
            let id = updated.id.to_string();
            emit_one(&updated, global.format, &id, || {
                println!("{} Updated shop settings", style("✓").green());
                print_settings(&updated);
            })
        }
    }
}

fn print_settings(s: &ShopSettings) {
    heading(s.shop_name.as_deref().unwrap_or("Shop settings"));
    field("Company", &s.company_id);
    field("Address", format_opt(s.address.as_deref()));
    field("City", format_opt(s.city.as_deref()));
    field("State", format_opt(s.state.as_deref()));
    field("ZIP", format_opt(s.zip_code.as_deref()));
    field("Phone", format_opt(s.phone.as_deref()));
    field("Email", format_opt(s.email.as_deref()));
    field("Website", format_opt(s.website.as_deref()));
    field("Tax rate", format!("{}%", s.tax_rate.normalize()));
    field("Labor rate", format!("{}/h", format_money(s.labor_rate)));
}
