//! `hunter customer` - customer records

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, format_date, format_money, format_opt, parse_id, truncate_str};
use crate::cli::output::{emit_list, emit_one, field, heading};
use crate::cli::{GlobalOpts, Session};
use crate::core::config::Config;
use crate::engine::customer;
use crate::entities::customer::{Customer, CustomerDetail, CustomerInput};

#[derive(Subcommand, Debug)]
pub enum CustomerCommands {
    /// List customers, newest first
    List {
        /// Match name, email or phone (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show a customer with vehicles and estimates
    Show {
        id: String,
    },

    /// Register a new customer
    New(CustomerArgs),

    /// Change a customer; omitted flags keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Delete a customer with their vehicles and estimates
    Delete {
        id: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct CustomerArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub phone: String,

    #[command(flatten)]
    pub extra: CustomerExtra,
}

#[derive(clap::Args, Debug, Default)]
pub struct CustomerExtra {
    #[arg(long)]
    pub email: Option<String>,

    /// Second phone number
    #[arg(long)]
    pub phone2: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    #[arg(long)]
    pub zip_code: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CustomerFields {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[command(flatten)]
    pub extra: CustomerExtra,
}

impl CustomerFields {
    /// Full input: the flags given over the current record
    fn over(self, current: &Customer) -> CustomerInput {
        let keep = |flag: Option<String>, value: &Option<String>| flag.or_else(|| value.clone());
        CustomerInput {
            first_name: self.first_name.unwrap_or_else(|| current.first_name.clone()),
            last_name: self.last_name.unwrap_or_else(|| current.last_name.clone()),
            phone: self.phone.unwrap_or_else(|| current.phone.clone()),
            email: keep(self.extra.email, &current.email),
            phone2: keep(self.extra.phone2, &current.phone2),
            address: keep(self.extra.address, &current.address),
            city: keep(self.extra.city, &current.city),
            state: keep(self.extra.state, &current.state),
            zip_code: keep(self.extra.zip_code, &current.zip_code),
            notes: keep(self.extra.notes, &current.notes),
        }
    }
}

pub fn run(cmd: CustomerCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut session = Session::open(global, config)?;
    match cmd {
        CustomerCommands::List { search } => {
            let customers = customer::list(&session.store, &session.ctx, search.as_deref())?;
            emit_list(
                &customers,
                global.format,
                &["ID", "NAME", "PHONE", "EMAIL", "VEHICLES", "ESTIMATES"],
                "No customers found.",
                |c| {
                    vec![
                        c.customer.id.to_string(),
                        truncate_str(&c.customer.full_name(), 30),
                        c.customer.phone.clone(),
                        format_opt(c.customer.email.as_deref()),
                        c.vehicle_count.to_string(),
                        c.estimate_count.to_string(),
                    ]
                },
                |c| c.customer.id.to_string(),
            )
        }
        CustomerCommands::Show { id } => {
            let detail = customer::get(&session.store, &session.ctx, &parse_id(&id)?)?;
            emit_one(&detail, global.format, &id, || print_customer(&detail))
        }
        CustomerCommands::New(args) => {
            let input = CustomerInput {
                first_name: args.first_name,
                last_name: args.last_name,
                phone: args.phone,
                email: args.extra.email,
                phone2: args.extra.phone2,
                address: args.extra.address,
                city: args.extra.city,
                state: args.extra.state,
                zip_code: args.extra.zip_code,
                notes: args.extra.notes,
            };
            let created = customer::create(&mut session.store, &session.ctx, input)?;
            let id = created.id.to_string();
            emit_one(&created, global.format, &id, || {
                println!(
                    "{} Created customer {} ({})",
                    style("✓").green(),
                    style(created.full_name()).cyan(),
                    created.id
                );
            })
        }
        CustomerCommands::Edit { id, fields } => {
            let customer_id = parse_id(&id)?;
            let current = customer::get(&session.store, &session.ctx, &customer_id)?;
            let input = fields.over(&current.customer);
            let updated = customer::update(&mut session.store, &session.ctx, &customer_id, input)?;
            emit_one(&updated, global.format, &id, || {
                println!(
                    "{} Updated customer {}",
                    style("✓").green(),
                    style(updated.full_name()).cyan()
                );
            })
        }
        CustomerCommands::Delete { id, yes } => {
            let customer_id = parse_id(&id)?;
            let current = customer::get(&session.store, &session.ctx, &customer_id)?;
            let prompt = format!(
                "delete {} with {} vehicle(s) and {} estimate(s)",
                current.customer.full_name(),
                current.vehicles.len(),
                current.estimates.len()
            );
            if !confirm(&prompt, yes)? {
                return Ok(());
            }
            customer::delete(&mut session.store, &session.ctx, &customer_id)?;
            println!("{} Deleted customer {}", style("✓").green(), id);
            Ok(())
        }
    }
}

fn print_customer(detail: &CustomerDetail) {
    let c = &detail.customer;
    heading(&c.full_name());
    field("ID", &c.id);
    field("Phone", &c.phone);
    field("Email", format_opt(c.email.as_deref()));
    if let Some(phone) = &c.phone2 {
        field("Phone 2", phone);
    }
    let place: Vec<&str> = [c.address.as_deref(), c.city.as_deref(), c.state.as_deref(), c.zip_code.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !place.is_empty() {
        field("Address", place.join(", "));
    }
    if let Some(notes) = &c.notes {
        field("Notes", notes);
    }
    field("Since", format_date(&c.created));

    println!();
    println!("{}", style(format!("Vehicles ({})", detail.vehicles.len())).bold());
    for v in &detail.vehicles {
        println!(
            "  • {:<28} {:<10} {}",
            v.label(),
            format_opt(v.license_plate.as_deref()),
            style(&v.id).dim()
        );
    }

    println!();
    println!("{}", style(format!("Estimates ({})", detail.estimates.len())).bold());
    for e in &detail.estimates {
        println!(
            "  • {:<14} {:<12} {:>12}  {}",
            e.estimate_number,
            e.status.as_str(),
            format_money(e.total),
            format_date(&e.created)
        );
    }
}
