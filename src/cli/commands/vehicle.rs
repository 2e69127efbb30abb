//! `hunter vehicle` - vehicles of customers

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, format_date, format_money, format_opt, parse_id, parse_id_opt};
use crate::cli::output::{emit_list, emit_one, field, heading};
use crate::cli::{GlobalOpts, Session};
use crate::core::config::Config;
use crate::engine::vehicle;
use crate::entities::vehicle::{Vehicle, VehicleDetail, VehicleInput};

#[derive(Subcommand, Debug)]
pub enum VehicleCommands {
    /// List vehicles, newest first
    List {
        /// Only vehicles of this customer
        #[arg(long)]
        customer: Option<String>,

        /// Match make, model, VIN or plate (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show a vehicle with its owner and estimates
    Show {
        id: String,
    },

    /// Register a vehicle for a customer
    New {
        #[arg(long)]
        customer: String,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        make: String,

        #[arg(long)]
        model: String,

        #[command(flatten)]
        extra: VehicleExtra,
    },

    /// Change a vehicle; omitted flags keep their current value
    Edit {
        id: String,

        /// Move the vehicle to another customer
        #[arg(long)]
        customer: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        make: Option<String>,

        #[arg(long)]
        model: Option<String>,

        #[command(flatten)]
        extra: VehicleExtra,
    },

    /// Delete a vehicle and its estimates
    Delete {
        id: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct VehicleExtra {
    #[arg(long)]
    pub trim: Option<String>,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub vin: Option<String>,

    #[arg(long)]
    pub license_plate: Option<String>,

    #[arg(long)]
    pub mileage: Option<i64>,

    #[arg(long)]
    pub engine_type: Option<String>,

    #[arg(long)]
    pub transmission: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl VehicleExtra {
    fn over(self, base: Option<&Vehicle>, mut input: VehicleInput) -> VehicleInput {
        let keep = |flag: Option<String>, pick: fn(&Vehicle) -> &Option<String>| {
            flag.or_else(|| base.and_then(|v| pick(v).clone()))
        };
        input.trim = keep(self.trim, |v| &v.trim);
        input.color = keep(self.color, |v| &v.color);
        input.vin = keep(self.vin, |v| &v.vin);
        input.license_plate = keep(self.license_plate, |v| &v.license_plate);
        input.engine_type = keep(self.engine_type, |v| &v.engine_type);
        input.transmission = keep(self.transmission, |v| &v.transmission);
        input.notes = keep(self.notes, |v| &v.notes);
        input.mileage = self.mileage.or_else(|| base.and_then(|v| v.mileage));
        input
    }
}

pub fn run(cmd: VehicleCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut session = Session::open(global, config)?;
    match cmd {
        VehicleCommands::List { customer, search } => {
            let customer_id = parse_id_opt(customer.as_deref())?;
            let vehicles = vehicle::list(
                &session.store,
                &session.ctx,
                customer_id.as_ref(),
                search.as_deref(),
            )?;
            emit_list(
                &vehicles,
                global.format,
                &["ID", "VEHICLE", "PLATE", "VIN", "OWNER", "ESTIMATES"],
                "No vehicles found.",
                |v| {
                    vec![
                        v.vehicle.id.to_string(),
                        v.vehicle.label(),
                        format_opt(v.vehicle.license_plate.as_deref()),
                        format_opt(v.vehicle.vin.as_deref()),
                        v.customer_name.clone(),
                        v.estimate_count.to_string(),
                    ]
                },
                |v| v.vehicle.id.to_string(),
            )
        }
        VehicleCommands::Show { id } => {
            let detail = vehicle::get(&session.store, &session.ctx, &parse_id(&id)?)?;
            emit_one(&detail, global.format, &id, || print_vehicle(&detail))
        }
        VehicleCommands::New {
            customer,
            year,
            make,
            model,
            extra,
        } => {
            let input = extra.over(
                None,
                VehicleInput {
                    customer_id: Some(parse_id(&customer)?),
                    year: Some(year),
                    make,
                    model,
                    ..VehicleInput::default()
                },
            );
            let created = vehicle::create(&mut session.store, &session.ctx, input)?;
            let id = created.id.to_string();
            emit_one(&created, global.format, &id, || {
                println!(
                    "{} Created vehicle {} ({})",
                    style("✓").green(),
                    style(created.label()).cyan(),
                    created.id
                );
            })
        }
        VehicleCommands::Edit {
            id,
            customer,
            year,
            make,
            model,
            extra,
        } => {
            let vehicle_id = parse_id(&id)?;
            let current = vehicle::get(&session.store, &session.ctx, &vehicle_id)?.vehicle;
            let input = extra.over(
                Some(&current),
                VehicleInput {
                    customer_id: Some(match customer {
                        Some(c) => parse_id(&c)?,
                        None => current.customer_id.clone(),
                    }),
                    year: Some(year.unwrap_or(current.year)),
                    make: make.unwrap_or_else(|| current.make.clone()),
                    model: model.unwrap_or_else(|| current.model.clone()),
                    ..VehicleInput::default()
                },
            );
            let updated = vehicle::update(&mut session.store, &session.ctx, &vehicle_id, input)?;
            emit_one(&updated, global.format, &id, || {
                println!("{} Updated vehicle {}", style("✓").green(), style(updated.label()).cyan());
            })
        }
        VehicleCommands::Delete { id, yes } => {
            let vehicle_id = parse_id(&id)?;
            let current = vehicle::get(&session.store, &session.ctx, &vehicle_id)?;
            let prompt = format!(
                "delete {} with {} estimate(s)",
                current.vehicle.label(),
                current.estimates.len()
            );
            if !confirm(&prompt, yes)? {
                return Ok(());
            }
            vehicle::delete(&mut session.store, &session.ctx, &vehicle_id)?;
            println!("{} Deleted vehicle {}", style("✓").green(), id);
            Ok(())
        }
    }
}

fn print_vehicle(detail: &VehicleDetail) {
    let v = &detail.vehicle;
    heading(&v.label());
    field("ID", &v.id);
    field("Owner", format!("{} ({})", detail.customer.full_name(), detail.customer.phone));
    if let Some(trim) = &v.trim {
        field("Trim", trim);
    }
    field("Color", format_opt(v.color.as_deref()));
    field("VIN", format_opt(v.vin.as_deref()));
    field("Plate", format_opt(v.license_plate.as_deref()));
    if let Some(miles) = v.mileage {
        field("Mileage", miles);
    }
    if let Some(engine) = &v.engine_type {
        field("Engine", engine);
    }
    if let Some(transmission) = &v.transmission {
        field("Transmission", transmission);
    }
    if let Some(notes) = &v.notes {
        field("Notes", notes);
    }
    field("Added", format_date(&v.created));

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
