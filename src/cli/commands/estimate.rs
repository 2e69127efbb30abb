//! `hunter estimate` - quotes, their items and approval

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use miette::Result;
use rust_decimal::Decimal;

use crate::cli::filters::EstimateStatusArg;
use crate::cli::helpers::{
    confirm, format_date, format_money, format_opt, parse_id, parse_id_opt, read_document,
    truncate_str,
};
use crate::cli::output::{emit_list, emit_one, field, heading, ListTable};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::config::Config;
use crate::core::error::ShopResult;
use crate::core::pricing::{labor_unit_price, Margin};
use crate::core::workflow::EstimateStatus;
use crate::engine::{estimate, settings};
use crate::entities::estimate::{
    EstimateDetail, EstimateFilter, EstimatePatch, ItemInput, ItemType, NewEstimate,
};

#[derive(Subcommand, Debug)]
pub enum EstimateCommands {
    /// List estimates, newest first
    List {
        #[arg(long, short = 's', default_value = "all")]
        status: EstimateStatusArg,

        #[arg(long)]
        customer: Option<String>,

        #[arg(long)]
        vehicle: Option<String>,
    },

    /// Show an estimate with its items and totals
    Show {
        id: String,

        /// Include internal cost and margin
        #[arg(long)]
        margin: bool,
    },

    /// Open a DRAFT estimate for a customer's vehicle
    New {
        #[arg(long)]
        customer: String,

        #[arg(long)]
        vehicle: String,

        /// Tax rate in percent (defaults to the shop setting)
        #[arg(long)]
        tax_rate: Option<Decimal>,

        #[command(flatten)]
        notes: EstimateNotes,
    },

    /// Replace items, change rates, notes or status
    Edit {
        id: String,

        /// YAML list of items replacing the current ones (`-` for stdin)
        #[arg(long, value_name = "FILE")]
        items: Option<PathBuf>,

        /// DRAFT, SENT, APPROVED, REJECTED, IN_PROGRESS, COMPLETED or CANCELLED
        #[arg(long)]
        status: Option<EstimateStatus>,

        #[arg(long)]
        tax_rate: Option<Decimal>,

        /// Flat discount off the total (keeps the current one when omitted)
        #[arg(long, allow_hyphen_values = true)]
        discount: Option<Decimal>,

        #[command(flatten)]
        notes: EstimateNotes,
    },

    /// Move an estimate to another status
    Status {
        id: String,
        status: EstimateStatus,
    },

    /// Delete an estimate and its work order
    Delete {
        id: String,
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct EstimateNotes {
    /// Work requested, shown to the customer
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub diagnostic_notes: Option<String>,

    #[arg(long)]
    pub customer_notes: Option<String>,

    /// Never shown to the customer
    #[arg(long)]
    pub internal_notes: Option<String>,
}

/// Price labor lines given only as hours at the line's rate or `shop_rate`
pub fn fill_labor_prices(items: &mut [ItemInput], shop_rate: Decimal) -> ShopResult<()> {
    for item in items.iter_mut() {
        if item.item_type != ItemType::Labor || item.unit_price.is_some() {
            continue;
        }
        if let Some(hours) = item.hours {
            let rate = *item.labor_rate.get_or_insert(shop_rate);
            item.unit_price = Some(labor_unit_price(hours, rate)?);
        }
    }
    Ok(())
}

pub fn run(cmd: EstimateCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut session = Session::open(global, config)?;
    match cmd {
        EstimateCommands::List {
            status,
            customer,
            vehicle,
        } => {
            let filter = EstimateFilter {
                status: status.to_filter(),
                customer_id: parse_id_opt(customer.as_deref())?,
                vehicle_id: parse_id_opt(vehicle.as_deref())?,
            };
            let estimates = estimate::list(&session.store, &session.ctx, &filter)?;
            emit_list(
                &estimates,
                global.format,
                &["ID", "NUMBER", "STATUS", "CUSTOMER", "VEHICLE", "ITEMS", "TOTAL", "WO", "CREATED"],
                "No estimates found.",
                |e| {
                    vec![
                        e.estimate.id.to_string(),
                        e.estimate.estimate_number.clone(),
                        e.estimate.status.to_string(),
                        truncate_str(&e.customer_name, 24),
                        truncate_str(&e.vehicle_label, 24),
                        e.item_count.to_string(),
                        format_money(e.estimate.total),
                        e.work_order
                            .as_ref()
                            .map(|w| w.work_order_number.clone())
                            .unwrap_or_else(|| "-".to_string()),
                        format_date(&e.estimate.created),
                    ]
                },
                |e| e.estimate.id.to_string(),
            )
        }
        EstimateCommands::Show { id, margin } => {
            let detail = estimate::get(&session.store, &session.ctx, &parse_id(&id)?)?;
            let margin = if margin { Some(detail.margin()?) } else { None };
            emit_one(&detail, global.format, &id, || print_estimate(&detail, margin))
        }
        EstimateCommands::New {
            customer,
            vehicle,
            tax_rate,
            notes,
        } => {
            let input = NewEstimate {
                customer_id: Some(parse_id(&customer)?),
                vehicle_id: Some(parse_id(&vehicle)?),
                tax_rate,
                description: notes.description,
                diagnostic_notes: notes.diagnostic_notes,
                customer_notes: notes.customer_notes,
                internal_notes: notes.internal_notes,
            };
            let detail = estimate::create(&mut session.store, &session.ctx, input)?;
            let id = detail.estimate.id.to_string();
            emit_one(&detail, global.format, &id, || {
                println!(
                    "{} Created estimate {} ({})",
                    style("✓").green(),
                    style(&detail.estimate.estimate_number).cyan(),
                    detail.estimate.id
                );
            })
        }
        EstimateCommands::Edit {
            id,
            items,
            status,
            tax_rate,
            discount,
            notes,
        } => {
            let items = match items {
                Some(path) => {
                    let mut items: Vec<ItemInput> = read_document(&path)?;
                    let shop = settings::get(&mut session.store, &session.ctx)?;
                    fill_labor_prices(&mut items, shop.labor_rate)?;
                    Some(items)
                }
                None => None,
            };
            let patch = EstimatePatch {
                items,
                status,
                tax_rate,
                discount,
                description: notes.description,
                diagnostic_notes: notes.diagnostic_notes,
                customer_notes: notes.customer_notes,
                internal_notes: notes.internal_notes,
            };
            apply(&mut session, &id, patch, global.format)
        }
        EstimateCommands::Status { id, status } => {
            let patch = EstimatePatch {
                status: Some(status),
                ..EstimatePatch::default()
            };
            apply(&mut session, &id, patch, global.format)
        }
        EstimateCommands::Delete { id, yes } => {
            let estimate_id = parse_id(&id)?;
            let current = estimate::get(&session.store, &session.ctx, &estimate_id)?;
            let mut prompt = format!("delete estimate {}", current.estimate.estimate_number);
            if let Some(wo) = &current.work_order {
                prompt.push_str(&format!(" and work order {}", wo.work_order.work_order_number));
            }
            if !confirm(&prompt, yes)? {
                return Ok(());
            }
            estimate::delete(&mut session.store, &session.ctx, &estimate_id)?;
            println!("{} Deleted estimate {}", style("✓").green(), id);
            Ok(())
        }
    }
}

/// Send a patch; an omitted discount keeps the stored one
fn apply(session: &mut Session, id: &str, mut patch: EstimatePatch, format: OutputFormat) -> Result<()> {
    let estimate_id = parse_id(id)?;
    let current = estimate::get(&session.store, &session.ctx, &estimate_id)?;
    if patch.discount.is_none() {
        patch.discount = Some(current.estimate.discount);
    }
    let had_work_order = current.work_order.is_some();
    let detail = estimate::update(&mut session.store, &session.ctx, &estimate_id, patch)?;
    emit_one(&detail, format, id, || {
        println!(
            "{} Updated estimate {} - {} {}",
            style("✓").green(),
            style(&detail.estimate.estimate_number).cyan(),
            style(detail.estimate.status).yellow(),
            format_money(detail.estimate.total)
        );
        if let (false, Some(wo)) = (had_work_order, &detail.work_order) {
            println!(
                "   Opened work order {}",
                style(&wo.work_order.work_order_number).cyan()
            );
        }
    })
}

fn print_estimate(detail: &EstimateDetail, margin: Option<Margin>) {
    let e = &detail.estimate;
    heading(&format!("{}  {}", e.estimate_number, e.status));
    field("ID", &e.id);
    field(
        "Customer",
        format!("{} ({})", detail.customer.full_name(), detail.customer.phone),
    );
    field("Vehicle", detail.vehicle.label());
    field("Description", format_opt(e.description.as_deref()));
    if let Some(notes) = &e.diagnostic_notes {
        field("Diagnosis", notes);
    }
    if let Some(notes) = &e.customer_notes {
        field("Customer notes", notes);
    }
    if let Some(notes) = &e.internal_notes {
        field("Internal notes", notes);
    }
    field("Created", format_date(&e.created));
    if let Some(date) = &e.approved_date {
        field("Approved", format_date(date));
    }
    if let Some(date) = &e.completed_date {
        field("Completed", format_date(date));
    }

    println!();
    if detail.items.is_empty() {
        println!("{}", style("No items.").dim());
    } else {
        let mut table = ListTable::new(&["#", "TYPE", "DESCRIPTION", "QTY", "PRICE", "AMOUNT", "TAX"]);
        for (index, item) in detail.items.iter().enumerate() {
            table.push(vec![
                (index + 1).to_string(),
                item.item_type.to_string(),
                truncate_str(&item.description, 36),
                item.quantity.normalize().to_string(),
                format_money(item.unit_price),
                format_money(item.amount),
                if item.taxable { "yes" } else { "no" }.to_string(),
            ]);
        }
        println!("{}", table.render());
    }

    println!();
    field("Subtotal", format_money(e.subtotal));
    field(&format!("Tax ({}%)", e.tax_rate.normalize()), format_money(e.tax_amount));
    if !e.discount.is_zero() {
        field("Discount", format_money(e.discount));
    }
    field("Total", style(format_money(e.total)).bold());

    if let Some(margin) = margin {
        println!();
        field("Cost", format_money(margin.cost));
        field(
            "Margin",
            format!("{} ({}%)", format_money(margin.margin), margin.margin_pct),
        );
    }

    if let Some(wo) = &detail.work_order {
        println!();
        field(
            "Work order",
            format!("{} {}", wo.work_order.work_order_number, wo.work_order.status),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_fill_labor_prices() {
        let mut items = vec![
            ItemInput {
                item_type: ItemType::Labor,
                description: "Brake job".to_string(),
                hours: Some(d("2.5")),
                ..Default::default()
            },
            ItemInput {
                item_type: ItemType::Labor,
                description: "Diag".to_string(),
                hours: Some(d("1")),
                labor_rate: Some(d("120")),
                ..Default::default()
            },
            ItemInput {
                item_type: ItemType::Labor,
                description: "Flat rate".to_string(),
                hours: Some(d("3")),
                unit_price: Some(d("99")),
                ..Default::default()
            },
            ItemInput {
                item_type: ItemType::Part,
                description: "Pads".to_string(),
                hours: Some(d("1")),
                ..Default::default()
            },
        ];
        fill_labor_prices(&mut items, d("85.00")).unwrap();
        assert_eq!(items[0].unit_price, Some(d("212.50")));
        assert_eq!(items[0].labor_rate, Some(d("85.00")));
        assert_eq!(items[1].unit_price, Some(d("120")));
        assert_eq!(items[2].unit_price, Some(d("99")));
        assert_eq!(items[3].unit_price, None);
    }
}
