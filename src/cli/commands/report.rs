//! `hunter report` - business summary

use console::style;
use miette::Result;

use crate::cli::helpers::format_money;
use crate::cli::output::{effective_format, field, heading, print_structured, ListTable};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::config::Config;
use crate::engine::report::{self, ShopReport};

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Include cost and margin figures
    #[arg(long)]
    pub margin: bool,
}

pub fn run(args: ReportArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let session = Session::open(global, config)?;
    let summary = report::summary(&session.store, &session.ctx)?;
    match effective_format(global.format, false) {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(&summary, global.format),
        OutputFormat::Table | OutputFormat::Csv => {
            let mut table = ListTable::new(&["METRIC", "VALUE"]);
            for (metric, value) in rows(&summary, args.margin) {
                table.push(vec![metric.to_string(), value]);
            }
            table.print(global.format)
        }
        _ => {
            print_report(&summary, args.margin);
            Ok(())
        }
    }
}

fn rows(r: &ShopReport, margin: bool) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("total_estimates", r.total_estimates.to_string()),
        ("approved", r.approved_count.to_string()),
        ("rejected", r.rejected_count.to_string()),
        ("pending", r.pending_count.to_string()),
        ("approval_rate", format!("{}%", r.approval_rate)),
        ("total_quoted", format_money(r.total_quoted)),
        ("total_approved", format_money(r.total_approved)),
        ("total_completed", format_money(r.total_completed)),
        ("avg_estimate", format_money(r.avg_estimate)),
        ("active_work_orders", r.active_work_orders.to_string()),
        ("completed_work_orders", r.completed_work_orders.to_string()),
        ("customers", r.customers.to_string()),
        ("vehicles", r.vehicles.to_string()),
    ];
    if margin {
        rows.push(("total_cost", format_money(r.total_cost)));
        rows.push(("total_margin", format_money(r.total_margin)));
        rows.push(("margin_pct", format!("{}%", r.margin_pct)));
    }
    rows
}

fn print_report(r: &ShopReport, margin: bool) {
    heading("Estimates");
    field("Total", r.total_estimates);
    field("Approved", style(r.approved_count).green());
    field("Rejected", style(r.rejected_count).red());
    field("Pending", style(r.pending_count).yellow());
    field("Approval rate", format!("{}%", r.approval_rate));
    println!();
    heading("Revenue");
    field("Quoted", format_money(r.total_quoted));
    field("Approved", format_money(r.total_approved));
    field("Completed", format_money(r.total_completed));
    field("Average", format_money(r.avg_estimate));
    if margin {
        field("Cost", format_money(r.total_cost));
        field("Margin", format!("{} ({}%)", format_money(r.total_margin), r.margin_pct));
    }
    println!();
    heading("Shop");
    field("Work orders open", r.active_work_orders);
    field("Work orders done", r.completed_work_orders);
    field("Customers", r.customers);
    field("Vehicles", r.vehicles);
}
