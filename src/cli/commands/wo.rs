//! `hunter wo` - work orders on the shop floor

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::filters::{PriorityArg, WorkOrderStatusArg};
use crate::cli::helpers::{
    format_date, format_money, format_opt, parse_datetime, parse_id, read_document, truncate_str,
};
use crate::cli::output::{emit_list, emit_one, field, heading, ListTable};
use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::config::Config;
use crate::core::workflow::{TaskStatus, WorkOrderStatus};
use crate::engine::work_order;
use crate::entities::work_order::{
    TaskInput, WorkOrderDetail, WorkOrderFilter, WorkOrderPatch, WorkTask,
};

#[derive(Subcommand, Debug)]
pub enum WoCommands {
    /// List work orders, newest first
    List {
        #[arg(long, short = 's', default_value = "all")]
        status: WorkOrderStatusArg,
    },

    /// Show a work order with its estimate and tasks
    Show {
        id: String,
    },

    /// Open the work order of an approved estimate
    Create {
        estimate_id: String,
    },

    /// Replace tasks, assign, schedule or change status
    Edit {
        id: String,

        /// YAML list of tasks replacing the current ones (`-` for stdin)
        #[arg(long, value_name = "FILE")]
        tasks: Option<PathBuf>,

        /// PENDING, IN_PROGRESS, WAITING_PARTS, ON_HOLD, COMPLETED or DELIVERED
        #[arg(long)]
        status: Option<WorkOrderStatus>,

        /// Technician
        #[arg(long)]
        assigned_to: Option<String>,

        #[arg(long)]
        bay: Option<String>,

        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,

        /// YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_datetime)]
        start_date: Option<DateTime<Utc>>,

        /// YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_datetime)]
        estimated_completion: Option<DateTime<Utc>>,

        #[arg(long)]
        tech_notes: Option<String>,
    },

    /// Move a work order to another status
    Status {
        id: String,
        status: WorkOrderStatus,
    },

    /// Flip a task between PENDING and COMPLETED
    Toggle {
        id: String,
        /// Task number as shown by `wo show`
        task: usize,
    },
}

/// Task list with task `number` (1-based) flipped
pub fn toggle_task(tasks: &[WorkTask], number: usize) -> Result<Vec<TaskInput>> {
    if number == 0 || number > tasks.len() {
        return Err(miette::miette!(
            "task {} does not exist; the work order has {} task(s)",
            number,
            tasks.len()
        ));
    }
    Ok(tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let mut input = TaskInput::from(task);
            if index + 1 == number {
                input.status = Some(task.status.toggled());
            }
            input
        })
        .collect())
}

pub fn run(cmd: WoCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut session = Session::open(global, config)?;
    match cmd {
        WoCommands::List { status } => {
            let filter = WorkOrderFilter {
                status: status.to_filter(),
            };
            let orders = work_order::list(&session.store, &session.ctx, &filter)?;
            emit_list(
                &orders,
                global.format,
                &["ID", "NUMBER", "STATUS", "PRIORITY", "ESTIMATE", "CUSTOMER", "VEHICLE", "TASKS", "TECH"],
                "No work orders found.",
                |w| {
                    vec![
                        w.work_order.id.to_string(),
                        w.work_order.work_order_number.clone(),
                        w.work_order.status.to_string(),
                        w.work_order.priority.to_string(),
                        w.estimate_number.clone(),
                        truncate_str(&w.customer_name, 24),
                        truncate_str(&w.vehicle_label, 24),
                        format!("{}/{}", w.tasks_completed, w.task_count),
                        format_opt(w.work_order.assigned_to.as_deref()),
                    ]
                },
                |w| w.work_order.id.to_string(),
            )
        }
        WoCommands::Show { id } => {
            let detail = work_order::get(&session.store, &session.ctx, &parse_id(&id)?)?;
            emit_one(&detail, global.format, &id, || print_work_order(&detail))
        }
        WoCommands::Create { estimate_id } => {
            let detail =
                work_order::create_for_estimate(&mut session.store, &session.ctx, &parse_id(&estimate_id)?)?;
            let id = detail.work_order.id.to_string();
            emit_one(&detail, global.format, &id, || {
                println!(
                    "{} Opened work order {} for {}",
                    style("✓").green(),
                    style(&detail.work_order.work_order_number).cyan(),
                    detail.estimate.estimate_number
                );
            })
        }
        WoCommands::Edit {
            id,
            tasks,
            status,
            assigned_to,
            bay,
            priority,
            start_date,
            estimated_completion,
            tech_notes,
        } => {
            let tasks = match tasks {
                Some(path) => Some(read_document::<Vec<TaskInput>>(&path)?),
                None => None,
            };
            let patch = WorkOrderPatch {
                tasks,
                status,
                assigned_to,
                bay,
                priority: priority.map(Into::into),
                start_date,
                estimated_completion,
                tech_notes,
            };
            apply(&mut session, &id, patch, global.format)
        }
        WoCommands::Status { id, status } => {
            let patch = WorkOrderPatch {
                status: Some(status),
                ..WorkOrderPatch::default()
            };
            apply(&mut session, &id, patch, global.format)
        }
        WoCommands::Toggle { id, task } => {
            let current = work_order::get(&session.store, &session.ctx, &parse_id(&id)?)?;
            let patch = WorkOrderPatch {
                tasks: Some(toggle_task(&current.tasks, task)?),
                ..WorkOrderPatch::default()
            };
            apply(&mut session, &id, patch, global.format)
        }
    }
}

fn apply(session: &mut Session, id: &str, patch: WorkOrderPatch, format: OutputFormat) -> Result<()> {
    let detail = work_order::update(&mut session.store, &session.ctx, &parse_id(id)?, patch)?;
    emit_one(&detail, format, id, || {
        let (done, total) = detail.progress();
        println!(
            "{} Updated work order {} - {} ({}/{} tasks)",
            style("✓").green(),
            style(&detail.work_order.work_order_number).cyan(),
            style(detail.work_order.status).yellow(),
            done,
            total
        );
        if detail.work_order.status == WorkOrderStatus::Completed {
            println!(
                "   Estimate {} is {}",
                detail.estimate.estimate_number, detail.estimate.status
            );
        }
    })
}

fn print_work_order(detail: &WorkOrderDetail) {
    let w = &detail.work_order;
    heading(&format!("{}  {}", w.work_order_number, w.status));
    field("ID", &w.id);
    field(
        "Estimate",
        format!(
            "{} {} {}",
            detail.estimate.estimate_number,
            detail.estimate.status,
            format_money(detail.estimate.total)
        ),
    );
    field(
        "Customer",
        format!("{} ({})", detail.customer.full_name(), detail.customer.phone),
    );
    field("Vehicle", detail.vehicle.label());
    field("Priority", w.priority);
    field("Technician", format_opt(w.assigned_to.as_deref()));
    field("Bay", format_opt(w.bay.as_deref()));
    if let Some(date) = &w.start_date {
        field("Started", format_date(date));
    }
    if let Some(date) = &w.estimated_completion {
        field("Promised", format_date(date));
    }
    if let Some(date) = &w.completed_date {
        field("Completed", format_date(date));
    }
    if let Some(date) = &w.delivered_date {
        field("Delivered", format_date(date));
    }
    if let Some(notes) = &w.tech_notes {
        field("Tech notes", notes);
    }

    println!();
    let (done, total) = detail.progress();
    println!("{}", style(format!("Tasks ({}/{})", done, total)).bold());
    if detail.tasks.is_empty() {
        println!("{}", style("No tasks.").dim());
        return;
    }
    let mut table = ListTable::new(&["#", "", "TASK", "TECH", "HOURS"]);
    for (index, task) in detail.tasks.iter().enumerate() {
        let mark = match task.status {
            TaskStatus::Completed => "✓",
            TaskStatus::Pending => " ",
        };
        table.push(vec![
            (index + 1).to_string(),
            mark.to_string(),
            truncate_str(&task.description, 40),
            format_opt(task.assigned_to.as_deref()),
            task.time_spent
                .map(|h| h.normalize().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{}", table.render());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{EntityId, EntityPrefix};

    fn task(description: &str, status: TaskStatus) -> WorkTask {
        TaskInput {
            description: description.to_string(),
            status: Some(status),
            ..Default::default()
        }
        .into_task(&EntityId::new(EntityPrefix::Word), 0, Utc::now())
    }

    #[test]
    fn test_toggle_task() {
        let tasks = vec![
            task("Remove wheels", TaskStatus::Completed),
            task("Replace pads", TaskStatus::Pending),
        ];
        let inputs = toggle_task(&tasks, 2).unwrap();
        assert_eq!(inputs[0].status, Some(TaskStatus::Completed));
        assert_eq!(inputs[1].status, Some(TaskStatus::Completed));
        assert_eq!(inputs[1].description, "Replace pads");

        let inputs = toggle_task(&tasks, 1).unwrap();
        assert_eq!(inputs[0].status, Some(TaskStatus::Pending));
    }

    #[test]
    fn test_toggle_task_out_of_range() {
        let tasks = vec![task("Road test", TaskStatus::Pending)];
        assert!(toggle_task(&tasks, 0).is_err());
        assert!(toggle_task(&tasks, 2).is_err());
    }
}
