use diario_core::TaskId;

use crate::cli::TaskCommands;
use crate::commands::common::{format_task_lines, open_dashboard, resolve_date};
use crate::error::CliError;

pub async fn run_task(
    command: TaskCommands,
    profile: Option<&str>,
    date: Option<&str>,
) -> Result<(), CliError> {
    let context = open_dashboard(profile, resolve_date(date)?).await?;
    let dashboard = &context.dashboard;

    match command {
        TaskCommands::Add { title } => {
            let inserted = dashboard.add_task(&title.join(" ")).await?;
            for task in inserted {
                println!("{}", task.id);
            }
        }
        TaskCommands::Toggle { id } => {
            let id = TaskId::new(id.trim());
            let is_completed = dashboard.toggle_task(&id).await?;
            let label = if is_completed { "Completed" } else { "Reopened" };
            println!("{label} {id}");
        }
        TaskCommands::Delete { id } => {
            let id = TaskId::new(id.trim());
            dashboard.delete_task(&id).await?;
            println!("Deleted {id}");
        }
        TaskCommands::List { json } => {
            let view = dashboard.tasks().snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.tasks)?);
            } else {
                for line in format_task_lines(&view.tasks) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}
