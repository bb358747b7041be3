use diario_core::sync::JournalStatus;

use crate::commands::common::{format_dashboard, open_dashboard, resolve_date, resolve_entry_text};
use crate::error::CliError;

pub async fn run_show(
    profile: Option<&str>,
    date: Option<&str>,
    as_json: bool,
) -> Result<(), CliError> {
    let context = open_dashboard(profile, resolve_date(date)?).await?;
    let view = context.dashboard.snapshot().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in format_dashboard(&view) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_write(
    profile: Option<&str>,
    date: Option<&str>,
    text_parts: &[String],
    clear: bool,
) -> Result<(), CliError> {
    let context = open_dashboard(profile, resolve_date(date)?).await?;
    let dashboard = &context.dashboard;
    let current = dashboard.journal().content().await;

    let content = resolve_entry_text(text_parts, clear, &current)?;
    if content == current {
        println!("No changes for {}", dashboard.scope().date_key);
        return Ok(());
    }

    dashboard.edit_entry(content).await;
    let result = dashboard.save_entry().await;
    if dashboard.journal().status().await == JournalStatus::Error {
        eprintln!("Error");
    }
    result?;

    println!("Saved {}", dashboard.scope().date_key);
    Ok(())
}
