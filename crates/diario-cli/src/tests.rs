use chrono::NaiveDate;
use clap::Parser;
use diario_core::config::ClientConfig;
use diario_core::sync::{JournalStatus, JournalView, Reconciliation, TaskListView, TaskView};
use diario_core::{DashboardView, DateKey, Task, TaskId, UserId};
use pretty_assertions::assert_eq;

use crate::commands::common::{
    completion_mark, default_editor, entry_text_from_args, format_dashboard, format_task_lines,
    mask_secret, parse_date_arg,
};
#[cfg(unix)]
use crate::commands::common::capture_with_editor;
use crate::cli::{Cli, Commands};
use crate::commands::config::{merge_profile, summarize_profile};
use crate::config_profiles::CliProfile;
use crate::error::CliError;

fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn task_view(id: &str, title: &str, is_completed: bool, reconciliation: Reconciliation) -> TaskView {
    TaskView {
        task: Task {
            id: TaskId::new(id),
            user_id: UserId::new("ana"),
            date_key: DateKey::new(day("2024-05-01")),
            title: title.to_string(),
            is_completed,
            created_at: None,
        },
        reconciliation,
    }
}

fn dashboard_view(content: &str, tasks: Vec<TaskView>) -> DashboardView {
    DashboardView {
        greeting: "Hello, Ana".to_string(),
        email: None,
        date_key: DateKey::new(day("2024-05-01")),
        journal: JournalView {
            scope: None,
            content: content.to_string(),
            status: JournalStatus::Idle,
        },
        tasks: TaskListView {
            scope: None,
            tasks,
            draft: String::new(),
        },
    }
}

fn words(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| (*part).to_string()).collect()
}

#[test]
fn entry_text_from_args_keeps_whitespace() {
    assert_eq!(
        entry_text_from_args(&words(&["  indented", "line\n"]), false),
        Some("  indented line\n".to_string())
    );
}

#[test]
fn entry_text_from_args_clear_saves_empty_entry() {
    assert_eq!(entry_text_from_args(&[], true), Some(String::new()));
}

#[test]
fn entry_text_from_args_without_text_defers_to_other_sources() {
    assert_eq!(entry_text_from_args(&[], false), None);
}

#[test]
fn write_accepts_clear_flag() {
    let cli = Cli::try_parse_from(["diario", "write", "--clear"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Write { ref text, clear: true }) if text.is_empty()
    ));
}

#[test]
fn write_rejects_text_with_clear() {
    assert!(Cli::try_parse_from(["diario", "write", "note", "--clear"]).is_err());
}

#[cfg(unix)]
#[test]
fn editor_capture_returns_buffer_verbatim() {
    let content = capture_with_editor("true", "  first line\n\nsecond line\n").unwrap();
    assert_eq!(content, "  first line\n\nsecond line\n");
}

#[cfg(target_os = "linux")]
#[test]
fn emptied_editor_buffer_clears_entry() {
    let content = capture_with_editor("truncate -s 0", "yesterday's text").unwrap();
    assert_eq!(content, "");
}

#[cfg(unix)]
#[test]
fn failing_editor_is_reported() {
    assert!(matches!(
        capture_with_editor("false", "text"),
        Err(CliError::EditorFailed(_))
    ));
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn parse_date_arg_accepts_relative_words() {
    let today = day("2024-03-01");
    assert_eq!(parse_date_arg("today", today).unwrap(), today);
    assert_eq!(parse_date_arg(" Yesterday ", today).unwrap(), day("2024-02-29"));
    assert_eq!(parse_date_arg("tomorrow", today).unwrap(), day("2024-03-02"));
}

#[test]
fn parse_date_arg_accepts_canonical_dates() {
    let today = day("2024-03-01");
    assert_eq!(parse_date_arg("2023-12-31", today).unwrap(), day("2023-12-31"));
}

#[test]
fn parse_date_arg_rejects_other_formats() {
    let today = day("2024-03-01");
    for raw in ["31/12/2023", "2023-13-01", "2023-1-5", "next week", ""] {
        assert!(matches!(
            parse_date_arg(raw, today),
            Err(CliError::InvalidDate(_))
        ));
    }
}

#[test]
fn completion_mark_flags_diverged_tasks() {
    assert_eq!(
        completion_mark(&task_view("1", "a", false, Reconciliation::Confirmed)),
        "[ ]"
    );
    assert_eq!(
        completion_mark(&task_view("1", "a", true, Reconciliation::Pending)),
        "[x]"
    );
    assert_eq!(
        completion_mark(&task_view("1", "a", true, Reconciliation::Diverged)),
        "[!]"
    );
}

#[test]
fn format_task_lines_reports_empty_day() {
    assert_eq!(format_task_lines(&[]), vec!["No tasks for this day."]);
}

#[test]
fn format_task_lines_numbers_tasks_with_ids() {
    let lines = format_task_lines(&[
        task_view("7", "Buy milk", false, Reconciliation::Confirmed),
        task_view("9", "Walk", true, Reconciliation::Confirmed),
    ]);
    assert_eq!(
        lines,
        vec!["  1. [ ] Buy milk  (7)", "  2. [x] Walk  (9)"]
    );
}

#[test]
fn format_dashboard_shows_placeholder_for_empty_entry() {
    let lines = format_dashboard(&dashboard_view("  ", Vec::new()));
    assert_eq!(
        lines,
        vec![
            "Hello, Ana",
            "Journal for 2024-05-01",
            "",
            "(no entry yet)",
            "",
            "Tasks",
            "No tasks for this day.",
        ]
    );
}

#[test]
fn format_dashboard_keeps_entry_lines() {
    let lines = format_dashboard(&dashboard_view(
        "Slept well.\nLong walk.",
        vec![task_view("3", "Call mum", false, Reconciliation::Confirmed)],
    ));
    assert_eq!(lines[3], "Slept well.");
    assert_eq!(lines[4], "Long walk.");
    assert_eq!(lines.last().map(String::as_str), Some("  1. [ ] Call mum  (3)"));
}

#[test]
fn mask_secret_hides_middle() {
    assert_eq!(mask_secret("abcdefghijklmnop"), "abcd...mnop");
    assert_eq!(mask_secret("short"), "*****");
}

#[test]
fn merge_profile_prefers_flags_then_env_then_file() {
    let existing = CliProfile {
        supabase_url: Some("https://file.supabase.co".to_string()),
        supabase_anon_key: Some("file-key".to_string()),
    };
    let env = ClientConfig {
        supabase_url: Some("https://env.supabase.co".to_string()),
        supabase_anon_key: None,
    };
    let explicit = ClientConfig {
        supabase_url: None,
        supabase_anon_key: Some(" flag-key ".to_string()),
    };

    let merged = merge_profile(&existing, explicit, env);
    assert_eq!(
        merged,
        CliProfile {
            supabase_url: Some("https://env.supabase.co".to_string()),
            supabase_anon_key: Some("flag-key".to_string()),
        }
    );
}

#[test]
fn summarize_profile_masks_key_and_lists_env_overrides() {
    let profile = CliProfile {
        supabase_url: Some("https://file.supabase.co".to_string()),
        supabase_anon_key: Some("anon-key-0123456789".to_string()),
    };
    let env = ClientConfig {
        supabase_url: Some("https://env.supabase.co".to_string()),
        supabase_anon_key: None,
    };

    let summary = summarize_profile("work", true, "/tmp/cli-config.json", &profile, &env);
    assert_eq!(summary.supabase_url.as_deref(), Some("https://env.supabase.co"));
    assert_eq!(summary.supabase_anon_key.as_deref(), Some("anon...6789"));
    assert_eq!(summary.env_overrides, vec!["SUPABASE_URL"]);
    assert!(summary.active);
}
