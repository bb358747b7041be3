use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Days, Local, NaiveDate};
use diario_core::auth::SupabaseIdentity;
use diario_core::config::{ClientConfig, SupabaseSettings};
use diario_core::store::SupabaseStore;
use diario_core::sync::{DateSelection, Reconciliation, TaskView};
use diario_core::{App, Dashboard, DashboardView, DateKey};

use crate::auth::{identity_for_profile, SessionStore};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// A signed-in dashboard plus the identity whose token channel backs its store.
pub struct DashboardContext {
    pub profile_name: String,
    pub identity: SupabaseIdentity<SessionStore>,
    pub dashboard: Dashboard<SupabaseStore>,
}

/// Resolved profile name and its Supabase settings (environment overrides file).
pub fn resolve_profile_settings(
    profile: Option<&str>,
) -> Result<(String, Option<SupabaseSettings>), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile);
    let from_file = config
        .profile(&profile_name)
        .map(|profile| profile.client_config())
        .unwrap_or_default();
    let settings = from_file.overridden_by(ClientConfig::from_env()).resolve()?;
    Ok((profile_name, settings))
}

pub fn require_profile_settings(
    profile: Option<&str>,
) -> Result<(String, SupabaseSettings), CliError> {
    let (profile_name, settings) = resolve_profile_settings(profile)?;
    let settings = settings.ok_or_else(|| CliError::NotConfigured(profile_name.clone()))?;
    Ok((profile_name, settings))
}

pub fn open_identity(
    profile: Option<&str>,
) -> Result<(String, SupabaseIdentity<SessionStore>), CliError> {
    let (profile_name, settings) = require_profile_settings(profile)?;
    let identity = identity_for_profile(&profile_name, &settings)?;
    Ok((profile_name, identity))
}

/// Restore the profile session and load the dashboard for `date`.
pub async fn open_dashboard(
    profile: Option<&str>,
    date: NaiveDate,
) -> Result<DashboardContext, CliError> {
    let (profile_name, settings) = require_profile_settings(profile)?;
    let identity = identity_for_profile(&profile_name, &settings)?;
    let store = Arc::new(SupabaseStore::new(&settings, identity.tokens())?);
    tracing::debug!("Opening profile '{}' on {}", profile_name, date);

    let app = App::start_on(&identity, store, DateSelection::new(date)).await;
    let dashboard = app
        .dashboard()
        .cloned()
        .ok_or_else(|| CliError::NotSignedIn(profile_name.clone()))?;

    Ok(DashboardContext {
        profile_name,
        identity,
        dashboard,
    })
}

pub fn resolve_date(raw: Option<&str>) -> Result<NaiveDate, CliError> {
    let today = Local::now().date_naive();
    raw.map_or(Ok(today), |raw| parse_date_arg(raw, today))
}

/// Parse `YYYY-MM-DD` or one of the words `today`, `yesterday`, `tomorrow`.
pub fn parse_date_arg(raw: &str, today: NaiveDate) -> Result<NaiveDate, CliError> {
    let normalized = raw.trim().to_ascii_lowercase();
    let relative = match normalized.as_str() {
        "today" => Some(today),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        _ => None,
    };
    if let Some(date) = relative {
        return Ok(date);
    }

    normalized
        .parse::<DateKey>()
        .map(|key| key.date())
        .map_err(|_| CliError::InvalidDate(raw.trim().to_string()))
}

pub fn completion_mark(task: &TaskView) -> &'static str {
    match (task.task.is_completed, task.reconciliation) {
        (_, Reconciliation::Diverged) => "[!]",
        (true, _) => "[x]",
        (false, _) => "[ ]",
    }
}

pub fn format_task_lines(tasks: &[TaskView]) -> Vec<String> {
    if tasks.is_empty() {
        return vec!["No tasks for this day.".to_string()];
    }

    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            format!(
                "{:>3}. {} {}  ({})",
                index + 1,
                completion_mark(task),
                task.task.title,
                task.task.id
            )
        })
        .collect()
}

pub fn format_dashboard(view: &DashboardView) -> Vec<String> {
    let mut lines = vec![
        view.greeting.clone(),
        format!("Journal for {}", view.date_key),
        String::new(),
    ];

    if view.journal.content.trim().is_empty() {
        lines.push("(no entry yet)".to_string());
    } else {
        lines.extend(view.journal.content.lines().map(str::to_string));
    }

    lines.push(String::new());
    lines.push("Tasks".to_string());
    lines.extend(format_task_lines(&view.tasks.tasks));
    lines
}

/// New entry text, taken verbatim: arguments, then piped stdin, then `$EDITOR`
/// prefilled with `current`. An emptied editor buffer clears the entry.
pub fn resolve_entry_text(
    text_parts: &[String],
    clear: bool,
    current: &str,
) -> Result<String, CliError> {
    if let Some(content) = entry_text_from_args(text_parts, clear) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    capture_editor_input_with_initial(current)
}

/// Text given on the command line, `Some("")` for `--clear`.
pub fn entry_text_from_args(text_parts: &[String], clear: bool) -> Option<String> {
    if clear {
        Some(String::new())
    } else if text_parts.is_empty() {
        None
    } else {
        Some(text_parts.join(" "))
    }
}

/// Piped input as-is; nothing piped (or a terminal) yields `None`.
pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok((!buffer.is_empty()).then_some(buffer))
}

pub fn capture_editor_input_with_initial(initial_content: &str) -> Result<String, CliError> {
    capture_with_editor(&preferred_editor(), initial_content)
}

/// Run `editor` on a temp file holding `initial_content` and return the file as saved.
pub fn capture_with_editor(editor: &str, initial_content: &str) -> Result<String, CliError> {
    let temp_file = create_temp_entry_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file);
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(content?)
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_entry_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("diario-entry-{}-{now}.md", std::process::id()))
}

/// Show the first and last few characters of a key.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
