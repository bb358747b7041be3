use diario_core::config::{ClientConfig, ENV_SUPABASE_ANON_KEY, ENV_SUPABASE_URL};
use diario_core::util::{is_http_url, normalize_text_option};
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::commands::common::mask_secret;
use crate::config_profiles::{default_config_path, CliProfile, CliProfilesConfig};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub profile: String,
    pub active: bool,
    pub config_path: String,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub env_overrides: Vec<&'static str>,
}

pub fn run_config(command: ConfigCommands, profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            supabase_url,
            supabase_anon_key,
            no_activate,
        } => run_config_init(profile, supabase_url, supabase_anon_key, no_activate),
        ConfigCommands::Show { json } => run_config_show(profile, json),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    supabase_url: Option<String>,
    supabase_anon_key: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged = merge_profile(
        &existing,
        ClientConfig {
            supabase_url,
            supabase_anon_key,
        },
        ClientConfig::from_env(),
    );
    validate_profile_urls(&merged)?;
    *config.profile_mut_or_default(&profile_name) = merged;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let mut missing_fields = Vec::new();
    if let Some(profile) = config.profile(&profile_name) {
        if profile.supabase_url().is_none() {
            missing_fields.push("supabase_url");
        }
        if profile.supabase_anon_key().is_none() {
            missing_fields.push("supabase_anon_key");
        }
    }
    if missing_fields.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `diario auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

/// Explicit flags win over environment values, which win over the stored profile.
pub fn merge_profile(existing: &CliProfile, explicit: ClientConfig, env: ClientConfig) -> CliProfile {
    let merged = existing.client_config().overridden_by(env).overridden_by(explicit);
    CliProfile {
        supabase_url: merged.supabase_url,
        supabase_anon_key: merged.supabase_anon_key,
    }
}

pub fn run_config_show(profile_name: Option<&str>, as_json: bool) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();
    let config_path = default_config_path().map_err(CliError::Config)?;

    let summary = summarize_profile(
        &profile_name,
        config.active_profile.as_deref() == Some(profile_name.as_str()),
        &config_path.display().to_string(),
        &profile,
        &ClientConfig::from_env(),
    );

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let active_label = if summary.active { " (active)" } else { "" };
    println!("Profile: {}{}", summary.profile, active_label);
    println!("Config: {}", summary.config_path);
    println!(
        "Supabase URL: {}",
        summary.supabase_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "Supabase anon key: {}",
        summary.supabase_anon_key.as_deref().unwrap_or("(not set)")
    );
    if !summary.env_overrides.is_empty() {
        println!("Overridden by: {}", summary.env_overrides.join(", "));
    }
    Ok(())
}

pub fn summarize_profile(
    profile_name: &str,
    active: bool,
    config_path: &str,
    profile: &CliProfile,
    env: &ClientConfig,
) -> ProfileSummary {
    let mut env_overrides = Vec::new();
    if normalize_text_option(env.supabase_url.clone()).is_some() {
        env_overrides.push(ENV_SUPABASE_URL);
    }
    if normalize_text_option(env.supabase_anon_key.clone()).is_some() {
        env_overrides.push(ENV_SUPABASE_ANON_KEY);
    }

    let effective = profile.client_config().overridden_by(env.clone());
    ProfileSummary {
        profile: profile_name.to_string(),
        active,
        config_path: config_path.to_string(),
        supabase_url: effective.supabase_url,
        supabase_anon_key: effective.supabase_anon_key.as_deref().map(mask_secret),
        env_overrides,
    }
}

fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.supabase_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "supabase_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
