//! Client configuration.
//!
//! Provides the `ClientConfig` struct used by the CLI (and any other front end)
//! to discover the Supabase project that backs auth and the journal tables.

use std::env;

use serde::{Deserialize, Serialize};

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

/// Public Supabase project settings.
///
/// Only the project URL and the anon (public) key live here; user tokens are
/// kept by the session persistence layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
}

/// Fully specified Supabase settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

impl ClientConfig {
    /// Read `SUPABASE_URL` / `SUPABASE_ANON_KEY` from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            supabase_url: normalize_text_option(lookup(ENV_SUPABASE_URL)),
            supabase_anon_key: normalize_text_option(lookup(ENV_SUPABASE_ANON_KEY)),
        }
    }

    /// Overlay non-empty values from `other` on top of `self`.
    #[must_use]
    pub fn overridden_by(self, other: Self) -> Self {
        Self {
            supabase_url: normalize_text_option(other.supabase_url)
                .or_else(|| normalize_text_option(self.supabase_url)),
            supabase_anon_key: normalize_text_option(other.supabase_anon_key)
                .or_else(|| normalize_text_option(self.supabase_anon_key)),
        }
    }

    /// Resolve into usable settings.
    ///
    /// Returns `Ok(None)` when nothing is configured and an error when only one
    /// of the two values is present or the URL is malformed.
    pub fn resolve(&self) -> Result<Option<SupabaseSettings>> {
        let url = normalize_text_option(self.supabase_url.clone());
        let anon_key = normalize_text_option(self.supabase_anon_key.clone());

        match (url, anon_key) {
            (None, None) => Ok(None),
            (Some(url), Some(anon_key)) => {
                if !is_http_url(&url) {
                    return Err(Error::Config(
                        "Supabase URL must include http:// or https://".to_string(),
                    ));
                }
                Ok(Some(SupabaseSettings {
                    url: url.trim_end_matches('/').to_string(),
                    anon_key,
                }))
            }
            (Some(_), None) => Err(Error::Config(format!("{ENV_SUPABASE_ANON_KEY} is missing"))),
            (None, Some(_)) => Err(Error::Config(format!("{ENV_SUPABASE_URL} is missing"))),
        }
    }
}
