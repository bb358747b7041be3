//! CLI session persistence in the OS keychain.
//!
//! Each profile owns one keychain slot holding its serialized `AuthSession`.
//! Test builds swap the keychain for a process-wide map.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

use diario_core::auth::{AuthError, AuthResult, AuthSession, SessionPersistence, SupabaseIdentity};
use diario_core::config::SupabaseSettings;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "diario-cli";

fn storage_error(error: impl ToString) -> AuthError {
    AuthError::SecureStorage(error.to_string())
}

#[derive(Clone)]
pub struct SessionStore {
    slot: String,
}

impl SessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            slot: format!("supabase_session:{profile_name}"),
        }
    }
}

#[cfg(not(test))]
impl SessionStore {
    fn entry(&self) -> AuthResult<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE_NAME, &self.slot).map_err(storage_error)
    }

    fn read_slot(&self) -> AuthResult<Option<String>> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(storage_error(error)),
        }
    }

    fn write_slot(&self, raw: &str) -> AuthResult<()> {
        self.entry()?.set_password(raw).map_err(storage_error)
    }

    fn remove_slot(&self) -> AuthResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(storage_error(error)),
        }
    }
}

#[cfg(test)]
impl SessionStore {
    fn slots() -> AuthResult<std::sync::MutexGuard<'static, HashMap<String, String>>> {
        static SLOTS: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        SLOTS
            .get_or_init(|| Mutex::new(HashMap::new()))
            .lock()
            .map_err(storage_error)
    }

    fn read_slot(&self) -> AuthResult<Option<String>> {
        Ok(Self::slots()?.get(&self.slot).cloned())
    }

    fn write_slot(&self, raw: &str) -> AuthResult<()> {
        Self::slots()?.insert(self.slot.clone(), raw.to_string());
        Ok(())
    }

    fn remove_slot(&self) -> AuthResult<()> {
        Self::slots()?.remove(&self.slot);
        Ok(())
    }
}

impl SessionPersistence for SessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        self.read_slot()?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(AuthError::from)
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        self.write_slot(&serde_json::to_string(session)?)
    }

    fn clear_session(&self) -> AuthResult<()> {
        self.remove_slot()
    }
}

/// Identity provider for a profile, persisting sessions in its keychain slot.
pub fn identity_for_profile(
    profile_name: &str,
    settings: &SupabaseSettings,
) -> AuthResult<SupabaseIdentity<SessionStore>> {
    SupabaseIdentity::new(settings, SessionStore::new(profile_name))
}

/// Drop a profile's stored session without contacting Supabase.
pub fn clear_stored_session(profile_name: &str) -> AuthResult<()> {
    SessionStore::new(profile_name).clear_session()
}
