use keyring::Entry;
use serde::{Deserialize, Serialize};
use tauri::AppHandle;
use tracing::{info, warn};

use crate::error::SavorlyError;

use super::config::{preference, remove_preference, save_preference};

/// Keychain service holding the identity provider's token.
const KEYCHAIN_SERVICE: &str = "savorly-identity";
const KEYCHAIN_USER: &str = "savorly";

const DISPLAY_NAME_KEY: &str = "identity_display_name";
const EMAIL_KEY: &str = "identity_email";

/// The signed-in user as the identity provider reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserSession {
    /// The key history lookups and generation requests run under: display
    /// name when present, otherwise email.
    pub fn user_key(&self) -> Option<String> {
        self.display_name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.email.clone().filter(|s| !s.trim().is_empty()))
    }
}

fn token_entry() -> Result<Entry, SavorlyError> {
    Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER).map_err(|e| {
        warn!("Failed to create keyring entry: {}", e);
        SavorlyError::Keychain(e.to_string())
    })
}

/// The stored profile, if anyone is signed in.
pub(crate) fn stored_session(app: &AppHandle) -> Result<Option<UserSession>, SavorlyError> {
    let display_name = preference(app, DISPLAY_NAME_KEY)?.filter(|s| !s.is_empty());
    let email = preference(app, EMAIL_KEY)?.filter(|s| !s.is_empty());
    if display_name.is_none() && email.is_none() {
        return Ok(None);
    }
    Ok(Some(UserSession {
        display_name,
        email,
    }))
}

/// The key the current user's server requests run under; "guest" when
/// nobody is signed in.
pub(crate) fn active_user_key(app: &AppHandle) -> String {
    match stored_session(app) {
        Ok(Some(session)) => session
            .user_key()
            .unwrap_or_else(|| "guest".to_string()),
        _ => "guest".to_string(),
    }
}

pub(crate) fn token_present() -> bool {
    Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER)
        .and_then(|e| e.get_password())
        .is_ok()
}

/// Store a provider session: the token in the OS keychain, the profile in
/// preferences.
#[tauri::command]
pub fn set_identity_session(
    app: AppHandle,
    token: &str,
    session: UserSession,
) -> Result<(), String> {
    info!("Storing identity session");
    token_entry()
        .map_err(String::from)?
        .set_password(token)
        .map_err(|e| {
            warn!("Failed to store identity token: {}", e);
            e.to_string()
        })?;

    save_preference(
        &app,
        DISPLAY_NAME_KEY,
        session.display_name.as_deref().unwrap_or(""),
    )
    .map_err(String::from)?;
    save_preference(&app, EMAIL_KEY, session.email.as_deref().unwrap_or(""))
        .map_err(String::from)
}

#[tauri::command]
pub fn get_identity_session(app: AppHandle) -> Result<Option<UserSession>, String> {
    stored_session(&app).map_err(String::from)
}

#[tauri::command]
pub fn has_identity_token() -> Result<bool, String> {
    Ok(token_present())
}

/// Clear the session. Best-effort: a missing token or a failed preference
/// write only logs, the user is signed out either way.
#[tauri::command]
pub fn sign_out(app: AppHandle) {
    info!("Signing out");
    match token_entry() {
        Ok(entry) => match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => warn!("Failed to delete identity token: {}", e),
        },
        Err(e) => warn!("Sign-out skipped keychain cleanup: {}", e),
    }
    for key in [DISPLAY_NAME_KEY, EMAIL_KEY] {
        if let Err(e) = remove_preference(&app, key) {
            warn!("Sign-out failed to clear '{}': {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key_prefers_display_name() {
        let session = UserSession {
            display_name: Some("Alex Chen".to_string()),
            email: Some("alex@example.com".to_string()),
        };
        assert_eq!(session.user_key().as_deref(), Some("Alex Chen"));
    }

    #[test]
    fn test_user_key_falls_back_to_email() {
        let session = UserSession {
            display_name: Some("   ".to_string()),
            email: Some("alex@example.com".to_string()),
        };
        assert_eq!(session.user_key().as_deref(), Some("alex@example.com"));

        let nobody = UserSession::default();
        assert_eq!(nobody.user_key(), None);
    }
}
