//! OS keychain persistence for backend credentials.

use keyring::Entry;
use tracing::{info, warn};

use crate::error::SceneError;
use crate::session::Credentials;

const KEYCHAIN_USER: &str = "scenewright";

/// The three tokens a session carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Gemini,
    Amplify,
    Replicate,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 3] = [
        CredentialKind::Gemini,
        CredentialKind::Amplify,
        CredentialKind::Replicate,
    ];

    /// Keychain service name for this token.
    pub fn service(&self) -> &'static str {
        match self {
            CredentialKind::Gemini => "scenewright-gemini-api",
            CredentialKind::Amplify => "scenewright-amplify-token",
            CredentialKind::Replicate => "scenewright-replicate-token",
        }
    }

    fn get(&self, creds: &Credentials) -> String {
        match self {
            CredentialKind::Gemini => creds.gemini_key.clone(),
            CredentialKind::Amplify => creds.amplify_token.clone(),
            CredentialKind::Replicate => creds.replicate_token.clone(),
        }
    }

    fn set(&self, creds: &mut Credentials, value: String) {
        match self {
            CredentialKind::Gemini => creds.gemini_key = value,
            CredentialKind::Amplify => creds.amplify_token = value,
            CredentialKind::Replicate => creds.replicate_token = value,
        }
    }
}

fn entry(kind: CredentialKind) -> Result<Entry, SceneError> {
    Entry::new(kind.service(), KEYCHAIN_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", kind.service(), e);
        SceneError::Keychain(e.to_string())
    })
}

pub fn store_one(kind: CredentialKind, value: &str) -> Result<(), SceneError> {
    info!("Storing credential: {}", kind.service());
    entry(kind)?.set_password(value).map_err(|e| {
        warn!("Failed to set password for {}: {}", kind.service(), e);
        SceneError::Keychain(e.to_string())
    })
}

/// `None` when no entry exists.
pub fn load_one(kind: CredentialKind) -> Result<Option<String>, SceneError> {
    match entry(kind)?.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => {
            info!("No credential stored for {}", kind.service());
            Ok(None)
        }
        Err(e) => {
            warn!("Failed to get password for {}: {}", kind.service(), e);
            Err(SceneError::Keychain(e.to_string()))
        }
    }
}

pub fn clear_one(kind: CredentialKind) -> Result<(), SceneError> {
    match entry(kind)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => {
            warn!("Failed to delete credential for {}: {}", kind.service(), e);
            Err(SceneError::Keychain(e.to_string()))
        }
    }
}

/// Store every non-empty token; empty tokens clear their entry.
pub fn store(creds: &Credentials) -> Result<(), SceneError> {
    for kind in CredentialKind::ALL {
        let value = kind.get(creds);
        if value.is_empty() {
            clear_one(kind)?;
        } else {
            store_one(kind, &value)?;
        }
    }
    Ok(())
}

/// Load all tokens. Missing entries load as empty strings.
pub fn load() -> Result<Credentials, SceneError> {
    let mut creds = Credentials::default();
    for kind in CredentialKind::ALL {
        if let Some(value) = load_one(kind)? {
            kind.set(&mut creds, value);
        }
    }
    Ok(creds)
}

pub fn clear() -> Result<(), SceneError> {
    for kind in CredentialKind::ALL {
        clear_one(kind)?;
    }
    Ok(())
}
