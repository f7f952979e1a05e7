use std::sync::RwLock;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

/// Default keychain service name
pub const SERVICE_NAME: &str = "herocache";

/// Keychain account holding the session token
const TOKEN_ACCOUNT: &str = "session-token";

/// A single, process-wide slot for the opaque session token.
pub trait TokenStore: Send + Sync {
    fn set_token(&self, token: &str) -> Result<()>;

    /// The stored token, if any
    fn token(&self) -> Option<String>;

    /// Remove the token. Removing an absent token succeeds.
    fn delete_token(&self) -> Result<()>;

    fn has_token(&self) -> bool {
        self.token().is_some()
    }
}

/// Token stored in the OS keychain
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn set_token(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")?;
        debug!(service = %self.service, "Stored session token in keychain");
        Ok(())
    }

    fn token(&self) -> Option<String> {
        match self.entry().and_then(|e| {
            e.get_password()
                .context("Failed to retrieve token from keychain")
        }) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!(error = %e, "No session token available");
                None
            }
        }
    }

    fn delete_token(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// Token held in memory only; lost when the process exits.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn set_token(&self, token: &str) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| anyhow::anyhow!("Token slot lock poisoned"))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn token(&self) -> Option<String> {
        self.slot.read().ok().and_then(|slot| slot.clone())
    }

    fn delete_token(&self) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| anyhow::anyhow!("Token slot lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}
