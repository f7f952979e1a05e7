use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::TokenStore;
use crate::error::Result;
use crate::store::HeroStore;

/// Wipes the local cache and signs the user out.
pub struct ClearData {
    store: Arc<HeroStore>,
    tokens: Arc<dyn TokenStore>,
}

impl ClearData {
    pub fn new(store: Arc<HeroStore>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { store, tokens }
    }

    /// Clear every cached record, then drop the session token.
    ///
    /// If the wipe fails the token is kept, so the user is never signed out
    /// of a cache that still holds their data.
    pub fn clear_all_and_logout(&self) -> Result<()> {
        self.store.clear_all()?;

        if let Err(e) = self.tokens.delete_token() {
            warn!(error = %e, "Cache cleared but session token could not be removed");
        }
        info!("Cleared local data and logged out");
        Ok(())
    }
}
