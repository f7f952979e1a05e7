use std::sync::Arc;

use tracing::{info, warn};

use crate::api::HeroApi;
use crate::auth::TokenStore;
use crate::error::{Error, Result};

/// Exchanges credentials for a session token and keeps it.
pub struct LoginService {
    api: Arc<dyn HeroApi>,
    tokens: Arc<dyn TokenStore>,
}

impl LoginService {
    pub fn new(api: Arc<dyn HeroApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { api, tokens }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::RequestConstructionFailed);
        }

        let token = self.api.login(username, password).await.map_err(|e| {
            warn!(error = %e, "Login failed");
            e
        })?;

        self.tokens.set_token(&token).map_err(|e| {
            warn!(error = %e, "Failed to store session token");
            Error::store(format!("{:#}", e))
        })?;

        info!("Logged in");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.tokens.has_token()
    }
}
