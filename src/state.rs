// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::identity::IdentityClient;
use crate::storage::SocialDb;

/// Session-token configuration shared with the `Auth` extractor.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub secure_cookies: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SocialDb>,
    /// `None` when CHAT_API_URL/CHAT_API_KEY are unset; sync is skipped.
    pub identity: Option<Arc<IdentityClient>>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(db: SocialDb, identity: Option<IdentityClient>, auth: AuthConfig) -> Self {
        Self {
            db: Arc::new(db),
            identity: identity.map(Arc::new),
            auth,
        }
    }
}
