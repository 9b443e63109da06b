// SPDX-License-Identifier: MIT

//! Axum extractor for the authenticated user.
//!
//! Use the `Auth` extractor in handlers to require a valid session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is the current StoredUser
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use super::{token, AuthError, SESSION_COOKIE};
use crate::state::AppState;
use crate::storage::{StorageError, StoredUser};

/// Extractor for the authenticated user.
///
/// Verifies the session cookie and loads the full user record, so handlers
/// have the friend set and onboarding flag without a second lookup.
pub struct Auth(pub StoredUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // First check if a layer already resolved the user
        if let Some(user) = parts.extensions.get::<StoredUser>().cloned() {
            return Ok(Auth(user));
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or(AuthError::MissingSessionCookie)?;

        let claims = token::verify_session_token(cookie.value(), &state.auth.jwt_secret)?;

        let user = state.db.get_user(&claims.sub).map_err(|e| match e {
            StorageError::NotFound(_) => AuthError::UserNotFound,
            other => AuthError::InternalError(other.to_string()),
        })?;

        Ok(Auth(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppState, AuthConfig};
    use crate::storage::SocialDb;
    use axum::http::Request;

    fn create_test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let db = SocialDb::open(&dir.path().join("social.redb")).expect("open db");
        let state = AppState::new(
            db,
            None,
            AuthConfig {
                jwt_secret: "test-secret".to_string(),
                secure_cookies: false,
            },
        );
        (state, dir)
    }

    fn parts_with_cookie(token: &str) -> Parts {
        Request::builder()
            .uri("/test")
            .header("Cookie", format!("{SESSION_COOKIE}={token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn rejects_missing_cookie() {
        let (state, _dir) = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingSessionCookie)));
    }

    #[tokio::test]
    async fn loads_user_from_valid_session() {
        let (state, _dir) = create_test_state();
        let user = StoredUser::new("Ana", "ana@x.com", "$argon2id$fake", "pic");
        state.db.create_user(&user).unwrap();

        let token = token::sign_session_token(&user.id, "test-secret").unwrap();
        let mut parts = parts_with_cookie(&token);

        let Auth(loaded) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded.email, "ana@x.com");
    }

    #[tokio::test]
    async fn rejects_token_for_deleted_user() {
        let (state, _dir) = create_test_state();
        let token = token::sign_session_token("no-such-user", "test-secret").unwrap();
        let mut parts = parts_with_cookie(&token);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn prefers_extensions() {
        let (state, _dir) = create_test_state();
        let user = StoredUser::new("Mid", "mid@x.com", "$argon2id$fake", "pic");

        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts.extensions.insert(user.clone());

        let Auth(loaded) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(loaded.id, user.id);
    }
}
