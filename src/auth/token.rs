// SPDX-License-Identifier: MIT

//! Session-token issuance, verification, and cookie construction.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwt";

/// Session lifetime: 7 days, for both the token `exp` and the cookie Max-Age.
const SESSION_LIFETIME_SECS: i64 = 7 * 24 * 60 * 60;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Sign a session token for `user_id`.
pub fn sign_session_token(user_id: &str, secret: &str) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + SESSION_LIFETIME_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::InternalError(format!("failed to sign session token: {e}")))
}

/// Verify a session token and return its claims.
pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::MalformedToken,
    })?;

    Ok(token_data.claims)
}

/// Build the session cookie: http-only, SameSite=Strict, 7-day Max-Age.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_LIFETIME_SECS))
        .build()
}

/// Build an expired cookie that clears the session.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn sign_and_verify_round_trip() {
        let token = sign_session_token("user-123", SECRET).unwrap();
        let claims = verify_session_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.exp - claims.iat, SESSION_LIFETIME_SECS);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_session_token("user-123", SECRET).unwrap();
        let result = verify_session_token(&token, "other-secret");
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let result = verify_session_token("not-a-jwt", SECRET);
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(SESSION_LIFETIME_SECS))
        );
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
