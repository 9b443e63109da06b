// SPDX-License-Identifier: MIT

//! Auth endpoints: signup, login, logout, onboarding, current user.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    auth::{clear_session_cookie, session_cookie, sign_session_token, Auth},
    error::ApiError,
    identity::IdentityProfile,
    models::{
        is_valid_email, random_avatar_url, AuthResponse, LoginRequest, OnboardRequest,
        SignupRequest, StatusMessage,
    },
    state::AppState,
    storage::{StorageError, StoredUser},
};

/// Identical body for unknown email and wrong password, so a caller cannot
/// probe which emails are registered.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

const MIN_PASSWORD_LEN: usize = 6;

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "User created, session cookie set", body = AuthResponse),
        (status = 400, description = "Validation failure or duplicate email"),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    if request.full_name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ApiError::bad_request("Please fill all the fields"));
    }

    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters long",
        ));
    }

    if !is_valid_email(&request.email) {
        return Err(ApiError::bad_request("Please enter a valid email address"));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(request.password.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            ApiError::internal("Internal server error")
        })?
        .to_string();

    let user = StoredUser::new(
        request.full_name.trim(),
        request.email.trim(),
        password_hash,
        random_avatar_url(),
    );

    state.db.create_user(&user).map_err(|e| match e {
        StorageError::AlreadyExists(_) => {
            ApiError::conflict("User with this email already exists")
        }
        other => other.into(),
    })?;

    // Best-effort at signup: a chat-backend outage must not block account
    // creation.
    if let Err(e) = sync_identity(&state, &user).await {
        warn!(user_id = %user.id, error = %e, "chat identity upsert failed during signup");
    }

    let token = sign_session_token(&user.id, &state.auth.jwt_secret)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let jar = jar.add(session_cookie(token, state.auth.secure_cookies));

    info!(user_id = %user.id, "user signed up");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            success: true,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated, session cookie set", body = AuthResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Please fill all the fields"));
    }

    let user = state
        .db
        .get_user_by_email(request.email.trim())?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    let password_ok = PasswordHash::new(&user.password_hash)
        .map(|hash| {
            Argon2::default()
                .verify_password(request.password.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false);

    if !password_ok {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = sign_session_token(&user.id, &state.auth.jwt_secret)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let jar = jar.add(session_cookie(token, state.auth.secure_cookies));

    info!(user_id = %user.id, "user logged in");
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session cookie cleared", body = StatusMessage))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<StatusMessage>) {
    let jar = jar.add(clear_session_cookie());
    (
        jar,
        Json(StatusMessage {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/api/auth/onboarding",
    request_body = OnboardRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Profile completed", body = AuthResponse),
        (status = 400, description = "Missing fields, itemized in the body"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn onboard(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<OnboardRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::missing_fields("All fields are required", missing));
    }

    let mut user = user;
    user.full_name = request.full_name.unwrap_or_default().trim().to_string();
    user.bio = request.bio.unwrap_or_default().trim().to_string();
    user.native_language = request.native_language.unwrap_or_default().trim().to_string();
    user.learning_language = request
        .learning_language
        .unwrap_or_default()
        .trim()
        .to_string();
    user.location = request.location.unwrap_or_default().trim().to_string();
    user.is_onboarded = true;
    user.updated_at = Utc::now();

    state.db.update_user(&user).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found("User not found"),
        other => other.into(),
    })?;

    // Unlike signup, a failed re-upsert here is surfaced even though the
    // user record is already updated: onboarding changes the display name
    // the chat backend shows, and silently diverging identities confused
    // support more than a retryable 500 does.
    if let Err(e) = sync_identity(&state, &user).await {
        error!(user_id = %user.id, error = %e, "chat identity upsert failed during onboarding");
        return Err(ApiError::internal("Internal server error"));
    }

    info!(user_id = %user.id, "user onboarded");
    Ok(Json(AuthResponse {
        success: true,
        user: user.into(),
    }))
}

/// Get the current authenticated user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn me(Auth(user): Auth) -> Json<AuthResponse> {
    Json(AuthResponse {
        success: true,
        user: user.into(),
    })
}

async fn sync_identity(
    state: &AppState,
    user: &StoredUser,
) -> Result<(), crate::identity::IdentityError> {
    let Some(client) = &state.identity else {
        return Ok(());
    };
    client
        .upsert(&IdentityProfile {
            id: &user.id,
            name: &user.full_name,
            image: &user.profile_pic,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SESSION_COOKIE;
    use crate::models::{PLACEHOLDER_AVATAR_BASE, PLACEHOLDER_AVATAR_COUNT};
    use crate::state::AuthConfig;
    use crate::storage::SocialDb;

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

    fn signup_request(name: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            full_name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn signup_ok(state: &AppState, name: &str, email: &str) -> AuthResponse {
        let (status, _jar, Json(response)) = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request(name, email, "secret1")),
        )
        .await
        .expect("signup succeeds");
        assert_eq!(status, StatusCode::CREATED);
        response
    }

    #[tokio::test]
    async fn signup_creates_user_with_placeholder_avatar() {
        let (state, _dir) = create_test_state();
        let response = signup_ok(&state, "Ana", "ana@x.com").await;

        assert!(response.success);
        assert!(!response.user.is_onboarded);

        let idx: u32 = response
            .user
            .profile_pic
            .strip_prefix(&format!("{PLACEHOLDER_AVATAR_BASE}/"))
            .and_then(|rest| rest.strip_suffix(".png"))
            .and_then(|n| n.parse().ok())
            .expect("avatar from placeholder set");
        assert!((1..=PLACEHOLDER_AVATAR_COUNT).contains(&idx));

        // Persisted, with the hash stored and never equal to the password.
        let stored = state.db.get_user(&response.user.id).unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn signup_sets_session_cookie() {
        let (state, _dir) = create_test_state();
        let (_status, jar, _body) = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("Ana", "ana@x.com", "secret1")),
        )
        .await
        .unwrap();

        let cookie = jar.get(SESSION_COOKIE).expect("session cookie set");
        assert!(!cookie.value().is_empty());
    }

    #[tokio::test]
    async fn signup_rejects_short_password_without_creating_user() {
        let (state, _dir) = create_test_state();
        let err = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("Ana", "ana@x.com", "12345")),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(state.db.list_users().unwrap().is_empty());
    }

    #[tokio::test]
    async fn signup_rejects_missing_fields_and_bad_email() {
        let (state, _dir) = create_test_state();

        let err = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("", "ana@x.com", "secret1")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Please fill all the fields");

        let err = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("Ana", "not-an-email", "secret1")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Please enter a valid email address");

        assert!(state.db.list_users().unwrap().is_empty());
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let (state, _dir) = create_test_state();
        signup_ok(&state, "Ana", "ana@x.com").await;

        let err = signup(
            State(state.clone()),
            CookieJar::new(),
            Json(signup_request("Other", "ana@x.com", "secret2")),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "User with this email already exists");
        assert_eq!(state.db.list_users().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_credentials() {
        let (state, _dir) = create_test_state();
        signup_ok(&state, "Ana", "ana@x.com").await;

        let (jar, Json(response)) = login(
            State(state.clone()),
            CookieJar::new(),
            Json(LoginRequest {
                email: "ana@x.com".to_string(),
                password: "secret1".to_string(),
            }),
        )
        .await
        .expect("login succeeds");

        assert!(response.success);
        assert!(jar.get(SESSION_COOKIE).is_some());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (state, _dir) = create_test_state();
        signup_ok(&state, "Ana", "ana@x.com").await;

        let unknown_email = login(
            State(state.clone()),
            CookieJar::new(),
            Json(LoginRequest {
                email: "nobody@x.com".to_string(),
                password: "secret1".to_string(),
            }),
        )
        .await
        .unwrap_err();

        let wrong_password = login(
            State(state.clone()),
            CookieJar::new(),
            Json(LoginRequest {
                email: "ana@x.com".to_string(),
                password: "wrong-password".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.message, wrong_password.message);
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let (state, _dir) = create_test_state();
        let err = login(
            State(state.clone()),
            CookieJar::new(),
            Json(LoginRequest {
                email: "ana@x.com".to_string(),
                password: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_clears_the_cookie() {
        let (jar, Json(response)) = logout(CookieJar::new()).await;
        let cookie = jar.get(SESSION_COOKIE).expect("removal cookie present");
        assert!(cookie.value().is_empty());
        assert!(response.success);
    }

    #[tokio::test]
    async fn onboarding_merges_fields_and_flips_flag() {
        let (state, _dir) = create_test_state();
        let created = signup_ok(&state, "Ana", "ana@x.com").await;
        let user = state.db.get_user(&created.user.id).unwrap();

        let Json(response) = onboard(
            State(state.clone()),
            Auth(user),
            Json(OnboardRequest {
                full_name: Some("Ana Lima".into()),
                bio: Some("hi".into()),
                native_language: Some("pt".into()),
                learning_language: Some("en".into()),
                location: Some("Lisbon".into()),
            }),
        )
        .await
        .expect("onboarding succeeds");

        assert!(response.user.is_onboarded);
        assert_eq!(response.user.full_name, "Ana Lima");

        let stored = state.db.get_user(&created.user.id).unwrap();
        assert!(stored.is_onboarded);
        assert_eq!(stored.learning_language, "en");
    }

    #[tokio::test]
    async fn onboarding_itemizes_missing_fields() {
        let (state, _dir) = create_test_state();
        let created = signup_ok(&state, "Ana", "ana@x.com").await;
        let user = state.db.get_user(&created.user.id).unwrap();

        let err = onboard(
            State(state.clone()),
            Auth(user),
            Json(OnboardRequest {
                full_name: Some("Ana".into()),
                bio: None,
                native_language: Some("pt".into()),
                learning_language: None,
                location: Some("Lisbon".into()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.missing_fields, Some(vec!["bio", "learningLanguage"]));

        // Record untouched.
        let stored = state.db.get_user(&created.user.id).unwrap();
        assert!(!stored.is_onboarded);
    }

    #[tokio::test]
    async fn me_returns_current_user() {
        let (state, _dir) = create_test_state();
        let created = signup_ok(&state, "Ana", "ana@x.com").await;
        let user = state.db.get_user(&created.user.id).unwrap();

        let Json(response) = me(Auth(user)).await;
        assert_eq!(response.user.id, created.user.id);
    }
}
