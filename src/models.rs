// SPDX-License-Identifier: MIT

//! Wire models for the JSON API.
//!
//! The wire format is camelCase; storage types live in `storage` and are
//! projected through these DTOs so credential hashes never serialize out.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{RequestStatus, StoredFriendRequest, StoredUser};

// =============================================================================
// Placeholder avatars
// =============================================================================

/// Base URL of the numbered placeholder-avatar set.
pub const PLACEHOLDER_AVATAR_BASE: &str = "https://avatar-placeholder.iran.liara.run/public";

/// Number of avatars in the placeholder set.
pub const PLACEHOLDER_AVATAR_COUNT: u32 = 100;

/// Uniform pick from the fixed placeholder set, assigned at signup.
pub fn random_avatar_url() -> String {
    let idx = rand::thread_rng().gen_range(1..=PLACEHOLDER_AVATAR_COUNT);
    format!("{PLACEHOLDER_AVATAR_BASE}/{idx}.png")
}

// =============================================================================
// Validation
// =============================================================================

/// Simple `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(email)
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Onboarding payload. All fields are required; absent ones are itemized in
/// the validation error.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnboardRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub native_language: Option<String>,
    pub learning_language: Option<String>,
    pub location: Option<String>,
}

impl OnboardRequest {
    /// Names of required fields that are missing or blank, in wire casing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.full_name) {
            missing.push("fullName");
        }
        if blank(&self.bio) {
            missing.push("bio");
        }
        if blank(&self.native_language) {
            missing.push("nativeLanguage");
        }
        if blank(&self.learning_language) {
            missing.push("learningLanguage");
        }
        if blank(&self.location) {
            missing.push("location");
        }
        missing
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Public projection of a user record.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub profile_pic: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
    pub is_onboarded: bool,
    pub friends: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            profile_pic: user.profile_pic,
            bio: user.bio,
            native_language: user.native_language,
            learning_language: user.learning_language,
            location: user.location,
            is_onboarded: user.is_onboarded,
            friends: user.friends,
            created_at: user.created_at,
        }
    }
}

/// Signup/login/onboarding envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessage {
    pub success: bool,
    pub message: String,
}

/// Friend-card projection used by friend lists and request listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendSummary {
    pub id: String,
    pub full_name: String,
    pub profile_pic: String,
    pub native_language: String,
    pub learning_language: String,
}

impl From<StoredUser> for FriendSummary {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            profile_pic: user.profile_pic,
            native_language: user.native_language,
            learning_language: user.learning_language,
        }
    }
}

/// A friend request on the wire.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl From<StoredFriendRequest> for FriendRequestResponse {
    fn from(request: StoredFriendRequest) -> Self {
        Self {
            id: request.id,
            sender: request.sender_id,
            recipient: request.recipient_id,
            status: request.status,
            created_at: request.created_at,
        }
    }
}

/// Incoming pending request with the sender projected.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequestView {
    pub id: String,
    pub sender: FriendSummary,
    pub status: RequestStatus,
}

/// Sent request with the recipient projected (accepted or still pending).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentRequestView {
    pub id: String,
    pub recipient: FriendSummary,
    pub status: RequestStatus,
}

/// Response for GET /api/users/friend-requests.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestsResponse {
    pub incoming_reqs: Vec<IncomingRequestView>,
    pub accepted_reqs: Vec<SentRequestView>,
}
