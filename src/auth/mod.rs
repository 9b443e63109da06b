// SPDX-License-Identifier: MIT

//! # Authentication Module
//!
//! Session-token authentication for the Polyglot API.
//!
//! ## Auth Flow
//!
//! 1. Signup/login issues an HS256 JWT (subject = user id, 7-day expiry)
//! 2. The token travels in an http-only, SameSite=Strict `jwt` cookie
//! 3. Protected handlers use the [`Auth`] extractor, which verifies the
//!    token and loads the current user from the store
//!
//! ## Security
//!
//! - Signing secret comes from `JWT_SECRET_KEY` (required at startup)
//! - The `Secure` cookie attribute is set when `APP_ENV=production`
//! - Clock skew tolerance is 60 seconds

pub mod error;
pub mod extractor;
pub mod token;

pub use error::AuthError;
pub use extractor::Auth;
pub use token::{
    clear_session_cookie, session_cookie, sign_session_token, verify_session_token, SessionClaims,
    SESSION_COOKIE,
};
