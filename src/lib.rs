// SPDX-License-Identifier: MIT

//! Polyglot - Language-Learning Social Backend
//!
//! This crate provides the JSON API behind a language-exchange app:
//! account signup/login with cookie sessions, one-time profile onboarding,
//! partner recommendations, and the friend-request workflow.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session tokens, cookies, and the `Auth` extractor
//! - `identity` - Chat-backend identity sync (outbound)
//! - `storage` - Embedded redb database (users, friend requests)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod state;
pub mod storage;
