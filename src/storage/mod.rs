// SPDX-License-Identifier: MIT

//! # Persistence Module
//!
//! All state lives in a single embedded redb database (pure Rust, ACID):
//! user records with an email-uniqueness index, and friend requests with an
//! unordered-pair index. Write transactions are the concurrency discipline:
//! redb serializes writers, so check-then-create sequences and the
//! accept-request multi-write run atomically.

pub mod db;
pub mod requests;
pub mod users;

pub use db::{SocialDb, StorageError, StorageResult};
pub use requests::{RequestStatus, StoredFriendRequest};
pub use users::StoredUser;
