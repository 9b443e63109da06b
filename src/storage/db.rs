// SPDX-License-Identifier: MIT

//! Embedded social-graph database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser (JSON bytes)
//! - `email_index`: lowercased email → user_id
//! - `friend_requests`: request_id → serialized StoredFriendRequest
//! - `request_pair_index`: sorted `a|b` pair key → request_id
//!
//! The pair index enforces the at-most-one-request-per-pair invariant:
//! the existence check and the insert happen inside the same write
//! transaction, and redb serializes writers, so concurrent duplicate
//! sends cannot both commit.

use std::path::Path;

use redb::{Database, TableDefinition};

/// Primary table: user_id → serialized StoredUser (JSON bytes).
pub(super) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Index: lowercased email → user_id. Backs email uniqueness.
pub(super) const EMAIL_INDEX: TableDefinition<&str, &str> = TableDefinition::new("email_index");

/// Primary table: request_id → serialized StoredFriendRequest (JSON bytes).
pub(super) const FRIEND_REQUESTS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("friend_requests");

/// Index: sorted `a|b` pair key → request_id. One request per unordered pair.
pub(super) const REQUEST_PAIR_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("request_pair_index");

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Embedded ACID database for users and friend requests.
pub struct SocialDb {
    pub(super) db: Database,
}

impl SocialDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(FRIEND_REQUESTS)?;
            let _ = write_txn.open_table(REQUEST_PAIR_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Cheap readability probe for health checks.
    pub fn ping(&self) -> bool {
        use redb::ReadableDatabase;
        match self.db.begin_read() {
            Ok(txn) => txn.open_table(USERS).is_ok(),
            Err(_) => false,
        }
    }
}
