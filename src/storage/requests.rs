// SPDX-License-Identifier: MIT

//! Friend-request records and lifecycle operations.
//!
//! A request moves `pending → accepted` and never backward. Acceptance is a
//! single write transaction covering the status flip and both symmetric
//! friend-set inserts, so the mutual-friendship invariant survives a crash
//! between writes.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::db::{SocialDb, StorageError, StorageResult, FRIEND_REQUESTS, REQUEST_PAIR_INDEX, USERS};
use super::users::StoredUser;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
}

/// Friend request as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFriendRequest {
    /// Unique request identifier (UUID)
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key for the unordered-pair index: the two ids sorted and joined.
fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

impl SocialDb {
    /// Create a pending request from `sender_id` to `recipient_id`.
    ///
    /// The pair-index check and both inserts share one write transaction;
    /// a request already existing between the pair, in either direction and
    /// any status, fails with `AlreadyExists`.
    pub fn create_friend_request(
        &self,
        sender_id: &str,
        recipient_id: &str,
    ) -> StorageResult<StoredFriendRequest> {
        let now = Utc::now();
        let request = StoredFriendRequest {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let key = pair_key(sender_id, recipient_id);
        let json = serde_json::to_vec(&request)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut pair_table = write_txn.open_table(REQUEST_PAIR_INDEX)?;
            if pair_table.get(key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(
                    "A friend request already exists between you and this user".to_string(),
                ));
            }
            pair_table.insert(key.as_str(), request.id.as_str())?;

            let mut requests_table = write_txn.open_table(FRIEND_REQUESTS)?;
            requests_table.insert(request.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(request)
    }

    /// Look up a request by id.
    pub fn get_friend_request(&self, request_id: &str) -> StorageResult<StoredFriendRequest> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FRIEND_REQUESTS)?;
        match table.get(request_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!(
                "Friend request {request_id}"
            ))),
        }
    }

    /// Accept a request: flip the status and link both friend sets, all in
    /// one write transaction.
    ///
    /// Idempotent: re-accepting an already-accepted request re-asserts the
    /// friend links and succeeds, so a retry after a failed response cannot
    /// leave the graph half-linked.
    pub fn accept_friend_request(&self, request_id: &str) -> StorageResult<StoredFriendRequest> {
        let write_txn = self.db.begin_write()?;
        let accepted = {
            let mut requests_table = write_txn.open_table(FRIEND_REQUESTS)?;

            let existing_bytes = {
                let existing = requests_table.get(request_id)?.ok_or_else(|| {
                    StorageError::NotFound(format!("Friend request {request_id}"))
                })?;
                existing.value().to_vec()
            };

            let mut request: StoredFriendRequest = serde_json::from_slice(&existing_bytes)?;
            request.status = RequestStatus::Accepted;
            request.updated_at = Utc::now();

            let json = serde_json::to_vec(&request)?;
            requests_table.insert(request_id, json.as_slice())?;

            let mut users_table = write_txn.open_table(USERS)?;
            link_friends(&mut users_table, &request.sender_id, &request.recipient_id)?;
            link_friends(&mut users_table, &request.recipient_id, &request.sender_id)?;

            request
        };
        write_txn.commit()?;
        Ok(accepted)
    }

    /// Pending requests addressed to `user_id`.
    pub fn incoming_pending_requests(
        &self,
        user_id: &str,
    ) -> StorageResult<Vec<StoredFriendRequest>> {
        self.filter_requests(|r| r.recipient_id == user_id && r.status == RequestStatus::Pending)
    }

    /// Accepted requests that `user_id` originally sent.
    pub fn accepted_requests_sent_by(
        &self,
        user_id: &str,
    ) -> StorageResult<Vec<StoredFriendRequest>> {
        self.filter_requests(|r| r.sender_id == user_id && r.status == RequestStatus::Accepted)
    }

    /// Pending requests that `user_id` sent.
    pub fn outgoing_pending_requests(
        &self,
        user_id: &str,
    ) -> StorageResult<Vec<StoredFriendRequest>> {
        self.filter_requests(|r| r.sender_id == user_id && r.status == RequestStatus::Pending)
    }

    fn filter_requests(
        &self,
        keep: impl Fn(&StoredFriendRequest) -> bool,
    ) -> StorageResult<Vec<StoredFriendRequest>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FRIEND_REQUESTS)?;

        let mut requests = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            let request: StoredFriendRequest = serde_json::from_slice(entry.1.value())?;
            if keep(&request) {
                requests.push(request);
            }
        }
        Ok(requests)
    }
}

/// Insert `friend_id` into `user_id`'s friend set if absent.
fn link_friends(
    users_table: &mut redb::Table<'_, &'static str, &'static [u8]>,
    user_id: &str,
    friend_id: &str,
) -> StorageResult<()> {
    let existing_bytes = {
        let existing = users_table
            .get(user_id)?
            .ok_or_else(|| StorageError::NotFound(format!("User {user_id}")))?;
        existing.value().to_vec()
    };

    let mut user: StoredUser = serde_json::from_slice(&existing_bytes)?;
    if !user.is_friend_of(friend_id) {
        user.friends.push(friend_id.to_string());
        user.updated_at = Utc::now();
        let json = serde_json::to_vec(&user)?;
        users_table.insert(user_id, json.as_slice())?;
    }
    Ok(())
}
