// SPDX-License-Identifier: MIT

//! User records and their operations on the embedded database.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::db::{SocialDb, StorageError, StorageResult, EMAIL_INDEX, USERS};

/// User record as persisted.
///
/// `password_hash` is an Argon2 PHC string; it never leaves the storage
/// layer (API projections live in `models`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    pub full_name: String,
    /// Unique, indexed lowercased
    pub email: String,
    pub password_hash: String,
    /// Placeholder avatar URL assigned at signup
    pub profile_pic: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub native_language: String,
    #[serde(default)]
    pub learning_language: String,
    #[serde(default)]
    pub location: String,
    /// Flipped once the profile-completion step is done
    pub is_onboarded: bool,
    /// Unordered, unique set of mutually-accepted user ids
    #[serde(default)]
    pub friends: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// Fresh signup record: not onboarded, no friends, empty profile.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        profile_pic: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            full_name: full_name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            profile_pic: profile_pic.into(),
            bio: String::new(),
            native_language: String::new(),
            learning_language: String::new(),
            location: String::new(),
            is_onboarded: false,
            friends: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_friend_of(&self, user_id: &str) -> bool {
        self.friends.iter().any(|id| id == user_id)
    }
}

impl SocialDb {
    /// Persist a new user. The email-uniqueness check and both inserts share
    /// one write transaction.
    pub fn create_user(&self, user: &StoredUser) -> StorageResult<()> {
        let email_key = user.email.to_lowercase();
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut email_table = write_txn.open_table(EMAIL_INDEX)?;
            if email_table.get(email_key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "User with email {}",
                    user.email
                )));
            }
            email_table.insert(email_key.as_str(), user.id.as_str())?;

            let mut users_table = write_txn.open_table(USERS)?;
            users_table.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a user by id.
    pub fn get_user(&self, user_id: &str) -> StorageResult<StoredUser> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!("User {user_id}"))),
        }
    }

    /// Look up a user by email (case-insensitive).
    pub fn get_user_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let email_key = email.to_lowercase();
        let read_txn = self.db.begin_read()?;
        let email_table = read_txn.open_table(EMAIL_INDEX)?;

        let user_id = match email_table.get(email_key.as_str())? {
            Some(v) => v.value().to_string(),
            None => return Ok(None),
        };

        let users_table = read_txn.open_table(USERS)?;
        match users_table.get(user_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Overwrite an existing user record.
    pub fn update_user(&self, user: &StoredUser) -> StorageResult<()> {
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(USERS)?;
            if table.get(user.id.as_str())?.is_none() {
                return Err(StorageError::NotFound(format!("User {}", user.id)));
            }
            table.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// All users, unordered.
    pub fn list_users(&self) -> StorageResult<Vec<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;

        let mut users = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            users.push(serde_json::from_slice(entry.1.value())?);
        }
        Ok(users)
    }

    /// Resolve a user's friend set to full records.
    ///
    /// Dangling friend ids are skipped rather than failing the whole read.
    pub fn friends_of(&self, user_id: &str) -> StorageResult<Vec<StoredUser>> {
        let user = self.get_user(user_id)?;

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;

        let mut friends = Vec::with_capacity(user.friends.len());
        for friend_id in &user.friends {
            if let Some(value) = table.get(friend_id.as_str())? {
                friends.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(friends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (SocialDb, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let db = SocialDb::open(&dir.path().join("social.redb")).expect("open db");
        (db, dir)
    }

    fn sample_user(name: &str, email: &str) -> StoredUser {
        StoredUser::new(name, email, "$argon2id$fake", "https://avatars.test/1.png")
    }

    #[test]
    fn create_and_get_user() {
        let (db, _dir) = test_db();
        let user = sample_user("Ana", "ana@x.com");
        db.create_user(&user).unwrap();

        let loaded = db.get_user(&user.id).unwrap();
        assert_eq!(loaded, user);
        assert!(!loaded.is_onboarded);
        assert!(loaded.friends.is_empty());
    }

    #[test]
    fn duplicate_email_rejected_case_insensitively() {
        let (db, _dir) = test_db();
        db.create_user(&sample_user("Ana", "ana@x.com")).unwrap();

        let result = db.create_user(&sample_user("Impostor", "ANA@X.COM"));
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        // Exactly one user persisted.
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn get_user_by_email_is_case_insensitive() {
        let (db, _dir) = test_db();
        let user = sample_user("Ana", "Ana@X.com");
        db.create_user(&user).unwrap();

        let found = db.get_user_by_email("ana@x.com").unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));

        assert!(db.get_user_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn update_user_requires_existing_record() {
        let (db, _dir) = test_db();
        let mut user = sample_user("Ana", "ana@x.com");

        let result = db.update_user(&user);
        assert!(matches!(result, Err(StorageError::NotFound(_))));

        db.create_user(&user).unwrap();
        user.bio = "hello".into();
        user.is_onboarded = true;
        db.update_user(&user).unwrap();

        let loaded = db.get_user(&user.id).unwrap();
        assert_eq!(loaded.bio, "hello");
        assert!(loaded.is_onboarded);
    }

    #[test]
    fn friends_of_resolves_records_and_skips_dangling() {
        let (db, _dir) = test_db();
        let mut ana = sample_user("Ana", "ana@x.com");
        let bo = sample_user("Bo", "bo@x.com");
        db.create_user(&bo).unwrap();

        ana.friends = vec![bo.id.clone(), "missing-id".to_string()];
        db.create_user(&ana).unwrap();

        let friends = db.friends_of(&ana.id).unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, bo.id);
    }
}
