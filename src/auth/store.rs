use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;

/// User record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub created_at: OffsetDateTime,
}

/// Fields the pipeline supplies on creation; id and created_at are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's uniqueness constraint rejected the insert. Two
    /// registrations can race past the pre-insert lookup; this is the
    /// authoritative signal.
    #[error("email already registered")]
    UniqueViolation,

    #[error("store backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

/// Persistence boundary for user records. Backed by Postgres in
/// production and by an in-memory map in pipeline tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;
}

#[cfg(test)]
pub(crate) mod mem {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-memory store mirroring the Postgres behavior, including the
    /// case-insensitive uniqueness constraint. Counts calls so tests can
    /// assert the store was never touched.
    #[derive(Default)]
    pub struct MemStore {
        users: Mutex<Vec<User>>,
        pub lookups: AtomicUsize,
        pub inserts: AtomicUsize,
    }

    impl MemStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl UserStore for MemStore {
        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            if users
                .iter()
                .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
            {
                return Err(StoreError::UniqueViolation);
            }
            let user = User {
                id: users.len() as i64 + 1,
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                created_at: OffsetDateTime::now_utc(),
            };
            users.push(user.clone());
            Ok(user)
        }
    }
}
