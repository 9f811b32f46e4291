//! Shared, thread-safe access to one [`Database`].
//!
//! The handle is built once at startup and cloned into every component that
//! needs persistence. Each call holds the connection lock for the duration of
//! a single statement or transaction.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rapport_shared::{
    Dyad, Message, MessageStore, RelationshipStore, RequestOutcome, UserDirectory, UserId,
    UserSummary,
};

use crate::database::Database;
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct StoreHandle {
    db: Arc<Mutex<Database>>,
}

impl StoreHandle {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        Database::open_at(path).map(Self::new)
    }

    pub fn open_in_memory() -> Result<Self> {
        Database::open_in_memory().map(Self::new)
    }

    /// Run `f` with exclusive access to the database.
    pub fn with<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut guard = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut guard)
    }
}

impl UserDirectory for StoreHandle {
    fn exists(&self, id: &UserId) -> rapport_shared::Result<bool> {
        Ok(self.with(|db| db.user_exists(id))?)
    }

    fn summary(&self, id: &UserId) -> rapport_shared::Result<Option<UserSummary>> {
        Ok(self.with(|db| db.user_summary(id))?)
    }
}

impl RelationshipStore for StoreHandle {
    fn insert_pending(
        &self,
        sender: &UserId,
        receiver: &UserId,
    ) -> rapport_shared::Result<RequestOutcome> {
        Ok(self.with(|db| db.insert_friend_request(sender, receiver))?)
    }

    fn accept_pending(&self, user: &UserId, sender: &UserId) -> rapport_shared::Result<bool> {
        Ok(self.with(|db| db.accept_friend_request(user, sender))?)
    }

    fn pending_requesters(&self, user: &UserId) -> rapport_shared::Result<Vec<UserId>> {
        Ok(self.with(|db| db.pending_requesters(user))?)
    }

    fn friends_of(&self, user: &UserId) -> rapport_shared::Result<Vec<UserId>> {
        Ok(self.with(|db| db.friends_of(user))?)
    }

    fn are_friends(&self, a: &UserId, b: &UserId) -> rapport_shared::Result<bool> {
        Ok(self.with(|db| db.are_friends(a, b))?)
    }
}

impl MessageStore for StoreHandle {
    fn append_message(&self, message: &Message) -> rapport_shared::Result<()> {
        Ok(self.with(|db| db.insert_message(message))?)
    }

    fn conversation(&self, dyad: &Dyad) -> rapport_shared::Result<Vec<Message>> {
        Ok(self.with(|db| db.get_conversation(dyad))?)
    }

    fn latest_timestamp(&self) -> rapport_shared::Result<Option<DateTime<Utc>>> {
        Ok(self.with(|db| db.latest_message_timestamp())?)
    }
}
