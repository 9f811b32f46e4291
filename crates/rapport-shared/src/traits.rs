//! Collaborator traits consumed by the social core.
//!
//! The store crate implements all three over a single SQLite handle; tests
//! and alternative backends can provide their own.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{Dyad, Message, RequestOutcome, UserId, UserSummary};

/// Resolves user identifiers. Owned by whoever manages accounts.
pub trait UserDirectory: Send + Sync {
    fn exists(&self, id: &UserId) -> Result<bool>;

    fn summary(&self, id: &UserId) -> Result<Option<UserSummary>>;
}

/// Pending-request and friendship edges.
///
/// Implementations must apply each method atomically: membership changes are
/// "insert if absent" / "remove if present", never read-modify-write.
pub trait RelationshipStore: Send + Sync {
    /// Record `sender` in `receiver`'s pending set unless it is already there
    /// or the two are already friends.
    fn insert_pending(&self, sender: &UserId, receiver: &UserId) -> Result<RequestOutcome>;

    /// Remove `sender` from `user`'s pending set and record the friendship on
    /// both sides, as one unit. Returns `false` (and changes nothing) when no
    /// such pending entry exists.
    fn accept_pending(&self, user: &UserId, sender: &UserId) -> Result<bool>;

    /// Requesters pending on `user`, oldest first.
    fn pending_requesters(&self, user: &UserId) -> Result<Vec<UserId>>;

    /// Friends of `user`, in the order the friendships were established.
    fn friends_of(&self, user: &UserId) -> Result<Vec<UserId>>;

    fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool>;
}

/// Append-only message log.
pub trait MessageStore: Send + Sync {
    fn append_message(&self, message: &Message) -> Result<()>;

    /// All messages of the dyad, ascending by creation time then insertion.
    fn conversation(&self, dyad: &Dyad) -> Result<Vec<Message>>;

    /// Creation time of the most recently stored message, if any.
    fn latest_timestamp(&self) -> Result<Option<DateTime<Utc>>>;
}
