use thiserror::Error;

use crate::types::UserId;

/// Failure kinds surfaced by the relationship graph and the conversation log.
///
/// Every variant is distinct so the transport layer can map it to its own
/// response; none of them is retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RapportError {
    /// A referenced user identifier does not resolve.
    #[error("User not found: {0}")]
    NotFound(UserId),

    /// A request from `sender` to `receiver` is already pending, or the two
    /// users are already friends.
    #[error("Friend request already sent from {sender} to {receiver}")]
    DuplicateRequest { sender: UserId, receiver: UserId },

    /// Accepting a request that was never sent.
    #[error("No pending friend request from {sender} to {user}")]
    NoPendingRequest { user: UserId, sender: UserId },

    /// Messaging between non-friends while friendship is required.
    #[error("Users {sender} and {receiver} are not friends")]
    NotFriends { sender: UserId, receiver: UserId },

    /// Empty text, self-referential request, malformed identifier.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Any fault below the persistence boundary.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, RapportError>;
