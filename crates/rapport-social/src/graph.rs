//! Friend-request handshake.
//!
//! Per ordered pair (requester, receiver) the states are
//! `NONE -> REQUESTED -> FRIENDS`. `FRIENDS` is terminal: there is no decline
//! or unfriend operation, and a new request between friends is rejected.

use std::sync::Arc;

use rapport_shared::{
    RapportError, RelationshipStore, RequestOutcome, Result, UserDirectory, UserId, UserSummary,
};
use tracing::{debug, info, warn};

pub struct RelationshipGraph {
    directory: Arc<dyn UserDirectory>,
    store: Arc<dyn RelationshipStore>,
}

impl RelationshipGraph {
    pub fn new(directory: Arc<dyn UserDirectory>, store: Arc<dyn RelationshipStore>) -> Self {
        Self { directory, store }
    }

    /// Put `sender` in `receiver`'s pending set.
    ///
    /// Fails with `InvalidArgument` for a self request, `NotFound` if either
    /// user is unknown, and `DuplicateRequest` if the request is already
    /// pending or the two are already friends.
    pub fn send_friend_request(&self, sender: &UserId, receiver: &UserId) -> Result<()> {
        if sender == receiver {
            return Err(RapportError::InvalidArgument(
                "cannot send a friend request to yourself".into(),
            ));
        }
        self.require_user(sender)?;
        self.require_user(receiver)?;

        match self.store.insert_pending(sender, receiver)? {
            RequestOutcome::Created => {
                info!(sender = %sender, receiver = %receiver, "friend request sent");
                Ok(())
            }
            outcome => {
                debug!(sender = %sender, receiver = %receiver, ?outcome, "friend request rejected");
                Err(RapportError::DuplicateRequest {
                    sender: *sender,
                    receiver: *receiver,
                })
            }
        }
    }

    /// `user` accepts the pending request from `sender`.
    ///
    /// The pending entry is removed and the friendship recorded on both
    /// sides in one atomic step. Accepting a request that was never sent
    /// fails with `NoPendingRequest` and changes nothing.
    pub fn accept_friend_request(&self, user: &UserId, sender: &UserId) -> Result<()> {
        if user == sender {
            return Err(RapportError::InvalidArgument(
                "cannot accept a friend request from yourself".into(),
            ));
        }
        self.require_user(user)?;
        self.require_user(sender)?;

        if !self.store.accept_pending(user, sender)? {
            return Err(RapportError::NoPendingRequest {
                user: *user,
                sender: *sender,
            });
        }

        info!(user = %user, sender = %sender, "friend request accepted");
        Ok(())
    }

    /// Users waiting for `user` to accept, oldest request first.
    pub fn list_pending_requests(&self, user: &UserId) -> Result<Vec<UserSummary>> {
        self.require_user(user)?;
        let ids = self.store.pending_requesters(user)?;
        self.resolve(ids)
    }

    pub fn list_friends(&self, user: &UserId) -> Result<Vec<UserSummary>> {
        self.require_user(user)?;
        let ids = self.store.friends_of(user)?;
        self.resolve(ids)
    }

    /// Raw identifier sets for `user`: (pending requesters, friends).
    pub fn edges(&self, user: &UserId) -> Result<(Vec<UserId>, Vec<UserId>)> {
        self.require_user(user)?;
        Ok((
            self.store.pending_requesters(user)?,
            self.store.friends_of(user)?,
        ))
    }

    pub fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool> {
        self.store.are_friends(a, b)
    }

    fn require_user(&self, id: &UserId) -> Result<()> {
        if self.directory.exists(id)? {
            Ok(())
        } else {
            Err(RapportError::NotFound(*id))
        }
    }

    fn resolve(&self, ids: Vec<UserId>) -> Result<Vec<UserSummary>> {
        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            match self.directory.summary(&id)? {
                Some(summary) => summaries.push(summary),
                None => warn!(user = %id, "edge points at a user the directory cannot resolve"),
            }
        }
        Ok(summaries)
    }
}
