//! # rapport-social
//!
//! The two stateful pieces of Rapport:
//!
//! - [`RelationshipGraph`] runs the friend-request handshake
//!   (`NONE -> REQUESTED -> FRIENDS`) and keeps friendships symmetric.
//! - [`ConversationLog`] appends direct messages and returns the messages of
//!   a pair of users in chronological order.
//!
//! Neither component knows about the other. Both receive their collaborators
//! (a [`UserDirectory`] and a store) at construction time.
//!
//! [`UserDirectory`]: rapport_shared::UserDirectory

pub mod clock;
pub mod conversation;
pub mod graph;
pub mod policy;

pub use clock::MonotonicClock;
pub use conversation::ConversationLog;
pub use graph::RelationshipGraph;
pub use policy::SocialPolicy;

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;
    use rapport_shared::UserId;
    use rapport_store::{StoreHandle, User};

    pub(crate) fn store() -> StoreHandle {
        StoreHandle::open_in_memory().expect("in-memory store")
    }

    pub(crate) fn register(store: &StoreHandle, name: &str) -> UserId {
        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        store.with(|db| db.create_user(&user)).expect("create user");
        user.id
    }
}
