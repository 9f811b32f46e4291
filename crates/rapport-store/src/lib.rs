//! # rapport-store
//!
//! SQLite persistence for Rapport.
//!
//! [`Database`] wraps a `rusqlite::Connection` and provides typed CRUD
//! helpers for users, friend requests, friendships and messages.
//! [`StoreHandle`] shares one database between the relationship graph, the
//! conversation log and the account layer, and implements the collaborator
//! traits from `rapport-shared` on top of it.

pub mod database;
pub mod handle;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod relationships;
pub mod users;

mod columns;
mod error;

pub use database::Database;
pub use error::StoreError;
pub use handle::StoreHandle;
pub use models::*;
