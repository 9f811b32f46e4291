//! # rapport-shared
//!
//! Identifier types, the domain error taxonomy, and the collaborator traits
//! shared by the store, the social core and the HTTP server.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{RapportError, Result};
pub use traits::{MessageStore, RelationshipStore, UserDirectory};
pub use types::*;
