//! Registration and credential checks.
//!
//! This is the directory side of the system: it creates the users the social
//! core refers to. Password hashing and store access run on the blocking pool.

use chrono::Utc;
use rapport_shared::UserId;
use rapport_store::{StoreHandle, User};
use tracing::info;

use crate::api::blocking;
use crate::error::ServerError;

pub async fn register(
    store: &StoreHandle,
    cost: u32,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, ServerError> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ServerError::BadRequest("All fields are required".into()));
    }

    if find_by_email(store, email).await?.is_some() {
        return Err(ServerError::UserExists);
    }

    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ServerError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| ServerError::Internal(format!("failed to hash password: {e}")))?;

    let user = User {
        id: UserId::new(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash,
        created_at: Utc::now(),
    };
    // The unique index still guards against a concurrent signup with the same email.
    let handle = store.clone();
    let user = blocking(move || {
        handle.with(|db| db.create_user(&user))?;
        Ok(user)
    })
    .await?;

    info!(user = %user.id, "user registered");
    Ok(user)
}

/// Resolve `email`/`password` to a user. Unknown email and wrong password
/// fail the same way.
pub async fn login(store: &StoreHandle, email: &str, password: &str) -> Result<User, ServerError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ServerError::BadRequest("All fields are required".into()));
    }

    let user = find_by_email(store, email.trim())
        .await?
        .ok_or(ServerError::InvalidCredentials)?;

    let password = password.to_string();
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ServerError::Internal(format!("verify task failed: {e}")))?
        .map_err(|e| ServerError::Internal(format!("stored password hash is unreadable: {e}")))?;

    if !valid {
        return Err(ServerError::InvalidCredentials);
    }

    info!(user = %user.id, "user logged in");
    Ok(user)
}

async fn find_by_email(store: &StoreHandle, email: &str) -> Result<Option<User>, ServerError> {
    let store = store.clone();
    let email = email.to_string();
    blocking(move || Ok(store.with(|db| db.find_user_by_email(&email))?)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: u32 = 4;

    #[tokio::test]
    async fn register_then_login() {
        let store = StoreHandle::open_in_memory().unwrap();
        let user = register(&store, COST, "Alice", "alice@example.com", "s3cret")
            .await
            .unwrap();
        assert_ne!(user.password_hash, "s3cret");

        let logged_in = login(&store, "alice@example.com", "s3cret").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let store = StoreHandle::open_in_memory().unwrap();
        register(&store, COST, "Alice", "alice@example.com", "s3cret")
            .await
            .unwrap();

        assert!(matches!(
            login(&store, "alice@example.com", "nope").await,
            Err(ServerError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&store, "bob@example.com", "s3cret").await,
            Err(ServerError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn corrupt_stored_hash_is_an_internal_error() {
        let store = StoreHandle::open_in_memory().unwrap();
        let user = User {
            id: UserId::new(),
            name: "Mallory".into(),
            email: "mallory@example.com".into(),
            password_hash: "not-a-bcrypt-hash".into(),
            created_at: Utc::now(),
        };
        store.with(|db| db.create_user(&user)).unwrap();

        assert!(matches!(
            login(&store, "mallory@example.com", "anything").await,
            Err(ServerError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = StoreHandle::open_in_memory().unwrap();
        register(&store, COST, "Alice", "alice@example.com", "one")
            .await
            .unwrap();
        assert!(matches!(
            register(&store, COST, "Other", "alice@example.com", "two").await,
            Err(ServerError::UserExists)
        ));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let store = StoreHandle::open_in_memory().unwrap();
        assert!(matches!(
            register(&store, COST, "", "a@example.com", "pw").await,
            Err(ServerError::BadRequest(_))
        ));
        assert!(matches!(
            login(&store, "a@example.com", "").await,
            Err(ServerError::BadRequest(_))
        ));
    }
}
