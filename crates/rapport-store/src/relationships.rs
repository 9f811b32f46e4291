//! Friend requests and friendships.
//!
//! Set membership is expressed through `UNIQUE` constraints, so every change
//! is an "insert if absent" or "delete if present" statement. Accepting a
//! request touches both users' rows and runs inside one transaction.

use chrono::Utc;
use rapport_shared::{RequestOutcome, UserId};
use rusqlite::{params, OptionalExtension};

use crate::columns::{ts_to_sql, user_id_from_sql};
use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    /// Add `sender` to `receiver`'s pending set.
    pub fn insert_friend_request(
        &mut self,
        sender: &UserId,
        receiver: &UserId,
    ) -> Result<RequestOutcome> {
        let tx = self.conn_mut().transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO friend_requests (requester_id, receiver_id, created_at)
             SELECT ?1, ?2, ?3
             WHERE NOT EXISTS (
                 SELECT 1 FROM friendships WHERE user_id = ?2 AND friend_id = ?1
             )",
            params![sender.to_string(), receiver.to_string(), ts_to_sql(&Utc::now())],
        )?;

        let outcome = if inserted == 1 {
            RequestOutcome::Created
        } else if friendship_exists(&tx, receiver, sender)? {
            RequestOutcome::AlreadyFriends
        } else {
            RequestOutcome::AlreadyPending
        };

        tx.commit()?;
        Ok(outcome)
    }

    /// Move a pending request from `sender` into a symmetric friendship.
    ///
    /// Returns `false` without touching anything when `sender` is not in
    /// `user`'s pending set. A request in the opposite direction, if any, is
    /// cleared as well so the pair is never both pending and friends.
    pub fn accept_friend_request(&mut self, user: &UserId, sender: &UserId) -> Result<bool> {
        let tx = self.conn_mut().transaction()?;

        let removed = tx.execute(
            "DELETE FROM friend_requests WHERE requester_id = ?1 AND receiver_id = ?2",
            params![sender.to_string(), user.to_string()],
        )?;
        if removed == 0 {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM friend_requests WHERE requester_id = ?1 AND receiver_id = ?2",
            params![user.to_string(), sender.to_string()],
        )?;

        let now = ts_to_sql(&Utc::now());
        for (a, b) in [(user, sender), (sender, user)] {
            tx.execute(
                "INSERT OR IGNORE INTO friendships (user_id, friend_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![a.to_string(), b.to_string(), now],
            )?;
        }

        tx.commit()?;
        Ok(true)
    }

    /// Requesters waiting on `user`, oldest first.
    pub fn pending_requesters(&self, user: &UserId) -> Result<Vec<UserId>> {
        self.collect_ids(
            "SELECT requester_id FROM friend_requests
             WHERE receiver_id = ?1
             ORDER BY seq ASC",
            user,
        )
    }

    /// Friends of `user`, in the order the friendships were established.
    pub fn friends_of(&self, user: &UserId) -> Result<Vec<UserId>> {
        self.collect_ids(
            "SELECT friend_id FROM friendships
             WHERE user_id = ?1
             ORDER BY seq ASC",
            user,
        )
    }

    pub fn are_friends(&self, a: &UserId, b: &UserId) -> Result<bool> {
        Ok(friendship_exists(self.conn(), a, b)?)
    }

    fn collect_ids(&self, sql: &str, user: &UserId) -> Result<Vec<UserId>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params![user.to_string()], |row| {
            let raw: String = row.get(0)?;
            user_id_from_sql(0, &raw)
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

fn friendship_exists(
    conn: &rusqlite::Connection,
    user: &UserId,
    friend: &UserId,
) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM friendships WHERE user_id = ?1 AND friend_id = ?2",
            params![user.to_string(), friend.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}
