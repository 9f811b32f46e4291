//! v001 -- Initial schema creation.
//!
//! Creates `users`, `friend_requests`, `friendships` and `messages`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,              -- bcrypt
    created_at    TEXT NOT NULL               -- RFC-3339, micros, UTC
);

-- ----------------------------------------------------------------
-- Pending friend requests (receiver's incoming set)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS friend_requests (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    requester_id TEXT NOT NULL,
    receiver_id  TEXT NOT NULL,
    created_at   TEXT NOT NULL,

    UNIQUE (requester_id, receiver_id),
    CHECK (requester_id <> receiver_id),
    FOREIGN KEY (requester_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (receiver_id)  REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_friend_requests_receiver
    ON friend_requests(receiver_id, seq);

-- ----------------------------------------------------------------
-- Friendships, one row per direction
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS friendships (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT NOT NULL,
    friend_id  TEXT NOT NULL,
    created_at TEXT NOT NULL,

    UNIQUE (user_id, friend_id),
    CHECK (user_id <> friend_id),
    FOREIGN KEY (user_id)   REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (friend_id) REFERENCES users(id) ON DELETE CASCADE
);

-- ----------------------------------------------------------------
-- Messages (append-only). Participants are not foreign keys: the log
-- accepts any well-formed identifier.
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    id          TEXT NOT NULL UNIQUE,         -- UUID v4
    sender_id   TEXT NOT NULL,
    receiver_id TEXT NOT NULL,
    dyad        TEXT NOT NULL,                -- "<low>:<high>"
    text        TEXT NOT NULL CHECK (length(text) > 0),
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_dyad_ts
    ON messages(dyad, created_at, seq);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
