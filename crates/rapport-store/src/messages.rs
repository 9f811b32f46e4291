use chrono::{DateTime, Utc};
use rapport_shared::{Dyad, Message, MessageId};
use rusqlite::{params, OptionalExtension};

use crate::columns::{ts_from_sql, ts_to_sql, user_id_from_sql, uuid_from_sql};
use crate::database::Database;
use crate::error::Result;

impl Database {
    pub fn insert_message(&self, message: &Message) -> Result<()> {
        self.conn().execute(
            "INSERT INTO messages (id, sender_id, receiver_id, dyad, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.id.to_string(),
                message.sender_id.to_string(),
                message.receiver_id.to_string(),
                message.dyad().key(),
                message.text,
                ts_to_sql(&message.created_at),
            ],
        )?;
        Ok(())
    }

    /// Every message exchanged within `dyad`, oldest first. Messages sharing
    /// a timestamp come back in insertion order.
    pub fn get_conversation(&self, dyad: &Dyad) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, sender_id, receiver_id, text, created_at
             FROM messages
             WHERE dyad = ?1
             ORDER BY created_at ASC, seq ASC",
        )?;

        let rows = stmt.query_map(params![dyad.key()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    pub fn latest_message_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT created_at FROM messages ORDER BY created_at DESC, seq DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.map(|s| ts_from_sql(0, &s)).transpose()?)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let sender_str: String = row.get(1)?;
    let receiver_str: String = row.get(2)?;
    let text: String = row.get(3)?;
    let ts_str: String = row.get(4)?;

    Ok(Message {
        id: MessageId(uuid_from_sql(0, &id_str)?),
        sender_id: user_id_from_sql(1, &sender_str)?,
        receiver_id: user_id_from_sql(2, &receiver_str)?,
        text,
        created_at: ts_from_sql(4, &ts_str)?,
    })
}
