// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sender-to-ticket lookups and upserts.

use cardbridge_core::BridgeError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Ticket id currently associated with a sender.
pub async fn get_ticket(db: &Database, sender_id: &str) -> Result<Option<String>, BridgeError> {
    let sender_id = sender_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT ticket_id FROM conversation_state WHERE sender_id = ?1",
                params![sender_id],
                |row| row.get(0),
            );
            match result {
                Ok(ticket_id) => Ok(Some(ticket_id)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the ticket for a sender.
pub async fn upsert_ticket(
    db: &Database,
    sender_id: &str,
    ticket_id: &str,
) -> Result<(), BridgeError> {
    let sender_id = sender_id.to_string();
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversation_state (sender_id, ticket_id, updated_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(sender_id) DO UPDATE SET
                     ticket_id = excluded.ticket_id,
                     updated_at = excluded.updated_at",
                params![sender_id, ticket_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete the entry for a sender. Returns whether a row was removed.
pub async fn delete_ticket(db: &Database, sender_id: &str) -> Result<bool, BridgeError> {
    let sender_id = sender_id.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute(
                "DELETE FROM conversation_state WHERE sender_id = ?1",
                params![sender_id],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}
