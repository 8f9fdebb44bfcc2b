// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cardbridge state` command implementation.
//!
//! Lets an operator repair the sender to ticket mapping: link an orphaned
//! ticket after a partial failure, or drop an entry whose ticket is gone.

use cardbridge_config::model::BridgeConfig;
use cardbridge_core::{BridgeError, ConversationStore, SenderId, TicketId};
use cardbridge_storage::SqliteConversationStore;

use crate::StateAction;

const USER_SERVER: &str = "s.whatsapp.net";

/// Accepts a bare phone number or a full address and returns the store key.
pub fn sender_id(raw: &str) -> SenderId {
    let raw = raw.trim().trim_start_matches('+');
    if raw.contains('@') {
        SenderId(raw.to_string())
    } else {
        SenderId(format!("{raw}@{USER_SERVER}"))
    }
}

pub async fn run_state(config: &BridgeConfig, action: StateAction) -> Result<(), BridgeError> {
    let store = SqliteConversationStore::new(config.storage.clone());
    store.initialize().await?;
    let result = apply(&store, action).await;
    store.close().await?;
    println!("{}", result?);
    Ok(())
}

async fn apply(store: &dyn ConversationStore, action: StateAction) -> Result<String, BridgeError> {
    match action {
        StateAction::Get { sender } => {
            let sender = sender_id(&sender);
            Ok(match store.get(&sender).await? {
                Some(ticket) => format!("{sender} -> {ticket}"),
                None => format!("{sender} has no open ticket"),
            })
        }
        StateAction::Set { sender, ticket } => {
            let sender = sender_id(&sender);
            let ticket = TicketId(ticket.trim().to_string());
            store.set(&sender, &ticket).await?;
            Ok(format!("{sender} -> {ticket}"))
        }
        StateAction::Clear { sender } => {
            let sender = sender_id(&sender);
            Ok(if store.clear(&sender).await? {
                format!("cleared {sender}")
            } else {
                format!("{sender} had no open ticket")
            })
        }
    }
}
