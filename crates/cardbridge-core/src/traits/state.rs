// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state store trait.

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{SenderId, TicketId};

/// Durable mapping from sender identity to the sender's open ticket.
///
/// Keys are compared by exact string equality. Backend failures surface as
/// [`BridgeError::StoreUnavailable`], never as an absent entry.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Initializes the backend (migrations, connection).
    async fn initialize(&self) -> Result<(), BridgeError>;

    /// Flushes pending writes and releases the backend.
    async fn close(&self) -> Result<(), BridgeError>;

    /// Returns the open ticket for a sender, or `None` if there is no entry.
    async fn get(&self, sender: &SenderId) -> Result<Option<TicketId>, BridgeError>;

    /// Associates a sender with a ticket, replacing any previous entry.
    async fn set(&self, sender: &SenderId, ticket: &TicketId) -> Result<(), BridgeError>;

    /// Removes the entry for a sender. Returns whether an entry existed.
    ///
    /// Operator tooling only; the engine never clears state.
    async fn clear(&self, sender: &SenderId) -> Result<bool, BridgeError>;
}
