// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket tracker trait for the board tickets are filed on.

use std::path::Path;

use async_trait::async_trait;

use crate::error::BridgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CommentRef, NewTicket, SenderId, Ticket, TicketId};

/// Adapter over the external ticket tracker.
///
/// Each operation reports its own error variant so the engine can log which
/// step of a chain failed. None of the operations are atomic with each other.
#[async_trait]
pub trait TicketTracker: PluginAdapter {
    /// Creates a ticket. Fails with [`BridgeError::CreateFailed`].
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket, BridgeError>;

    /// Records the sender identity on a ticket. Fails with [`BridgeError::FieldUpdateFailed`].
    async fn set_custom_field(&self, ticket: &TicketId, sender: &SenderId)
        -> Result<(), BridgeError>;

    /// Appends a comment. Fails with [`BridgeError::CommentFailed`].
    async fn add_comment(&self, ticket: &TicketId, text: &str) -> Result<CommentRef, BridgeError>;

    /// Uploads a local file as an attachment. Fails with [`BridgeError::AttachFailed`].
    async fn attach_file(
        &self,
        ticket: &TicketId,
        path: &Path,
        display_name: &str,
    ) -> Result<(), BridgeError>;

    /// Fetches a ticket. Fails with [`BridgeError::TicketNotFound`] when it is gone.
    async fn fetch_ticket(&self, ticket: &TicketId) -> Result<Ticket, BridgeError>;
}
