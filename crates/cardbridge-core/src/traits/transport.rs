// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat transport trait for the one-to-one messaging platform.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::BridgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ChatId, ContactInfo, InboundMessage, JoinedChannel, MediaRef, MessageId, SenderId,
};

/// Adapter over the chat platform the bridge listens on.
///
/// Connection, pairing and delivery live behind this trait; the engine only
/// uses the primitives below.
#[async_trait]
pub trait ChatTransport: PluginAdapter {
    /// Receives the next inbound message event.
    async fn receive(&self) -> Result<InboundMessage, BridgeError>;

    /// Marks messages as read in the given chat.
    async fn mark_read(
        &self,
        message_ids: &[MessageId],
        timestamp: DateTime<Utc>,
        chat: &ChatId,
        sender: &SenderId,
    ) -> Result<(), BridgeError>;

    /// Downloads the raw bytes of an attachment.
    async fn download(&self, media: &MediaRef) -> Result<Vec<u8>, BridgeError>;

    /// Sends a plain-text message to a chat.
    async fn send_text(&self, chat: &ChatId, text: &str) -> Result<MessageId, BridgeError>;

    /// Looks up the contact entry for a sender. `None` when the platform has no entry.
    async fn resolve_contact(&self, sender: &SenderId)
        -> Result<Option<ContactInfo>, BridgeError>;

    /// Lists chats and groups the bridge account has joined (diagnostics only).
    async fn list_joined_channels(&self) -> Result<Vec<JoinedChannel>, BridgeError>;
}
