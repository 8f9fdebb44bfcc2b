// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the bridging engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Canonical, device-independent address of a chat participant.
///
/// Used verbatim as the conversation store key. Compared by exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderId(pub String);

impl SenderId {
    /// Returns the phone number part of the address.
    ///
    /// `4915112345678@s.whatsapp.net` yields `4915112345678`. A device suffix
    /// (`:12`) is dropped if present.
    pub fn number(&self) -> &str {
        user_part(&self.0)
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a chat or thread messages are sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub String);

impl ChatId {
    /// Returns the chat address with any device suffix removed.
    ///
    /// `123:7@s.whatsapp.net` becomes `123@s.whatsapp.net`.
    pub fn non_device(&self) -> ChatId {
        match self.0.split_once('@') {
            Some((user, server)) => {
                let user = user.split(':').next().unwrap_or(user);
                ChatId(format!("{user}@{server}"))
            }
            None => ChatId(user_part(&self.0).to_string()),
        }
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a ticket on the external tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub String);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn user_part(address: &str) -> &str {
    let user = address.split('@').next().unwrap_or(address);
    user.split(':').next().unwrap_or(user)
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays for the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Tracker,
    Store,
}

// --- Inbound messages ---

/// Reference to a downloadable attachment held by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Transport-specific handle passed back to [`download`](crate::ChatTransport::download).
    pub reference: String,
    /// Content type declared by the sender's client.
    pub mime_type: String,
}

/// The content of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Plain conversation text.
    Text(String),
    /// Extended text message (links, quotes, formatting).
    ExtendedText(String),
    Image {
        media: MediaRef,
        caption: Option<String>,
    },
    Video {
        media: MediaRef,
        caption: Option<String>,
    },
    Audio {
        media: MediaRef,
    },
    Document {
        media: MediaRef,
        file_name: Option<String>,
    },
    /// Anything else (stickers, locations, contacts, polls, reactions).
    Unsupported { kind: String },
}

impl Payload {
    /// Short name of the payload kind for logging.
    pub fn kind(&self) -> &str {
        match self {
            Payload::Text(_) => "text",
            Payload::ExtendedText(_) => "extended_text",
            Payload::Image { .. } => "image",
            Payload::Video { .. } => "video",
            Payload::Audio { .. } => "audio",
            Payload::Document { .. } => "document",
            Payload::Unsupported { kind } => kind,
        }
    }

    /// Returns the attachment reference for the four media kinds.
    pub fn media(&self) -> Option<&MediaRef> {
        match self {
            Payload::Image { media, .. }
            | Payload::Video { media, .. }
            | Payload::Audio { media }
            | Payload::Document { media, .. } => Some(media),
            _ => None,
        }
    }
}

/// A message delivered by the chat transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub sender: SenderId,
    pub chat: ChatId,
    /// Display name the sender chose for themselves, if the transport saw one.
    pub push_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub payload: Payload,
    pub is_from_me: bool,
    pub is_group: bool,
}

/// Contact details resolved by the chat transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub business_name: Option<String>,
    pub full_name: Option<String>,
    pub push_name: Option<String>,
    pub number: String,
}

/// A chat or group the bridge account is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedChannel {
    pub id: ChatId,
    pub name: String,
}

// --- Tickets ---

/// Parameters for creating a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub board_id: String,
    pub list_id: String,
}

/// A ticket as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    /// Human-facing link to the ticket.
    pub url: String,
}

/// Reference to a comment added to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRef {
    pub id: String,
    pub ticket_id: TicketId,
    /// Link to the ticket the comment landed on.
    pub ticket_url: String,
}
