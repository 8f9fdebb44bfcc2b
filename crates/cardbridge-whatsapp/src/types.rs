// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types shared with the WhatsApp Web sidecar.
//!
//! Webhook events arrive as JSON with a `type` tag. Message content mirrors
//! the WhatsApp message structure: at most one of the content fields is set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cardbridge_core::{ChatId, InboundMessage, MediaRef, MessageId, Payload, SenderId};

/// An event pushed by the sidecar to `POST /events`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidecarEvent {
    /// A new message in any chat the account is part of.
    Message(MessageEvent),
    /// The sidecar (re)connected to WhatsApp.
    Connected,
    /// The sidecar lost its WhatsApp session.
    Disconnected {
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageEvent {
    pub id: String,
    pub chat: String,
    pub sender: String,
    #[serde(default)]
    pub push_name: Option<String>,
    /// Unix seconds.
    pub timestamp: i64,
    #[serde(default)]
    pub is_from_me: bool,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub message: MessageContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub conversation: Option<String>,
    #[serde(default)]
    pub extended_text: Option<ExtendedText>,
    #[serde(default)]
    pub image: Option<CaptionedMedia>,
    #[serde(default)]
    pub video: Option<CaptionedMedia>,
    #[serde(default)]
    pub audio: Option<MediaContent>,
    #[serde(default)]
    pub document: Option<DocumentContent>,
    /// Name of the content kind when it is none of the above (sticker, location, ...).
    #[serde(default)]
    pub other_kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtendedText {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaContent {
    pub media_ref: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionedMedia {
    pub media_ref: String,
    pub mime_type: String,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentContent {
    pub media_ref: String,
    pub mime_type: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl MessageContent {
    /// Classify the content. Attachments win over text, checked in the
    /// order video, audio, document, image.
    pub fn into_payload(self) -> Payload {
        let media = |media_ref: String, mime_type: String| MediaRef {
            reference: media_ref,
            mime_type,
        };

        if let Some(v) = self.video {
            return Payload::Video {
                media: media(v.media_ref, v.mime_type),
                caption: v.caption,
            };
        }
        if let Some(a) = self.audio {
            return Payload::Audio {
                media: media(a.media_ref, a.mime_type),
            };
        }
        if let Some(d) = self.document {
            return Payload::Document {
                media: media(d.media_ref, d.mime_type),
                file_name: d.file_name,
            };
        }
        if let Some(i) = self.image {
            return Payload::Image {
                media: media(i.media_ref, i.mime_type),
                caption: i.caption,
            };
        }
        match (self.conversation, self.extended_text) {
            (Some(text), _) if !text.is_empty() => Payload::Text(text),
            (_, Some(ext)) => Payload::ExtendedText(ext.text.unwrap_or_default()),
            _ => Payload::Unsupported {
                kind: self.other_kind.unwrap_or_else(|| "unknown".to_string()),
            },
        }
    }
}

impl MessageEvent {
    /// Convert to the engine's message type.
    ///
    /// Group chats are detected by flag or by the `@g.us` server. When
    /// `own_jid` is given, messages whose sender is the bridge account are
    /// flagged as self-sent even if the sidecar did not say so.
    pub fn into_inbound(self, own_jid: Option<&str>) -> InboundMessage {
        let sender = SenderId(non_device(&self.sender));
        let is_from_me = self.is_from_me
            || own_jid.is_some_and(|own| non_device(own) == sender.0);
        let is_group = self.is_group || self.chat.ends_with("@g.us");
        let timestamp = DateTime::<Utc>::from_timestamp(self.timestamp, 0).unwrap_or_else(Utc::now);

        InboundMessage {
            id: MessageId(self.id),
            chat: ChatId(self.chat),
            sender,
            push_name: self.push_name.filter(|n| !n.is_empty()),
            timestamp,
            payload: self.message.into_payload(),
            is_from_me,
            is_group,
        }
    }
}

/// Strip a `:device` suffix from the user part of an address.
fn non_device(address: &str) -> String {
    ChatId(address.to_string()).non_device().0
}

// --- Sidecar REST bodies ---

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ReceiptRequest<'a> {
    pub message_ids: Vec<&'a str>,
    /// Unix seconds.
    pub timestamp: i64,
    pub chat: &'a str,
    pub sender: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ContactResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub push_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupEntry {
    pub jid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SidecarHealth {
    #[serde(default)]
    pub connected: bool,
}
