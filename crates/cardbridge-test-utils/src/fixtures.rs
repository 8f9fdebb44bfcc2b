// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message builders.

use chrono::Utc;

use cardbridge_core::{ChatId, InboundMessage, MediaRef, MessageId, Payload, SenderId};

/// Address of a one-to-one chat participant for `number`.
pub fn sender(number: &str) -> SenderId {
    SenderId(format!("{number}@s.whatsapp.net"))
}

/// A direct message from `number` with the given payload.
pub fn message(number: &str, payload: Payload) -> InboundMessage {
    let sender = sender(number);
    InboundMessage {
        id: MessageId(format!("msg-{number}-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())),
        chat: ChatId(sender.0.clone()),
        sender,
        push_name: None,
        timestamp: Utc::now(),
        payload,
        is_from_me: false,
        is_group: false,
    }
}

/// A plain text direct message.
pub fn text(number: &str, body: &str) -> InboundMessage {
    message(number, Payload::Text(body.to_string()))
}

/// An image direct message.
pub fn image(number: &str, reference: &str, mime_type: &str, caption: Option<&str>) -> InboundMessage {
    message(
        number,
        Payload::Image {
            media: MediaRef {
                reference: reference.to_string(),
                mime_type: mime_type.to_string(),
            },
            caption: caption.map(str::to_string),
        },
    )
}
