// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text the engine composes: ticket bodies, comments and operator lines.

use cardbridge_core::Payload;
use cardbridge_media::Extracted;

/// The text a message contributes to its ticket.
///
/// A non-empty attachment caption wins, then plain text, then the
/// extended-text body.
pub fn resolve_text<'a>(payload: &'a Payload, extracted: &'a Extracted) -> &'a str {
    if !extracted.caption.is_empty() {
        return extracted.caption.as_str();
    }
    match payload {
        Payload::Text(body) if !body.is_empty() => body.as_str(),
        Payload::ExtendedText(body) => body.as_str(),
        _ => "",
    }
}

pub fn comment_body(prefix: &str, text: &str, attachment_note: Option<&str>) -> String {
    match attachment_note {
        Some(note) => format!("{prefix}{text}\n\n{note}"),
        None => format!("{prefix}{text}"),
    }
}

pub fn new_ticket_notice(number: &str, ticket_url: &str) -> String {
    format!("New ticket from @{number}\n\n{ticket_url}")
}

pub fn new_message_notice(number: &str, ticket_url: &str) -> String {
    format!("New message from @{number}\n\n{ticket_url}")
}

pub fn create_failed_notice(number: &str) -> String {
    format!("*Failed to create a ticket*\n\nhttps://wa.me/{number}")
}

pub fn forward_failed_notice(number: &str) -> String {
    format!("*Failed to forward a message*\n\nhttps://wa.me/{number}")
}
