// SPDX-FileCopyrightText: 2026 Cardbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the cardbridge chat-to-ticket bridge.
//!
//! This crate provides the error type, the common value types, and the three
//! capability traits the bridging engine is written against: the chat
//! transport, the ticket tracker, and the conversation state store. Concrete
//! adapters live in their own crates and implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BridgeError;
pub use types::{
    AdapterType, ChatId, CommentRef, ContactInfo, HealthStatus, InboundMessage, JoinedChannel,
    MediaRef, MessageId, NewTicket, Payload, SenderId, Ticket, TicketId,
};

pub use traits::{ChatTransport, ConversationStore, PluginAdapter, TicketTracker};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_error_has_all_variants() {
        let _config = BridgeError::Config("test".into());
        let _unsupported = BridgeError::UnsupportedType {
            kind: "sticker".into(),
        };
        let _no_ext = BridgeError::NoExtension {
            mime_type: "application/x-nothing".into(),
        };
        let _storage = BridgeError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        let _download = BridgeError::Download {
            message: "test".into(),
            source: None,
        };
        let _store = BridgeError::StoreUnavailable {
            source: Box::new(std::io::Error::other("locked")),
        };
        let _create = BridgeError::CreateFailed {
            message: "test".into(),
            source: None,
        };
        let _field = BridgeError::FieldUpdateFailed {
            message: "test".into(),
            source: None,
        };
        let _comment = BridgeError::CommentFailed {
            message: "test".into(),
            source: None,
        };
        let _attach = BridgeError::AttachFailed {
            message: "test".into(),
            source: None,
        };
        let _not_found = BridgeError::TicketNotFound {
            ticket_id: "t-1".into(),
        };
        let _tracker = BridgeError::Tracker {
            message: "test".into(),
            source: None,
        };
        let _transport = BridgeError::Transport {
            message: "test".into(),
            source: None,
        };
        let _internal = BridgeError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Transport, AdapterType::Tracker, AdapterType::Store] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_chat_transport<T: ChatTransport>() {}
        fn _assert_ticket_tracker<T: TicketTracker>() {}
        fn _assert_conversation_store<T: ConversationStore>() {}
    }
}
